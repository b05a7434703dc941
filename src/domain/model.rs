use serde::{Deserialize, Serialize};

pub const DEFAULT_POPULATE: &str = "SEO.socialImage";
pub const DEFAULT_SORT: &str = "updatedAt:desc";
pub const DEFAULT_PAGE_LIMIT: u32 = 25;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;

/// A single content record exactly as the CMS returned it.
pub type ContentRecord = serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginate {
    pub limit: u32,
}

/// Request for one page of a content collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentQuery {
    pub content_type: String,
    /// `key=value`, split on the first `=`.
    #[serde(default)]
    pub filter: Option<String>,
    /// Comma-separated field paths; `None` means [`DEFAULT_POPULATE`].
    #[serde(default)]
    pub populate: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub paginate: Option<Paginate>,
}

impl ContentQuery {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_populate(mut self, populate: impl Into<String>) -> Self {
        self.populate = Some(populate.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.paginate = Some(Paginate { limit });
        self
    }

    /// Collection path with the literal plural suffix, e.g. `/api/articles`.
    pub fn collection_path(&self) -> String {
        format!("/api/{}s", self.content_type)
    }

    pub fn populate_or_default(&self) -> &str {
        self.populate.as_deref().unwrap_or(DEFAULT_POPULATE)
    }

    pub fn sort_or_default(&self) -> &str {
        self.sort.as_deref().unwrap_or(DEFAULT_SORT)
    }

    /// A limit of zero falls back to the default page size.
    pub fn limit_or_default(&self) -> u32 {
        match &self.paginate {
            Some(p) if p.limit > 0 => p.limit,
            _ => DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub store_slug: String,
    pub api_url: String,
    /// Seconds between site rebuilds; carried for the build pipeline, unused here.
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u64,
}

fn default_sync_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

impl ServiceConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            store_slug: String::new(),
            api_url: api_url.into(),
            sync_interval: DEFAULT_SYNC_INTERVAL_SECS,
        }
    }
}

/// `documentId` when present, otherwise the numeric or string `id`.
pub fn record_id(record: &ContentRecord) -> Option<String> {
    ["documentId", "id"]
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// One validated record of a loaded collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: String,
    pub data: ContentRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadedCollection {
    pub name: String,
    pub content_type: String,
    pub entries: Vec<Entry>,
}
