use crate::domain::model::ContentQuery;
use crate::utils::error::Result;
use url::Url;

/// Ordered query parameters with `append`/`set` semantics, so repeated keys
/// such as `populate` survive until they are explicitly overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Replaces the first value for `key` and drops any later ones, or appends
    /// when the key is not present yet.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || *k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Splits `key=value` on the first `=`. A filter without `=` keeps its key
/// with an empty value; empty filters and empty keys yield nothing.
pub fn split_filter(filter: &str) -> Option<(&str, &str)> {
    let (key, value) = filter.split_once('=').unwrap_or((filter, ""));
    if key.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

/// Appends the deep-population parameters for a comma-separated field list.
///
/// `seo.image,author` becomes `populate=seo&populate[1]=seo.image&populate=author`:
/// a nested path emits its parent plus an indexed entry numbered by the
/// field's 1-based position in the list. Only the first two segments of a
/// path are used, so `blocks.media.file` is populated as `blocks.media`.
pub fn append_populate(params: &mut QueryParams, populate: &str) {
    if populate.is_empty() {
        return;
    }

    for (index, field) in populate.split(',').enumerate() {
        let mut segments = field.split('.');
        match (segments.next(), segments.next()) {
            (Some(parent), Some(child)) => {
                params.append("populate", parent);
                params.append(
                    format!("populate[{}]", index + 1),
                    format!("{}.{}", parent, child),
                );
            }
            _ => params.append("populate", field),
        }
    }
}

/// Query parameters for a content collection request, defaults applied.
pub fn content_params(query: &ContentQuery) -> QueryParams {
    let mut params = QueryParams::new();

    append_populate(&mut params, query.populate_or_default());

    if let Some((key, value)) = query.filter.as_deref().and_then(split_filter) {
        params.set(key, value);
    }
    // an explicitly empty populate is still sent, as `populate=`
    if query.populate_or_default().is_empty() {
        params.set("populate", "");
    }
    params.set("pagination[limit]", query.limit_or_default().to_string());
    params.set("sort", query.sort_or_default());

    params
}

/// Resolves `path` against `api_url` and attaches `params` in order.
pub fn build_url(api_url: &str, path: &str, params: &QueryParams) -> Result<Url> {
    let mut url = Url::parse(api_url)?.join(path)?;

    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.pairs().iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    Ok(url)
}

/// Full content collection URL for `query`.
pub fn build_content_url(api_url: &str, query: &ContentQuery) -> Result<Url> {
    build_url(api_url, &query.collection_path(), &content_params(query))
}
