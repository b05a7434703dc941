use crate::domain::model::{ContentQuery, Paginate, ServiceConfig};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LoaderError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Loader configuration file:
///
/// ```toml
/// [service]
/// store_slug = "main"
/// api_url = "${STRAPI_API_URL}"
/// sync_interval = 300
///
/// [[collections]]
/// name = "posts"
/// content_type = "post"
/// filter = "store=3"
/// populate = "SEO.socialImage,author"
/// limit = 50
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub collections: Vec<CollectionSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    pub content_type: String,
    pub filter: Option<String>,
    pub populate: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<u32>,
}

impl CollectionSpec {
    pub fn to_query(&self) -> ContentQuery {
        ContentQuery {
            content_type: self.content_type.clone(),
            filter: self.filter.clone(),
            populate: self.populate.clone(),
            sort: self.sort.clone(),
            paginate: self.limit.map(|limit| Paginate { limit }),
        }
    }
}

impl LoaderConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| LoaderError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LoaderError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionSpec> {
        self.collections.iter().find(|c| c.name == name)
    }
}

impl ConfigProvider for LoaderConfig {
    fn api_url(&self) -> &str {
        &self.service.api_url
    }
}

impl Validate for LoaderConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("service.api_url", &self.service.api_url)?;
        validation::validate_positive_number("service.sync_interval", self.service.sync_interval, 1)?;

        let mut names = HashSet::new();
        for collection in &self.collections {
            validation::validate_non_empty_string("collections.name", &collection.name)?;
            validation::validate_content_type("collections.content_type", &collection.content_type)?;
            if !names.insert(collection.name.as_str()) {
                return Err(LoaderError::InvalidConfigValue {
                    field: "collections.name".to_string(),
                    value: collection.name.clone(),
                    reason: "Collection names must be unique".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[service]
store_slug = "main"
api_url = "https://cms.example.com"
sync_interval = 120

[[collections]]
name = "posts"
content_type = "post"
filter = "store=3"
populate = "SEO.socialImage,author"
limit = 50

[[collections]]
name = "pages"
content_type = "page"
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = LoaderConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.service.store_slug, "main");
        assert_eq!(config.api_url(), "https://cms.example.com");
        assert_eq!(config.service.sync_interval, 120);
        assert_eq!(config.collections.len(), 2);
        assert!(config.validate().is_ok());

        let posts = config.collection("posts").unwrap().to_query();
        assert_eq!(posts.content_type, "post");
        assert_eq!(posts.filter.as_deref(), Some("store=3"));
        assert_eq!(posts.limit_or_default(), 50);

        let pages = config.collection("pages").unwrap().to_query();
        assert_eq!(pages.populate_or_default(), "SEO.socialImage");
        assert_eq!(pages.limit_or_default(), 25);
    }

    #[test]
    fn test_service_defaults() {
        let config = LoaderConfig::from_toml_str(
            r#"
[service]
api_url = "http://localhost:1337"
"#,
        )
        .unwrap();

        assert_eq!(config.service.store_slug, "");
        assert_eq!(config.service.sync_interval, 300);
        assert!(config.collections.is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STRAPI_LOADER_TEST_URL", "https://env.cms.example.com");

        let config = LoaderConfig::from_toml_str(
            r#"
[service]
api_url = "${STRAPI_LOADER_TEST_URL}"
"#,
        )
        .unwrap();
        assert_eq!(config.service.api_url, "https://env.cms.example.com");

        std::env::remove_var("STRAPI_LOADER_TEST_URL");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let config = LoaderConfig::from_toml_str(
            r#"
[service]
api_url = "${STRAPI_LOADER_SURELY_UNSET}"
"#,
        )
        .unwrap();

        assert_eq!(config.service.api_url, "${STRAPI_LOADER_SURELY_UNSET}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_collection_names_rejected() {
        let config = LoaderConfig::from_toml_str(
            r#"
[service]
api_url = "https://cms.example.com"

[[collections]]
name = "posts"
content_type = "post"

[[collections]]
name = "posts"
content_type = "article"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = LoaderConfig::from_toml_str("[service\napi_url = 1").unwrap_err();
        assert!(matches!(err, LoaderError::Config { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = LoaderConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.collections[0].name, "posts");
    }
}
