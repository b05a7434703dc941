use crate::config::toml_config::LoaderConfig;
use crate::domain::model::{ContentQuery, Paginate, ServiceConfig};
use crate::utils::error::{LoaderError, Result};
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "strapi-loader")]
#[command(about = "Fetch content and content-type schemas from a Strapi CMS")]
pub struct CliConfig {
    /// Base URL of the CMS; overrides `service.api_url` from the config file
    #[arg(long, env = "STRAPI_API_URL")]
    pub api_url: Option<String>,

    /// Loader configuration file (TOML)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print one page of records as JSON
    Content {
        content_type: String,
        #[arg(long, help = "key=value filter")]
        filter: Option<String>,
        #[arg(long, help = "Comma-separated fields to populate")]
        populate: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Print the record validator for a content type as JSON
    Schema { content_type: String },
    /// Load and validate the collections listed in the config file
    Load {
        #[arg(long, help = "Only load this collection")]
        collection: Option<String>,
        #[arg(long, help = "Write <name>.json files here instead of stdout")]
        output: Option<String>,
    },
}

impl Command {
    pub fn content_query(&self) -> Option<ContentQuery> {
        match self {
            Command::Content {
                content_type,
                filter,
                populate,
                sort,
                limit,
            } => Some(ContentQuery {
                content_type: content_type.clone(),
                filter: filter.clone(),
                populate: populate.clone(),
                sort: sort.clone(),
                paginate: limit.map(|limit| Paginate { limit }),
            }),
            _ => None,
        }
    }
}

impl CliConfig {
    /// Reads and validates the `--config` file, if one was given.
    pub fn load_file(&self) -> Result<Option<LoaderConfig>> {
        let Some(path) = &self.config else {
            return Ok(None);
        };

        let file = LoaderConfig::from_file(path)?;
        file.validate()?;
        Ok(Some(file))
    }

    /// Service settings from the config file with `--api-url` applied on top.
    pub fn service_config(&self, file: Option<&LoaderConfig>) -> Result<ServiceConfig> {
        let mut service = match file {
            Some(file) => file.service.clone(),
            None => ServiceConfig::new(String::new()),
        };
        if let Some(api_url) = &self.api_url {
            service.api_url = api_url.clone();
        }

        if service.api_url.is_empty() {
            return Err(LoaderError::Config {
                message: "no CMS URL: pass --api-url, set STRAPI_API_URL or use --config"
                    .to_string(),
            });
        }
        validation::validate_url("api_url", &service.api_url)?;
        Ok(service)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(api_url) = &self.api_url {
            validation::validate_url("api_url", api_url)?;
        }

        match &self.command {
            Command::Content { content_type, .. } | Command::Schema { content_type } => {
                validation::validate_content_type("content_type", content_type)
            }
            Command::Load { .. } if self.config.is_none() => Err(LoaderError::Config {
                message: "the load command needs --config".to_string(),
            }),
            Command::Load { .. } => Ok(()),
        }
    }
}
