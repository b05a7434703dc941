pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::LoaderConfig};
pub use core::loader::{fetch_content, fetch_schema, load_collection, StrapiLoader};
pub use core::schema::{ContentSchema, FieldValidator};
pub use domain::model::{ContentQuery, ServiceConfig};
pub use utils::error::{LoaderError, Result};
