pub mod gateway;
pub mod loader;
pub mod query;
pub mod schema;

pub use crate::domain::model::{ContentQuery, ContentRecord, ServiceConfig};
pub use crate::domain::ports::{ConfigProvider, ContentSource, Storage};
pub use crate::utils::error::Result;
