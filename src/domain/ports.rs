use crate::core::schema::ContentSchema;
use crate::domain::model::{ContentQuery, ContentRecord, ServiceConfig};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_url(&self) -> &str;
}

impl ConfigProvider for ServiceConfig {
    fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_content(&self, query: &ContentQuery) -> Result<Vec<ContentRecord>>;
    async fn fetch_schema(&self, content_type: &str) -> Result<ContentSchema>;
}
