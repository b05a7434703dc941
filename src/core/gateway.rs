use crate::core::query::{build_url, QueryParams};
use crate::utils::error::{LoaderError, Result};
use reqwest::Client;

/// Single-shot JSON GET against the CMS. No retries, no caching.
#[derive(Debug, Clone)]
pub struct FetchGateway {
    client: Client,
    api_url: String,
}

impl FetchGateway {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_url)
    }

    pub fn with_client(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    pub async fn get_json(&self, path: &str, params: &QueryParams) -> Result<serde_json::Value> {
        let url = build_url(&self.api_url, path, params)?;

        tracing::debug!("Making CMS request to: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("CMS response status: {}", status);

        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            tracing::error!("❌ CMS request to {} failed: {}", path, status);
            return Err(LoaderError::Transport {
                status,
                status_text,
            });
        }

        Ok(response.json().await?)
    }
}
