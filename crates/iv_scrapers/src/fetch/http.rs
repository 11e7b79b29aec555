use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use iv_core::{FailureKind, FetchError, FetchRequest};
use tracing::info;

/// Raw transport: one attempt at fetching a page as text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest, identity: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::new(FailureKind::Other, format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest, identity: &str) -> Result<String, FetchError> {
        let url = request
            .to_url()
            .map_err(|e| FetchError::new(FailureKind::ClientError, e.to_string()))?;
        info!("🌐 Fetching page: {}", url);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, identity)
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml")
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8")
            .header(REFERER, "https://www.google.com/")
            .send()
            .await?;

        let status = response.status();
        if let Some(kind) = FailureKind::from_status(status.as_u16()) {
            return Err(FetchError::new(kind, format!("HTTP {} for {}", status, request.url)));
        }
        Ok(response.text().await?)
    }
}
