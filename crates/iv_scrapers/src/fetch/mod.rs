//! Page acquisition: identity rotation, retry with backoff and response caching
//! layered over a raw [`PageFetcher`] transport.

pub mod cache;
pub mod http;
pub mod identity;
pub mod retry;

use std::sync::Arc;
use std::time::Duration;
use iv_core::config::FetchConfig;
use iv_core::{FetchError, FetchRequest, Result};

pub use cache::{CacheEntry, ResponseCache};
pub use http::{HttpFetcher, PageFetcher};
pub use identity::IdentityRotator;
pub use retry::{Classify, RetryPolicy};

/// Shared acquisition stack handed to every source adapter.
/// Cloning is cheap; clones share the same cache and rotator.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn PageFetcher>,
    identities: Arc<IdentityRotator>,
    retry: Arc<RetryPolicy>,
    cache: Arc<ResponseCache<String>>,
    cache_ttl: Duration,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn PageFetcher>,
        identities: Arc<IdentityRotator>,
        retry: Arc<RetryPolicy>,
        cache: Arc<ResponseCache<String>>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            transport,
            identities,
            retry,
            cache,
            cache_ttl,
        }
    }

    /// Builds the HTTP-backed stack described by `config`.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        let transport = HttpFetcher::new(config.request_timeout())?;
        Self::with_transport(Arc::new(transport), config)
    }

    /// Same stack as [`Fetcher::from_config`] over a caller-supplied transport.
    pub fn with_transport(transport: Arc<dyn PageFetcher>, config: &FetchConfig) -> Result<Self> {
        Ok(Self::new(
            transport,
            Arc::new(IdentityRotator::new(config.identities.clone())?),
            Arc::new(RetryPolicy::from_config(config)),
            Arc::new(ResponseCache::new()),
            config.cache_ttl(),
        ))
    }

    /// Cached, retried fetch. Each attempt uses the next rotated identity.
    pub async fn get(&self, request: &FetchRequest) -> std::result::Result<String, FetchError> {
        let key = request.cache_key();
        self.cache
            .get_or_fetch(&key, self.cache_ttl, move || {
                self.retry.execute(move || {
                    let identity = self.identities.next();
                    self.transport.fetch(request, identity)
                })
            })
            .await
    }

    pub fn cache(&self) -> &ResponseCache<String> {
        &self.cache
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use iv_core::FailureKind;
    use std::sync::Mutex;

    struct FlakyTransport {
        failures_left: Mutex<u32>,
        identities: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageFetcher for FlakyTransport {
        async fn fetch(&self, _request: &FetchRequest, identity: &str) -> std::result::Result<String, FetchError> {
            self.identities.lock().unwrap().push(identity.to_string());
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(FetchError::new(FailureKind::Connect, "reset"));
            }
            Ok("<html></html>".to_string())
        }
    }

    fn test_config() -> FetchConfig {
        FetchConfig {
            identities: vec!["ua-1".into(), "ua-2".into()],
            base_delay_ms: 1,
            ..FetchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_retries_rotate_identity_and_cache_result() {
        let transport = Arc::new(FlakyTransport {
            failures_left: Mutex::new(1),
            identities: Mutex::new(Vec::new()),
        });
        let fetcher = Fetcher::with_transport(transport.clone(), &test_config()).unwrap();
        let request = FetchRequest::new("https://www.zhihu.com/search").with_param("q", "rust");

        assert_eq!(fetcher.get(&request).await.unwrap(), "<html></html>");
        assert_eq!(fetcher.get(&request).await.unwrap(), "<html></html>");

        let used = transport.identities.lock().unwrap().clone();
        assert_eq!(used, vec!["ua-1".to_string(), "ua-2".to_string()]);
        assert_eq!(fetcher.cache().len(), 1);
    }
}
