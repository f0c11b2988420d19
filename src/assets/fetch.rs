use crate::config::SyncConfig;
use crate::error::{DocsError, FetchError, Result};
use std::time::Duration;

/// HTTP fetcher for remote assets with a bounded retry policy.
///
/// Transport errors and 5xx responses are retried with exponential backoff;
/// 4xx responses and invalid payloads fail immediately.
pub struct Fetcher {
    client: reqwest::Client,
    attempts: u32,
    backoff: Duration,
}

impl Fetcher {
    /// Build a fetcher from the `[sync]` config section
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("zelig-docs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DocsError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            attempts: config.attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    /// Fetch the full body at `url`, retrying transient failures
    pub async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let mut delay = self.backoff;
        let mut attempt = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.attempts && e.is_retryable() => {
                    tracing::warn!(
                        "Attempt {attempt}/{} for {url} failed ({e}), retrying in {delay:?}",
                        self.attempts
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            FetchError::Network {
                url: url.to_string(),
                source: e,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            source: e,
        })?;

        Ok(body.to_vec())
    }
}
