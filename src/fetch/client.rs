//! HTTP fetcher backed by reqwest.

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

/// Fetches roster pages over HTTP with a fixed User-Agent and timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_seconds: f64,
}

impl HttpFetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(config.timeout_seconds)
            .ok()
            .filter(|t| !t.is_zero())
            .with_context(|| {
                format!(
                    "Invalid fetch timeout: {} (must be a positive number of seconds)",
                    config.timeout_seconds
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn classify(&self, url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                seconds: self.timeout_seconds,
            }
        } else if e.is_builder() {
            FetchError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(url, e))?;
        debug!("Received {} bytes from {}", body.len(), url);

        Ok(body)
    }
}
