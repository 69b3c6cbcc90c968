//! Retrying HTTP client shared by every provider.
//!
//! Each provider owns exactly one [`UpstreamClient`], built lazily on first use
//! from a [`ClientConfig`]. Transient failures (connect errors, timeouts, 5xx,
//! 408, 429) are retried with exponential backoff; everything else surfaces
//! immediately.

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, Jitter, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::models::ProviderKey;

/// Default `User-Agent` sent to every upstream.
pub const DEFAULT_USER_AGENT: &str = "finfeed";

/// Upstream error bodies longer than this are cut before being kept.
const MAX_UPSTREAM_MESSAGE_LEN: usize = 512;

/// HTTP client settings applied to every provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Identifying `User-Agent` header for upstream attribution.
    pub user_agent: String,

    /// Whole-request timeout, per attempt.
    pub timeout_ms: u64,

    pub connect_timeout_ms: u64,

    /// Retries after the first attempt. Transient failures only.
    pub max_retries: u32,

    /// Delay before the first retry.
    pub retry_base_interval_ms: u64,

    /// Upper bound for any single retry delay.
    pub retry_max_interval_ms: u64,

    /// Exponential growth factor between retries.
    pub backoff_factor: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            max_retries: 2,
            retry_base_interval_ms: 50,
            retry_max_interval_ms: 400,
            backoff_factor: 2,
        }
    }
}

/// A provider's HTTP client with retry middleware and error mapping.
#[derive(Clone)]
pub struct UpstreamClient {
    inner: ClientWithMiddleware,
    provider: ProviderKey,
    /// Credential to mask in logged URLs.
    secret: Option<String>,
}

impl UpstreamClient {
    /// Build a client for `provider`.
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the TLS backend or the configured
    /// `User-Agent` cannot be used.
    pub fn build(
        provider: ProviderKey,
        config: &ClientConfig,
        secret: Option<&str>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| {
                ProviderError::upstream(provider, format!("Failed to build HTTP client: {}", e))
            })?;

        let min_interval = Duration::from_millis(config.retry_base_interval_ms);
        let max_interval =
            Duration::from_millis(config.retry_max_interval_ms.max(config.retry_base_interval_ms));
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(min_interval, max_interval)
            .jitter(Jitter::Bounded)
            .base(config.backoff_factor)
            .build_with_max_retries(config.max_retries);

        let inner = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        debug!(
            "{}: HTTP client ready (max_retries={}, timeout={}ms)",
            provider, config.max_retries, config.timeout_ms
        );

        Ok(Self {
            inner,
            provider,
            secret: secret.filter(|s| !s.is_empty()).map(str::to_string),
        })
    }

    /// GET `url` with `query` and return the body of a 2xx response.
    ///
    /// Non-2xx responses never reach the caller's parser: 429 becomes
    /// [`ProviderError::RateLimited`], anything else [`ProviderError::Upstream`]
    /// carrying the status and the (truncated) body.
    pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, ProviderError> {
        debug!("{} request: GET {}", self.provider, self.redact(url, query));

        let response = self.inner.get(url).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.ok();
            return Err(ProviderError::RateLimited {
                provider: self.provider,
                upstream_message: body.and_then(truncate_body),
            });
        }

        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(ProviderError::Upstream {
                provider: self.provider,
                message: format!("HTTP {}", status),
                upstream_message: body.and_then(truncate_body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.into()))
    }

    /// GET and decode a JSON body. A body of the wrong shape is a payload error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let text = self.get_text(url, query).await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn redact(&self, url: &str, query: &[(&str, &str)]) -> String {
        let mut rendered = url.to_string();
        if !query.is_empty() {
            let pairs = query
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("&");
            rendered.push('?');
            rendered.push_str(&pairs);
        }

        match self.secret {
            Some(ref secret) => rendered.replace(secret.as_str(), "***"),
            None => rendered,
        }
    }
}

fn truncate_body(body: String) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_UPSTREAM_MESSAGE_LEN).collect())
}
