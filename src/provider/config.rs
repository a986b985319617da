// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider configuration options

use std::time::Duration;

use crate::config::LeaderboardConfig;
use crate::transport::{BackoffPolicy, RequestPacer};

/// Configuration for creating the JSON-RPC provider used by the raw-log source
///
/// # Example
///
/// ```rust,ignore
/// use holdscan::provider::ProviderConfig;
/// use holdscan::transport::RequestPacer;
/// use std::time::Duration;
///
/// let config = ProviderConfig::new("https://rpc.hyperliquid.xyz/evm")
///     .with_pacer(RequestPacer::new(Duration::from_millis(120)))
///     .with_timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// RPC endpoint URL
    pub url: String,
    /// Per-request HTTP timeout
    pub timeout: Option<Duration>,
    /// Retry policy for transient failures (None disables retries)
    pub backoff: Option<BackoffPolicy>,
    /// Pacer shared with other clients (None disables pacing)
    pub pacer: Option<RequestPacer>,
}

impl ProviderConfig {
    /// Create a new provider configuration with the specified URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            backoff: None,
            pacer: None,
        }
    }

    /// Derive the provider settings for `url` from a run configuration
    #[must_use]
    pub fn for_run(url: impl Into<String>, run: &LeaderboardConfig, pacer: RequestPacer) -> Self {
        Self::new(url)
            .with_timeout(run.request_timeout)
            .with_backoff(run.backoff.clone())
            .with_pacer(pacer)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Share a pacer with other clients
    #[must_use]
    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = Some(pacer);
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new("http://localhost:8545")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_new() {
        let config = ProviderConfig::new("https://rpc.hyperliquid.xyz/evm");
        assert_eq!(config.url, "https://rpc.hyperliquid.xyz/evm");
        assert!(config.backoff.is_none());
        assert!(config.pacer.is_none());
    }

    #[test]
    fn test_run_settings_carry_over() {
        let run = crate::config::LeaderboardConfigBuilder::new(alloy_primitives::Address::ZERO)
            .request_timeout(Duration::from_secs(7))
            .build()
            .unwrap();
        let pacer = RequestPacer::new(Duration::from_millis(250));

        let config = ProviderConfig::for_run("http://localhost:8545", &run, pacer);

        assert_eq!(config.timeout, Some(Duration::from_secs(7)));
        assert_eq!(config.backoff, Some(run.backoff.clone()));
        assert_eq!(config.pacer.map(|p| p.min_interval()), Some(Duration::from_millis(250)));
    }
}
