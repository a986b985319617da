// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Exponential backoff for RPC and explorer requests.
//!
//! [`BackoffPolicy`] is shared by two consumers:
//! - [`RetryLayer`], a Tower layer wrapped around the Alloy HTTP transport so
//!   every `eth_getLogs` / `eth_getBlockByNumber` call is retried transparently
//! - [`retry_with_backoff`], used by the explorer client, whose requests do not
//!   go through the Alloy transport

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket, RpcError};
use alloy_transport::{TransportError, TransportErrorKind};
use tower::Layer;
use tracing::{debug, warn};

use crate::config::constants::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES};
use crate::errors::SourceError;

/// Bounds for retrying a single request.
///
/// The delay before retry `n` (zero-based) is:
///
/// ```text
/// delay = min(base_delay * 2^n, max_delay)
/// ```
///
/// so a request is attempted at most `max_retries + 1` times and never waits
/// longer than `max_delay` between attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Maximum number of retry attempts (not including the initial request).
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl BackoffPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// A policy that never retries; used by tests that count attempts.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Backoff before the retry following failed attempt `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2u64.saturating_pow(attempt);
        let delay_ms = self
            .base_delay
            .as_millis()
            .saturating_mul(multiplier as u128);
        let capped_delay_ms = delay_ms.min(self.max_delay.as_millis()) as u64;
        Duration::from_millis(capped_delay_ms)
    }
}

/// Runs `request` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
///
/// Exhaustion is reported as [`SourceError::RetriesExhausted`] wrapping the last
/// failure, so the caller sees both the operation and the root cause.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    operation: &str,
    mut request: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0u32;
    loop {
        match request().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if !error.is_retryable() => {
                debug!(operation, error = %error, "Non-retryable error, not retrying");
                return Err(error);
            }
            Err(error) if attempt >= policy.max_retries => {
                warn!(
                    operation,
                    error = %error,
                    attempts = attempt + 1,
                    "Max retries exceeded"
                );
                return Err(SourceError::RetriesExhausted {
                    operation: operation.to_string(),
                    attempts: attempt + 1,
                    source: Box::new(error),
                });
            }
            Err(error) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    operation,
                    error = %error,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis(),
                    "Retryable error, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// A Tower layer that adds retry logic with exponential backoff to RPC requests.
///
/// # Example
///
/// ```rust,ignore
/// use holdscan::transport::{BackoffPolicy, RetryLayer};
/// use alloy_rpc_client::ClientBuilder;
///
/// let client = ClientBuilder::default()
///     .layer(RetryLayer::new(BackoffPolicy::default()))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryLayer {
    policy: Arc<BackoffPolicy>,
}

impl RetryLayer {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RetryService {
            service,
            policy: self.policy.clone(),
        }
    }
}

/// A Tower service that retries failed RPC requests with exponential backoff.
#[derive(Clone, Debug)]
pub struct RetryService<S> {
    service: S,
    policy: Arc<BackoffPolicy>,
}

impl<S> tower::Service<RequestPacket> for RetryService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let service = self.service.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            let mut attempt = 0u32;
            loop {
                let mut service_clone = service.clone();

                match service_clone.call(request.clone()).await {
                    Ok(response) => {
                        if attempt > 0 {
                            debug!(attempt, "RPC request succeeded after retry");
                        }
                        return Ok(response);
                    }
                    Err(error) => {
                        if !is_retryable_error(&error) {
                            debug!(error = %error, "Non-retryable RPC error, not retrying");
                            return Err(error);
                        }

                        if attempt >= policy.max_retries {
                            warn!(
                                error = %error,
                                attempts = attempt + 1,
                                "Max RPC retries exceeded"
                            );
                            return Err(error);
                        }

                        let delay = policy.delay_for(attempt);
                        warn!(
                            error = %error,
                            attempt = attempt + 1,
                            max_retries = policy.max_retries,
                            delay_ms = delay.as_millis(),
                            "Retryable RPC error, backing off"
                        );

                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        })
    }
}

/// Determines if an RPC error is retryable.
///
/// Returns `true` for transient errors that may succeed on retry:
/// - Transport/connection errors (connection issues, HTTP 5xx, rate limits)
/// - Malformed or truncated response bodies
/// - Null responses
/// - Error responses whose code the provider marks as retryable
fn is_retryable_error(error: &TransportError) -> bool {
    match error {
        RpcError::Transport(kind) => is_transport_kind_retryable(kind),
        // Malformed request: retrying sends the same bytes again
        RpcError::SerError(_) => false,
        RpcError::DeserError { .. } => true,
        RpcError::ErrorResp(err) => err.is_retry_err(),
        RpcError::NullResp => true,
        _ => false,
    }
}

fn is_transport_kind_retryable(kind: &TransportErrorKind) -> bool {
    kind.is_retry_err()
}
