// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for transfer sources.
//!
//! Both the paginated explorer API and the raw-log RPC source report failures
//! through [`SourceError`]. The variants carry enough context (operation, page,
//! block range) for the caller to decide whether to skip the slice, or abort.

use super::RpcError;

/// Errors that can occur while fetching transfers from a source.
///
/// # Examples
///
/// ```rust
/// use holdscan::SourceError;
///
/// let error = SourceError::malformed("tokennfttx page 3", "expected value at line 1 column 1");
/// assert!(error.is_retryable());
///
/// let error = SourceError::api("tokennfttx page 3", "Invalid API Key");
/// assert!(!error.is_retryable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The HTTP request could not be completed.
    ///
    /// Connection resets, DNS failures and timeouts land here.
    #[error("HTTP request failed during {operation}")]
    Http {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("{operation} returned HTTP {status}")]
    Status { operation: String, status: u16 },

    /// The body was not the JSON document we expected.
    ///
    /// Explorers under load sometimes return HTML error pages or cut a body
    /// short, so this is treated as transient rather than as "no data".
    #[error("Malformed response during {operation}: {details}")]
    MalformedResponse { operation: String, details: String },

    /// The indexer reported an error status (`status: "0"` with a message
    /// other than "no records").
    #[error("Indexer error during {operation}: {message}")]
    Api {
        operation: String,
        message: String,
        retryable: bool,
    },

    /// A JSON-RPC call failed after transport-level retries.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Every attempt for a request failed with a retryable error.
    #[error("{operation} failed after {attempts} attempts")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<SourceError>,
    },
}

impl SourceError {
    /// Create an `Http` error from a reqwest failure.
    pub fn http(operation: impl Into<String>, source: reqwest::Error) -> Self {
        SourceError::Http {
            operation: operation.into(),
            source,
        }
    }

    /// Create a `MalformedResponse` error with details.
    pub fn malformed(operation: impl Into<String>, details: impl Into<String>) -> Self {
        SourceError::MalformedResponse {
            operation: operation.into(),
            details: details.into(),
        }
    }

    /// Create an `Api` error; rate-limit messages are flagged as retryable.
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_ascii_lowercase();
        let retryable = lowered.contains("rate limit") || lowered.contains("too many");
        SourceError::Api {
            operation: operation.into(),
            message,
            retryable,
        }
    }

    /// Whether a fresh attempt of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Http { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
                    || source.is_body() || source.is_decode()
            }
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            SourceError::MalformedResponse { .. } => true,
            SourceError::Api { retryable, .. } => *retryable,
            SourceError::Rpc(_) => false,
            SourceError::RetriesExhausted { .. } => false,
        }
    }
}
