//! Shared RPC error types for blockchain provider operations.
//!
//! This module provides error types for the JSON-RPC calls the raw-log source
//! makes (`eth_getLogs`, `eth_getBlockByNumber`) and for provider construction.

use alloy_primitives::BlockNumber;

/// Errors that can occur during blockchain RPC operations.
///
/// Retries have already been applied by the transport layer by the time one
/// of these surfaces, so every variant is final for the request it describes.
///
/// # Examples
///
/// ```rust
/// use holdscan::RpcError;
///
/// let error = RpcError::BlockNotFound { block_number: 42 };
/// assert_eq!(error.to_string(), "Block not found: 42");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Failed to fetch logs for a block range.
    ///
    /// This can occur due to rate limiting, a range the endpoint refuses,
    /// network connectivity issues, or provider-side errors.
    #[error("Failed to fetch logs for blocks {from_block}-{to_block}")]
    GetLogsFailed {
        from_block: BlockNumber,
        to_block: BlockNumber,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to read the current chain head.
    #[error("Failed to fetch latest block number")]
    GetBlockNumberFailed {
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Block was not found at the specified block number.
    ///
    /// This can occur if the block number is beyond the chain tip or the
    /// provider hasn't synced that block.
    #[error("Block not found: {block_number}")]
    BlockNotFound { block_number: BlockNumber },

    /// Failed to fetch block details by number.
    ///
    /// This is different from `BlockNotFound` - it indicates the RPC call itself
    /// failed, not that the block doesn't exist.
    #[error("Failed to fetch block {block_number} details")]
    GetBlockFailed {
        block_number: BlockNumber,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The RPC endpoint URL could not be parsed.
    #[error("Invalid RPC URL: {0}")]
    ProviderUrlInvalid(String),

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl RpcError {
    /// Helper to create a `GetLogsFailed` error from any error type.
    pub fn get_logs_failed(
        from_block: BlockNumber,
        to_block: BlockNumber,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetLogsFailed {
            from_block,
            to_block,
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetBlockNumberFailed` error from any error type.
    pub fn get_block_number_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RpcError::GetBlockNumberFailed {
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetBlockFailed` error from any error type.
    pub fn get_block_failed(
        block_number: BlockNumber,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetBlockFailed {
            block_number,
            source: Box::new(source),
        }
    }
}
