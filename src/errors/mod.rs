//! Error types for the holdscan library.
//!
//! This module provides strongly-typed errors for all public APIs in holdscan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`SourceError`,
//!   `DiscoveryError`, etc.)
//! - **Unified error type** (`HoldscanError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Architecture
//!
//! Each pipeline stage has its own error type:
//! - [`ConfigError`] - Missing or malformed configuration (fatal at startup)
//! - [`SourceError`] - Explorer API and raw-log fetch failures
//! - [`BoundsError`] - Failures while locating the accrual-start block
//! - [`DiscoveryError`] - Strict slices that could not be scanned
//! - [`SnapshotError`] - Serialization and artifact write failures
//!
//! Additionally, [`RpcError`] provides shared error variants for blockchain RPC operations.
//!
//! # Examples
//!
//! ```rust,ignore
//! use holdscan::{HoldscanError, SnapshotJob, UnixTimestamp};
//!
//! async fn refresh(job: SnapshotJob) -> Result<(), HoldscanError> {
//!     let snapshot = job.build(UnixTimestamp::now()).await?;
//!     job.writer().write(&snapshot).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod discovery;
mod rpc;
mod snapshot;
mod source;

pub use config::ConfigError;
pub use discovery::{BoundsError, DiscoveryError};
pub use rpc::RpcError;
pub use snapshot::SnapshotError;
pub use source::SourceError;

/// Unified error type for all holdscan operations.
///
/// All module-specific error types automatically convert to `HoldscanError` via
/// `From` implementations, so you can use `?` to propagate errors naturally.
/// The display string names the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum HoldscanError {
    /// Error from configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a transfer source outside of discovery.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Error from provider construction or RPC calls.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Error from bounds resolution.
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// Error from latest-transfer discovery.
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Error from writing the snapshot artifact.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}
