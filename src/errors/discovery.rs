// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for bounds resolution and latest-transfer discovery.

use alloy_primitives::BlockNumber;

use super::SourceError;

/// Errors that can occur while resolving the block span to scan.
#[derive(Debug, thiserror::Error)]
pub enum BoundsError {
    /// Fetching an indexer page failed.
    #[error("Failed to read transfer page {page} while resolving bounds")]
    Page {
        page: u32,
        #[source]
        source: SourceError,
    },

    /// A row on the page could not be used to locate the boundary.
    #[error("Invalid block range: {reason}")]
    InvalidRange { reason: String },
}

impl BoundsError {
    pub fn page(page: u32, source: SourceError) -> Self {
        BoundsError::Page { page, source }
    }
}

/// Errors that can occur during latest-transfer discovery.
///
/// Only slices scanned under the strict policy produce these; best-effort
/// slices are logged, counted, and skipped.
///
/// # Examples
///
/// ```rust,ignore
/// use holdscan::{Discovery, DiscoveryError, DiscoveryStrategy};
///
/// match discovery.run(DiscoveryStrategy::RawLogBackfill).await {
///     Ok(outcome) => println!("{} tokens", outcome.latest.len()),
///     Err(DiscoveryError::Range { from_block, to_block, .. }) => {
///         eprintln!("blocks {from_block}-{to_block} could not be scanned");
///     }
///     Err(e) => eprintln!("discovery failed: {e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// An indexer page could not be fetched under the strict policy.
    #[error("Failed to fetch transfer page {page}")]
    Page {
        page: u32,
        #[source]
        source: SourceError,
    },

    /// A block range could not be scanned under the strict policy.
    #[error("Failed to scan blocks {from_block}-{to_block}")]
    Range {
        from_block: BlockNumber,
        to_block: BlockNumber,
        #[source]
        source: SourceError,
    },

    /// The log source could not report its chain head.
    #[error("Failed to read the chain head for backfill")]
    ChainHead(#[source] SourceError),

    /// Bounds resolution failed before the backfill could start.
    #[error("Bounds resolution failed: {0}")]
    Bounds(#[from] BoundsError),

    /// The strategy cannot run with the supplied collaborators or settings.
    #[error("Discovery misconfigured: {details}")]
    Misconfigured { details: String },
}

impl DiscoveryError {
    pub fn page(page: u32, source: SourceError) -> Self {
        DiscoveryError::Page { page, source }
    }

    pub fn range(from_block: BlockNumber, to_block: BlockNumber, source: SourceError) -> Self {
        DiscoveryError::Range {
            from_block,
            to_block,
            source,
        }
    }

    pub fn misconfigured(details: impl Into<String>) -> Self {
        DiscoveryError::Misconfigured {
            details: details.into(),
        }
    }
}
