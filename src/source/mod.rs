// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer sources
//!
//! Two interchangeable ways of reading a collection's transfer history, both
//! normalized into [`TransferEvent`]:
//!
//! - [`TransferIndex`]: a paginated indexer (Etherscan-compatible
//!   `tokennfttx` endpoint), implemented by [`ExplorerClient`]
//! - [`TransferLogSource`]: raw `eth_getLogs` over a block range, implemented by
//!   [`RpcLogSource`]
//!
//! Sources carry no business logic. Retries happen inside the source; an error
//! returned from a trait method is final for that page or range, and the caller
//! decides whether to skip it or abort.

use alloy_primitives::BlockNumber;
use async_trait::async_trait;

use crate::errors::SourceError;
use crate::types::transfer::TransferEvent;

pub mod indexer;
pub mod logs;

pub use indexer::{ExplorerClient, ExplorerConfig};
pub use logs::RpcLogSource;

/// Chain-order direction for indexer pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Oldest transfer first
    Ascending,
    /// Newest transfer first
    Descending,
}

impl SortOrder {
    /// Value of the `sort` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

/// A paginated index of a collection's transfers
///
/// Pages are 1-based. An empty page means the history is exhausted.
#[async_trait]
pub trait TransferIndex: Send + Sync {
    /// Fetch one page of transfers in the requested chain order.
    async fn transfers_page(
        &self,
        page: u32,
        page_size: u32,
        sort: SortOrder,
    ) -> Result<Vec<TransferEvent>, SourceError>;

    /// The newest transfer, or `None` for a collection with no transfers.
    async fn latest_transfer(&self) -> Result<Option<TransferEvent>, SourceError> {
        let page = self.transfers_page(1, 1, SortOrder::Descending).await?;
        Ok(page.into_iter().next())
    }
}

/// Raw transfer logs over inclusive block ranges
#[async_trait]
pub trait TransferLogSource: Send + Sync {
    /// Current chain head.
    async fn latest_block(&self) -> Result<BlockNumber, SourceError>;

    /// Every transfer of the collection in `[from_block, to_block]`.
    ///
    /// Order within the returned vector is unspecified; each event carries its
    /// own chain position.
    async fn transfers_in_range(
        &self,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<TransferEvent>, SourceError>;
}
