// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Locate the block span holding every transfer since the accrual start
//!
//! Reads the indexer newest-first and stops at the first page that crosses
//! the accrual start, so a collection with a long pre-start history costs a
//! handful of page requests rather than a full scan. The result only narrows
//! and orders later work: a scan from genesis yields the same leaderboard.

use alloy_primitives::BlockNumber;
use tracing::{debug, info, Instrument};

use crate::errors::BoundsError;
use crate::source::{SortOrder, TransferIndex};
use crate::tracing::spans;
use crate::types::time::UnixTimestamp;

/// Inclusive block span `[start_block, latest_block]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBounds {
    /// Oldest block holding a transfer at or after the accrual start
    pub start_block: BlockNumber,
    /// Block of the newest transfer
    pub latest_block: BlockNumber,
}

impl ScanBounds {
    /// Bounds with `start_block` clamped to `latest_block`.
    pub fn new(start_block: BlockNumber, latest_block: BlockNumber) -> Self {
        Self {
            start_block: start_block.min(latest_block),
            latest_block,
        }
    }

    /// Replace the lower bound, e.g. from a manual `START_BLOCK`.
    ///
    /// The override is clamped so the span never inverts.
    pub fn with_override(self, start_block: BlockNumber) -> Self {
        Self::new(start_block, self.latest_block)
    }
}

impl std::fmt::Display for ScanBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start_block, self.latest_block)
    }
}

/// Finds [`ScanBounds`] by walking an indexer newest-first
pub struct BoundsResolver<'a, I: ?Sized> {
    index: &'a I,
    page_size: u32,
}

impl<'a, I> BoundsResolver<'a, I>
where
    I: TransferIndex + ?Sized,
{
    pub fn new(index: &'a I, page_size: u32) -> Self {
        Self {
            index,
            page_size: page_size.max(1),
        }
    }

    /// Resolve the span for transfers at or after `accrual_start`.
    ///
    /// Returns `None` when the collection has no transfers at all. When even
    /// the newest transfer predates the start, the span collapses to the
    /// newest block.
    pub async fn resolve(
        &self,
        accrual_start: UnixTimestamp,
    ) -> Result<Option<ScanBounds>, BoundsError> {
        let span = spans::resolve_bounds(accrual_start, self.page_size);
        self.walk(accrual_start).instrument(span).await
    }

    async fn walk(&self, accrual_start: UnixTimestamp) -> Result<Option<ScanBounds>, BoundsError> {
        let Some(newest) = self
            .index
            .latest_transfer()
            .await
            .map_err(|e| BoundsError::page(1, e))?
        else {
            info!("Collection has no transfers");
            return Ok(None);
        };

        let latest_block = newest.position.block_number;
        if newest.timestamp < accrual_start {
            info!(latest_block, "Newest transfer predates accrual start");
            return Ok(Some(ScanBounds::new(latest_block, latest_block)));
        }

        let mut candidate = latest_block;
        let mut page = 1u32;

        loop {
            let rows = self
                .index
                .transfers_page(page, self.page_size, SortOrder::Descending)
                .await
                .map_err(|e| BoundsError::page(page, e))?;

            let Some(oldest) = rows.last() else {
                debug!(page, "History exhausted before crossing accrual start");
                break;
            };

            if oldest.timestamp >= accrual_start {
                candidate = oldest.position.block_number;
                page += 1;
                continue;
            }

            // Rows are newest first, so ">= start" holds for a prefix
            let crossing = rows.partition_point(|row| row.timestamp >= accrual_start);
            if crossing > 0 {
                candidate = rows[crossing - 1].position.block_number;
            }
            debug!(page, crossing, "Found accrual start crossing");
            break;
        }

        if candidate > latest_block {
            return Err(BoundsError::InvalidRange {
                reason: format!(
                    "resolved start block {candidate} is newer than latest block {latest_block}"
                ),
            });
        }

        let bounds = ScanBounds::new(candidate, latest_block);
        info!(%bounds, pages = page, "Resolved block span");
        Ok(Some(bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use crate::types::token::TokenId;
    use crate::types::transfer::{ChainPosition, TransferEvent};
    use alloy_primitives::Address;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Serves `events` (given oldest first) newest first, counting requests.
    struct DescendingIndex {
        events: Vec<TransferEvent>,
        requests: AtomicU32,
    }

    impl DescendingIndex {
        /// One transfer per block, block `n` at timestamp `n * 10`.
        fn with_blocks(blocks: std::ops::RangeInclusive<u64>) -> Self {
            let events = blocks
                .map(|block| TransferEvent {
                    position: ChainPosition::new(block, 0),
                    timestamp: UnixTimestamp::new(block * 10),
                    from: Address::ZERO,
                    to: Address::with_last_byte(7),
                    token_id: TokenId::from(block),
                })
                .collect();
            Self {
                events,
                requests: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl TransferIndex for DescendingIndex {
        async fn transfers_page(
            &self,
            page: u32,
            page_size: u32,
            sort: SortOrder,
        ) -> Result<Vec<TransferEvent>, SourceError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let mut ordered = self.events.clone();
            if sort == SortOrder::Descending {
                ordered.reverse();
            }
            let skip = ((page - 1) * page_size) as usize;
            Ok(ordered.into_iter().skip(skip).take(page_size as usize).collect())
        }
    }

    #[tokio::test]
    async fn test_no_transfers_resolves_to_none() {
        let index = DescendingIndex::with_blocks(1..=0);
        let bounds = BoundsResolver::new(&index, 10)
            .resolve(UnixTimestamp::new(0))
            .await
            .unwrap();
        assert_eq!(bounds, None);
    }

    #[tokio::test]
    async fn test_start_after_newest_transfer_collapses_span() {
        let index = DescendingIndex::with_blocks(1..=100);
        let bounds = BoundsResolver::new(&index, 10)
            .resolve(UnixTimestamp::new(5_000))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(bounds, ScanBounds::new(100, 100));
        // Only the single-row newest-transfer lookup
        assert_eq!(index.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_crossing_inside_a_page() {
        let index = DescendingIndex::with_blocks(1..=100);
        // Block 43 is the oldest at or after t=425
        let bounds = BoundsResolver::new(&index, 10)
            .resolve(UnixTimestamp::new(425))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(bounds, ScanBounds::new(43, 100));
        // Newest-transfer lookup plus pages covering 100..=91 ... 50..=41
        assert_eq!(index.requests.load(Ordering::SeqCst), 1 + 6);
    }

    #[tokio::test]
    async fn test_crossing_on_page_boundary_keeps_previous_candidate() {
        let index = DescendingIndex::with_blocks(1..=100);
        // Page 6 (blocks 50..=41) is entirely older than t=505
        let bounds = BoundsResolver::new(&index, 10)
            .resolve(UnixTimestamp::new(505))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(bounds, ScanBounds::new(51, 100));
    }

    #[tokio::test]
    async fn test_start_before_all_history_reaches_oldest_block() {
        let index = DescendingIndex::with_blocks(5..=37);
        let bounds = BoundsResolver::new(&index, 10)
            .resolve(UnixTimestamp::new(0))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(bounds, ScanBounds::new(5, 37));
    }

    #[test]
    fn test_override_is_clamped() {
        let bounds = ScanBounds::new(40, 100);
        assert_eq!(bounds.with_override(10), ScanBounds::new(10, 100));
        assert_eq!(bounds.with_override(500), ScanBounds::new(100, 100));
    }
}
