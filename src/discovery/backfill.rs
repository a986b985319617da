// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw-log backfill on top of an indexer pass
//!
//! The backfill scans `[lower, latest]` newest chunk first, then continues
//! from `lower - 1` down to the configured floor. Together the two segments
//! are one contiguous descending scan, so the first time a token shows up is
//! its latest transfer. Tokens the indexer pass already resolved are never
//! touched.

use std::ops::ControlFlow;

use alloy_primitives::BlockNumber;
use tracing::{info, warn};

use crate::blocks::ScanBounds;
use crate::errors::DiscoveryError;
use crate::events::{RangeScanReport, RangeScanner, ScanTolerance};
use crate::source::TransferLogSource;
use crate::types::config::MaxBlockRange;

use super::latest::LatestTransfers;
use super::SkippedSlice;

/// Counters for one backfill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillStats {
    pub chunks_scanned: usize,
    pub events_seen: usize,
    pub tokens_added: usize,
    pub skipped: Vec<SkippedSlice>,
    pub stopped_early: bool,
}

impl BackfillStats {
    fn absorb(&mut self, report: RangeScanReport) {
        self.chunks_scanned += report.chunks_scanned;
        self.events_seen += report.events_seen;
        self.stopped_early |= report.stopped_early;
        self.skipped.extend(
            report
                .skipped
                .into_iter()
                .map(|(from_block, to_block)| SkippedSlice::Blocks {
                    from_block,
                    to_block,
                }),
        );
    }
}

/// Fills the gaps an indexer pass left, from raw logs
pub struct Backfill<'a, S: ?Sized> {
    scanner: RangeScanner<'a, S>,
    floor_block: BlockNumber,
}

impl<'a, S> Backfill<'a, S>
where
    S: TransferLogSource + ?Sized,
{
    pub fn new(
        source: &'a S,
        chunk_size: MaxBlockRange,
        concurrency: usize,
        tolerance: ScanTolerance,
        floor_block: BlockNumber,
    ) -> Self {
        Self {
            scanner: RangeScanner::new(source, chunk_size, concurrency, tolerance),
            floor_block,
        }
    }

    /// Add every token `resolved` lacks, until `target_supply` tokens are known.
    pub async fn run(
        &self,
        bounds: ScanBounds,
        resolved: &mut LatestTransfers,
        target_supply: u64,
    ) -> Result<BackfillStats, DiscoveryError> {
        let mut stats = BackfillStats::default();
        let target = target_supply as usize;

        if resolved.len() >= target {
            info!(tokens = resolved.len(), target_supply, "Supply already reconciled");
            return Ok(stats);
        }

        let mut found = LatestTransfers::new();
        let segments = [
            Some((bounds.start_block.max(self.floor_block), bounds.latest_block)),
            bounds
                .start_block
                .checked_sub(1)
                .filter(|upper| *upper >= self.floor_block)
                .map(|upper| (self.floor_block, upper)),
        ];

        for (from_block, to_block) in segments.into_iter().flatten() {
            if from_block > to_block {
                continue;
            }
            info!(from_block, to_block, "Backfilling block segment");

            let report = self
                .scanner
                .scan_descending(from_block, to_block, |events| {
                    for event in &events {
                        if !resolved.contains(&event.token_id) {
                            found.insert_if_absent(event.into());
                        }
                    }
                    if resolved.len() + found.len() >= target {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                })
                .await?;

            let stop = report.stopped_early;
            stats.absorb(report);
            if stop {
                break;
            }
        }

        stats.tokens_added = resolved.merge_absent(found);
        if !stats.skipped.is_empty() {
            warn!(skipped = stats.skipped.len(), "Backfill skipped block ranges");
        }
        info!(
            tokens_added = stats.tokens_added,
            tokens = resolved.len(),
            target_supply,
            chunks = stats.chunks_scanned,
            "Backfill complete"
        );
        Ok(stats)
    }
}
