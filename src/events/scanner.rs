// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Descending block-range scanner with bounded concurrency
//!
//! Splits `[from_block, to_block]` into chunks of at most
//! [`MaxBlockRange`] blocks, newest first, and fetches up to `concurrency`
//! chunks at a time. Results are handed to the caller's sink strictly in
//! descending chunk order even when fetches complete out of order, so the sink
//! always sees a contiguous, newest-first prefix of history and may stop the
//! scan early.
//!
//! # Examples
//!
//! ```rust,ignore
//! use holdscan::events::scanner::{RangeScanner, ScanTolerance};
//! use std::ops::ControlFlow;
//!
//! let scanner = RangeScanner::new(&source, MaxBlockRange::new(3000), 4, ScanTolerance::Strict);
//! let report = scanner
//!     .scan_descending(start_block, latest_block, |events| {
//!         for event in &events {
//!             latest.observe(event);
//!         }
//!         if latest.len() as u64 >= supply {
//!             ControlFlow::Break(())
//!         } else {
//!             ControlFlow::Continue(())
//!         }
//!     })
//!     .await?;
//! ```

use std::cmp::Reverse;
use std::ops::ControlFlow;
use std::str::FromStr;

use alloy_primitives::BlockNumber;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn, Instrument};

use crate::errors::DiscoveryError;
use crate::source::TransferLogSource;
use crate::tracing::spans;
use crate::types::config::MaxBlockRange;
use crate::types::transfer::TransferEvent;

/// What to do when a slice exhausts its retries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanTolerance {
    /// Abort the run, naming the slice
    #[default]
    Strict,
    /// Log the slice, count it in the report, and continue
    BestEffort,
}

impl FromStr for ScanTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ScanTolerance::Strict),
            "best-effort" | "best_effort" | "besteffort" => Ok(ScanTolerance::BestEffort),
            other => Err(format!(
                "unknown tolerance {other:?} (expected strict or best-effort)"
            )),
        }
    }
}

impl std::fmt::Display for ScanTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanTolerance::Strict => f.write_str("strict"),
            ScanTolerance::BestEffort => f.write_str("best-effort"),
        }
    }
}

/// Summary of one descending scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeScanReport {
    pub chunks_scanned: usize,
    pub events_seen: usize,
    /// Ranges skipped under [`ScanTolerance::BestEffort`]
    pub skipped: Vec<(BlockNumber, BlockNumber)>,
    /// The sink asked to stop before the range was exhausted
    pub stopped_early: bool,
}

/// Chunked, concurrent, newest-first log scanner
pub struct RangeScanner<'a, S: ?Sized> {
    source: &'a S,
    chunk_size: MaxBlockRange,
    concurrency: usize,
    tolerance: ScanTolerance,
}

impl<'a, S> RangeScanner<'a, S>
where
    S: TransferLogSource + ?Sized,
{
    /// `concurrency` is raised to one if zero.
    pub fn new(
        source: &'a S,
        chunk_size: MaxBlockRange,
        concurrency: usize,
        tolerance: ScanTolerance,
    ) -> Self {
        Self {
            source,
            chunk_size,
            concurrency: concurrency.max(1),
            tolerance,
        }
    }

    /// Scan `[from_block, to_block]` newest chunk first.
    ///
    /// Each chunk's events are passed to `sink` sorted newest first. Returning
    /// [`ControlFlow::Break`] stops the scan; fetches already in flight are
    /// dropped.
    pub async fn scan_descending<F>(
        &self,
        from_block: BlockNumber,
        to_block: BlockNumber,
        mut sink: F,
    ) -> Result<RangeScanReport, DiscoveryError>
    where
        F: FnMut(Vec<TransferEvent>) -> ControlFlow<()>,
    {
        let span = spans::scan_descending(from_block, to_block, self.chunk_size.as_u64());
        self.scan_chunks(from_block, to_block, &mut sink)
            .instrument(span)
            .await
    }

    async fn scan_chunks<F>(
        &self,
        from_block: BlockNumber,
        to_block: BlockNumber,
        sink: &mut F,
    ) -> Result<RangeScanReport, DiscoveryError>
    where
        F: FnMut(Vec<TransferEvent>) -> ControlFlow<()>,
    {
        let total_chunks = self.chunk_size.chunks_needed(from_block, to_block);
        info!(
            from_block,
            to_block,
            total_chunks,
            concurrency = self.concurrency,
            tolerance = %self.tolerance,
            "Starting descending range scan"
        );

        let source = self.source;
        let mut fetches = stream::iter(self.chunk_size.chunk_range_desc(from_block, to_block))
            .map(|(lo, hi)| async move { (lo, hi, source.transfers_in_range(lo, hi).await) })
            .buffered(self.concurrency);

        let mut report = RangeScanReport::default();

        while let Some((lo, hi, result)) = fetches.next().await {
            report.chunks_scanned += 1;

            let mut events = match result {
                Ok(events) => events,
                Err(e) => match self.tolerance {
                    ScanTolerance::Strict => return Err(DiscoveryError::range(lo, hi, e)),
                    ScanTolerance::BestEffort => {
                        warn!(from_block = lo, to_block = hi, error = %e, "Skipping block range");
                        report.skipped.push((lo, hi));
                        continue;
                    }
                },
            };

            debug!(
                from_block = lo,
                to_block = hi,
                events = events.len(),
                chunk = report.chunks_scanned,
                total_chunks,
                "Scanned block range"
            );

            report.events_seen += events.len();
            events.sort_by_key(|event| Reverse(event.position));

            if sink(events).is_break() {
                report.stopped_early = true;
                break;
            }
        }

        info!(
            chunks_scanned = report.chunks_scanned,
            events_seen = report.events_seen,
            skipped = report.skipped.len(),
            stopped_early = report.stopped_early,
            "Finished descending range scan"
        );

        Ok(report)
    }
}
