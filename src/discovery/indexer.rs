// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Indexer-backed discovery passes

use tracing::{debug, info, warn};

use crate::config::constants::MAX_CONSECUTIVE_PAGE_FAILURES;
use crate::errors::DiscoveryError;
use crate::source::{SortOrder, TransferIndex};

use super::latest::LatestTransfers;
use super::SkippedSlice;

/// Counters for one pass over the indexer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    pub pages: u32,
    pub events_seen: usize,
    pub skipped: Vec<SkippedSlice>,
    /// Stopped because the target supply was reached
    pub stopped_early: bool,
}

/// Pages through a [`TransferIndex`] to build a [`LatestTransfers`] map
pub struct IndexerDiscovery<'a, I: ?Sized> {
    index: &'a I,
    page_size: u32,
}

impl<'a, I> IndexerDiscovery<'a, I>
where
    I: TransferIndex + ?Sized,
{
    pub fn new(index: &'a I, page_size: u32) -> Self {
        Self {
            index,
            page_size: page_size.max(1),
        }
    }

    /// Read the whole history oldest first.
    ///
    /// Every page is required: a page that exhausts its retries fails the pass.
    pub async fn ascending_full_scan(
        &self,
    ) -> Result<(LatestTransfers, PassStats), DiscoveryError> {
        let mut latest = LatestTransfers::new();
        let mut stats = PassStats::default();

        for page in 1u32.. {
            let rows = self
                .index
                .transfers_page(page, self.page_size, SortOrder::Ascending)
                .await
                .map_err(|e| DiscoveryError::page(page, e))?;

            if rows.is_empty() {
                break;
            }

            stats.pages = page;
            stats.events_seen += rows.len();
            for event in &rows {
                latest.observe(event);
            }
            debug!(page, rows = rows.len(), tokens = latest.len(), "Read ascending page");
        }

        info!(
            pages = stats.pages,
            events = stats.events_seen,
            tokens = latest.len(),
            "Ascending scan complete"
        );
        Ok((latest, stats))
    }

    /// Read history newest first until `target_supply` tokens are resolved.
    ///
    /// The first occurrence of a token is its latest transfer. Pages that
    /// exhaust their retries are skipped and reported; after
    /// [`MAX_CONSECUTIVE_PAGE_FAILURES`] skips in a row the pass ends as if the
    /// history were exhausted. A `target_supply` that is never reached simply
    /// runs the pass to the end of the history.
    pub async fn descending_until(&self, target_supply: u64) -> (LatestTransfers, PassStats) {
        let mut latest = LatestTransfers::new();
        let mut stats = PassStats::default();
        let mut consecutive_failures = 0u32;

        for page in 1u32.. {
            if latest.len() as u64 >= target_supply {
                stats.stopped_early = true;
                break;
            }

            let mut rows = match self
                .index
                .transfers_page(page, self.page_size, SortOrder::Descending)
                .await
            {
                Ok(rows) => {
                    consecutive_failures = 0;
                    rows
                }
                Err(e) => {
                    warn!(page, error = %e, "Skipping transfer page");
                    stats.skipped.push(SkippedSlice::Page(page));
                    consecutive_failures += 1;
                    if consecutive_failures >= MAX_CONSECUTIVE_PAGE_FAILURES {
                        warn!(page, consecutive_failures, "Giving up on indexer pass");
                        break;
                    }
                    continue;
                }
            };

            if rows.is_empty() {
                break;
            }

            stats.pages = page;
            stats.events_seen += rows.len();
            // Pages are newest first; re-sort in case the indexer ties loosely
            rows.sort_by(|a, b| b.position.cmp(&a.position));
            for event in &rows {
                latest.insert_if_absent(event.into());
            }
            debug!(page, rows = rows.len(), tokens = latest.len(), "Read descending page");
        }

        info!(
            pages = stats.pages,
            events = stats.events_seen,
            tokens = latest.len(),
            target_supply,
            skipped = stats.skipped.len(),
            stopped_early = stats.stopped_early,
            "Descending scan complete"
        );
        (latest, stats)
    }
}
