// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Latest-transfer discovery
//!
//! Reduces a collection's transfer history to one [`LatestTransferRecord`]
//! per token. Three strategies produce the same map for the same history:
//!
//! - [`DiscoveryStrategy::IndexerAscendingFullScan`]: every indexer page, oldest
//!   first; the greatest chain position wins. Every page is required.
//! - [`DiscoveryStrategy::IndexerDescendingBounded`]: indexer pages newest
//!   first, first occurrence wins, stopping once the target supply is
//!   resolved. Failed pages are skipped.
//! - [`DiscoveryStrategy::RawLogBackfill`]: the descending indexer pass, then
//!   raw `eth_getLogs` ranges for whatever it missed. The backfill never
//!   overwrites a token the indexer pass resolved.
//!
//! [`LatestTransferRecord`]: crate::types::transfer::LatestTransferRecord

use std::str::FromStr;

use alloy_primitives::BlockNumber;
use serde::Serialize;
use tracing::{info, warn, Instrument};

use crate::blocks::{BoundsResolver, ScanBounds};
use crate::config::LeaderboardConfig;
use crate::config::constants::{DEFAULT_PAGE_SIZE, DEFAULT_SCAN_CONCURRENCY};
use crate::errors::DiscoveryError;
use crate::events::ScanTolerance;
use crate::source::{TransferIndex, TransferLogSource};
use crate::tracing::spans;
use crate::types::config::MaxBlockRange;
use crate::types::time::UnixTimestamp;

pub mod backfill;
pub mod indexer;
pub mod latest;

pub use backfill::{Backfill, BackfillStats};
pub use indexer::{IndexerDiscovery, PassStats};
pub use latest::LatestTransfers;

/// How the latest-transfer map is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum DiscoveryStrategy {
    #[default]
    #[serde(rename = "ascending")]
    IndexerAscendingFullScan,
    #[serde(rename = "descending")]
    IndexerDescendingBounded,
    #[serde(rename = "backfill")]
    RawLogBackfill,
}

impl DiscoveryStrategy {
    /// Strategies that stop on, or reconcile against, a known supply
    pub fn requires_supply(&self) -> bool {
        matches!(
            self,
            DiscoveryStrategy::IndexerDescendingBounded | DiscoveryStrategy::RawLogBackfill
        )
    }

    pub fn requires_rpc(&self) -> bool {
        matches!(self, DiscoveryStrategy::RawLogBackfill)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryStrategy::IndexerAscendingFullScan => "ascending",
            DiscoveryStrategy::IndexerDescendingBounded => "descending",
            DiscoveryStrategy::RawLogBackfill => "backfill",
        }
    }
}

impl FromStr for DiscoveryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" | "full" => Ok(DiscoveryStrategy::IndexerAscendingFullScan),
            "descending" | "desc" | "fast" => Ok(DiscoveryStrategy::IndexerDescendingBounded),
            "backfill" | "rpc" => Ok(DiscoveryStrategy::RawLogBackfill),
            other => Err(format!(
                "unknown strategy {other:?} (expected ascending, descending or backfill)"
            )),
        }
    }
}

impl std::fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page or block range that was skipped after exhausting its retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkippedSlice {
    Page(u32),
    Blocks {
        from_block: BlockNumber,
        to_block: BlockNumber,
    },
}

impl std::fmt::Display for SkippedSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkippedSlice::Page(page) => write!(f, "page {page}"),
            SkippedSlice::Blocks {
                from_block,
                to_block,
            } => write!(f, "blocks {from_block}-{to_block}"),
        }
    }
}

/// What discovery found and how complete it is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub strategy: DiscoveryStrategy,
    /// Distinct tokens resolved, burned ones included
    pub tokens_discovered: usize,
    pub target_supply: Option<u64>,
    /// `false` when a known supply was not reached
    pub supply_reconciled: bool,
    pub skipped: Vec<SkippedSlice>,
    /// Span the backfill covered, if it ran
    pub bounds: Option<ScanBounds>,
}

#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    pub latest: LatestTransfers,
    pub report: DiscoveryReport,
}

/// Knobs shared by every strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub page_size: u32,
    pub target_supply: Option<u64>,
    pub accrual_start: UnixTimestamp,
    pub start_block_override: Option<BlockNumber>,
    /// Lowest block the backfill scans
    pub rpc_start_block: BlockNumber,
    pub scan_chunk_size: MaxBlockRange,
    pub scan_concurrency: usize,
    pub scan_tolerance: ScanTolerance,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            target_supply: None,
            accrual_start: UnixTimestamp::EPOCH,
            start_block_override: None,
            rpc_start_block: 0,
            scan_chunk_size: MaxBlockRange::default(),
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            scan_tolerance: ScanTolerance::default(),
        }
    }
}

impl From<&LeaderboardConfig> for DiscoverySettings {
    fn from(config: &LeaderboardConfig) -> Self {
        Self {
            page_size: config.page_size,
            target_supply: config.rule.target_supply,
            accrual_start: config.rule.accrual_start,
            start_block_override: config.start_block_override,
            rpc_start_block: config.rpc_start_block,
            scan_chunk_size: config.scan_chunk_size,
            scan_concurrency: config.scan_concurrency,
            scan_tolerance: config.scan_tolerance,
        }
    }
}

/// Runs a [`DiscoveryStrategy`] against the configured sources
pub struct Discovery<'a> {
    index: &'a dyn TransferIndex,
    logs: Option<&'a dyn TransferLogSource>,
    settings: DiscoverySettings,
}

impl<'a> Discovery<'a> {
    pub fn new(index: &'a dyn TransferIndex, settings: DiscoverySettings) -> Self {
        Self {
            index,
            logs: None,
            settings,
        }
    }

    /// Attach the raw-log source the backfill strategy needs.
    pub fn with_log_source(mut self, logs: &'a dyn TransferLogSource) -> Self {
        self.logs = Some(logs);
        self
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    pub async fn run(&self, strategy: DiscoveryStrategy) -> Result<DiscoveryOutcome, DiscoveryError> {
        let span = spans::discover_latest_transfers(strategy);
        self.run_strategy(strategy).instrument(span).await
    }

    async fn run_strategy(
        &self,
        strategy: DiscoveryStrategy,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let target_supply = self.settings.target_supply;
        if strategy.requires_supply() && target_supply.is_none() {
            return Err(DiscoveryError::misconfigured(format!(
                "the {strategy} strategy needs a target supply"
            )));
        }

        let pages = IndexerDiscovery::new(self.index, self.settings.page_size);
        let mut skipped = Vec::new();
        let mut bounds = None;

        let latest = match strategy {
            DiscoveryStrategy::IndexerAscendingFullScan => pages.ascending_full_scan().await?.0,
            DiscoveryStrategy::IndexerDescendingBounded => {
                let (latest, stats) = pages.descending_until(target_supply.unwrap_or(u64::MAX)).await;
                skipped.extend(stats.skipped);
                latest
            }
            DiscoveryStrategy::RawLogBackfill => {
                let logs = self.logs.ok_or_else(|| {
                    DiscoveryError::misconfigured("the backfill strategy needs a log source")
                })?;
                let target = target_supply.unwrap_or(u64::MAX);

                let (mut latest, stats) = pages.descending_until(target).await;
                skipped.extend(stats.skipped);

                if (latest.len() as u64) < target {
                    let range = self.backfill_bounds(logs).await?;
                    let backfill = Backfill::new(
                        logs,
                        self.settings.scan_chunk_size,
                        self.settings.scan_concurrency,
                        self.settings.scan_tolerance,
                        self.settings.rpc_start_block,
                    );
                    let stats = backfill.run(range, &mut latest, target).await?;
                    skipped.extend(stats.skipped);
                    bounds = Some(range);
                }
                latest
            }
        };

        let tokens_discovered = latest.len();
        let supply_reconciled =
            target_supply.is_none_or(|target| tokens_discovered as u64 >= target);

        if supply_reconciled {
            info!(%strategy, tokens_discovered, ?target_supply, "Discovery complete");
        } else {
            warn!(
                %strategy,
                tokens_discovered,
                ?target_supply,
                "Discovered fewer tokens than the target supply"
            );
        }

        Ok(DiscoveryOutcome {
            latest,
            report: DiscoveryReport {
                strategy,
                tokens_discovered,
                target_supply,
                supply_reconciled,
                skipped,
                bounds,
            },
        })
    }

    /// Span for the backfill: lower bound from the indexer (or the override),
    /// upper bound at the newer of the indexer's newest block and the chain head.
    async fn backfill_bounds(
        &self,
        logs: &dyn TransferLogSource,
    ) -> Result<ScanBounds, DiscoveryError> {
        let head = logs.latest_block().await.map_err(DiscoveryError::ChainHead)?;

        let resolved = BoundsResolver::new(self.index, self.settings.page_size)
            .resolve(self.settings.accrual_start)
            .await?;

        let mut bounds = match resolved {
            Some(found) => ScanBounds::new(found.start_block, found.latest_block.max(head)),
            None => ScanBounds::new(head, head),
        };
        if let Some(block) = self.settings.start_block_override {
            bounds = bounds.with_override(block);
        }

        info!(%bounds, head, "Backfill span");
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "ascending".parse::<DiscoveryStrategy>().unwrap(),
            DiscoveryStrategy::IndexerAscendingFullScan
        );
        assert_eq!(
            "Descending".parse::<DiscoveryStrategy>().unwrap(),
            DiscoveryStrategy::IndexerDescendingBounded
        );
        assert_eq!(
            " backfill ".parse::<DiscoveryStrategy>().unwrap(),
            DiscoveryStrategy::RawLogBackfill
        );
        assert!("bisect".parse::<DiscoveryStrategy>().is_err());
    }

    #[test]
    fn test_strategy_requirements() {
        assert!(!DiscoveryStrategy::IndexerAscendingFullScan.requires_supply());
        assert!(DiscoveryStrategy::IndexerDescendingBounded.requires_supply());
        assert!(!DiscoveryStrategy::IndexerDescendingBounded.requires_rpc());
        assert!(DiscoveryStrategy::RawLogBackfill.requires_rpc());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for strategy in [
            DiscoveryStrategy::IndexerAscendingFullScan,
            DiscoveryStrategy::IndexerDescendingBounded,
            DiscoveryStrategy::RawLogBackfill,
        ] {
            assert_eq!(strategy.to_string().parse::<DiscoveryStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_skipped_slice_display() {
        assert_eq!(SkippedSlice::Page(4).to_string(), "page 4");
        assert_eq!(
            SkippedSlice::Blocks {
                from_block: 10,
                to_block: 19
            }
            .to_string(),
            "blocks 10-19"
        );
    }
}
