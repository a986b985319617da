// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The published leaderboard document and its atomic writer
//!
//! ```json
//! {
//!   "updatedAt": "2025-09-01T12:00:00.000Z",
//!   "contract": "0x…",
//!   "rule": {
//!     "label": "Shrooms",
//!     "windowHours": 6,
//!     "pointsPerWindow": 10,
//!     "onlyCurrentOwners": true,
//!     "resetOnSale": true,
//!     "startAt": "2025-08-18T10:00:00.000Z"
//!   },
//!   "totalHolders": 1,
//!   "leaderboard": [
//!     { "address": "0x…", "tokens": 2, "holdingSeconds": 36000, "periods": 1, "points": 10 }
//!   ],
//!   "discovery": {
//!     "strategy": "descending",
//!     "tokensDiscovered": 2,
//!     "targetSupply": 2,
//!     "supplyReconciled": true,
//!     "skippedSlices": 0
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::{Serialize, Serializer};
use tracing::{debug, info, Instrument};

use crate::config::RuleConfig;
use crate::discovery::{DiscoveryReport, DiscoveryStrategy};
use crate::errors::SnapshotError;
use crate::leaderboard::{serialize_address, HolderAccrual, Leaderboard};
use crate::tracing::spans;
use crate::types::time::UnixTimestamp;

/// Scoring rule as published
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(serialize_with = "serialize_hours")]
    pub window_hours: f64,
    pub points_per_window: u64,
    pub only_current_owners: bool,
    pub reset_on_sale: bool,
    pub start_at: String,
}

impl From<&RuleConfig> for SnapshotRule {
    fn from(rule: &RuleConfig) -> Self {
        Self {
            label: rule.label.clone(),
            window_hours: rule.window_hours(),
            points_per_window: rule.points_per_window,
            only_current_owners: true,
            reset_on_sale: true,
            start_at: rule.accrual_start.to_iso8601(),
        }
    }
}

/// Completeness of the discovery behind a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySummary {
    pub strategy: DiscoveryStrategy,
    pub tokens_discovered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_supply: Option<u64>,
    pub supply_reconciled: bool,
    pub skipped_slices: usize,
}

impl From<&DiscoveryReport> for DiscoverySummary {
    fn from(report: &DiscoveryReport) -> Self {
        Self {
            strategy: report.strategy,
            tokens_discovered: report.tokens_discovered,
            target_supply: report.target_supply,
            supply_reconciled: report.supply_reconciled,
            skipped_slices: report.skipped.len(),
        }
    }
}

/// The full leaderboard document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub updated_at: String,
    #[serde(serialize_with = "serialize_address")]
    pub contract: Address,
    pub rule: SnapshotRule,
    pub total_holders: usize,
    pub leaderboard: Vec<HolderAccrual>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoverySummary>,
}

impl Snapshot {
    pub fn new(
        contract: Address,
        rule: &RuleConfig,
        leaderboard: Leaderboard,
        updated_at: UnixTimestamp,
    ) -> Self {
        Self {
            updated_at: updated_at.to_iso8601(),
            contract,
            rule: SnapshotRule::from(rule),
            total_holders: leaderboard.total_holders(),
            leaderboard: leaderboard.into_entries(),
            discovery: None,
        }
    }

    pub fn with_discovery(mut self, report: &DiscoveryReport) -> Self {
        self.discovery = Some(DiscoverySummary::from(report));
        self
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Whole hours as an integer, anything else as a decimal
fn serialize_hours<S: Serializer>(hours: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if hours.is_finite() && hours.fract() == 0.0 && *hours >= 0.0 && *hours <= u64::MAX as f64 {
        serializer.serialize_u64(*hours as u64)
    } else {
        serializer.serialize_f64(*hours)
    }
}

/// Writes snapshots so readers only ever see a complete document
///
/// The document goes to a sibling temp file, is flushed, and is then renamed
/// over the target. A failure at any step leaves the previous snapshot in place.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let span = spans::write_snapshot(&self.path);
        self.write_atomic(snapshot).instrument(span).await
    }

    async fn write_atomic(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let json = snapshot.to_json_pretty()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SnapshotError::io(parent, "failed to create output directory", e))?;
        }

        let temp_path = self.path.with_extension("tmp");

        if let Err(e) = tokio::fs::write(&temp_path, &json).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(SnapshotError::io(&temp_path, "failed to write temp file", e));
        }

        if let Err(e) = sync_file(&temp_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(SnapshotError::io(&temp_path, "failed to flush temp file", e));
        }
        debug!(temp = %temp_path.display(), bytes = json.len(), "Wrote temp snapshot");

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(SnapshotError::io(&self.path, "failed to publish snapshot", e));
        }

        info!(
            path = %self.path.display(),
            holders = snapshot.total_holders,
            "Snapshot written"
        );
        Ok(())
    }
}

async fn sync_file(path: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(path).await?.sync_all().await
}
