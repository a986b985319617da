// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! One end-to-end leaderboard run
//!
//! Discovery, accrual, aggregation and the atomic write, wired from a
//! [`LeaderboardConfig`]. Nothing carries over between runs: every snapshot is
//! rebuilt from the transfer history.

use std::sync::Arc;

use tracing::{info, Instrument};

use crate::accrual;
use crate::config::LeaderboardConfig;
use crate::discovery::{Discovery, DiscoveryOutcome, DiscoverySettings};
use crate::errors::{DiscoveryError, HoldscanError};
use crate::leaderboard::Leaderboard;
use crate::provider::{create_http_provider, ProviderConfig};
use crate::snapshot::{Snapshot, SnapshotWriter};
use crate::source::{
    ExplorerClient, ExplorerConfig, RpcLogSource, TransferIndex, TransferLogSource,
};
use crate::tracing::spans;
use crate::transport::RequestPacer;
use crate::types::time::UnixTimestamp;

pub struct SnapshotJob {
    config: LeaderboardConfig,
    index: Arc<dyn TransferIndex>,
    logs: Option<Arc<dyn TransferLogSource>>,
    writer: SnapshotWriter,
}

impl SnapshotJob {
    /// A job over an already-built indexer.
    pub fn new(config: LeaderboardConfig, index: Arc<dyn TransferIndex>) -> Self {
        let writer = SnapshotWriter::new(config.output_path.clone());
        Self {
            config,
            index,
            logs: None,
            writer,
        }
    }

    pub fn with_log_source(mut self, logs: Arc<dyn TransferLogSource>) -> Self {
        self.logs = Some(logs);
        self
    }

    /// Build the explorer client and, when `RPC_URL` is set, the raw-log
    /// source. Both share one request pacer.
    pub fn from_config(config: LeaderboardConfig) -> Result<Self, HoldscanError> {
        let pacer = RequestPacer::new(config.request_delay);

        let explorer = ExplorerClient::new(ExplorerConfig::for_run(&config, pacer.clone()))?;
        let mut job = Self::new(config, Arc::new(explorer));

        if let Some(url) = job.config.rpc_url.clone() {
            let provider = create_http_provider(ProviderConfig::for_run(url, &job.config, pacer))?;
            let logs = RpcLogSource::new(provider, job.config.contract);
            job = job.with_log_source(Arc::new(logs));
        }

        Ok(job)
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    pub fn writer(&self) -> &SnapshotWriter {
        &self.writer
    }

    /// Resolve the latest transfer of every token with the configured strategy.
    pub async fn discover(&self) -> Result<DiscoveryOutcome, DiscoveryError> {
        let mut discovery = Discovery::new(&*self.index, DiscoverySettings::from(&self.config));
        if let Some(logs) = &self.logs {
            discovery = discovery.with_log_source(&**logs);
        }
        discovery.run(self.config.strategy).await
    }

    /// Accrue and rank a discovery outcome as of `now`.
    pub fn snapshot(&self, outcome: &DiscoveryOutcome, now: UnixTimestamp) -> Snapshot {
        let rule = &self.config.rule;
        let span = spans::build_leaderboard(outcome.latest.len(), now);
        let _guard = span.enter();

        let accruals = accrual::accrue(outcome.latest.records(), rule, now);
        let board = Leaderboard::aggregate(accruals, rule);
        info!(
            holders = board.total_holders(),
            tokens = outcome.report.tokens_discovered,
            "Built leaderboard"
        );

        Snapshot::new(self.config.contract, rule, board, now).with_discovery(&outcome.report)
    }

    /// Discover and build a snapshot as of `now`, without writing it.
    pub async fn build(&self, now: UnixTimestamp) -> Result<Snapshot, HoldscanError> {
        let outcome = self.discover().await?;
        Ok(self.snapshot(&outcome, now))
    }

    /// Full run: discovery, then accrual up to the moment discovery finished,
    /// then the atomic write.
    pub async fn run(&self) -> Result<Snapshot, HoldscanError> {
        let span = spans::run_snapshot(self.config.contract, self.config.strategy);
        async {
            let outcome = self.discover().await?;
            let snapshot = self.snapshot(&outcome, UnixTimestamp::now());
            self.writer.write(&snapshot).await?;
            Ok(snapshot)
        }
        .instrument(span)
        .await
    }

    /// Like [`run`](Self::run) with a fixed clock.
    pub async fn run_at(&self, now: UnixTimestamp) -> Result<Snapshot, HoldscanError> {
        let span = spans::run_snapshot(self.config.contract, self.config.strategy);
        async {
            let snapshot = self.build(now).await?;
            self.writer.write(&snapshot).await?;
            Ok(snapshot)
        }
        .instrument(span)
        .await
    }
}
