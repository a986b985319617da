use anyhow::Context;
use tracing::info;

use crate::{config::LeaderboardConfig, job::SnapshotJob};

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    // Load .env.local / .env and the process environment
    let config = LeaderboardConfig::from_env().context("configuration")?;

    info!(
        contract = %config.contract,
        strategy = %config.strategy,
        window_seconds = config.rule.window_seconds,
        points_per_window = config.rule.points_per_window,
        accrual_start = %config.rule.accrual_start.to_iso8601(),
        target_supply = ?config.rule.target_supply,
        output = %config.output_path.display(),
        "Starting leaderboard snapshot"
    );

    let job = SnapshotJob::from_config(config).context("initialising sources")?;
    let snapshot = job.run().await.context("building snapshot")?;

    info!(
        holders = snapshot.total_holders,
        path = %job.writer().path().display(),
        "Leaderboard snapshot complete"
    );

    Ok(())
}
