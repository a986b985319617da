//! Current-owner holding-time leaderboards for ERC-721 collections.
//!
//! Every run rebuilds the leaderboard from the collection's transfer history:
//!
//! 1. [`discovery`] resolves the latest transfer of each token from an
//!    Etherscan-compatible indexer, optionally backfilled from raw logs.
//! 2. [`accrual`] turns each live token into eligible holding seconds.
//! 3. [`leaderboard`] sums seconds per owner, floors them into windows once,
//!    and ranks owners.
//! 4. [`snapshot`] writes the JSON document atomically.
//!
//! ```rust,ignore
//! use holdscan::{LeaderboardConfig, SnapshotJob};
//!
//! let config = LeaderboardConfig::from_env()?;
//! let snapshot = SnapshotJob::from_config(config)?.run().await?;
//! println!("{} holders", snapshot.total_holders);
//! ```

pub mod accrual;
pub mod blocks;
pub mod bootstrap;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod events;
pub mod job;
pub mod leaderboard;
pub mod provider;
pub mod snapshot;
pub mod source;
mod tracing;
pub mod transport;
pub mod types;

pub use accrual::{accrue, held_seconds, TokenAccrual};
pub use blocks::{BoundsResolver, ScanBounds};
pub use config::{LeaderboardConfig, LeaderboardConfigBuilder, RuleConfig};
pub use discovery::{
    Discovery, DiscoveryOutcome, DiscoveryReport, DiscoverySettings, DiscoveryStrategy,
    LatestTransfers, SkippedSlice,
};
pub use errors::{
    BoundsError, ConfigError, DiscoveryError, HoldscanError, RpcError, SnapshotError, SourceError,
};
pub use events::{RangeScanReport, RangeScanner, ScanTolerance};
pub use job::SnapshotJob;
pub use leaderboard::{HolderAccrual, Leaderboard};
pub use snapshot::{Snapshot, SnapshotWriter};
pub use source::{
    ExplorerClient, ExplorerConfig, RpcLogSource, SortOrder, TransferIndex, TransferLogSource,
};
pub use types::config::MaxBlockRange;
pub use types::time::UnixTimestamp;
pub use types::token::TokenId;
pub use types::transfer::{ChainPosition, LatestTransferRecord, TransferEvent};
