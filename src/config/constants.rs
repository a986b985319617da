//! Defaults and well-known values
//!
//! This module centralizes magic constants used throughout the holdscan crate,
//! so the environment table, the builders and the tests agree on one set of
//! defaults.

use alloy_primitives::{b256, B256};

/// Keccak-256 of `Transfer(address,address,uint256)`.
///
/// ERC-20 and ERC-721 share this signature; ERC-721 logs carry the token id as
/// a third indexed topic.
pub const TRANSFER_TOPIC0: B256 =
    b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");

/// Indexer endpoint used when `EXPLORER_API_BASE` is unset.
pub const DEFAULT_EXPLORER_API_BASE: &str = "https://hyperliquid.cloud.blockscout.com/api";

/// `2025-08-18T10:00:00Z`
pub const DEFAULT_ACCRUAL_START: &str = "2025-08-18T10:00:00Z";

/// Six hours.
pub const DEFAULT_WINDOW_SECONDS: u64 = 6 * 60 * 60;

pub const DEFAULT_POINTS_PER_WINDOW: u64 = 10;

/// Rows per indexer page. Blockscout caps `offset` at 10,000; 1000 keeps
/// responses small enough to survive flaky gateways.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Blocks per `eth_getLogs` call.
pub const DEFAULT_SCAN_CHUNK_SIZE: u64 = 3000;

pub const DEFAULT_SCAN_CONCURRENCY: usize = 4;

/// Consecutive skipped pages after which a best-effort indexer pass gives up
pub const MAX_CONSECUTIVE_PAGE_FAILURES: u32 = 3;

/// Minimum spacing between outbound requests, in milliseconds.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 120;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 300;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_OUTPUT_PATH: &str = "public/leaderboard.json";
