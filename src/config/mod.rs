//! Configuration for holdscan runs
//!
//! A run is configured entirely from the environment (after `.env.local` and
//! `.env` are loaded by the binary). [`LeaderboardConfig::from_lookup`] does the
//! parsing against any key lookup, so tests never touch process state.
//!
//! # Example: From the environment
//!
//! ```rust,no_run
//! use holdscan::LeaderboardConfig;
//!
//! let config = LeaderboardConfig::from_env()?;
//! println!("scanning {}", config.contract);
//! # Ok::<(), holdscan::ConfigError>(())
//! ```
//!
//! # Example: Builder
//!
//! ```rust
//! use holdscan::{DiscoveryStrategy, LeaderboardConfigBuilder};
//! use alloy_primitives::address;
//!
//! let config = LeaderboardConfigBuilder::new(address!("9be117c8f9a2a11b6ee1b7e0f4a5eb1f2bb9a7c1"))
//!     .strategy(DiscoveryStrategy::IndexerDescendingBounded)
//!     .target_supply(3333)
//!     .page_size(500)
//!     .build()?;
//!
//! assert_eq!(config.rule.target_supply, Some(3333));
//! # Ok::<(), holdscan::ConfigError>(())
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use url::Url;

use crate::discovery::DiscoveryStrategy;
use crate::errors::ConfigError;
use crate::events::scanner::ScanTolerance;
use crate::transport::BackoffPolicy;
use crate::types::config::MaxBlockRange;
use crate::types::time::UnixTimestamp;

pub mod constants;

use constants::*;

/// Point-accrual rule applied to every token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfig {
    /// Length of one accrual window in seconds (never zero)
    pub window_seconds: u64,
    pub points_per_window: u64,
    /// Holding time before this instant never counts
    pub accrual_start: UnixTimestamp,
    /// Known collection size; discovery can stop early once reached
    pub target_supply: Option<u64>,
    /// Display name for the points, e.g. "Shrooms"
    pub label: Option<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
            points_per_window: DEFAULT_POINTS_PER_WINDOW,
            accrual_start: default_accrual_start(),
            target_supply: None,
            label: None,
        }
    }
}

impl RuleConfig {
    /// Window length in hours, as published in the snapshot
    pub fn window_hours(&self) -> f64 {
        self.window_seconds as f64 / 3600.0
    }
}

/// Everything a single leaderboard run needs
#[derive(Debug, Clone)]
pub struct LeaderboardConfig {
    pub contract: Address,
    pub rule: RuleConfig,
    pub strategy: DiscoveryStrategy,

    pub explorer_api_base: Url,
    pub explorer_api_key: Option<String>,
    /// Rows requested per indexer page
    pub page_size: u32,

    /// Required by [`DiscoveryStrategy::RawLogBackfill`]
    pub rpc_url: Option<Url>,
    /// Lowest block the raw-log backfill will scan
    pub rpc_start_block: u64,
    /// Replaces the resolved lower bound when set
    pub start_block_override: Option<u64>,
    pub scan_chunk_size: MaxBlockRange,
    pub scan_concurrency: usize,
    pub scan_tolerance: ScanTolerance,

    /// Minimum spacing between outbound requests
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub backoff: BackoffPolicy,

    pub output_path: PathBuf,
}

impl LeaderboardConfig {
    /// Load `.env.local` and `.env` (if present), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse from an in-memory map of variables.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Parse and validate the configuration through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let contract = get("CONTRACT_ADDRESS")
            .ok_or_else(|| ConfigError::missing("CONTRACT_ADDRESS"))
            .and_then(|raw| parse_contract(&raw))?;

        let mut builder = LeaderboardConfigBuilder::new(contract);

        if let Some(raw) = get("ACCRUAL_START") {
            builder = builder.accrual_start(parse_timestamp("ACCRUAL_START", &raw)?);
        }
        if let Some(raw) = get("WINDOW_SECONDS") {
            builder = builder.window_seconds(parse_number("WINDOW_SECONDS", &raw)?);
        }
        if let Some(raw) = get("POINTS_PER_WINDOW") {
            builder = builder.points_per_window(parse_number("POINTS_PER_WINDOW", &raw)?);
        }
        if let Some(label) = get("POINTS_LABEL") {
            builder = builder.label(label);
        }
        if let Some(raw) = get("TOTAL_SUPPLY") {
            builder = builder.target_supply(parse_number("TOTAL_SUPPLY", &raw)?);
        }
        if let Some(raw) = get("DISCOVERY_STRATEGY") {
            let strategy = raw
                .parse::<DiscoveryStrategy>()
                .map_err(|reason| ConfigError::invalid("DISCOVERY_STRATEGY", reason))?;
            builder = builder.strategy(strategy);
        }
        if let Some(raw) = get("EXPLORER_API_BASE") {
            builder = builder.explorer_api_base(parse_url("EXPLORER_API_BASE", &raw)?);
        }
        if let Some(key) = get("EXPLORER_API_KEY") {
            builder = builder.explorer_api_key(key);
        }
        if let Some(raw) = get("PAGE_SIZE") {
            builder = builder.page_size(parse_number("PAGE_SIZE", &raw)?);
        }
        if let Some(raw) = get("RPC_URL") {
            builder = builder.rpc_url(parse_url("RPC_URL", &raw)?);
        }
        if let Some(raw) = get("RPC_START_BLOCK") {
            builder = builder.rpc_start_block(parse_number("RPC_START_BLOCK", &raw)?);
        }
        if let Some(raw) = get("START_BLOCK") {
            let block: u64 = parse_number("START_BLOCK", &raw)?;
            // Zero means "no override"
            if block > 0 {
                builder = builder.start_block_override(block);
            }
        }
        if let Some(raw) = get("SCAN_CHUNK_SIZE") {
            let blocks: u64 = parse_number("SCAN_CHUNK_SIZE", &raw)?;
            if blocks == 0 {
                return Err(ConfigError::invalid("SCAN_CHUNK_SIZE", "must be positive"));
            }
            builder = builder.scan_chunk_size(blocks);
        }
        if let Some(raw) = get("SCAN_CONCURRENCY") {
            builder = builder.scan_concurrency(parse_number("SCAN_CONCURRENCY", &raw)?);
        }
        if let Some(raw) = get("SCAN_TOLERANCE") {
            let tolerance = raw
                .parse::<ScanTolerance>()
                .map_err(|reason| ConfigError::invalid("SCAN_TOLERANCE", reason))?;
            builder = builder.scan_tolerance(tolerance);
        }
        if let Some(raw) = get("REQUEST_DELAY_MS") {
            builder = builder.request_delay(Duration::from_millis(parse_number(
                "REQUEST_DELAY_MS",
                &raw,
            )?));
        }
        if let Some(raw) = get("REQUEST_TIMEOUT_SECS") {
            builder = builder.request_timeout(Duration::from_secs(parse_number(
                "REQUEST_TIMEOUT_SECS",
                &raw,
            )?));
        }

        let mut backoff = BackoffPolicy::default();
        if let Some(raw) = get("MAX_RETRIES") {
            backoff.max_retries = parse_number("MAX_RETRIES", &raw)?;
        }
        if let Some(raw) = get("RETRY_BASE_DELAY_MS") {
            backoff.base_delay = Duration::from_millis(parse_number("RETRY_BASE_DELAY_MS", &raw)?);
        }
        if let Some(raw) = get("RETRY_MAX_DELAY_MS") {
            backoff.max_delay = Duration::from_millis(parse_number("RETRY_MAX_DELAY_MS", &raw)?);
        }
        builder = builder.backoff(backoff);

        if let Some(raw) = get("OUTPUT_PATH") {
            builder = builder.output_path(raw);
        }

        builder.build()
    }

    /// Check cross-field requirements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rule.window_seconds == 0 {
            return Err(ConfigError::invalid("WINDOW_SECONDS", "must be positive"));
        }
        if self.page_size == 0 {
            return Err(ConfigError::invalid("PAGE_SIZE", "must be positive"));
        }
        if self.rule.target_supply == Some(0) {
            return Err(ConfigError::invalid("TOTAL_SUPPLY", "must be positive"));
        }
        if self.scan_concurrency == 0 {
            return Err(ConfigError::invalid("SCAN_CONCURRENCY", "must be positive"));
        }
        if self.backoff.base_delay > self.backoff.max_delay {
            return Err(ConfigError::invalid(
                "RETRY_BASE_DELAY_MS",
                "must not exceed RETRY_MAX_DELAY_MS",
            ));
        }
        if self.strategy.requires_supply() && self.rule.target_supply.is_none() {
            return Err(ConfigError::invalid(
                "TOTAL_SUPPLY",
                format!("required by the {} strategy", self.strategy),
            ));
        }
        if self.strategy.requires_rpc() && self.rpc_url.is_none() {
            return Err(ConfigError::invalid(
                "RPC_URL",
                format!("required by the {} strategy", self.strategy),
            ));
        }
        Ok(())
    }
}

/// Builder for [`LeaderboardConfig`]
///
/// Starts from the defaults in [`constants`]; only the contract is mandatory.
#[derive(Debug, Clone)]
pub struct LeaderboardConfigBuilder {
    contract: Address,
    rule: RuleConfig,
    strategy: DiscoveryStrategy,
    /// Falls back to [`DEFAULT_EXPLORER_API_BASE`] in [`build`](Self::build)
    explorer_api_base: Option<Url>,
    explorer_api_key: Option<String>,
    page_size: u32,
    rpc_url: Option<Url>,
    rpc_start_block: u64,
    start_block_override: Option<u64>,
    scan_chunk_size: MaxBlockRange,
    scan_concurrency: usize,
    scan_tolerance: ScanTolerance,
    request_delay: Duration,
    request_timeout: Duration,
    backoff: BackoffPolicy,
    output_path: PathBuf,
}

impl LeaderboardConfigBuilder {
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            rule: RuleConfig::default(),
            strategy: DiscoveryStrategy::default(),
            explorer_api_base: None,
            explorer_api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            rpc_url: None,
            rpc_start_block: 0,
            start_block_override: None,
            scan_chunk_size: MaxBlockRange::new(DEFAULT_SCAN_CHUNK_SIZE),
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            scan_tolerance: ScanTolerance::default(),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            backoff: BackoffPolicy::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }

    pub fn accrual_start(mut self, start: UnixTimestamp) -> Self {
        self.rule.accrual_start = start;
        self
    }

    pub fn window_seconds(mut self, seconds: u64) -> Self {
        self.rule.window_seconds = seconds;
        self
    }

    pub fn points_per_window(mut self, points: u64) -> Self {
        self.rule.points_per_window = points;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.rule.label = Some(label.into());
        self
    }

    pub fn target_supply(mut self, supply: u64) -> Self {
        self.rule.target_supply = Some(supply);
        self
    }

    pub fn strategy(mut self, strategy: DiscoveryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn explorer_api_base(mut self, base: Url) -> Self {
        self.explorer_api_base = Some(base);
        self
    }

    pub fn explorer_api_key(mut self, key: impl Into<String>) -> Self {
        self.explorer_api_key = Some(key.into());
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    pub fn rpc_url(mut self, url: Url) -> Self {
        self.rpc_url = Some(url);
        self
    }

    pub fn rpc_start_block(mut self, block: u64) -> Self {
        self.rpc_start_block = block;
        self
    }

    pub fn start_block_override(mut self, block: u64) -> Self {
        self.start_block_override = Some(block);
        self
    }

    pub fn scan_chunk_size(mut self, blocks: u64) -> Self {
        self.scan_chunk_size = MaxBlockRange::new(blocks);
        self
    }

    pub fn scan_concurrency(mut self, workers: usize) -> Self {
        self.scan_concurrency = workers;
        self
    }

    pub fn scan_tolerance(mut self, tolerance: ScanTolerance) -> Self {
        self.scan_tolerance = tolerance;
        self
    }

    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<LeaderboardConfig, ConfigError> {
        let explorer_api_base = match self.explorer_api_base {
            Some(base) => base,
            None => parse_url("EXPLORER_API_BASE", DEFAULT_EXPLORER_API_BASE)?,
        };
        let config = LeaderboardConfig {
            contract: self.contract,
            rule: self.rule,
            strategy: self.strategy,
            explorer_api_base,
            explorer_api_key: self.explorer_api_key,
            page_size: self.page_size,
            rpc_url: self.rpc_url,
            rpc_start_block: self.rpc_start_block,
            start_block_override: self.start_block_override,
            scan_chunk_size: self.scan_chunk_size,
            scan_concurrency: self.scan_concurrency,
            scan_tolerance: self.scan_tolerance,
            request_delay: self.request_delay,
            request_timeout: self.request_timeout,
            backoff: self.backoff,
            output_path: self.output_path,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Accepts exactly `0x` followed by 40 hex digits, any case.
fn parse_contract(raw: &str) -> Result<Address, ConfigError> {
    let valid = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(ConfigError::invalid(
            "CONTRACT_ADDRESS",
            format!("expected 0x followed by 40 hex digits, got {raw:?}"),
        ));
    }
    Address::from_str(raw).map_err(|e| ConfigError::invalid("CONTRACT_ADDRESS", e.to_string()))
}

/// Accepts RFC 3339 (`2025-08-18T10:00:00Z`) or raw unix seconds.
fn parse_timestamp(variable: &str, raw: &str) -> Result<UnixTimestamp, ConfigError> {
    if let Ok(seconds) = raw.parse::<u64>() {
        return Ok(UnixTimestamp::new(seconds));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| UnixTimestamp::from_datetime(dt.with_timezone(&Utc)))
        .map_err(|e| ConfigError::invalid(variable, format!("{raw:?} is not ISO-8601: {e}")))
}

fn parse_number<T>(variable: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::invalid(variable, format!("{raw:?}: {e}")))
}

fn parse_url(variable: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::invalid(variable, format!("{raw:?}: {e}")))
}

fn default_accrual_start() -> UnixTimestamp {
    DateTime::parse_from_rfc3339(DEFAULT_ACCRUAL_START)
        .map(|dt| UnixTimestamp::from_datetime(dt.with_timezone(&Utc)))
        .unwrap_or(UnixTimestamp::EPOCH)
}
