//! Span creation helpers for holdscan operations.
//!
//! Telemetry stays out of business logic: rather than `#[instrument]` on each
//! function, every instrumented operation has a helper here and the caller
//! attaches the span to its future.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     async { /* business logic */ }.instrument(span).await
//! }
//! ```

use alloy_primitives::{Address, BlockNumber};
use tracing::{Level, Span};

use crate::discovery::DiscoveryStrategy;
use crate::source::SortOrder;
use crate::types::time::UnixTimestamp;

/// Create span for one full snapshot run.
///
/// Parent: None (root span for this operation)
/// Children: resolve_bounds, discover_latest_transfers, build_leaderboard, write_snapshot
#[inline]
pub(crate) fn run_snapshot(contract: Address, strategy: DiscoveryStrategy) -> Span {
    tracing::span!(
        Level::INFO,
        "holdscan.run_snapshot",
        contract = %contract,
        strategy = %strategy,
    )
}

/// Create span for fetching one indexer page.
///
/// Parent: discovery or bounds span
/// Children: HTTP request (with retries)
#[inline]
pub(crate) fn fetch_transfer_page(page: u32, page_size: u32, sort: SortOrder) -> Span {
    tracing::debug_span!(
        "holdscan.fetch_transfer_page",
        page = page,
        page_size = page_size,
        sort = %sort,
    )
}

/// Create span for fetching raw transfer logs over a block range.
///
/// Parent: scan_descending span
/// Children: eth_getLogs and eth_getBlockByNumber calls
#[inline]
pub(crate) fn fetch_transfer_logs(
    contract: Address,
    from_block: BlockNumber,
    to_block: BlockNumber,
) -> Span {
    tracing::trace_span!(
        "holdscan.fetch_transfer_logs",
        contract = %contract,
        from_block = from_block,
        to_block = to_block,
    )
}

/// Create span for a chunked newest-first range scan.
///
/// Parent: discover_latest_transfers span
/// Children: fetch_transfer_logs spans (one per chunk)
#[inline]
pub(crate) fn scan_descending(
    from_block: BlockNumber,
    to_block: BlockNumber,
    chunk_size: u64,
) -> Span {
    tracing::debug_span!(
        "holdscan.scan_descending",
        from_block = from_block,
        to_block = to_block,
        chunk_size = chunk_size,
    )
}

/// Create span for resolving the block span since the accrual start.
///
/// Parent: run_snapshot span
/// Children: fetch_transfer_page spans
#[inline]
pub(crate) fn resolve_bounds(accrual_start: UnixTimestamp, page_size: u32) -> Span {
    tracing::span!(
        Level::INFO,
        "holdscan.resolve_bounds",
        accrual_start = accrual_start.as_u64(),
        page_size = page_size,
    )
}

/// Create span for building the per-token latest-transfer map.
///
/// Parent: run_snapshot span
/// Children: fetch_transfer_page or scan_descending spans
#[inline]
pub(crate) fn discover_latest_transfers(strategy: DiscoveryStrategy) -> Span {
    tracing::span!(
        Level::INFO,
        "holdscan.discover_latest_transfers",
        strategy = %strategy,
    )
}

/// Create span for accrual and aggregation.
///
/// Parent: run_snapshot span
#[inline]
pub(crate) fn build_leaderboard(tokens: usize, now: UnixTimestamp) -> Span {
    tracing::debug_span!(
        "holdscan.build_leaderboard",
        tokens = tokens,
        now = now.as_u64(),
    )
}

/// Create span for persisting a snapshot.
///
/// Parent: run_snapshot span
#[inline]
pub(crate) fn write_snapshot(path: &std::path::Path) -> Span {
    tracing::debug_span!("holdscan.write_snapshot", path = %path.display())
}
