// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Holding-time accrual per token
//!
//! A token earns time from the later of its last receipt and the accrual start
//! up to `now`. Time never goes negative and never predates the accrual start.
//! Window and point counts truncate.

use alloy_primitives::Address;

use crate::config::RuleConfig;
use crate::types::time::UnixTimestamp;
use crate::types::token::TokenId;
use crate::types::transfer::LatestTransferRecord;

/// Eligible holding time for one token held by its current owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccrual {
    pub token_id: TokenId,
    pub owner: Address,
    pub held_seconds: u64,
}

/// `max(0, now - max(received_at, accrual_start))`
pub fn held_seconds(
    received_at: UnixTimestamp,
    accrual_start: UnixTimestamp,
    now: UnixTimestamp,
) -> u64 {
    now.saturating_since(received_at.max(accrual_start))
}

/// Whole windows in `held_seconds`; zero for a zero-length window
pub fn windows(held_seconds: u64, window_seconds: u64) -> u64 {
    held_seconds.checked_div(window_seconds).unwrap_or(0)
}

pub fn points(windows: u64, points_per_window: u64) -> u64 {
    windows.saturating_mul(points_per_window)
}

/// Accrue every live token. Burned tokens are dropped.
pub fn accrue<'a, I>(records: I, rule: &RuleConfig, now: UnixTimestamp) -> Vec<TokenAccrual>
where
    I: IntoIterator<Item = &'a LatestTransferRecord>,
{
    records
        .into_iter()
        .filter(|record| !record.is_burned())
        .map(|record| TokenAccrual {
            token_id: record.token_id,
            owner: record.owner,
            held_seconds: held_seconds(record.received_at, rule.accrual_start, now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transfer::ChainPosition;

    const HOUR: u64 = 3600;

    fn record(token: u64, owner: Address, received_at: u64) -> LatestTransferRecord {
        LatestTransferRecord {
            token_id: TokenId::from(token),
            owner,
            received_at: UnixTimestamp::new(received_at),
            position: ChainPosition::new(token, 0),
        }
    }

    #[test]
    fn test_received_before_start_counts_from_start() {
        let start = UnixTimestamp::new(1_000_000);
        let now = UnixTimestamp::new(1_000_000 + 7 * HOUR);
        assert_eq!(held_seconds(UnixTimestamp::new(10), start, now), 7 * HOUR);
    }

    #[test]
    fn test_received_after_start_counts_from_receipt() {
        let start = UnixTimestamp::new(1_000);
        let now = UnixTimestamp::new(10_000);
        assert_eq!(held_seconds(UnixTimestamp::new(4_000), start, now), 6_000);
    }

    #[test]
    fn test_future_receipt_or_start_is_zero() {
        let now = UnixTimestamp::new(500);
        assert_eq!(held_seconds(UnixTimestamp::new(900), UnixTimestamp::EPOCH, now), 0);
        assert_eq!(held_seconds(UnixTimestamp::EPOCH, UnixTimestamp::new(900), now), 0);
    }

    #[test]
    fn test_windows_truncate() {
        let window = 6 * HOUR;
        assert_eq!(windows(window - 1, window), 0);
        assert_eq!(windows(window, window), 1);
        assert_eq!(windows(3 * window + window - 1, window), 3);
        assert_eq!(windows(123, 0), 0);
        assert_eq!(points(3, 10), 30);
    }

    #[test]
    fn test_accrue_drops_burned_tokens() {
        let holder = Address::with_last_byte(0xaa);
        let records = [record(1, holder, 0), record(2, Address::ZERO, 0)];
        let rule = RuleConfig {
            accrual_start: UnixTimestamp::EPOCH,
            ..RuleConfig::default()
        };

        let accruals = accrue(&records, &rule, UnixTimestamp::new(HOUR));
        assert_eq!(
            accruals,
            vec![TokenAccrual {
                token_id: TokenId::from(1u64),
                owner: holder,
                held_seconds: HOUR,
            }]
        );
    }
}
