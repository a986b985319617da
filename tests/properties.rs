// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Property tests for latest-transfer resolution and leaderboard aggregation

use std::collections::BTreeMap;

use alloy_primitives::Address;
use holdscan::{
    accrue, held_seconds, ChainPosition, LatestTransferRecord, LatestTransfers, Leaderboard,
    RuleConfig, TokenAccrual, TokenId, TransferEvent, UnixTimestamp,
};
use proptest::prelude::*;

const START: u64 = 1_000_000;

/// Histories with unique chain positions. Owner 0 is a burn.
fn history_strategy() -> impl Strategy<Value = Vec<TransferEvent>> {
    prop::collection::vec(
        (0u64..12, 0u64..40, 0u64..4, 0u8..6, 0u64..2_000_000),
        0..60,
    )
    .prop_map(|rows| {
        let mut by_position = BTreeMap::new();
        for (token, block, log_index, owner, timestamp) in rows {
            let position = ChainPosition::new(block, log_index);
            by_position.entry(position).or_insert(TransferEvent {
                position,
                timestamp: UnixTimestamp::new(timestamp),
                from: Address::with_last_byte(0xff),
                to: Address::with_last_byte(owner),
                token_id: TokenId::from(token),
            });
        }
        by_position.into_values().collect()
    })
}

fn shuffled_history_strategy() -> impl Strategy<Value = (Vec<TransferEvent>, Vec<TransferEvent>)> {
    history_strategy().prop_flat_map(|history| {
        let shuffled = Just(history.clone()).prop_shuffle();
        (Just(history), shuffled)
    })
}

fn accruals_strategy() -> impl Strategy<Value = Vec<TokenAccrual>> {
    prop::collection::vec((0u8..8, 0u64..200_000), 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(token, (owner, held_seconds))| TokenAccrual {
                token_id: TokenId::from(token as u64),
                owner: Address::with_last_byte(owner),
                held_seconds,
            })
            .collect()
    })
}

fn rule(window_seconds: u64, points_per_window: u64) -> RuleConfig {
    RuleConfig {
        window_seconds,
        points_per_window,
        accrual_start: UnixTimestamp::new(START),
        ..RuleConfig::default()
    }
}

proptest! {
    /// Property: the resolved map does not depend on delivery order
    #[test]
    fn test_latest_transfers_ignore_delivery_order(
        (history, shuffled) in shuffled_history_strategy()
    ) {
        prop_assert_eq!(
            LatestTransfers::from_history(&history),
            LatestTransfers::from_history(&shuffled)
        );
    }

    /// Property: a newest-first first-wins pass agrees with keeping the greatest position
    #[test]
    fn test_descending_first_wins_matches_greatest_position(history in history_strategy()) {
        let descending: LatestTransfers = history
            .iter()
            .rev()
            .map(LatestTransferRecord::from)
            .collect();

        prop_assert_eq!(descending, LatestTransfers::from_history(&history));
    }

    /// Property: every resolved record is the newest transfer of its token
    #[test]
    fn test_resolved_records_are_the_newest(history in history_strategy()) {
        let latest = LatestTransfers::from_history(&history);

        for event in &history {
            let record = latest.get(&event.token_id);
            prop_assert!(record.is_some_and(|record| record.position >= event.position));
        }
        let distinct: std::collections::BTreeSet<_> =
            history.iter().map(|event| event.token_id).collect();
        prop_assert_eq!(latest.len(), distinct.len());
    }

    /// Property: held time never predates the accrual start and never goes negative
    #[test]
    fn test_held_seconds_are_bounded(
        received_at in 0u64..2_000_000,
        now in 0u64..2_000_000,
    ) {
        let held = held_seconds(
            UnixTimestamp::new(received_at),
            UnixTimestamp::new(START),
            UnixTimestamp::new(now),
        );

        prop_assert!(held <= now.saturating_sub(START));
        prop_assert!(held <= now.saturating_sub(received_at));
        if now > received_at.max(START) {
            prop_assert_eq!(held, now - received_at.max(START));
        }
    }

    /// Property: burned tokens never reach the leaderboard
    #[test]
    fn test_burned_tokens_are_excluded(history in history_strategy()) {
        let latest = LatestTransfers::from_history(&history);
        let accruals = accrue(latest.records(), &rule(3_600, 1), UnixTimestamp::new(2_000_000));

        let live = latest.records().filter(|record| !record.is_burned()).count();
        prop_assert_eq!(accruals.len(), live);

        let board = Leaderboard::aggregate(accruals, &rule(3_600, 1));
        prop_assert!(board.get(&Address::ZERO).is_none());
        let tokens: u64 = board.entries().iter().map(|row| row.token_count).sum();
        prop_assert_eq!(tokens, live as u64);
    }

    /// Property: windows truncate the owner total and points scale them
    #[test]
    fn test_rows_floor_the_owner_total(
        accruals in accruals_strategy(),
        window_seconds in 1u64..50_000,
        points_per_window in 0u64..100,
    ) {
        let rule = rule(window_seconds, points_per_window);
        let board = Leaderboard::aggregate(accruals.clone(), &rule);

        for row in board.entries() {
            let total: u64 = accruals
                .iter()
                .filter(|accrual| accrual.owner == row.address)
                .map(|accrual| accrual.held_seconds)
                .sum();
            prop_assert_eq!(row.held_seconds, total);
            prop_assert_eq!(row.windows, total / window_seconds);
            prop_assert_eq!(row.points, row.windows * points_per_window);
        }
    }

    /// Property: rows are ranked and the ranking does not depend on input order
    #[test]
    fn test_ranking_is_ordered_and_deterministic(accruals in accruals_strategy()) {
        let rule = rule(6 * 3_600, 10);
        let board = Leaderboard::aggregate(accruals.clone(), &rule);

        for pair in board.entries().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                (a.points, a.token_count) >= (b.points, b.token_count),
                "{a:?} ranked above {b:?}"
            );
            if (a.points, a.token_count) == (b.points, b.token_count) {
                prop_assert!(a.address < b.address);
            }
        }

        let reversed = Leaderboard::aggregate(accruals.into_iter().rev(), &rule);
        prop_assert_eq!(board, reversed);
    }
}
