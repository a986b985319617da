// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The per-token latest-transfer map
//!
//! Two update disciplines share one map:
//!
//! - [`LatestTransfers::observe`] keeps whichever transfer has the greatest
//!   [`ChainPosition`](crate::types::transfer::ChainPosition); on an equal position the later delivery wins. Ascending
//!   scans use it.
//! - [`LatestTransfers::insert_if_absent`] keeps the first record offered for a
//!   token. Fed newest first, the first record is the latest transfer. Descending
//!   scans and backfill merges use it.

use std::collections::btree_map::{BTreeMap, Entry};

use crate::types::token::TokenId;
use crate::types::transfer::{LatestTransferRecord, TransferEvent};

/// `TokenId -> LatestTransferRecord`, iterated in ascending token id order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestTransfers {
    records: BTreeMap<TokenId, LatestTransferRecord>,
}

impl LatestTransfers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map from a history in any order.
    ///
    /// Events sharing a position (indexer rows without a log index) resolve to
    /// whichever comes last in `events`.
    pub fn from_history<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a TransferEvent>,
    {
        let mut latest = Self::new();
        for event in events {
            latest.observe(event);
        }
        latest
    }

    /// Record `event` unless the map holds a strictly newer transfer for its
    /// token.
    ///
    /// Returns `true` when the event was recorded.
    pub fn observe(&mut self, event: &TransferEvent) -> bool {
        match self.records.entry(event.token_id) {
            Entry::Vacant(slot) => {
                slot.insert(LatestTransferRecord::from(event));
                true
            }
            // Ascending delivery puts the newer of two tied rows last
            Entry::Occupied(mut slot) if event.position >= slot.get().position => {
                slot.insert(LatestTransferRecord::from(event));
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Record `record` unless its token is already resolved.
    ///
    /// Returns `true` when the record was inserted.
    pub fn insert_if_absent(&mut self, record: LatestTransferRecord) -> bool {
        match self.records.entry(record.token_id) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Fold in every token of `other` that this map has not resolved.
    ///
    /// Returns how many tokens were added.
    pub fn merge_absent(&mut self, other: LatestTransfers) -> usize {
        other
            .records
            .into_values()
            .filter(|record| self.insert_if_absent(record.clone()))
            .count()
    }

    pub fn contains(&self, token_id: &TokenId) -> bool {
        self.records.contains_key(token_id)
    }

    pub fn get(&self, token_id: &TokenId) -> Option<&LatestTransferRecord> {
        self.records.get(token_id)
    }

    /// Number of distinct tokens resolved, burned ones included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &LatestTransferRecord> {
        self.records.values()
    }
}

impl FromIterator<LatestTransferRecord> for LatestTransfers {
    /// Collects with insert-if-absent semantics.
    fn from_iter<T: IntoIterator<Item = LatestTransferRecord>>(iter: T) -> Self {
        let mut latest = Self::new();
        for record in iter {
            latest.insert_if_absent(record);
        }
        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::time::UnixTimestamp;
    use crate::types::transfer::ChainPosition;
    use alloy_primitives::Address;

    fn transfer(token: u64, block: u64, log_index: u64, to: u8) -> TransferEvent {
        TransferEvent {
            position: ChainPosition::new(block, log_index),
            timestamp: UnixTimestamp::new(block * 2),
            from: Address::ZERO,
            to: Address::with_last_byte(to),
            token_id: TokenId::from(token),
        }
    }

    #[test]
    fn test_observe_keeps_greatest_position() {
        let mut latest = LatestTransfers::new();
        assert!(latest.observe(&transfer(1, 10, 3, 0xaa)));
        assert!(latest.observe(&transfer(1, 10, 4, 0xbb)));
        assert!(!latest.observe(&transfer(1, 9, 99, 0xcc)));

        let record = latest.get(&TokenId::from(1u64)).unwrap();
        assert_eq!(record.owner, Address::with_last_byte(0xbb));
        assert_eq!(record.position, ChainPosition::new(10, 4));
    }

    #[test]
    fn test_tied_positions_resolve_to_the_last_delivered() {
        // Indexer rows without a log index: mint to 0xaa, then 0xaa -> 0xbb, same block
        let mint = transfer(8, 100, 0, 0xaa);
        let sale = transfer(8, 100, 0, 0xbb);

        let ascending = LatestTransfers::from_history([&mint, &sale]);
        let descending: LatestTransfers = [&sale, &mint]
            .into_iter()
            .map(LatestTransferRecord::from)
            .collect();

        assert_eq!(
            ascending.get(&TokenId::from(8u64)).unwrap().owner,
            Address::with_last_byte(0xbb)
        );
        assert_eq!(ascending, descending);
    }

    #[test]
    fn test_same_block_resolved_by_log_index() {
        let history = [transfer(5, 100, 7, 0x02), transfer(5, 100, 2, 0x01)];
        let latest = LatestTransfers::from_history(&history);
        assert_eq!(
            latest.get(&TokenId::from(5u64)).unwrap().owner,
            Address::with_last_byte(0x02)
        );
    }

    #[test]
    fn test_insert_if_absent_is_first_wins() {
        let mut latest = LatestTransfers::new();
        assert!(latest.insert_if_absent((&transfer(1, 50, 0, 0xaa)).into()));
        assert!(!latest.insert_if_absent((&transfer(1, 90, 0, 0xbb)).into()));
        assert_eq!(
            latest.get(&TokenId::from(1u64)).unwrap().owner,
            Address::with_last_byte(0xaa)
        );
    }

    #[test]
    fn test_merge_absent_never_overwrites() {
        let mut primary = LatestTransfers::from_history(&[transfer(1, 50, 0, 0xaa)]);
        let backfill = LatestTransfers::from_history(&[
            transfer(1, 80, 0, 0xbb),
            transfer(2, 70, 0, 0xcc),
        ]);

        assert_eq!(primary.merge_absent(backfill), 1);
        assert_eq!(primary.len(), 2);
        assert_eq!(
            primary.get(&TokenId::from(1u64)).unwrap().owner,
            Address::with_last_byte(0xaa)
        );
    }

    #[test]
    fn test_burned_tokens_keep_a_record() {
        let mut burn = transfer(3, 20, 0, 0);
        burn.to = Address::ZERO;
        let latest = LatestTransfers::from_history(&[transfer(3, 10, 0, 0xaa), burn]);

        assert_eq!(latest.len(), 1);
        assert!(latest.get(&TokenId::from(3u64)).unwrap().is_burned());
    }

    #[test]
    fn test_records_are_ordered_by_token_id() {
        let latest =
            LatestTransfers::from_history(&[transfer(9, 1, 0, 1), transfer(2, 2, 0, 1), transfer(5, 3, 0, 1)]);
        let ids: Vec<_> = latest.records().map(|r| r.token_id).collect();
        assert_eq!(ids, vec![TokenId::from(2u64), TokenId::from(5u64), TokenId::from(9u64)]);
    }
}
