// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for holdscan integration tests
//!
//! Provides in-memory implementations of the source traits so discovery and
//! the full job can be exercised without an explorer or a node.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use alloy_primitives::{Address, BlockNumber};
use async_trait::async_trait;
use holdscan::{
    ChainPosition, SortOrder, SourceError, TokenId, TransferEvent, TransferIndex,
    TransferLogSource, UnixTimestamp,
};

pub fn addr(byte: u8) -> Address {
    Address::with_last_byte(byte)
}

/// A transfer of `token` to `to` at `block`, timestamped `timestamp`
pub fn transfer(
    token: u64,
    block: BlockNumber,
    log_index: u64,
    from: Address,
    to: Address,
    timestamp: u64,
) -> TransferEvent {
    TransferEvent {
        position: ChainPosition::new(block, log_index),
        timestamp: UnixTimestamp::new(timestamp),
        from,
        to,
        token_id: TokenId::from(token),
    }
}

pub fn mint(token: u64, block: BlockNumber, to: Address, timestamp: u64) -> TransferEvent {
    transfer(token, block, 0, Address::ZERO, to, timestamp)
}

fn retries_exhausted(operation: String) -> SourceError {
    SourceError::RetriesExhausted {
        operation: operation.clone(),
        attempts: 3,
        source: Box::new(SourceError::malformed(operation, "unexpected end of body")),
    }
}

/// Mock paginated indexer
///
/// Serves its history sorted by chain position in the requested direction.
///
/// # Example
///
/// ```rust,ignore
/// let index = MockTransferIndex::new(history)
///     .with_failing_pages(&[3])
///     .indexed_through(1_000);
/// ```
pub struct MockTransferIndex {
    history: Vec<TransferEvent>,
    failing_pages: HashSet<u32>,
    requests: Mutex<Vec<(u32, u32, SortOrder)>>,
}

impl MockTransferIndex {
    pub fn new(mut history: Vec<TransferEvent>) -> Self {
        history.sort_by_key(|event| event.position);
        Self {
            history,
            failing_pages: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request for these pages exhausts its retries
    pub fn with_failing_pages(mut self, pages: &[u32]) -> Self {
        self.failing_pages.extend(pages);
        self
    }

    /// Drop everything after `block`, like an indexer lagging the chain
    pub fn indexed_through(mut self, block: BlockNumber) -> Self {
        self.history.retain(|event| event.position.block_number <= block);
        self
    }

    /// Drop every transfer of `token`, like an indexer with a gap
    pub fn missing_token(mut self, token: u64) -> Self {
        let token = TokenId::from(token);
        self.history.retain(|event| event.token_id != token);
        self
    }

    /// `(page, page_size, sort)` for every request made so far
    pub fn requests(&self) -> Vec<(u32, u32, SortOrder)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferIndex for MockTransferIndex {
    async fn transfers_page(
        &self,
        page: u32,
        page_size: u32,
        sort: SortOrder,
    ) -> Result<Vec<TransferEvent>, SourceError> {
        self.requests.lock().unwrap().push((page, page_size, sort));

        if self.failing_pages.contains(&page) {
            return Err(retries_exhausted(format!("tokennfttx page {page}")));
        }

        let skip = (page.saturating_sub(1) as usize) * page_size as usize;
        let rows: Vec<TransferEvent> = match sort {
            SortOrder::Ascending => self.history.iter().skip(skip).take(page_size as usize).cloned().collect(),
            SortOrder::Descending => self
                .history
                .iter()
                .rev()
                .skip(skip)
                .take(page_size as usize)
                .cloned()
                .collect(),
        };
        Ok(rows)
    }
}

/// Mock `eth_getLogs` source over an in-memory history
pub struct MockLogSource {
    history: Vec<TransferEvent>,
    head: BlockNumber,
    failing_ranges: HashSet<(BlockNumber, BlockNumber)>,
    requested: Mutex<Vec<(BlockNumber, BlockNumber)>>,
}

impl MockLogSource {
    pub fn new(history: Vec<TransferEvent>) -> Self {
        let head = history
            .iter()
            .map(|event| event.position.block_number)
            .max()
            .unwrap_or(0);
        Self {
            history,
            head,
            failing_ranges: HashSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_head(mut self, head: BlockNumber) -> Self {
        self.head = head;
        self
    }

    pub fn with_failing_range(mut self, from_block: BlockNumber, to_block: BlockNumber) -> Self {
        self.failing_ranges.insert((from_block, to_block));
        self
    }

    pub fn requested(&self) -> Vec<(BlockNumber, BlockNumber)> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferLogSource for MockLogSource {
    async fn latest_block(&self) -> Result<BlockNumber, SourceError> {
        Ok(self.head)
    }

    async fn transfers_in_range(
        &self,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<TransferEvent>, SourceError> {
        self.requested.lock().unwrap().push((from_block, to_block));

        if self.failing_ranges.contains(&(from_block, to_block)) {
            return Err(retries_exhausted(format!("eth_getLogs {from_block}-{to_block}")));
        }

        Ok(self
            .history
            .iter()
            .filter(|event| (from_block..=to_block).contains(&event.position.block_number))
            .cloned()
            .collect())
    }
}
