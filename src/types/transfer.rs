// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer events and the per-token records derived from them.

use alloy_primitives::{Address, BlockNumber};
use serde::{Deserialize, Serialize};

use super::{time::UnixTimestamp, token::TokenId};

/// Position of a log in canonical chain order
///
/// Ordering is by block number, then by log index within the block. The derived
/// `Ord` relies on field order, so `block_number` must stay first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainPosition {
    pub block_number: BlockNumber,
    pub log_index: u64,
}

impl ChainPosition {
    pub const fn new(block_number: BlockNumber, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl std::fmt::Display for ChainPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}

/// A single ERC-721 `Transfer` normalized from either the indexer or raw logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub position: ChainPosition,
    pub timestamp: UnixTimestamp,
    pub from: Address,
    /// Recipient; [`Address::ZERO`] marks a burn
    pub to: Address,
    pub token_id: TokenId,
}

impl TransferEvent {
    pub fn is_burn(&self) -> bool {
        self.to == Address::ZERO
    }

    pub fn is_mint(&self) -> bool {
        self.from == Address::ZERO
    }
}

/// The chronologically last transfer seen for a token
///
/// `owner` is the recipient of that transfer and `received_at` its block time.
/// A burned token keeps a record (with `owner == Address::ZERO`) so that older
/// transfers cannot resurrect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestTransferRecord {
    pub token_id: TokenId,
    pub owner: Address,
    pub received_at: UnixTimestamp,
    pub position: ChainPosition,
}

impl LatestTransferRecord {
    pub fn is_burned(&self) -> bool {
        self.owner == Address::ZERO
    }
}

impl From<&TransferEvent> for LatestTransferRecord {
    fn from(event: &TransferEvent) -> Self {
        Self {
            token_id: event.token_id,
            owner: event.to,
            received_at: event.timestamp,
            position: event.position,
        }
    }
}
