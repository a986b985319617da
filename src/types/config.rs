// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for configuration values
//!
//! These types ensure configuration values are not confused with
//! blockchain values (block numbers, timestamps, token ids).

use serde::{Deserialize, Serialize};

/// Maximum block range for a single `eth_getLogs` call
///
/// Public endpoints commonly reject ranges wider than a few thousand blocks,
/// so large scans are split into chunks of at most this many blocks.
///
/// # Examples
///
/// ```
/// use holdscan::MaxBlockRange;
///
/// let range = MaxBlockRange::new(1000);
/// let chunks: Vec<_> = range.chunk_range_desc(0, 2500).collect();
/// assert_eq!(chunks, vec![(1501, 2500), (501, 1500), (0, 500)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxBlockRange(u64);

impl MaxBlockRange {
    /// Rate-limit friendly default for explorer-backed RPC endpoints
    pub const DEFAULT: Self = Self(3000);

    /// Create a new max block range
    ///
    /// A zero range would never make progress, so it is raised to one block.
    pub const fn new(blocks: u64) -> Self {
        if blocks == 0 {
            Self(1)
        } else {
            Self(blocks)
        }
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Calculate number of chunks needed to cover `[start, end]`
    pub fn chunks_needed(&self, start: u64, end: u64) -> usize {
        if end < start {
            return 0;
        }
        let total_blocks = end - start + 1;
        total_blocks.div_ceil(self.0) as usize
    }

    /// Split `[start, end]` into chunks, newest first
    ///
    /// Chunks are aligned to `end`, so only the oldest chunk may be short.
    pub fn chunk_range_desc(&self, start: u64, end: u64) -> DescendingChunkIterator {
        DescendingChunkIterator {
            next: (start <= end).then_some(end),
            start,
            chunk_size: self.0,
        }
    }
}

impl Default for MaxBlockRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u64> for MaxBlockRange {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for MaxBlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} blocks", self.0)
    }
}

/// Iterator over descending block range chunks
///
/// Created by [`MaxBlockRange::chunk_range_desc`]. Yields inclusive
/// `(start, end)` tuples, highest block range first.
#[derive(Debug, Clone)]
pub struct DescendingChunkIterator {
    next: Option<u64>,
    start: u64,
    chunk_size: u64,
}

impl Iterator for DescendingChunkIterator {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let chunk_end = self.next?;
        let chunk_start = chunk_end
            .saturating_sub(self.chunk_size - 1)
            .max(self.start);

        self.next = (chunk_start > self.start).then(|| chunk_start - 1);
        Some((chunk_start, chunk_end))
    }
}
