// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token identifiers for ERC-721 collections.

use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a single NFT within a collection
///
/// ERC-721 token ids are full `uint256` values. Many collections mint ids far
/// above 2^53, so the id is kept as a [`U256`] end to end and rendered as a
/// decimal string whenever it leaves the process.
///
/// # Examples
///
/// ```
/// use holdscan::TokenId;
///
/// let id: TokenId = "115792089237316195423570985008687907853269984665640564039457584007913129639935"
///     .parse()
///     .unwrap();
/// assert_eq!(id.to_string().len(), 78);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(U256);

impl TokenId {
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<U256> for TokenId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for TokenId {
    type Err = alloy_primitives::ruint::ParseError;

    /// Parses a decimal id, or a `0x`-prefixed hex id
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => U256::from_str_radix(hex, 16).map(Self),
            None => U256::from_str_radix(s, 10).map(Self),
        }
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
