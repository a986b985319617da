// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-owner aggregation and ranking
//!
//! Seconds are summed per owner and floored into windows once, on the total.
//! Two tokens held five hours each under a six-hour window earn one window,
//! not zero.
//!
//! Rows are ranked by points, then token count, both descending. Owners are
//! grouped in address order before a stable sort, so equal rows always come
//! out in ascending address order.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Serialize, Serializer};

use crate::accrual::{self, TokenAccrual};
use crate::config::RuleConfig;

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolderAccrual {
    #[serde(serialize_with = "serialize_address")]
    pub address: Address,
    #[serde(rename = "tokens")]
    pub token_count: u64,
    #[serde(rename = "holdingSeconds")]
    pub held_seconds: u64,
    #[serde(rename = "periods")]
    pub windows: u64,
    pub points: u64,
}

/// Ranked holders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<HolderAccrual>,
}

impl Leaderboard {
    pub fn aggregate<I>(accruals: I, rule: &RuleConfig) -> Self
    where
        I: IntoIterator<Item = TokenAccrual>,
    {
        let mut totals: BTreeMap<Address, (u64, u64)> = BTreeMap::new();
        for accrual in accruals {
            if accrual.owner == Address::ZERO {
                continue;
            }
            let (tokens, seconds) = totals.entry(accrual.owner).or_default();
            *tokens += 1;
            *seconds = seconds.saturating_add(accrual.held_seconds);
        }

        let mut entries: Vec<HolderAccrual> = totals
            .into_iter()
            .map(|(address, (token_count, held_seconds))| {
                let windows = accrual::windows(held_seconds, rule.window_seconds);
                HolderAccrual {
                    address,
                    token_count,
                    held_seconds,
                    windows,
                    points: accrual::points(windows, rule.points_per_window),
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| b.token_count.cmp(&a.token_count))
        });

        Self { entries }
    }

    pub fn entries(&self) -> &[HolderAccrual] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<HolderAccrual> {
        self.entries
    }

    pub fn total_holders(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address: &Address) -> Option<&HolderAccrual> {
        self.entries.iter().find(|entry| entry.address == *address)
    }
}

/// Lowercase `0x` hex, whatever casing the address was parsed from
pub(crate) fn serialize_address<S: Serializer>(
    address: &Address,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{address:#x}"))
}
