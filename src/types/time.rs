// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Whole-second wall-clock time as reported by the chain.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds (always UTC)
///
/// Block timestamps are never negative, so the inner value is unsigned and
/// all arithmetic on it saturates at zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnixTimestamp(pub u64);

impl UnixTimestamp {
    pub const EPOCH: Self = Self(0);

    pub const fn new(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Converts a UTC datetime, clamping pre-1970 values to the epoch
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(u64::try_from(dt.timestamp()).unwrap_or(0))
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self`, or zero if `earlier` is later
    pub const fn saturating_since(&self, earlier: UnixTimestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// ISO-8601 rendering with millisecond precision and a `Z` suffix
    ///
    /// Falls back to the raw number for values chrono cannot represent.
    pub fn to_iso8601(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => self.0.to_string(),
        }
    }
}

impl From<u64> for UnixTimestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_saturating_since_never_negative() {
        let earlier = UnixTimestamp::new(100);
        let later = UnixTimestamp::new(250);

        assert_eq!(later.saturating_since(earlier), 150);
        assert_eq!(earlier.saturating_since(later), 0);
    }

    #[test]
    fn test_iso8601_round_trip_matches_js_format() {
        let dt = Utc.with_ymd_and_hms(2025, 8, 18, 10, 0, 0).unwrap();
        let ts = UnixTimestamp::from_datetime(dt);

        assert_eq!(ts.as_u64(), 1_755_511_200);
        assert_eq!(ts.to_iso8601(), "2025-08-18T10:00:00.000Z");
    }

    #[test]
    fn test_pre_epoch_datetime_clamps_to_zero() {
        let dt = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(UnixTimestamp::from_datetime(dt), UnixTimestamp::EPOCH);
    }
}
