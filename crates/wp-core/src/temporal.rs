//! # Temporal Types
//!
//! UTC-only timestamp type. All timestamps are stored in UTC with
//! second-level precision and a `Z` suffix in serialized form, which is the
//! exact form embedded in signed credential payloads.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A UTC timestamp with second-level precision.
///
/// Serializes to ISO 8601 with `Z` suffix (e.g., `2026-01-15T12:00:00Z`).
/// Subsecond precision is truncated at construction so that the rendered
/// string and the comparison value always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wrap a `chrono::DateTime<Utc>`, truncating subseconds.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_epoch_secs(dt.timestamp()).unwrap_or(Self(dt))
    }

    /// Build from Unix seconds.
    pub fn from_epoch_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Strict parse: RFC 3339 in UTC with a `Z` suffix.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!(
                "{s:?} must be UTC with a Z suffix"
            )));
        }
        Self::parse_lenient(s)
    }

    /// Lenient parse: any RFC 3339 offset, normalized to UTC.
    ///
    /// Used for dates supplied by third parties such as `expirationDate`,
    /// where browser clients emit milliseconds or explicit offsets.
    pub fn parse_lenient(s: &str) -> Result<Self, CoreError> {
        DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
            .map_err(|e| CoreError::InvalidTimestamp(format!("{s:?}: {e}")))
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Shift by a signed number of seconds, saturating at the chrono range.
    pub fn plus_secs(&self, secs: i64) -> Self {
        self.0
            .checked_add_signed(chrono::Duration::seconds(secs))
            .map(Self)
            .unwrap_or(*self)
    }

    /// ISO 8601 string with Z suffix, truncated to seconds.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_lenient(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_seconds_with_z() {
        let ts = Timestamp::from_epoch_secs(1_700_000_000).unwrap();
        assert_eq!(ts.to_iso8601(), "2023-11-14T22:13:20Z");
        assert_eq!(ts.to_string(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().timestamp_subsec_nanos(), 0);
        assert_eq!(ts.to_iso8601().len(), "2026-01-01T00:00:00Z".len());
    }

    #[test]
    fn strict_parse_requires_z() {
        assert!(Timestamp::parse("2026-01-15T12:00:00Z").is_ok());
        assert!(Timestamp::parse("2026-01-15T12:00:00+02:00").is_err());
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn lenient_parse_normalizes_offsets_and_millis() {
        let a = Timestamp::parse_lenient("2026-01-15T14:00:00.789+02:00").unwrap();
        assert_eq!(a.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn ordering_follows_time() {
        let a = Timestamp::from_epoch_secs(10).unwrap();
        let b = a.plus_secs(5);
        assert!(a < b);
        assert_eq!(b.epoch_secs(), 15);
        assert_eq!(b.plus_secs(-5), a);
    }

    #[test]
    fn serde_roundtrip_as_string() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2026-01-15T12:00:00Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
