//! Calendar-day bucketing.
//!
//! All day boundaries are UTC midnights. Bucketing and the range join both
//! go through this module so an image near midnight lands on the same day in
//! either place.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProjectionError;

pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A `YYYY-MM-DD` calendar day under UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The UTC day an instant falls on.
    pub fn of(instant: &DateTime<Utc>) -> Self {
        Self(instant.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parse a strict `YYYY-MM-DD` key.
    pub fn parse(raw: &str) -> Result<Self, ProjectionError> {
        let trimmed = raw.trim();
        let well_formed = trimmed.len() == 10
            && trimmed.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(ProjectionError::InvalidDayKey(raw.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| ProjectionError::InvalidDayKey(raw.to_string()))
    }

    /// The half-open interval `[D 00:00:00Z, D+1 00:00:00Z)`.
    pub fn range(&self) -> Result<DayRange, ProjectionError> {
        let next = self
            .0
            .succ_opt()
            .ok_or_else(|| ProjectionError::InvalidDayKey(self.to_string()))?;
        Ok(DayRange {
            start: self.0.and_time(chrono::NaiveTime::MIN).and_utc(),
            end: next.and_time(chrono::NaiveTime::MIN).and_utc(),
        })
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A half-open UTC interval covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    /// Lower bound as sent in range filters.
    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Exclusive upper bound as sent in range filters.
    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Parse a service timestamp into UTC.
///
/// Accepts RFC 3339, the `YYYY-MM-DD HH:MM:SS[.f]+00` form Postgres emits,
/// offset-less date-times (taken as UTC) and bare dates (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ProjectionError> {
    let trimmed = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.to_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(trimmed, format) {
            return Ok(instant.to_utc());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(day) = DayKey::parse(trimmed) {
        return Ok(day.date().and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err(ProjectionError::InvalidTimestamp(raw.to_string()))
}

/// Day key of a service timestamp.
pub fn day_key(raw: &str) -> Result<DayKey, ProjectionError> {
    parse_timestamp(raw).map(|instant| DayKey::of(&instant))
}

/// Interval of a raw day key.
pub fn day_range(raw: &str) -> Result<DayRange, ProjectionError> {
    DayKey::parse(raw)?.range()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = utc("2024-01-01T23:00:00Z");
        assert_eq!(utc("2024-01-01T23:00:00+00:00"), expected);
        assert_eq!(utc("2024-01-01 23:00:00+00"), expected);
        assert_eq!(utc("2024-01-01T23:00:00"), expected);
        assert_eq!(utc("2024-01-01 23:00:00.000"), expected);
        assert_eq!(utc("2024-01-02T01:00:00+02:00"), expected);
        assert_eq!(utc("2024-01-01T23:00:00.123456+00:00").timestamp(), expected.timestamp());
        assert_eq!(utc("2024-01-01"), utc("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        for raw in ["", "gestern", "2024-13-01T00:00:00Z", "01.02.2024"] {
            assert_eq!(
                parse_timestamp(raw),
                Err(ProjectionError::InvalidTimestamp(raw.to_string()))
            );
        }
    }

    #[test]
    fn test_day_key_uses_utc_boundaries() {
        assert_eq!(day_key("2024-01-01T23:30:00-02:00").unwrap().to_string(), "2024-01-02");
        assert_eq!(day_key("2024-01-02T00:30:00+01:00").unwrap().to_string(), "2024-01-01");
        assert_eq!(day_key("2024-01-01T00:00:00Z").unwrap().to_string(), "2024-01-01");
    }

    #[test]
    fn test_day_key_parse_is_strict() {
        assert!(DayKey::parse("2024-02-29").is_ok());
        for raw in ["2023-02-29", "2024-1-01", "20240101", "2024-01-01T00:00", "", "abcd-ef-gh"] {
            assert_eq!(
                DayKey::parse(raw),
                Err(ProjectionError::InvalidDayKey(raw.to_string()))
            );
        }
    }

    #[test]
    fn test_range_is_half_open() {
        let range = day_range("2024-01-01").unwrap();
        assert_eq!(range.start, utc("2024-01-01T00:00:00Z"));
        assert_eq!(range.end, utc("2024-01-02T00:00:00Z"));
        assert!(range.contains(&utc("2024-01-01T00:00:00Z")));
        assert!(range.contains(&utc("2024-01-01T23:59:59.999Z")));
        assert!(!range.contains(&utc("2024-01-02T00:00:00Z")));
        assert!(!range.contains(&utc("2023-12-31T23:59:59Z")));
    }

    #[test]
    fn test_range_params() {
        let range = day_range("2024-02-28").unwrap();
        assert_eq!(range.start_param(), "2024-02-28T00:00:00.000Z");
        assert_eq!(range.end_param(), "2024-02-29T00:00:00.000Z");
    }

    #[test]
    fn test_range_of_last_representable_day_fails() {
        let last = DayKey::from_date(NaiveDate::MAX);
        assert!(matches!(last.range(), Err(ProjectionError::InvalidDayKey(_))));
    }

    #[test]
    fn test_day_key_serde() {
        let key: DayKey = serde_json::from_str(r#""2024-03-01""#).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""2024-03-01""#);
        assert!(serde_json::from_str::<DayKey>(r#""2024-03""#).is_err());
    }
}
