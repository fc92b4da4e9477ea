//! Timestamp parsing for backend payloads.
//!
//! The backend emits ISO-8601 timestamps with or without a UTC offset.
//! Naive timestamps are taken to be UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse an ISO-8601 timestamp, treating offset-less values as UTC.
///
/// # Examples
/// ```
/// use punch_models::timestamp::parse_utc;
/// assert!(parse_utc("2024-03-05T09:00:00Z").is_some());
/// assert!(parse_utc("2024-03-05T09:00:00.123456").is_some());
/// assert!(parse_utc("yesterday").is_none());
/// ```
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Serde adapter for [`parse_utc`].
pub fn deserialize_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_utc(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// Serde adapter for optional timestamps; unparseable values become `None`.
pub fn deserialize_opt_utc<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_offsets_are_normalized() {
        let ts = parse_utc("2024-03-05T10:00:00+01:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_naive_is_utc() {
        let ts = parse_utc("2024-03-05 09:00:00").unwrap();
        assert_eq!(ts.hour(), 9);
        let ts = parse_utc("2024-03-05T09:00:00.250").unwrap();
        assert_eq!(ts.nanosecond(), 250_000_000);
    }
}
