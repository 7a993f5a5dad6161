//! Serde adapter for board timestamps.
//!
//! The board endpoints emit `created_at` as `YYYY-MM-DD HH:MM:SS` without a
//! timezone. Those are read as UTC. RFC 3339 strings are accepted too.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer, de};

pub const BOARD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse either an RFC 3339 timestamp or the board's naive UTC format.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, BOARD_FORMAT)
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.format(BOARD_FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_board_format_as_utc() {
        let ts = parse("2024-03-01 09:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2024-03-01T18:30:00+09:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_none());
    }
}
