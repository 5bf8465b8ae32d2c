//! Serde adapter for order timestamps.
//!
//! Reads either a date-time without offset or an RFC 3339 string; offset
//! values are converted to UTC. Writes are always without offset, to the
//! millisecond.

use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.format(FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(de::Error::custom)
}

pub fn parse(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Ok(value.naive_utc());
    }
    raw.parse::<NaiveDateTime>()
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}
