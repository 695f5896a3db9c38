//! Front-matter dates

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Date-time formats accepted without an offset (interpreted as UTC)
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// A content date as authored, with its parsed instant
///
/// Ordering and equality only consider the instant, so `2024-01-01` and
/// `2024-01-01T00:00:00Z` compare equal.
#[derive(Debug, Clone)]
pub struct ContentDate {
    raw: String,
    instant: DateTime<FixedOffset>,
}

impl ContentDate {
    /// Parse a date string, returning `None` when no known format matches
    pub fn parse(s: &str) -> Option<Self> {
        let raw = s.trim();
        parse_instant(raw).map(|instant| Self {
            raw: raw.to_string(),
            instant,
        })
    }

    /// The string as written in the front matter
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    pub fn format(&self, fmt: &str) -> String {
        self.instant.format(fmt).to_string()
    }

    /// `YYYY-MM-DD`, used by listings and the sitemap
    pub fn ymd(&self) -> String {
        self.format("%Y-%m-%d")
    }
}

fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().fixed_offset());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset());
        }
    }

    None
}

impl PartialEq for ContentDate {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for ContentDate {}

impl PartialOrd for ContentDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ContentDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl fmt::Display for ContentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ContentDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ContentDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DateVisitor;

        impl<'de> Visitor<'de> for DateVisitor {
            type Value = ContentDate;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a date such as 2024-06-01 or 2024-06-01T10:30:00Z")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                ContentDate::parse(value)
                    .ok_or_else(|| E::custom(format!("unrecognized date: {:?}", value)))
            }
        }

        deserializer.deserialize_str(DateVisitor)
    }
}
