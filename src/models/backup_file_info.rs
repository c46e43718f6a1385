//! Backup file descriptor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored backup archive as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFileInfo {
    pub key: String,
    pub size: i64,
    #[serde(with = "date_time")]
    pub modified: DateTime<Utc>,
}

/// `YYYY-MM-DD HH:MM:SS.mmmZ` timestamps, always UTC.
///
/// RFC 3339 input is accepted as well.
pub mod date_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.3fZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(LAYOUT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match NaiveDateTime::parse_from_str(raw, LAYOUT) {
            Ok(naive) => Ok(naive.and_utc()),
            Err(e) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| e),
        }
    }
}
