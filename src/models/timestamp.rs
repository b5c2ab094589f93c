//! Timestamps are carried as epoch milliseconds in memory, stored as BSON
//! dates and rendered as ISO-8601 strings in API responses.
//!
//! Use on stored models with `#[serde(with = "crate::models::timestamp")]`.

use chrono::{SecondsFormat, TimeZone, Utc};
use mongodb::bson::DateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S: Serializer>(millis: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    DateTime::from_millis(*millis).serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(DateTime::deserialize(deserializer)?.timestamp_millis())
}

/// BSON date for use in `doc!` update documents
pub fn to_bson(millis: i64) -> DateTime {
    DateTime::from_millis(millis)
}

/// `2024-05-01T12:00:00.000Z`
pub fn to_iso(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
