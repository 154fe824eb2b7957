//! Record to Bitable field conversion
//!
//! Bitable stores date columns as epoch milliseconds and link columns as
//! `{"link": ..}` objects; everything else is written as text.

use chrono::{NaiveDateTime, Utc};
use formsync_config::SinkConfig;
use serde_json::{Value, json};
use tracing::warn;

use crate::record::Record;
use crate::traits::Fields;

/// Layout of source timestamps, e.g. `2024-11-24 20:15:35`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source timestamps are wall-clock time in UTC+8
const SOURCE_UTC_OFFSET_SECS: i32 = 8 * 60 * 60;

/// Which columns need a non-text representation
#[derive(Debug, Clone)]
pub struct FieldTransform {
    timestamp_fields: Vec<String>,
    link_field: String,
}

impl FieldTransform {
    pub fn new(timestamp_fields: Vec<String>, link_field: impl Into<String>) -> Self {
        Self {
            timestamp_fields,
            link_field: link_field.into(),
        }
    }

    pub fn from_config(config: &SinkConfig) -> Self {
        Self::new(config.timestamp_fields.clone(), config.link_field.clone())
    }

    /// Convert a record to its wire representation
    ///
    /// Field names are trimmed. Unparseable timestamps are replaced with the
    /// current time and logged; they never reject the record.
    pub fn apply(&self, record: &Record) -> Fields {
        record
            .iter()
            .map(|(name, value)| {
                let name = name.trim();
                (name.to_string(), self.convert(name, value))
            })
            .collect()
    }

    fn convert(&self, name: &str, value: &str) -> Value {
        if self.timestamp_fields.iter().any(|f| f == name) {
            let millis = parse_local_timestamp(value).unwrap_or_else(|e| {
                warn!(field = name, time = value, error = %e, "failed to parse time, using now");
                Utc::now().timestamp_millis()
            });
            Value::from(millis)
        } else if name == self.link_field {
            json!({ "link": value })
        } else {
            Value::String(value.to_string())
        }
    }
}

/// Parse a UTC+8 wall-clock timestamp into epoch milliseconds
pub fn parse_local_timestamp(value: &str) -> Result<i64, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)?;
    let utc_millis = naive.and_utc().timestamp_millis();
    Ok(utc_millis - i64::from(SOURCE_UTC_OFFSET_SECS) * 1_000)
}
