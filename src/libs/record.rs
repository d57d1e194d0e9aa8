//! Stored data units: tool records, history entries and preferences.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Application-wide preferences, keyed by name.
pub type Preferences = BTreeMap<String, serde_json::Value>;

/// One persisted unit of tool data. `(tool_id, key)` is unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub tool_id: String,
    pub key: String,
    #[serde(with = "payload_base64")]
    pub payload: Vec<u8>,
    #[serde(deserialize_with = "millis_timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// A record stamped with the current time.
    pub fn new(tool_id: impl Into<String>, key: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self::at(tool_id, key, payload, Utc::now())
    }

    /// A record with an explicit timestamp, truncated to the stored millisecond precision.
    pub fn at(tool_id: impl Into<String>, key: impl Into<String>, payload: impl Into<Vec<u8>>, updated_at: DateTime<Utc>) -> Self {
        Self {
            tool_id: tool_id.into(),
            key: key.into(),
            payload: payload.into(),
            updated_at: updated_at.trunc_subsecs(3),
        }
    }

    /// JSON payload convenience for tools that store structured state.
    pub fn json(tool_id: impl Into<String>, key: impl Into<String>, value: &serde_json::Value) -> Self {
        Self::new(tool_id, key, value.to_string().into_bytes())
    }

    pub fn payload_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.payload).ok()
    }
}

/// One entry in a tool's history, such as a finished calculation or conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub tool_id: String,
    pub entry: serde_json::Value,
    #[serde(deserialize_with = "millis_timestamp::deserialize")]
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(tool_id: impl Into<String>, entry: serde_json::Value) -> Self {
        Self {
            tool_id: tool_id.into(),
            entry,
            recorded_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// Converts stored milliseconds back into a timestamp.
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Record payloads are arbitrary bytes; inside JSON bundles they travel as base64.
mod payload_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// Timestamps are stored with millisecond precision; finer input is truncated on the way in.
mod millis_timestamp {
    use chrono::{DateTime, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer).map(|timestamp| timestamp.trunc_subsecs(3))
    }
}
