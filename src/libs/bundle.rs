//! Export bundle: the self-describing serialized form of a whole store.
//!
//! A bundle is a JSON object tagged with [`FORMAT_VERSION`]:
//!
//! ```json
//! {
//!   "formatVersion": "1.0",
//!   "exportedAt": "2025-01-15T14:30:22.120Z",
//!   "records": [{ "toolId": "calc", "key": "last", "payload": "NDI=", "updatedAt": "..." }],
//!   "preferences": { "theme": "dark" },
//!   "history": [{ "toolId": "calc", "entry": { "expr": "6*7" }, "recordedAt": "..." }]
//! }
//! ```
//!
//! Payload bytes travel as base64. `preferences` and `history` are optional; when a
//! bundle omits one, importing it leaves the stored tree alone.
//!
//! On disk a bundle is pretty JSON, optionally gzip-compressed. Decoding sniffs the
//! gzip magic bytes, so either form can be imported without telling which it is.

use crate::libs::config::ExportConfig;
use crate::libs::error::DataError;
use crate::libs::record::{HistoryEntry, Preferences, Record};
use crate::libs::store::StoreContents;
use chrono::{DateTime, Local, SubsecRound, Utc};
use clap::ValueEnum;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Version tag written into every bundle. Imports require an exact match.
pub const FORMAT_VERSION: &str = "1.0";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Which auxiliary trees go into an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_history: bool,
    pub include_preferences: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_history: true,
            include_preferences: true,
        }
    }
}

impl ExportOptions {
    /// Records only.
    pub fn records_only() -> Self {
        Self {
            include_history: false,
            include_preferences: false,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            include_history: config.include_history,
            include_preferences: config.include_preferences,
        }
    }
}

/// How an imported bundle is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ImportMode {
    /// The bundle becomes the entire record set.
    #[default]
    Replace,
    /// Reserved. Always rejected.
    Merge,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Replace => write!(f, "replace"),
            ImportMode::Merge => write!(f, "merge"),
        }
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(ImportMode::Replace),
            "merge" => Ok(ImportMode::Merge),
            other => Err(format!("unknown import mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub format_version: String,
    pub exported_at: DateTime<Utc>,
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

impl ExportBundle {
    /// Wraps store contents in a bundle stamped with the current version and time.
    pub fn from_contents(contents: StoreContents) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            exported_at: Utc::now().trunc_subsecs(3),
            records: contents.records,
            preferences: contents.preferences,
            history: contents.history,
        }
    }

    pub fn into_contents(self) -> StoreContents {
        StoreContents {
            records: self.records,
            preferences: self.preferences,
            history: self.history,
        }
    }

    /// Number of distinct tools among the bundled records.
    pub fn tool_count(&self) -> usize {
        let mut tools: Vec<&str> = self.records.iter().map(|record| record.tool_id.as_str()).collect();
        tools.sort_unstable();
        tools.dedup();
        tools.len()
    }

    pub fn check_version(&self) -> Result<(), DataError> {
        if self.format_version == FORMAT_VERSION {
            Ok(())
        } else {
            Err(incompatible(Some(self.format_version.clone())))
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, DataError> {
        serde_json::to_string_pretty(self).map_err(|e| DataError::ExportFailed(e.to_string()))
    }

    /// Parses a JSON bundle. The version tag is checked before the rest of the
    /// structure, so a bundle from another format version is reported as such even
    /// when its layout differs.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DataError> {
        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| DataError::MalformedBundle(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| DataError::MalformedBundle("expected a JSON object".to_string()))?;

        match object.get("formatVersion") {
            None | Some(serde_json::Value::Null) => return Err(incompatible(None)),
            Some(serde_json::Value::String(version)) if version == FORMAT_VERSION => {}
            Some(serde_json::Value::String(version)) => return Err(incompatible(Some(version.clone()))),
            Some(other) => return Err(incompatible(Some(other.to_string()))),
        }

        serde_json::from_value(value).map_err(|e| DataError::MalformedBundle(e.to_string()))
    }

    /// Serialized file contents, gzip-compressed when asked.
    pub fn encode(&self, compress: bool) -> Result<Vec<u8>, DataError> {
        let json = self.to_json_pretty()?;
        if !compress {
            return Ok(json.into_bytes());
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(json.as_bytes())
            .map_err(|e| DataError::ExportFailed(e.to_string()))?;
        encoder.finish().map_err(|e| DataError::ExportFailed(e.to_string()))
    }

    /// Decodes file contents produced by [`encode`](Self::encode), compressed or not.
    pub fn decode(bytes: &[u8]) -> Result<Self, DataError> {
        if bytes.starts_with(&GZIP_MAGIC) {
            let mut json = Vec::new();
            GzDecoder::new(bytes)
                .read_to_end(&mut json)
                .map_err(|e| DataError::MalformedBundle(format!("corrupt gzip stream: {}", e)))?;
            return Self::from_json_slice(&json);
        }

        Self::from_json_slice(bytes)
    }

    /// `toolshed_export_YYYYMMDD_HHMMSS.json`, with `.gz` appended for compressed files.
    pub fn default_file_name(compress: bool) -> PathBuf {
        let stem = format!("toolshed_export_{}", Local::now().format("%Y%m%d_%H%M%S"));
        if compress {
            PathBuf::from(format!("{}.json.gz", stem))
        } else {
            PathBuf::from(format!("{}.json", stem))
        }
    }
}

fn incompatible(found: Option<String>) -> DataError {
    DataError::IncompatibleFormat {
        expected: FORMAT_VERSION.to_string(),
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_mode_parses_case_insensitively() {
        assert_eq!("Replace".parse::<ImportMode>(), Ok(ImportMode::Replace));
        assert_eq!("merge".parse::<ImportMode>(), Ok(ImportMode::Merge));
        assert!("append".parse::<ImportMode>().is_err());
        assert_eq!(ImportMode::Merge.to_string(), "merge");
    }

    #[test]
    fn version_is_checked_before_structure() {
        let err = ExportBundle::from_json_slice(br#"{"formatVersion": "2.0", "items": 3}"#).unwrap_err();
        assert_eq!(
            err,
            DataError::IncompatibleFormat {
                expected: FORMAT_VERSION.to_string(),
                found: Some("2.0".to_string()),
            }
        );
    }

    #[test]
    fn non_object_json_is_malformed() {
        assert!(matches!(ExportBundle::from_json_slice(b"[1, 2, 3]"), Err(DataError::MalformedBundle(_))));
        assert!(matches!(ExportBundle::from_json_slice(b"not json"), Err(DataError::MalformedBundle(_))));
    }

    #[test]
    fn absent_auxiliary_trees_are_not_serialized() {
        let bundle = ExportBundle::from_contents(StoreContents::default());
        let json = bundle.to_json_pretty().unwrap();
        assert!(json.contains("\"formatVersion\": \"1.0\""));
        assert!(!json.contains("preferences"));
        assert!(!json.contains("history"));
    }

    #[test]
    fn default_file_name_has_expected_shape() {
        let name = ExportBundle::default_file_name(true).display().to_string();
        assert!(name.starts_with("toolshed_export_"));
        assert!(name.ends_with(".json.gz"));
        assert_eq!(name.len(), "toolshed_export_20250115_143022.json.gz".len());
    }
}
