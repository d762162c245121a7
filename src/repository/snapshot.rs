//! Snapshots
//!
//! The stored `{items}` envelope and the versioned export file.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ImportLimits;
use crate::domain::{DomainError, DomainResult, Item};
use crate::sanitize::sanitize_with;

/// Format version written into export files
pub const EXPORT_VERSION: u32 = 1;

/// What sits under the storage key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEnvelope {
    pub items: Vec<Item>,
}

/// Exported file body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: u32,
    /// RFC 3339 UTC timestamp
    pub exported_at: String,
    pub items: Vec<Item>,
}

/// A download ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    /// Pretty-printed UTF-8 JSON
    pub contents: String,
}

impl ExportFile {
    pub const MIME_TYPE: &'static str = "application/json";
}

/// `shortcuts-YYYYMMDD-HHMM.json` in the given (usually local) time zone
pub fn export_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("shortcuts-{}.json", at.format("%Y%m%d-%H%M"))
}

/// Build the export file for `items` as of now
pub fn export(items: &[Item]) -> DomainResult<ExportFile> {
    export_at(items, Utc::now(), Local::now())
}

pub(crate) fn export_at(items: &[Item], utc: DateTime<Utc>, local: DateTime<Local>) -> DomainResult<ExportFile> {
    let envelope = ExportEnvelope {
        version: EXPORT_VERSION,
        exported_at: utc.to_rfc3339_opts(SecondsFormat::Millis, true),
        items: items.to_vec(),
    };
    let contents = serde_json::to_string_pretty(&envelope)?;
    Ok(ExportFile {
        file_name: export_file_name(&local),
        contents,
    })
}

/// Decode an uploaded file and sanitize it.
///
/// Only undecodable bytes or invalid JSON are errors; a well-formed file with
/// nothing usable yields an empty list.
pub fn parse_import(raw: &[u8], limits: &ImportLimits) -> DomainResult<Vec<Item>> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| DomainError::InvalidInput(format!("import is not UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| DomainError::InvalidInput(format!("import is not JSON: {}", e)))?;
    Ok(sanitize_with(&json, limits))
}
