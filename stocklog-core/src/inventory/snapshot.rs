//! Snapshot documents for export and import.
//!
//! A snapshot is a complete copy of items, movements and settings at a point
//! in time, written as a JSON document with an `exportDate` stamp. Import
//! validates the document shape before any state is touched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::InventoryError;
use crate::models::{AppSettings, Item, Movement};

/// A complete export of the inventory state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub movements: Vec<Movement>,
    pub settings: AppSettings,
    /// When the snapshot was exported. Ignored on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Builds a snapshot stamped with the current time.
    pub fn capture(items: Vec<Item>, movements: Vec<Movement>, settings: AppSettings) -> Self {
        Self {
            items,
            movements,
            settings,
            export_date: Some(Utc::now()),
        }
    }

    /// Parses and validates an import document.
    ///
    /// The three collections must be present with the right container shape
    /// (`items` and `movements` as arrays, `settings` as an object); any
    /// violation is reported as `InvalidImportFormat` before a single record
    /// is deserialized, so a rejected import can never have replaced state.
    pub fn from_json(text: &str) -> Result<Self, InventoryError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| InventoryError::InvalidImportFormat(format!("not valid JSON: {}", e)))?;

        let object = value.as_object().ok_or_else(|| {
            InventoryError::InvalidImportFormat("top level must be an object".to_string())
        })?;

        for (field, expect_array) in [("items", true), ("movements", true), ("settings", false)] {
            match object.get(field) {
                None => {
                    return Err(InventoryError::InvalidImportFormat(format!(
                        "missing required field '{}'",
                        field
                    )))
                }
                Some(v) if expect_array && !v.is_array() => {
                    return Err(InventoryError::InvalidImportFormat(format!(
                        "'{}' must be an array",
                        field
                    )))
                }
                Some(v) if !expect_array && !v.is_object() => {
                    return Err(InventoryError::InvalidImportFormat(format!(
                        "'{}' must be an object",
                        field
                    )))
                }
                Some(_) => {}
            }
        }

        serde_json::from_value(value).map_err(|e| InventoryError::InvalidImportFormat(e.to_string()))
    }

    /// Serializes the snapshot as the formatted export document.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Filename for an export: `<name>_<timestamp>.json`.
pub fn export_filename(name: &str, when: DateTime<Utc>) -> String {
    format!("{}_{}.json", name, when.format("%Y-%m-%d_%H-%M-%S"))
}
