//! Key registry
//!
//! The active-key table and per-key color records, keyed by key identifier.
//! Mirrors the two JSON data files the keyboard is loaded from.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Physical key identifier (W3C `KeyboardEvent.code` naming, e.g. `KeyA`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for KeyCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Stored color for a key
///
/// Unknown fields from the data file are kept so the table round-trips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRecord {
    /// Hex color string (not validated)
    pub color: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ColorRecord {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Registry entry for one key
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEntry {
    /// Only active keys take part in selection, coloring and shadowing
    pub active: bool,
    /// Committed color, if the data file has one
    pub color: Option<ColorRecord>,
}

/// Active-key list plus color table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyRegistry {
    entries: BTreeMap<KeyCode, KeyEntry>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the decoded key-list and color tables
    ///
    /// Keys that only appear in the color table are registered as inactive.
    pub fn from_tables(
        codes: BTreeMap<KeyCode, bool>,
        mut colors: BTreeMap<KeyCode, ColorRecord>,
    ) -> Self {
        let mut entries = BTreeMap::new();
        for (code, active) in codes {
            let color = colors.remove(&code);
            entries.insert(code, KeyEntry { active, color });
        }
        for (code, record) in colors {
            entries.insert(code, KeyEntry { active: false, color: Some(record) });
        }
        Self { entries }
    }

    /// Decode the key-list JSON (`{"KeyA": true, ...}`) and color JSON
    /// (`{"KeyA": {"color": "#00ff00"}, ...}`)
    pub fn from_json(codes_json: &str, colors_json: &str) -> Result<Self, String> {
        let codes: BTreeMap<KeyCode, bool> = serde_json::from_str(codes_json)
            .map_err(|e| format!("Failed to parse key list: {}", e))?;
        let colors: BTreeMap<KeyCode, ColorRecord> = serde_json::from_str(colors_json)
            .map_err(|e| format!("Failed to parse key colors: {}", e))?;
        Ok(Self::from_tables(codes, colors))
    }

    /// Present and flagged active
    pub fn is_active(&self, code: &str) -> bool {
        self.entries.get(code).map(|entry| entry.active).unwrap_or(false)
    }

    /// Active key identifiers in sorted order
    pub fn active_keys(&self) -> impl Iterator<Item = &KeyCode> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.active)
            .map(|(code, _)| code)
    }

    pub fn active_count(&self) -> usize {
        self.active_keys().count()
    }

    /// Committed color for a key
    pub fn color(&self, code: &str) -> Option<&str> {
        self.entries
            .get(code)
            .and_then(|entry| entry.color.as_ref())
            .map(|record| record.color.as_str())
    }

    /// Update the committed color, creating the record if needed
    ///
    /// Returns false for unknown keys.
    pub fn set_color(&mut self, code: &str, color: &str) -> bool {
        let Some(entry) = self.entries.get_mut(code) else {
            return false;
        };
        match entry.color.as_mut() {
            Some(record) => record.color = color.to_string(),
            None => entry.color = Some(ColorRecord::new(color)),
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
