//! STIX type to icon filename table

use crate::error::StixVizError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_ICONS_JSON: &str = include_str!("../data/icons.json");

lazy_static! {
    static ref DEFAULT_ICONS: IconTable = IconTable::from_json(DEFAULT_ICONS_JSON)
        .unwrap_or_else(|_| IconTable::empty(FALLBACK_ICON));
}

/// Used when the bundled table cannot be read
const FALLBACK_ICON: &str = "stix2_custom_object_icon_tiny_round_v1.svg";

/// Mapping from STIX type to icon filename, with one fallback for unknown types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconTable {
    fallback: String,
    #[serde(default)]
    types: BTreeMap<String, String>,
}

impl IconTable {
    /// Table with no entries; every type resolves to the fallback
    pub fn empty(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            types: BTreeMap::new(),
        }
    }

    /// Load a table from JSON: `{"fallback": "...", "types": {"<type>": "<file>"}}`
    pub fn from_json(text: &str) -> Result<Self, StixVizError> {
        let table: IconTable = serde_json::from_str(text).map_err(StixVizError::config)?;
        if table.fallback.is_empty() {
            return Err(StixVizError::Config("icon table fallback must not be empty".to_string()));
        }
        Ok(table)
    }

    /// Add or replace an entry
    pub fn with_entry(mut self, stix_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        self.types.insert(stix_type.into(), file_name.into());
        self
    }

    /// Icon key for a type; unknown types get the fallback
    pub fn icon_key(&self, stix_type: &str) -> &str {
        self.types.get(stix_type).map(String::as_str).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn contains(&self, stix_type: &str) -> bool {
        self.types.contains_key(stix_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for IconTable {
    fn default() -> Self {
        DEFAULT_ICONS.clone()
    }
}

/// Join an icon key onto an optional base directory with a single `/`
pub fn icon_url(icon_dir: Option<&str>, icon_key: &str) -> String {
    match icon_dir {
        None => icon_key.to_string(),
        Some(dir) if dir.is_empty() => icon_key.to_string(),
        Some(dir) => format!("{}/{}", dir.trim_end_matches('/'), icon_key),
    }
}
