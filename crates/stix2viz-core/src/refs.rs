//! Embedded reference properties that become synthetic edges

use crate::error::StixVizError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

const DEFAULT_REFS_JSON: &str = include_str!("../data/embedded_refs.json");

lazy_static! {
    static ref DEFAULT_REFS: EmbeddedRefTable =
        EmbeddedRefTable::from_json(DEFAULT_REFS_JSON).unwrap_or_default();
}

/// One `*_ref` / `*_refs` property and the edge it produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedRef {
    pub property: String,
    /// Relationship type given to the synthetic edge
    pub relationship: String,
    /// referrer -> referent when true, referent -> referrer otherwise
    pub forward: bool,
}

impl EmbeddedRef {
    /// `_ref` properties hold one id, `_refs` properties a list
    pub fn is_single(&self) -> bool {
        self.property.ends_with("_ref")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddedRefTable {
    entries: Vec<EmbeddedRef>,
}

impl EmbeddedRefTable {
    pub fn from_json(text: &str) -> Result<Self, StixVizError> {
        serde_json::from_str(text).map_err(StixVizError::config)
    }

    /// Table that generates no synthetic edges
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an entry, replacing any previous one for the same property
    pub fn with_entry(mut self, property: &str, relationship: &str, forward: bool) -> Self {
        self.entries.retain(|e| e.property != property);
        self.entries.push(EmbeddedRef {
            property: property.to_string(),
            relationship: relationship.to_string(),
            forward,
        });
        self
    }

    pub fn lookup(&self, property: &str) -> Option<&EmbeddedRef> {
        self.entries.iter().find(|e| e.property == property)
    }

    pub fn entries(&self) -> &[EmbeddedRef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The bundled table of STIX 2.1 embedded reference properties
pub fn default_embedded_refs() -> EmbeddedRefTable {
    DEFAULT_REFS.clone()
}
