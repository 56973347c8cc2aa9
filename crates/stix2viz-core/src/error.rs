//! Error and warning types for bundle normalization and graph building

use serde::Serialize;
use std::fmt;

/// Fatal errors: abort a single display call, never leave partial state
#[derive(Debug, thiserror::Error)]
pub enum StixVizError {
    #[error("Malformed STIX input: {0}")]
    MalformedInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StixVizError {
    pub fn malformed(err: impl fmt::Display) -> Self {
        StixVizError::MalformedInput(err.to_string())
    }

    pub fn config(err: impl fmt::Display) -> Self {
        StixVizError::Config(err.to_string())
    }
}

/// Non-fatal data quality issues, recovered locally with degraded output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An element lacked what a STIX object or relationship needs and was skipped
    Schema {
        /// Position of the element in the input sequence
        position: usize,
        /// STIX id, when the element had one
        id: Option<String>,
        reason: String,
    },

    /// An edge endpoint does not resolve to a node of the graph
    DanglingReference {
        source: String,
        target: String,
        relationship_type: String,
        /// The endpoint id that could not be resolved
        missing: String,
        /// Whether the edge was dropped (true) or kept as a dangling edge
        dropped: bool,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Schema { position, id, reason } => match id {
                Some(id) => write!(f, "skipped object #{} ({}): {}", position, id, reason),
                None => write!(f, "skipped object #{}: {}", position, reason),
            },
            Warning::DanglingReference { source, target, relationship_type, missing, dropped } => write!(
                f,
                "{} {} {}: unknown object {}{}",
                source,
                relationship_type,
                target,
                missing,
                if *dropped { " (edge dropped)" } else { "" }
            ),
        }
    }
}
