//! Human-readable fields of a selected STIX object

use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use stix2viz_core::{GraphModel, StixObject};

/// One displayed property of an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailField {
    /// Raw property name
    pub property: String,
    /// Prettified title, e.g. `Created by:`
    pub title: String,
    pub value: String,
    /// Referenced ids that resolve to objects of the graph
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

/// `created_by_ref` -> `Created by:`, `kill_chain_phases` -> `Kill chain phases:`
pub fn prettify_key(key: &str) -> String {
    let stem = key
        .strip_suffix("_refs")
        .or_else(|| key.strip_suffix("_ref"))
        .filter(|s| !s.is_empty())
        .unwrap_or(key);

    let spaced = stem.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => format!("{}{}:", first.to_uppercase(), chars.as_str()),
        None => ":".to_string(),
    }
}

/// Detail fields of an object, in property order
pub fn object_details(model: &GraphModel, object: &StixObject) -> Vec<DetailField> {
    object
        .properties()
        .iter()
        .map(|(property, value)| {
            let mut references = Vec::new();
            let value = if property.ends_with("_ref") || property.ends_with("_refs") {
                format_references(model, value, &mut references)
            } else {
                format_value(property, value)
            };

            DetailField {
                property: property.clone(),
                title: prettify_key(property),
                value,
                references,
            }
        })
        .collect()
}

fn format_references(model: &GraphModel, value: &Value, resolved: &mut Vec<String>) -> String {
    let ids: Vec<&str> = match value {
        Value::String(id) => vec![id.as_str()],
        Value::Array(ids) => ids.iter().filter_map(Value::as_str).collect(),
        other => return other.to_string(),
    };

    ids.into_iter()
        .map(|id| match model.node(id) {
            Some(node) => {
                resolved.push(id.to_string());
                node.label.clone()
            }
            None => {
                if model.object(id).is_some() {
                    resolved.push(id.to_string());
                }
                id.to_string()
            }
        })
        .join(", ")
}

fn format_value(property: &str, value: &Value) -> String {
    match (property, value) {
        ("kill_chain_phases", Value::Array(phases)) => phases
            .iter()
            .map(|phase| match phase.get("phase_name").and_then(Value::as_str) {
                Some(name) => name.to_string(),
                None => phase.to_string(),
            })
            .join(", "),
        ("external_references" | "granular_markings", other) => other.to_string(),
        (_, Value::String(s)) => s.clone(),
        (_, Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .join(", "),
        (_, other) => other.to_string(),
    }
}
