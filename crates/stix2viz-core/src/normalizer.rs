//! STIX content normalization
//!
//! Content handed to the visualizer comes as JSON text, a bundle, a bare
//! array of objects, or a single object. Everything is flattened into one
//! ordered sequence of [`StixObject`].

use crate::error::{StixVizError, Warning};
use crate::model::{json_kind, StixObject, BUNDLE_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

/// Raw content as received from the host
#[derive(Debug, Clone)]
pub enum StixInput<'a> {
    /// JSON text
    Text(&'a str),
    /// Already parsed JSON
    Value(Value),
}

impl<'a> From<&'a str> for StixInput<'a> {
    fn from(text: &'a str) -> Self {
        StixInput::Text(text)
    }
}

impl<'a> From<&'a String> for StixInput<'a> {
    fn from(text: &'a String) -> Self {
        StixInput::Text(text.as_str())
    }
}

impl From<Value> for StixInput<'_> {
    fn from(value: Value) -> Self {
        StixInput::Value(value)
    }
}

/// Normalizer output: valid objects in input order plus skipped-object warnings
#[derive(Debug, Clone, Default)]
pub struct NormalizedBundle {
    pub objects: Vec<StixObject>,
    pub warnings: Vec<Warning>,
}

impl NormalizedBundle {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Normalize content into an ordered sequence of STIX objects.
///
/// Fails only when the content is not JSON or not shaped like STIX content
/// at all. Elements missing `type` or `id` are dropped with a warning.
pub fn normalize<'a>(input: impl Into<StixInput<'a>>) -> Result<NormalizedBundle, StixVizError> {
    let value = match input.into() {
        StixInput::Text(text) => parse_text(text)?,
        // A JSON string at the top level is treated as JSON text
        StixInput::Value(Value::String(text)) => parse_text(&text)?,
        StixInput::Value(value) => value,
    };

    let elements = match value {
        Value::Object(mut map) => {
            if map.get("type").and_then(Value::as_str) == Some(BUNDLE_TYPE) {
                match map.remove("objects") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(objects)) => objects,
                    Some(other) => {
                        return Err(StixVizError::MalformedInput(format!(
                            "bundle 'objects' must be an array, got {}",
                            json_kind(&other)
                        )))
                    }
                }
            } else {
                vec![Value::Object(map)]
            }
        }
        Value::Array(elements) => elements,
        other => {
            return Err(StixVizError::MalformedInput(format!(
                "expected a STIX bundle, object or array of objects, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut bundle = NormalizedBundle {
        objects: Vec::with_capacity(elements.len()),
        warnings: Vec::new(),
    };

    for (position, element) in elements.into_iter().enumerate() {
        let id = element.get("id").and_then(Value::as_str).map(str::to_string);

        match StixObject::try_from(element) {
            Ok(object) => bundle.objects.push(object),
            Err(reason) => {
                let warning = Warning::Schema { position, id, reason };
                warn!("{}", warning);
                bundle.warnings.push(warning);
            }
        }
    }

    debug!(
        "Normalized {} STIX objects ({} skipped)",
        bundle.objects.len(),
        bundle.warnings.len()
    );

    Ok(bundle)
}

fn parse_text(text: &str) -> Result<Value, StixVizError> {
    serde_json::from_str(text).map_err(StixVizError::malformed)
}
