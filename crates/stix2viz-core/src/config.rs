//! View configuration
//!
//! Recognized options are typed fields; anything else is kept in
//! [`ViewConfig::extra`] and handed to the renderer untouched.

use crate::error::StixVizError;
use crate::model::json_kind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Node count above which `view: "auto"` switches to the list view
pub const DEFAULT_LIST_THRESHOLD: usize = 200;

/// Surface size used when neither the caller nor the config gives one
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Layout family delegated to the rendering library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Force,
    Hierarchical,
}

/// Graph or list presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Graph,
    List,
    Auto,
}

/// Per-type display overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDisplay {
    /// Property used as the node label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_property: Option<String>,
    /// Icon filename replacing the table entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_icon: Option<String>,
}

impl TypeDisplay {
    pub fn is_empty(&self) -> bool {
        self.display_property.is_none() && self.display_icon.is_none()
    }
}

/// Visualization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    /// Surface width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Surface height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Base path for type icons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_dir: Option<String>,

    #[serde(default)]
    pub layout: LayoutKind,

    /// Let the renderer run its physics simulation
    #[serde(default = "default_true")]
    pub physics: bool,

    /// Drop edges whose endpoints are not in the bundle instead of stubbing them
    #[serde(default)]
    pub drop_dangling_edges: bool,

    /// Generate edges from embedded `*_ref(s)` properties
    #[serde(default = "default_true")]
    pub embedded_refs: bool,

    /// Keep pan/zoom/selection when re-rendering on the same surface
    #[serde(default)]
    pub preserve_view_state: bool,

    #[serde(default)]
    pub view: ViewMode,

    #[serde(default = "default_list_threshold")]
    pub list_threshold: usize,

    /// STIX types hidden when the view is first shown
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_types: Vec<String>,

    /// Labels by STIX id, taking precedence over everything else
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, TypeDisplay>,

    /// Unrecognized options, passed through to the renderer
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_true() -> bool {
    true
}

fn default_list_threshold() -> usize {
    DEFAULT_LIST_THRESHOLD
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            icon_dir: None,
            layout: LayoutKind::default(),
            physics: true,
            drop_dangling_edges: false,
            embedded_refs: true,
            preserve_view_state: false,
            view: ViewMode::default(),
            list_threshold: DEFAULT_LIST_THRESHOLD,
            hidden_types: Vec::new(),
            user_labels: BTreeMap::new(),
            types: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, StixVizError> {
        let value: Value = serde_json::from_str(text).map_err(StixVizError::config)?;
        Self::from_value(value)
    }

    /// Build configuration from a parsed JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, StixVizError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(value).map_err(StixVizError::config),
            other => Err(StixVizError::Config(format!(
                "configuration must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Set the icon directory unless the caller already chose one
    pub fn merge_icon_dir(&mut self, icon_dir: &str) {
        if self.icon_dir.is_none() {
            self.icon_dir = Some(icon_dir.to_string());
        }
    }

    /// Display overrides for a STIX type.
    ///
    /// Looks in `types` first, then at a top-level entry keyed by the type
    /// name (`{"malware": {"display_icon": ...}}`).
    pub fn type_display(&self, stix_type: &str) -> Option<TypeDisplay> {
        if let Some(display) = self.types.get(stix_type) {
            return Some(display.clone());
        }

        self.extra
            .get(stix_type)
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value::<TypeDisplay>(v.clone()).ok())
            .filter(|display| !display.is_empty())
    }

    pub fn effective_width(&self) -> u32 {
        self.width.unwrap_or(DEFAULT_WIDTH)
    }

    pub fn effective_height(&self) -> u32 {
        self.height.unwrap_or(DEFAULT_HEIGHT)
    }

    pub fn user_label(&self, id: &str) -> Option<&str> {
        self.user_labels.get(id).map(String::as_str).filter(|l| !l.is_empty())
    }

    pub fn is_hidden_type(&self, stix_type: &str) -> bool {
        self.hidden_types.iter().any(|t| t == stix_type)
    }
}
