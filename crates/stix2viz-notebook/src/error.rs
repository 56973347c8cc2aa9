//! Display session errors

use stix2viz_core::StixVizError;
use stix2viz_render::RenderError;

/// A failed `display()` call. The session counter is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error(transparent)]
    Input(#[from] StixVizError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid asset manifest: {0}")]
    Manifest(String),
}

impl DisplayError {
    /// True for invalid configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, DisplayError::Input(StixVizError::Config(_)))
    }

    /// True for content that is not JSON or not shaped like STIX
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, DisplayError::Input(StixVizError::MalformedInput(_)))
    }
}
