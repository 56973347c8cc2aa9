//! Render binder errors

/// Errors raised while binding or driving a live view
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render surface error: {0}")]
    Surface(String),

    #[error("Unknown STIX object: {0}")]
    UnknownObject(String),
}

impl RenderError {
    pub fn surface(err: impl std::fmt::Display) -> Self {
        RenderError::Surface(err.to_string())
    }
}
