//! Surface backed by an embeddable display unit

use serde_json::Value;
use stix2viz_render::{RenderError, RenderFrame, RenderSurface, ViewState};

/// Collects the mounted frame as JSON for the client module to draw
#[derive(Debug, Clone)]
pub struct EmbedSurface {
    element_id: String,
    frame: Option<Value>,
    state: ViewState,
    hidden: Vec<String>,
    fit_requested: bool,
}

impl EmbedSurface {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            frame: None,
            state: ViewState::default(),
            hidden: Vec::new(),
            fit_requested: false,
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// Mounted frame as JSON
    pub fn frame(&self) -> Option<&Value> {
        self.frame.as_ref()
    }

    /// Initial view state handed to the client
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    pub fn fit_requested(&self) -> bool {
        self.fit_requested
    }
}

impl RenderSurface for EmbedSurface {
    fn surface_id(&self) -> &str {
        &self.element_id
    }

    fn has_content(&self) -> bool {
        self.frame.is_some()
    }

    fn mount(&mut self, frame: &RenderFrame) -> Result<(), RenderError> {
        let value = serde_json::to_value(frame).map_err(RenderError::surface)?;
        self.hidden = frame.hidden_node_ids();
        self.frame = Some(value);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.frame = None;
        self.state = ViewState::default();
        self.hidden.clear();
        self.fit_requested = false;
        Ok(())
    }

    fn fit(&mut self) -> Result<(), RenderError> {
        self.fit_requested = true;
        Ok(())
    }

    fn apply_view_state(&mut self, state: &ViewState) -> Result<(), RenderError> {
        self.state = state.clone();
        Ok(())
    }

    fn set_hidden(&mut self, node_ids: &[String]) -> Result<(), RenderError> {
        self.hidden = node_ids.to_vec();
        Ok(())
    }

    fn teardown(&mut self) {
        self.frame = None;
        self.hidden.clear();
    }
}
