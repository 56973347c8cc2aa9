//! Render surfaces

use crate::error::RenderError;
use crate::frame::RenderFrame;
use serde::Serialize;

/// Smallest and largest zoom scale a view accepts
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Pan/zoom/selection of a live view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
    /// STIX id of the selected node or relationship
    pub selected: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
            selected: None,
        }
    }
}

impl ViewState {
    pub fn is_default(&self) -> bool {
        *self == ViewState::default()
    }
}

/// A display target a render frame can be mounted on.
///
/// Implementations draw (or record) frames; they never compute layouts.
pub trait RenderSurface {
    /// Element id of the surface in the host output
    fn surface_id(&self) -> &str;

    /// Whether a frame is currently mounted
    fn has_content(&self) -> bool;

    /// Draw a frame with a fresh layout. The binder clears any previous frame first
    fn mount(&mut self, frame: &RenderFrame) -> Result<(), RenderError>;

    /// Remove the mounted frame and any view state
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Re-center and scale so every visible node fits
    fn fit(&mut self) -> Result<(), RenderError>;

    fn apply_view_state(&mut self, state: &ViewState) -> Result<(), RenderError>;

    /// Replace the set of hidden node ids
    fn set_hidden(&mut self, node_ids: &[String]) -> Result<(), RenderError>;

    /// Release everything the surface holds; it is not used afterwards
    fn teardown(&mut self);
}

/// Surface that only records what it was asked to do.
///
/// Backs the CLI's interactive mode and tests.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    id: String,
    frame: Option<RenderFrame>,
    state: ViewState,
    hidden: Vec<String>,
    mounts: usize,
    fits: usize,
    torn_down: bool,
}

impl HeadlessSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn frame(&self) -> Option<&RenderFrame> {
        self.frame.as_ref()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    /// Number of frames mounted over the surface's lifetime
    pub fn mount_count(&self) -> usize {
        self.mounts
    }

    pub fn fit_count(&self) -> usize {
        self.fits
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn ensure_live(&self) -> Result<(), RenderError> {
        if self.torn_down {
            return Err(RenderError::Surface(format!("surface {} was torn down", self.id)));
        }
        Ok(())
    }
}

impl RenderSurface for HeadlessSurface {
    fn surface_id(&self) -> &str {
        &self.id
    }

    fn has_content(&self) -> bool {
        self.frame.is_some()
    }

    fn mount(&mut self, frame: &RenderFrame) -> Result<(), RenderError> {
        self.ensure_live()?;
        self.hidden = frame.hidden_node_ids();
        self.frame = Some(frame.clone());
        self.mounts += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.ensure_live()?;
        self.frame = None;
        self.state = ViewState::default();
        self.hidden.clear();
        Ok(())
    }

    fn fit(&mut self) -> Result<(), RenderError> {
        self.ensure_live()?;
        self.fits += 1;
        Ok(())
    }

    fn apply_view_state(&mut self, state: &ViewState) -> Result<(), RenderError> {
        self.ensure_live()?;
        self.state = state.clone();
        Ok(())
    }

    fn set_hidden(&mut self, node_ids: &[String]) -> Result<(), RenderError> {
        self.ensure_live()?;
        self.hidden = node_ids.to_vec();
        Ok(())
    }

    fn teardown(&mut self) {
        self.frame = None;
        self.hidden.clear();
        self.torn_down = true;
    }
}
