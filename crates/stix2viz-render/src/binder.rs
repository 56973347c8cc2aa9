//! Binding graph models to render surfaces

use crate::detail::{object_details, DetailField};
use crate::error::RenderError;
use crate::frame::RenderFrame;
use crate::surface::{RenderSurface, ViewState, MAX_ZOOM, MIN_ZOOM};
use std::collections::BTreeSet;
use std::sync::Arc;
use stix2viz_core::{Connections, GraphModel, GraphNode, IconTable, StixObject, ViewConfig};
use tracing::{debug, info};

/// Shapes graph models into frames and mounts them on surfaces
#[derive(Debug, Clone, Default)]
pub struct RenderBinder {
    icons: IconTable,
}

impl RenderBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_icons(icons: IconTable) -> Self {
        Self { icons }
    }

    /// Mount a model on a surface with a clean layout.
    ///
    /// Whatever the surface showed before is cleared first. An empty model
    /// mounts an empty frame.
    pub fn bind<S: RenderSurface>(
        &self,
        model: Arc<GraphModel>,
        surface: S,
        config: &ViewConfig,
    ) -> Result<LiveView<S>, RenderError> {
        self.bind_with_state(model, surface, config, ViewState::default())
    }

    /// Re-render a live view with a new model on the same surface.
    ///
    /// Pan, zoom and selection are discarded unless `preserveViewState` is
    /// set; a preserved selection is dropped if the new model lacks it.
    pub fn rebind<S: RenderSurface>(
        &self,
        view: LiveView<S>,
        model: Arc<GraphModel>,
        config: &ViewConfig,
    ) -> Result<LiveView<S>, RenderError> {
        let LiveView { surface, state, .. } = view;

        let state = if config.preserve_view_state {
            let mut state = state;
            if state.selected.as_deref().is_some_and(|id| model.object(id).is_none()) {
                state.selected = None;
            }
            state
        } else {
            ViewState::default()
        };

        self.bind_with_state(model, surface, config, state)
    }

    fn bind_with_state<S: RenderSurface>(
        &self,
        model: Arc<GraphModel>,
        mut surface: S,
        config: &ViewConfig,
        state: ViewState,
    ) -> Result<LiveView<S>, RenderError> {
        let frame = RenderFrame::build(&model, config, &self.icons);

        if surface.has_content() {
            debug!("Clearing previous frame on surface {}", surface.surface_id());
            surface.clear()?;
        }
        surface.mount(&frame)?;
        if !state.is_default() {
            surface.apply_view_state(&state)?;
        }

        info!(
            "Bound {} nodes and {} edges to surface {} ({:?} view)",
            frame.nodes.len(),
            frame.edges.len(),
            surface.surface_id(),
            frame.kind
        );

        Ok(LiveView {
            hidden_types: config.hidden_types.iter().cloned().collect(),
            model,
            frame,
            surface,
            state,
        })
    }
}

/// Handle to a model mounted on a surface
#[derive(Debug)]
pub struct LiveView<S: RenderSurface> {
    model: Arc<GraphModel>,
    frame: RenderFrame,
    surface: S,
    state: ViewState,
    hidden_types: BTreeSet<String>,
}

impl<S: RenderSurface> LiveView<S> {
    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Re-center and reset the zoom
    pub fn fit_to_view(&mut self) -> Result<(), RenderError> {
        self.surface.fit()?;
        let selected = self.state.selected.clone();
        self.update_state(|state| {
            *state = ViewState {
                selected,
                ..ViewState::default()
            }
        })
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), RenderError> {
        self.update_state(|state| {
            state.pan_x += dx;
            state.pan_y += dy;
        })
    }

    /// Scale the zoom by a factor, clamped to [`MIN_ZOOM`, `MAX_ZOOM`]
    pub fn zoom(&mut self, factor: f64) -> Result<(), RenderError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(RenderError::Surface(format!("invalid zoom factor {}", factor)));
        }
        self.update_state(|state| {
            state.zoom = (state.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        })
    }

    /// Select an object by id and return it
    pub fn select(&mut self, id: &str) -> Result<&StixObject, RenderError> {
        if self.model.object(id).is_none() {
            return Err(RenderError::UnknownObject(id.to_string()));
        }
        self.update_state(|state| state.selected = Some(id.to_string()))?;
        self.model
            .object(id)
            .ok_or_else(|| RenderError::UnknownObject(id.to_string()))
    }

    /// Node click: select and return the full STIX object.
    ///
    /// Unknown ids return `None` and leave the selection as it was.
    pub fn click(&mut self, id: &str) -> Option<&StixObject> {
        match self.select(id) {
            Ok(object) => Some(object),
            Err(err) => {
                debug!("Ignoring click on {}: {}", id, err);
                None
            }
        }
    }

    pub fn clear_selection(&mut self) -> Result<(), RenderError> {
        self.update_state(|state| state.selected = None)
    }

    pub fn selected(&self) -> Option<&StixObject> {
        self.state.selected.as_deref().and_then(|id| self.model.object(id))
    }

    /// Hide or show every node of a type. Returns true if the type is now hidden.
    pub fn toggle_stix_type(&mut self, stix_type: &str) -> Result<bool, RenderError> {
        let hidden = if self.hidden_types.remove(stix_type) {
            false
        } else {
            self.hidden_types.insert(stix_type.to_string());
            true
        };

        self.frame.set_hidden_types(&self.hidden_types);
        self.surface.set_hidden(&self.frame.hidden_node_ids())?;
        debug!("Type {} is now {}", stix_type, if hidden { "hidden" } else { "shown" });
        Ok(hidden)
    }

    pub fn hidden_types(&self) -> &BTreeSet<String> {
        &self.hidden_types
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.frame.node(id).is_some_and(|node| !node.hidden)
    }

    /// Visible nodes whose label contains the keyword
    pub fn search(&self, keyword: &str) -> Vec<&GraphNode> {
        self.model
            .search(keyword)
            .into_iter()
            .filter(|node| self.is_visible(&node.id))
            .collect()
    }

    /// Display fields of an object, or `None` for unknown ids
    pub fn details(&self, id: &str) -> Option<Vec<DetailField>> {
        self.model.object(id).map(|object| object_details(&self.model, object))
    }

    pub fn connections(&self, id: &str) -> Connections<'_> {
        self.model.connections(id)
    }

    /// Tear the view down and hand the surface back
    pub fn destroy(mut self) -> S {
        self.surface.teardown();
        info!("Destroyed view on surface {}", self.surface.surface_id());
        self.surface
    }

    /// Hand the surface back without tearing it down, for hosts that keep
    /// showing what was mounted
    pub fn detach(self) -> S {
        self.surface
    }

    fn update_state(&mut self, change: impl FnOnce(&mut ViewState)) -> Result<(), RenderError> {
        let mut next = self.state.clone();
        change(&mut next);
        self.surface.apply_view_state(&next)?;
        self.state = next;
        Ok(())
    }
}
