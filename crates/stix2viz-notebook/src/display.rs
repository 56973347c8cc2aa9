//! Display sessions: one `display()` call turns STIX content into an
//! embeddable unit (surface markup plus loader script)

use crate::error::DisplayError;
use crate::html::{escape_html, script_json, Element};
use crate::manifest::AssetManifest;
use crate::surface::EmbedSurface;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use stix2viz_core::{normalize, GraphBuilder, StixInput, ViewConfig, Warning};
use stix2viz_render::{RenderBinder, RenderFrame, ViewState};
use tracing::{debug, info};

/// Prefix of surface element ids
pub const ELEMENT_ID_PREFIX: &str = "stix2viz";

/// Session id generator, owned by the host integration layer.
///
/// Ids start at 0 and strictly increase; concurrent callers never share one.
#[derive(Debug, Default)]
pub struct SessionIds {
    next: AtomicU64,
}

impl SessionIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocate the current value and advance the counter
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Id the next call would get
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

/// Everything the client module receives
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    session_id: u64,
    element_id: &'a str,
    config: Value,
    frame: &'a Value,
    state: &'a ViewState,
    hidden: &'a [String],
    warnings: &'a [Warning],
}

/// Turns STIX content into display units
#[derive(Debug, Clone)]
pub struct NotebookDisplay {
    sessions: Arc<SessionIds>,
    builder: GraphBuilder,
    binder: RenderBinder,
    manifest: AssetManifest,
}

impl NotebookDisplay {
    pub fn new(sessions: Arc<SessionIds>) -> Self {
        Self {
            sessions,
            builder: GraphBuilder::new(),
            binder: RenderBinder::new(),
            manifest: AssetManifest::default(),
        }
    }

    pub fn with_manifest(mut self, manifest: AssetManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_builder(mut self, builder: GraphBuilder) -> Self {
        self.binder = RenderBinder::with_icons(builder.icons().clone());
        self.builder = builder;
        self
    }

    pub fn sessions(&self) -> &SessionIds {
        &self.sessions
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Render content with an optional JSON configuration.
    ///
    /// `width`/`height` override the config's, which override 800x600.
    pub fn display<'a>(
        &self,
        data: impl Into<StixInput<'a>>,
        config: Option<&str>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<DisplayUnit, DisplayError> {
        let config = match config {
            Some(text) => ViewConfig::from_json_str(text)?,
            None => ViewConfig::default(),
        };
        self.display_with_config(data, config, width, height)
    }

    /// Render content with an already typed configuration
    pub fn display_with_config<'a>(
        &self,
        data: impl Into<StixInput<'a>>,
        mut config: ViewConfig,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<DisplayUnit, DisplayError> {
        config.merge_icon_dir(&self.manifest.icon_dir_url());
        config.width = Some(width.unwrap_or_else(|| config.effective_width()));
        config.height = Some(height.unwrap_or_else(|| config.effective_height()));

        let bundle = normalize(data)?;
        let model = Arc::new(self.builder.build_normalized(&bundle, &config));

        // Only a call that got this far consumes an id
        let session_id = self.sessions.next_id();
        let element_id = format!("{}-{}", ELEMENT_ID_PREFIX, session_id);

        let view = self
            .binder
            .bind(Arc::clone(&model), EmbedSurface::new(element_id.as_str()), &config)?;
        let surface = view.detach();

        let unit = DisplayUnit::assemble(
            session_id,
            &config,
            &surface,
            model.warnings(),
            &self.manifest.require_path(),
        )?;

        info!(
            "Display session {}: {} nodes, {} edges, {} warnings",
            session_id,
            model.node_count(),
            model.edge_count(),
            model.warnings().len()
        );
        Ok(unit)
    }

    /// Frame a display call would hand to the client, without allocating a session
    pub fn preview(&self, data: &str, config: &ViewConfig) -> Result<RenderFrame, DisplayError> {
        let bundle = normalize(data)?;
        let model = self.builder.build_normalized(&bundle, config);
        Ok(RenderFrame::build(&model, config, self.builder.icons()))
    }
}

/// Self-contained embeddable unit for the host display protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUnit {
    session_id: u64,
    element_id: String,
    width: u32,
    height: u32,
    /// Effective configuration, as emitted
    config: Value,
    markup: String,
    script: String,
}

impl DisplayUnit {
    fn assemble(
        session_id: u64,
        config: &ViewConfig,
        surface: &EmbedSurface,
        warnings: &[Warning],
        require_path: &str,
    ) -> Result<Self, DisplayError> {
        let element_id = surface.element_id().to_string();
        let data_id = format!("{}-data", element_id);
        let width = config.effective_width();
        let height = config.effective_height();
        let config_value = config.to_value()?;

        let empty = Value::Null;
        let payload = Payload {
            session_id,
            element_id: &element_id,
            config: config_value.clone(),
            frame: surface.frame().unwrap_or(&empty),
            state: surface.state(),
            hidden: surface.hidden(),
            warnings,
        };

        let container = Element::new("div")
            .attr("id", element_id.as_str())
            .attr("class", "stix2viz")
            .attr("style", format!("width:{}px;height:{}px;", width, height));
        let data = Element::new("script")
            .attr("type", "application/json")
            .attr("id", data_id.as_str())
            .script_body(script_json(&payload)?);
        let markup = format!("{}\n{}", container.render(), data.render());

        let loader = format!(
            "require({modules}, function (stix2viz) {{\n    var element = document.getElementById({element});\n    var payload = JSON.parse(document.getElementById({data}).textContent);\n    stix2viz.bindView(element, payload);\n}});",
            modules = script_json(&[require_path])?,
            element = script_json(&element_id)?,
            data = script_json(&data_id)?,
        );
        let script = Element::new("script")
            .attr("type", "text/javascript")
            .script_body(loader)
            .render();

        debug!("Assembled display unit {} ({} bytes)", element_id, markup.len() + script.len());

        Ok(Self {
            session_id,
            element_id,
            width,
            height,
            config: config_value,
            markup,
            script,
        })
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Surface element and the JSON data element
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Loader script wiring the data into the client module
    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn to_html(&self) -> String {
        format!("{}\n{}", self.markup, self.script)
    }

    /// Mime bundle for the host display protocol
    pub fn mime_bundle(&self) -> Value {
        json!({
            "text/html": self.to_html(),
            "text/plain": format!("<stix2viz view {}>", self.session_id),
        })
    }

    /// Full HTML page showing the unit, loading the module loader from `require_js`
    pub fn standalone_page(&self, title: &str, require_js: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(title),
            Element::new("script").attr("src", require_js).render(),
            self.to_html()
        )
    }
}
