//! CLI command definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stix2viz_core::{graph_from_input, GraphModel, ViewConfig};
use stix2viz_notebook::{AssetManifest, NotebookDisplay, Renderer, SessionIds};
use stix2viz_render::{HeadlessSurface, RenderBinder};
use tracing::info;

/// Module loader used by standalone pages
pub const DEFAULT_REQUIRE_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/require.js/2.3.6/require.min.js";

/// Main CLI structure
#[derive(Parser)]
#[command(name = "stix2viz")]
#[command(about = "Visualize STIX 2 content as interactive graphs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where STIX content and configuration come from
#[derive(clap::Args, Debug, Clone, PartialEq, Default)]
pub struct InputArgs {
    /// STIX content as JSON file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// STIX content as JSON string
    #[arg(short, long)]
    pub json: Option<String>,

    /// View configuration as JSON string
    #[arg(short, long)]
    pub config: Option<String>,

    /// View configuration as JSON file
    #[arg(long)]
    pub config_file: Option<PathBuf>,
}

impl InputArgs {
    pub fn read_content(&self) -> Result<String> {
        if let Some(path) = &self.file {
            read_file(path)
        } else if let Some(json) = &self.json {
            Ok(json.clone())
        } else {
            Err(anyhow::anyhow!("Either --file or --json must be specified"))
        }
    }

    /// Configuration text, if any was given
    pub fn read_config(&self) -> Result<Option<String>> {
        match (&self.config, &self.config_file) {
            (Some(_), Some(_)) => Err(anyhow::anyhow!("--config and --config-file are mutually exclusive")),
            (Some(text), None) => Ok(Some(text.clone())),
            (None, Some(path)) => read_file(path).map(Some),
            (None, None) => Ok(None),
        }
    }

    pub fn view_config(&self) -> Result<ViewConfig> {
        match self.read_config()? {
            Some(text) => Ok(ViewConfig::from_json_str(&text)?),
            None => Ok(ViewConfig::default()),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Render content to an embeddable HTML unit
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Surface width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Surface height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Rendering library the unit loads
        #[arg(short, long, default_value = "vis-network")]
        renderer: RendererKind,

        /// Emit a complete HTML page instead of a fragment
        #[arg(long)]
        standalone: bool,

        /// Module loader URL for standalone pages
        #[arg(long, default_value = DEFAULT_REQUIRE_JS)]
        require_js: String,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: text emits HTML, json the host mime bundle
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Summarize the graph built from content
    Graph {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one object with its details and connections
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        /// STIX id of the object
        #[arg(long)]
        id: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the asset manifest
    Manifest {
        /// Rendering library
        #[arg(short, long, default_value = "vis-network")]
        renderer: RendererKind,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Show system information
    Info,
}

/// Output format options
#[derive(Clone, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

/// Rendering library options
#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum RendererKind {
    D3,
    VisNetwork,
    Echarts,
}

impl From<RendererKind> for Renderer {
    fn from(kind: RendererKind) -> Self {
        match kind {
            RendererKind::D3 => Renderer::D3,
            RendererKind::VisNetwork => Renderer::VisNetwork,
            RendererKind::Echarts => Renderer::Echarts,
        }
    }
}

/// Command execution result
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Execute CLI commands
pub struct CommandExecutor {
    sessions: Arc<SessionIds>,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(SessionIds::new()),
        }
    }

    /// Execute a CLI command
    pub fn execute(&mut self, command: Commands) -> Result<CommandResult> {
        match command {
            Commands::Render {
                input,
                width,
                height,
                renderer,
                standalone,
                require_js,
                output,
                format,
            } => {
                let page = if standalone { Some(require_js.as_str()) } else { None };
                self.execute_render(&input, width, height, renderer, page, output, format)
            }
            Commands::Graph { input, format } => self.execute_graph(&input, format),
            Commands::Inspect { input, id, format } => self.execute_inspect(&input, &id, format),
            Commands::Manifest { renderer, format } => self.execute_manifest(renderer, format),
            Commands::Info => self.execute_info(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_render(
        &self,
        input: &InputArgs,
        width: Option<u32>,
        height: Option<u32>,
        renderer: RendererKind,
        standalone_require_js: Option<&str>,
        output: Option<PathBuf>,
        format: OutputFormat,
    ) -> Result<CommandResult> {
        let content = input.read_content()?;
        let config = input.read_config()?;

        let display = NotebookDisplay::new(Arc::clone(&self.sessions))
            .with_manifest(AssetManifest::for_renderer(renderer.into()));
        let unit = display.display(content.as_str(), config.as_deref(), width, height)?;

        let result = match format {
            OutputFormat::Text => match standalone_require_js {
                Some(require_js) => unit.standalone_page("STIX visualization", require_js),
                None => unit.to_html(),
            },
            OutputFormat::Json => serde_json::to_string(&unit.mime_bundle())?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&unit.mime_bundle())?,
        };

        if let Some(output_path) = &output {
            std::fs::write(output_path, &result)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Wrote display unit {} to {}", unit.element_id(), output_path.display());
        } else {
            println!("{}", result);
        }

        Ok(CommandResult {
            success: true,
            message: format!("Rendered {}", unit.element_id()),
            data: Some(json!({
                "session_id": unit.session_id(),
                "element_id": unit.element_id(),
                "config": unit.config(),
            })),
        })
    }

    fn execute_graph(&self, input: &InputArgs, format: OutputFormat) -> Result<CommandResult> {
        let config = input.view_config()?;
        let model = graph_from_input(&input.read_content()?, &config)?;

        let data = graph_summary(&model);
        let result = match format {
            OutputFormat::Text => graph_text(&model),
            OutputFormat::Json => serde_json::to_string(&data)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&data)?,
        };
        println!("{}", result);

        Ok(CommandResult {
            success: true,
            message: format!("{} nodes, {} edges", model.node_count(), model.edge_count()),
            data: Some(data),
        })
    }

    fn execute_inspect(&self, input: &InputArgs, id: &str, format: OutputFormat) -> Result<CommandResult> {
        let config = input.view_config()?;
        let model = Arc::new(graph_from_input(&input.read_content()?, &config)?);
        let mut view = RenderBinder::new().bind(model, HeadlessSurface::new("inspect"), &config)?;

        let object = view
            .click(id)
            .map(|o| o.to_value())
            .ok_or_else(|| anyhow::anyhow!("Unknown STIX object: {}", id))?;
        let details = view.details(id).unwrap_or_default();
        let connections = view.connections(id);

        let data = json!({
            "object": object,
            "details": &details,
            "connections": {
                "incoming": &connections.incoming,
                "outgoing": &connections.outgoing,
            },
        });

        let result = match format {
            OutputFormat::Text => {
                let mut output = String::new();
                for field in &details {
                    output.push_str(&format!("{} {}\n", field.title, field.value));
                }
                for edge in &connections.incoming {
                    output.push_str(&format!("<- {} {}\n", edge.relationship_type, edge.source));
                }
                for edge in &connections.outgoing {
                    output.push_str(&format!("-> {} {}\n", edge.relationship_type, edge.target));
                }
                output
            }
            OutputFormat::Json => serde_json::to_string(&data)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&data)?,
        };
        println!("{}", result);

        Ok(CommandResult {
            success: true,
            message: format!("Inspected {}", id),
            data: Some(data),
        })
    }

    fn execute_manifest(&self, renderer: RendererKind, format: OutputFormat) -> Result<CommandResult> {
        let manifest = AssetManifest::for_renderer(renderer.into());
        manifest.validate()?;
        let entries = manifest.to_value()?;

        let result = match format {
            OutputFormat::Text => manifest
                .entries()
                .iter()
                .map(|e| {
                    format!(
                        "{} -> {}{}",
                        e.source_dir,
                        e.dest_dir,
                        e.entry_module.as_deref().map(|m| format!(" (require {})", m)).unwrap_or_default()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => serde_json::to_string(&entries)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&entries)?,
        };
        println!("{}", result);

        Ok(CommandResult {
            success: true,
            message: format!("Asset manifest for {}", manifest.renderer()),
            data: Some(entries),
        })
    }

    fn execute_info(&self) -> Result<CommandResult> {
        let info = json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "repository": env!("CARGO_PKG_REPOSITORY"),
            "renderers": Renderer::ALL.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            "features": ["stix2", "graph", "notebook", "cli"]
        });

        let result = serde_json::to_string_pretty(&info)?;
        println!("{}", result);

        Ok(CommandResult {
            success: true,
            message: "System information".to_string(),
            data: Some(info),
        })
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// JSON summary of a graph: nodes, edges, type groups and warnings
pub fn graph_summary(model: &GraphModel) -> serde_json::Value {
    json!({
        "nodes": model.nodes(),
        "edges": model.edges(),
        "type_groups": model.type_groups(),
        "warnings": model.warnings(),
    })
}

/// Plain-text listing of a graph
pub fn graph_text(model: &GraphModel) -> String {
    let mut output = format!(
        "{} nodes, {} edges, {} warnings\n",
        model.node_count(),
        model.edge_count(),
        model.warnings().len()
    );
    for node in model.nodes() {
        output.push_str(&format!("  {} [{}] {}\n", node.id, node.stix_type, node.label));
    }
    for edge in model.edges() {
        output.push_str(&format!(
            "  {} -{}-> {}{}\n",
            edge.source,
            edge.relationship_type,
            edge.target,
            if edge.dangling { " (dangling)" } else { "" }
        ));
    }
    for warning in model.warnings() {
        output.push_str(&format!("  warning: {}\n", warning));
    }
    output
}
