//! Interactive CLI mode: load a bundle once, then explore it

use crate::commands::{graph_text, Cli, CommandExecutor};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use stix2viz_core::{graph_from_input, ViewConfig};
use stix2viz_render::{HeadlessSurface, LiveView, RenderBinder};

/// Outcome of one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Interactive CLI session
pub struct InteractiveSession {
    executor: CommandExecutor,
    binder: RenderBinder,
    config: ViewConfig,
    view: Option<LiveView<HeadlessSurface>>,
}

impl InteractiveSession {
    pub fn new() -> Self {
        Self {
            executor: CommandExecutor::new(),
            binder: RenderBinder::new(),
            config: ViewConfig::default(),
            view: None,
        }
    }

    /// Start interactive session
    pub fn run(&mut self) -> Result<()> {
        println!("Welcome to stix2viz Interactive Mode");
        println!("Type 'help' for available commands, 'quit' to exit");
        println!("{}", "=".repeat(50));

        loop {
            print!("stix2viz> ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }

            match self.handle_line(&input) {
                Ok(Reply::Quit) => {
                    println!("Goodbye!");
                    break;
                }
                Ok(Reply::Output(text)) if text.is_empty() => {}
                Ok(Reply::Output(text)) => println!("{}", text),
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        Ok(())
    }

    /// Handle one line of input
    pub fn handle_line(&mut self, input: &str) -> Result<Reply> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Reply::Output(String::new()));
        }

        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        let output = match command {
            "quit" | "exit" | "q" => return Ok(Reply::Quit),
            "help" | "h" => help_text(),
            "clear" => "\x1B[2J\x1B[1;1H".to_string(),
            "config" => self.set_config(rest)?,
            "load" => self.load(rest)?,
            "nodes" => self.nodes()?,
            "select" => self.select(rest)?,
            "connections" => self.connections(rest)?,
            "search" => self.search(rest)?,
            "hide" => self.toggle(rest)?,
            "fit" => {
                self.view_mut()?.fit_to_view()?;
                "View reset".to_string()
            }
            _ => self.execute_command(input)?,
        };

        Ok(Reply::Output(output))
    }

    fn set_config(&mut self, text: &str) -> Result<String> {
        self.config = if text.is_empty() {
            ViewConfig::default()
        } else {
            ViewConfig::from_json_str(text)?
        };
        Ok("Configuration updated; applies to the next load".to_string())
    }

    fn load(&mut self, path: &str) -> Result<String> {
        if path.is_empty() {
            return Err(anyhow::anyhow!("Usage: load <file>"));
        }

        let content = std::fs::read_to_string(path)?;
        let model = Arc::new(graph_from_input(&content, &self.config)?);

        let view = match self.view.take() {
            Some(view) => self.binder.rebind(view, model, &self.config)?,
            None => self.binder.bind(model, HeadlessSurface::new("interactive"), &self.config)?,
        };

        let model = view.model();
        let message = format!(
            "Loaded {} nodes, {} edges ({} warnings)",
            model.node_count(),
            model.edge_count(),
            model.warnings().len()
        );
        self.view = Some(view);
        Ok(message)
    }

    fn nodes(&self) -> Result<String> {
        let view = self.view_ref()?;
        Ok(view
            .model()
            .nodes()
            .iter()
            .map(|node| {
                format!(
                    "{} [{}] {}{}",
                    node.id,
                    node.stix_type,
                    node.label,
                    if view.is_visible(&node.id) { "" } else { " (hidden)" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn select(&mut self, id: &str) -> Result<String> {
        let view = self.view_mut()?;
        if view.click(id).is_none() {
            return Ok(format!("Unknown object: {}", id));
        }

        let details = view.details(id).unwrap_or_default();
        Ok(details
            .iter()
            .map(|field| format!("{} {}", field.title, field.value))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn connections(&self, id: &str) -> Result<String> {
        let connections = self.view_ref()?.connections(id);
        let incoming = connections
            .incoming
            .iter()
            .map(|edge| format!("<- {} {}", edge.relationship_type, edge.source));
        let outgoing = connections
            .outgoing
            .iter()
            .map(|edge| format!("-> {} {}", edge.relationship_type, edge.target));
        Ok(incoming.chain(outgoing).collect::<Vec<_>>().join("\n"))
    }

    fn search(&self, keyword: &str) -> Result<String> {
        let found = self.view_ref()?.search(keyword);
        if found.is_empty() {
            return Ok(format!("No nodes match '{}'", keyword));
        }
        Ok(found
            .iter()
            .map(|node| format!("{} {}", node.id, node.label))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn toggle(&mut self, stix_type: &str) -> Result<String> {
        if stix_type.is_empty() {
            return Err(anyhow::anyhow!("Usage: hide <stix-type>"));
        }
        let hidden = self.view_mut()?.toggle_stix_type(stix_type)?;
        Ok(format!("{} {}", stix_type, if hidden { "hidden" } else { "shown" }))
    }

    fn execute_command(&mut self, input: &str) -> Result<String> {
        // Parse the input as CLI arguments
        let mut args = vec!["stix2viz".to_string()];
        args.extend(shell_words::split(input)?);
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => return Ok(format!("Parse error: {}", e)),
        };

        let result = self.executor.execute(cli.command)?;
        Ok(result.message)
    }

    /// Summary of the loaded graph, if any
    pub fn summary(&self) -> Option<String> {
        self.view.as_ref().map(|view| graph_text(view.model()))
    }

    fn view_ref(&self) -> Result<&LiveView<HeadlessSurface>> {
        self.view.as_ref().ok_or_else(|| anyhow::anyhow!("No bundle loaded; use 'load <file>'"))
    }

    fn view_mut(&mut self) -> Result<&mut LiveView<HeadlessSurface>> {
        self.view.as_mut().ok_or_else(|| anyhow::anyhow!("No bundle loaded; use 'load <file>'"))
    }
}

impl Default for InteractiveSession {
    fn default() -> Self {
        Self::new()
    }
}

fn help_text() -> String {
    [
        "Available commands:",
        "  load <file>          Load a STIX bundle",
        "  config <json>        Set the view configuration for the next load",
        "  nodes                List nodes",
        "  select <id>          Select an object and show its details",
        "  connections <id>     Show incoming and outgoing edges",
        "  search <keyword>     Find visible nodes by label",
        "  hide <type>          Hide or show a STIX type",
        "  fit                  Reset pan and zoom",
        "  render|graph|inspect|manifest|info [options]",
        "                       Run a CLI command",
        "  clear                Clear screen",
        "  quit                 Exit interactive mode",
        "",
        "Use '<command> --help' for detailed help on each CLI command",
    ]
    .join("\n")
}

/// Start interactive mode
pub fn start_interactive() -> Result<()> {
    let mut session = InteractiveSession::new();
    session.run()
}
