//! Tests for the stix2viz CLI

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use stix2viz_cli::commands::{Cli, CommandExecutor, Commands, OutputFormat, RendererKind};
use stix2viz_cli::interactive::{InteractiveSession, Reply};
use tempfile::NamedTempFile;

const BUNDLE: &str = r#"{"type": "bundle", "id": "bundle--1", "objects": [
    {"type": "malware", "id": "malware--1", "name": "X"},
    {"type": "identity", "id": "identity--1", "name": "Y"},
    {"type": "relationship", "id": "relationship--1", "relationship_type": "uses",
     "source_ref": "malware--1", "target_ref": "identity--1"}
]}"#;

fn bundle_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(BUNDLE.as_bytes()).unwrap();
    file
}

#[test]
fn test_cli_parsing_info() {
    let cli = Cli::try_parse_from(vec!["stix2viz", "info"]).unwrap();

    match cli.command {
        Commands::Info => {} // Expected
        _ => panic!("Expected Info command"),
    }
}

#[test]
fn test_cli_parsing_render() {
    let args = vec![
        "stix2viz", "render", "--file", "bundle.json", "--width", "1024", "--renderer", "d3", "--standalone",
    ];
    let cli = Cli::try_parse_from(args).unwrap();

    match cli.command {
        Commands::Render { input, width, height, renderer, standalone, format, .. } => {
            assert_eq!(input.file, Some(PathBuf::from("bundle.json")));
            assert_eq!(width, Some(1024));
            assert_eq!(height, None);
            assert_eq!(renderer, RendererKind::D3);
            assert!(standalone);
            assert_eq!(format, OutputFormat::Text);
        }
        _ => panic!("Expected Render command"),
    }
}

#[test]
fn test_cli_parsing_inspect() {
    let args = vec!["stix2viz", "inspect", "--json", BUNDLE, "--id", "malware--1", "--format", "json"];
    let cli = Cli::try_parse_from(args).unwrap();

    match cli.command {
        Commands::Inspect { input, id, format } => {
            assert_eq!(input.json.as_deref(), Some(BUNDLE));
            assert_eq!(id, "malware--1");
            assert_eq!(format, OutputFormat::Json);
        }
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_cli_parsing_manifest_default_renderer() {
    let cli = Cli::try_parse_from(vec!["stix2viz", "manifest"]).unwrap();

    match cli.command {
        Commands::Manifest { renderer, format } => {
            assert_eq!(renderer, RendererKind::VisNetwork);
            assert_eq!(format, OutputFormat::JsonPretty);
        }
        _ => panic!("Expected Manifest command"),
    }
}

#[test]
fn test_cli_rejects_unknown_renderer() {
    assert!(Cli::try_parse_from(vec!["stix2viz", "manifest", "--renderer", "webgl"]).is_err());
}

#[test]
fn test_render_to_file() {
    let input = bundle_file();
    let output = NamedTempFile::new().unwrap();
    let path = input.path().to_string_lossy().to_string();
    let out_path = output.path().to_string_lossy().to_string();

    let cli = Cli::try_parse_from(vec![
        "stix2viz", "render", "--file", path.as_str(), "--config", r#"{"iconDir": "/custom/"}"#,
        "--output", out_path.as_str(),
    ])
    .unwrap();

    let mut executor = CommandExecutor::new();
    let result = executor.execute(cli.command).unwrap();
    assert!(result.success);

    let data = result.data.unwrap();
    assert_eq!(data["session_id"], 0);
    assert_eq!(data["config"]["iconDir"], "/custom/");

    let html = std::fs::read_to_string(output.path()).unwrap();
    assert!(html.contains("<div id=\"stix2viz-0\""));
    assert!(html.contains("stix2viz.bindView"));
}

#[test]
fn test_render_twice_uses_new_session() {
    let mut executor = CommandExecutor::new();
    let output = NamedTempFile::new().unwrap();
    let out_path = output.path().to_string_lossy().to_string();

    for expected in 0..2 {
        let cli = Cli::try_parse_from(vec![
            "stix2viz", "render", "--json", BUNDLE, "--output", out_path.as_str(),
        ])
        .unwrap();
        let result = executor.execute(cli.command).unwrap();
        assert_eq!(result.data.unwrap()["session_id"], expected);
    }
}

#[test]
fn test_render_invalid_config_fails() {
    let cli = Cli::try_parse_from(vec!["stix2viz", "render", "--json", BUNDLE, "--config", "{oops"]).unwrap();
    let err = CommandExecutor::new().execute(cli.command).unwrap_err();
    assert!(err.to_string().contains("Invalid configuration"));
}

#[test]
fn test_render_requires_input() {
    let cli = Cli::try_parse_from(vec!["stix2viz", "render"]).unwrap();
    assert!(CommandExecutor::new().execute(cli.command).is_err());
}

#[test]
fn test_graph_summary() {
    let input = bundle_file();
    let path = input.path().to_string_lossy().to_string();
    let cli = Cli::try_parse_from(vec!["stix2viz", "graph", "--file", path.as_str(), "--format", "json"]).unwrap();

    let result = CommandExecutor::new().execute(cli.command).unwrap();
    assert_eq!(result.message, "2 nodes, 1 edges");

    let data = result.data.unwrap();
    assert_eq!(data["edges"][0]["relationshipType"], "uses");
    assert_eq!(data["type_groups"][0], "malware");
}

#[test]
fn test_inspect_object() {
    let cli = Cli::try_parse_from(vec!["stix2viz", "inspect", "--json", BUNDLE, "--id", "identity--1"]).unwrap();

    let result = CommandExecutor::new().execute(cli.command).unwrap();
    let data = result.data.unwrap();
    assert_eq!(data["object"]["name"], "Y");
    assert_eq!(data["connections"]["incoming"][0]["source"], "malware--1");
}

#[test]
fn test_inspect_unknown_object_fails() {
    let cli = Cli::try_parse_from(vec!["stix2viz", "inspect", "--json", BUNDLE, "--id", "tool--9"]).unwrap();
    assert!(CommandExecutor::new().execute(cli.command).is_err());
}

#[test]
fn test_manifest_command() {
    let cli = Cli::try_parse_from(vec!["stix2viz", "manifest", "--renderer", "echarts"]).unwrap();

    let result = CommandExecutor::new().execute(cli.command).unwrap();
    let entries = result.data.unwrap();
    assert_eq!(entries[1]["src"], "echarts");
    assert_eq!(entries[2]["require"], "stix2viz/stix2viz");
}

#[test]
fn test_interactive_session_flow() {
    let input = bundle_file();
    let path = input.path().to_string_lossy().to_string();
    let mut session = InteractiveSession::new();

    let reply = session.handle_line("nodes").map(|_| ()).unwrap_err();
    assert!(reply.to_string().contains("No bundle loaded"));

    let reply = session.handle_line(&format!("load {}", path)).unwrap();
    assert_eq!(reply, Reply::Output("Loaded 2 nodes, 1 edges (0 warnings)".to_string()));

    match session.handle_line("select malware--1").unwrap() {
        Reply::Output(text) => assert!(text.contains("Name: X")),
        Reply::Quit => panic!("Expected output"),
    }

    match session.handle_line("select nothing--1").unwrap() {
        Reply::Output(text) => assert_eq!(text, "Unknown object: nothing--1"),
        Reply::Quit => panic!("Expected output"),
    }

    assert_eq!(
        session.handle_line("hide identity").unwrap(),
        Reply::Output("identity hidden".to_string())
    );
    assert_eq!(
        session.handle_line("search Y").unwrap(),
        Reply::Output("No nodes match 'Y'".to_string())
    );

    match session.handle_line("connections identity--1").unwrap() {
        Reply::Output(text) => assert_eq!(text, "<- uses malware--1"),
        Reply::Quit => panic!("Expected output"),
    }

    assert_eq!(session.handle_line("fit").unwrap(), Reply::Output("View reset".to_string()));
    assert!(session.summary().unwrap().starts_with("2 nodes, 1 edges"));
    assert_eq!(session.handle_line("quit").unwrap(), Reply::Quit);
}

#[test]
fn test_interactive_falls_back_to_cli_commands() {
    let mut session = InteractiveSession::new();

    assert_eq!(
        session.handle_line("info").unwrap(),
        Reply::Output("System information".to_string())
    );
    match session.handle_line("frobnicate").unwrap() {
        Reply::Output(text) => assert!(text.starts_with("Parse error")),
        Reply::Quit => panic!("Expected output"),
    }
}
