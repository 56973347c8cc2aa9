// Integration tests for stix2viz components
// These tests run STIX content through normalizer, builder, binder and display session

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::Arc;
    use stix2viz_core::{
        build_graph, graph_from_input, normalize, EdgeOrigin, GraphBuilder, IconTable, ViewConfig, Warning,
    };
    use stix2viz_notebook::{NotebookDisplay, SessionIds};
    use stix2viz_render::{HeadlessSurface, RenderBinder, RenderSurface};

    const SCENARIO: &str = r#"{"type":"bundle","objects":[
        {"type":"malware","id":"malware--1","name":"X"},
        {"type":"identity","id":"identity--1","name":"Y"},
        {"type":"relationship","id":"relationship--1","relationship_type":"uses",
         "source_ref":"malware--1","target_ref":"identity--1"}]}"#;

    #[test]
    fn test_end_to_end_scenario_graph() {
        let model = graph_from_input(SCENARIO, &ViewConfig::default()).unwrap();

        let ids: Vec<&str> = model.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["malware--1", "identity--1"]);
        assert_eq!(model.edge_count(), 1);

        let edge = &model.edges()[0];
        assert_eq!(edge.source, "malware--1");
        assert_eq!(edge.target, "identity--1");
        assert_eq!(edge.relationship_type, "uses");
        assert_eq!(edge.origin, EdgeOrigin::Relationship { id: "relationship--1".to_string() });
        assert!(!edge.dangling);
        assert!(model.warnings().is_empty());
    }

    #[test]
    fn test_empty_bundle_renders() {
        let config = ViewConfig::default();
        let model = graph_from_input(r#"{"type":"bundle","objects":[]}"#, &config).unwrap();
        assert_eq!(model.node_count(), 0);
        assert_eq!(model.edge_count(), 0);

        let view = RenderBinder::new()
            .bind(Arc::new(model), HeadlessSurface::new("empty"), &config)
            .unwrap();
        assert!(view.frame().nodes.is_empty());
        assert!(view.surface().has_content());
    }

    #[test]
    fn test_dangling_target_yields_one_edge() {
        let bundle = json!({"type": "bundle", "objects": [
            {"type": "malware", "id": "malware--1"},
            {"type": "relationship", "id": "relationship--1", "relationship_type": "targets",
             "source_ref": "malware--1", "target_ref": "identity--missing"}
        ]});
        let model = graph_from_input(bundle.clone(), &ViewConfig::default()).unwrap();

        assert_eq!(model.edge_count(), 1);
        assert!(model.edges()[0].dangling);
        assert!(matches!(
            &model.warnings()[0],
            Warning::DanglingReference { missing, dropped: false, .. } if missing == "identity--missing"
        ));

        let config = ViewConfig::from_json_str(r#"{"dropDanglingEdges": true}"#).unwrap();
        let model = graph_from_input(bundle, &config).unwrap();
        assert_eq!(model.edge_count(), 0);
        assert!(matches!(model.warnings()[0], Warning::DanglingReference { dropped: true, .. }));
    }

    #[test]
    fn test_index_round_trip() {
        let bundle = json!([
            {"type": "malware", "id": "malware--1"},
            {"type": "tool", "id": "tool--1"},
            {"type": "malware", "id": "malware--1", "name": "again"},
            {"type": "relationship", "id": "relationship--1", "relationship_type": "uses",
             "source_ref": "malware--1", "target_ref": "tool--1"}
        ]);
        let model = graph_from_input(bundle, &ViewConfig::default()).unwrap();

        assert_eq!(model.node_count(), 2);
        for node in model.nodes() {
            let object = model.object(&node.id).unwrap();
            assert_eq!(object.id(), node.id);
        }
        assert!(model.object("relationship--1").is_some());
    }

    #[test]
    fn test_builder_is_deterministic() {
        let bundle = normalize(SCENARIO).unwrap();
        let config = ViewConfig::default();

        let first = build_graph(&bundle.objects, &config);
        let second = build_graph(&bundle.objects, &config);
        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.edges(), second.edges());
    }

    #[test]
    fn test_icon_table_extends_without_builder_changes() {
        let bundle = normalize(json!([{"type": "x-acme-widget", "id": "x-acme-widget--1"}])).unwrap();
        let config = ViewConfig::default();

        let default = GraphBuilder::new().build(&bundle.objects, &config);
        assert_eq!(default.nodes()[0].icon_key, IconTable::default().fallback());

        let extended = GraphBuilder::new()
            .with_icons(IconTable::default().with_entry("x-acme-widget", "widget.png"))
            .build(&bundle.objects, &config);
        assert_eq!(extended.nodes()[0].icon_key, "widget.png");
    }

    #[test]
    fn test_display_sessions_and_icon_dir() {
        let display = NotebookDisplay::new(Arc::new(SessionIds::new()));

        let first = display.display(SCENARIO, Some(r#"{"iconDir":"/custom/"}"#), None, None).unwrap();
        let second = display.display(SCENARIO, None, Some(640), Some(480)).unwrap();

        assert_eq!(first.session_id(), 0);
        assert_eq!(second.session_id(), 1);
        assert_eq!(first.config()["iconDir"], "/custom/");
        assert_eq!(second.config()["iconDir"], "/nbextensions/stix2viz/icons");
        assert_eq!(second.dimensions(), (640, 480));
    }

    #[test]
    fn test_display_errors() {
        let display = NotebookDisplay::new(Arc::new(SessionIds::new()));

        assert!(display.display("not json", None, None, None).unwrap_err().is_malformed_input());
        assert!(display.display(SCENARIO, Some("[1"), None, None).unwrap_err().is_config_error());
        assert_eq!(display.sessions().peek(), 0);
    }

    #[test]
    fn test_hostile_strings_never_reach_markup() {
        let display = NotebookDisplay::new(Arc::new(SessionIds::new()));
        let bundle = json!({"type": "bundle", "objects": [
            {"type": "malware", "id": "malware--1", "name": "</script><script>alert(1)</script>"},
            {"type": "identity", "id": "identity--1", "name": "<img src=x onerror=alert(2)>"}
        ]});

        let html = display.display(bundle, None, None, None).unwrap().to_html();
        assert!(!html.contains("<script>alert(1)"));
        assert!(!html.contains("<img src=x"));
    }

    #[test]
    fn test_rebind_on_same_surface() {
        let config = ViewConfig::default();
        let binder = RenderBinder::new();
        let model = Arc::new(graph_from_input(SCENARIO, &config).unwrap());

        let mut view = binder.bind(Arc::clone(&model), HeadlessSurface::new("s"), &config).unwrap();
        assert!(view.click("malware--1").is_some());
        view.zoom(3.0).unwrap();

        let view = binder.rebind(view, model, &config).unwrap();
        assert!(view.selected().is_none());
        assert_eq!(view.state().zoom, 1.0);
        assert_eq!(view.surface().mount_count(), 2);

        let surface = view.destroy();
        assert!(surface.is_torn_down());
    }
}
