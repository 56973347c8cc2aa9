//! # stix2viz notebook
//!
//! ノートブック表示セッションとアセットマニフェスト
//! Display sessions for notebook hosts: session ids, escaped display units
//! and the asset manifest the host installs the client module from.

pub mod error;
pub mod html;
pub mod manifest;
pub mod surface;
pub mod display;

pub use error::*;
pub use html::*;
pub use manifest::*;
pub use surface::*;
pub use display::*;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    const SCENARIO: &str = r#"{"type":"bundle","objects":[
        {"type":"malware","id":"malware--1","name":"X"},
        {"type":"identity","id":"identity--1","name":"Y"},
        {"type":"relationship","id":"relationship--1","relationship_type":"uses",
         "source_ref":"malware--1","target_ref":"identity--1"}]}"#;

    fn display() -> NotebookDisplay {
        NotebookDisplay::new(Arc::new(SessionIds::new()))
    }

    #[cfg(test)]
    mod html_tests {
        use super::*;

        #[test]
        fn test_escape_html() {
            assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
        }

        #[test]
        fn test_script_json_escapes_markup() {
            let value = json!({"name": "</script><script>alert(1)</script>", "sep": "\u{2028}"});
            let out = script_json(&value).unwrap();

            assert!(!out.contains('<'));
            assert!(!out.contains('>'));
            assert!(!out.contains('\u{2028}'));
            // Still the same JSON
            let back: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert_eq!(back, value);
        }

        #[test]
        fn test_element_attributes_escaped() {
            let html = Element::new("div").attr("title", "a\"b").text("<b>").render();
            assert_eq!(html, "<div title=\"a&quot;b\">&lt;b&gt;</div>");
        }
    }

    #[cfg(test)]
    mod manifest_tests {
        use super::*;

        #[test]
        fn test_default_manifest_entries() {
            let manifest = AssetManifest::default();
            manifest.validate().unwrap();

            assert_eq!(manifest.renderer(), Renderer::VisNetwork);
            assert_eq!(manifest.entries().len(), 3);
            assert_eq!(manifest.visualization_module(), Some("stix2viz/stix2viz"));
            assert_eq!(manifest.require_path(), "nbextensions/stix2viz/stix2viz");
            assert_eq!(manifest.icon_dir_url(), "/nbextensions/stix2viz/icons");
        }

        #[test]
        fn test_manifest_wire_form() {
            let value = AssetManifest::for_renderer(Renderer::D3).to_value().unwrap();
            assert_eq!(
                value[1],
                json!({"section": "notebook", "src": "d3", "dest": "stix2viz", "require": "stix2viz/d3"})
            );
            assert!(value[0].get("require").is_none());
        }

        #[test]
        fn test_every_renderer_validates() {
            for renderer in Renderer::ALL {
                AssetManifest::for_renderer(renderer).validate().unwrap();
                assert_eq!(renderer.to_string().parse::<Renderer>().unwrap(), renderer);
            }
            assert!("webgl".parse::<Renderer>().is_err());
        }

        #[test]
        fn test_entry_module_outside_dest_rejected() {
            let entries = vec![AssetEntry {
                section: Section::Notebook,
                source_dir: "stix2viz".to_string(),
                dest_dir: "stix2viz".to_string(),
                entry_module: Some("other/stix2viz".to_string()),
            }];
            let err = AssetManifest::from_entries(Renderer::D3, entries).unwrap_err();
            assert!(matches!(err, DisplayError::Manifest(_)));
        }

        #[test]
        fn test_parent_directory_rejected() {
            let entries = vec![AssetEntry {
                section: Section::Notebook,
                source_dir: "../secrets".to_string(),
                dest_dir: "stix2viz".to_string(),
                entry_module: Some("stix2viz/stix2viz".to_string()),
            }];
            assert!(AssetManifest::from_entries(Renderer::D3, entries).is_err());
        }

        #[test]
        fn test_missing_visualization_module_rejected() {
            let entries = vec![AssetEntry {
                section: Section::Notebook,
                source_dir: "d3".to_string(),
                dest_dir: "stix2viz".to_string(),
                entry_module: Some("stix2viz/d3".to_string()),
            }];
            assert!(AssetManifest::from_entries(Renderer::D3, entries).is_err());
        }
    }

    #[cfg(test)]
    mod session_tests {
        use super::*;

        #[test]
        fn test_session_ids_increase() {
            let ids = SessionIds::new();
            assert_eq!(ids.next_id(), 0);
            assert_eq!(ids.next_id(), 1);
            assert_eq!(ids.peek(), 2);
            assert_eq!(SessionIds::starting_at(7).next_id(), 7);
        }

        #[test]
        fn test_two_displays_get_distinct_ids() {
            let display = display();
            let first = display.display(SCENARIO, None, None, None).unwrap();
            let second = display.display(SCENARIO, None, None, None).unwrap();

            assert_eq!(first.session_id(), 0);
            assert_eq!(second.session_id(), 1);
            assert_eq!(first.element_id(), "stix2viz-0");
            assert_ne!(first.element_id(), second.element_id());
        }

        #[test]
        fn test_failed_display_keeps_counter() {
            let display = display();
            let err = display.display("{not json", None, None, None).unwrap_err();
            assert!(err.is_malformed_input());

            let err = display.display(SCENARIO, Some("{bad"), None, None).unwrap_err();
            assert!(err.is_config_error());

            assert_eq!(display.sessions().peek(), 0);
            assert_eq!(display.display(SCENARIO, None, None, None).unwrap().session_id(), 0);
        }

        #[test]
        fn test_icon_dir_preserved() {
            let unit = display()
                .display(SCENARIO, Some(r#"{"iconDir": "/custom/"}"#), None, None)
                .unwrap();
            assert_eq!(unit.config()["iconDir"], "/custom/");

            let unit = display().display(SCENARIO, None, None, None).unwrap();
            assert_eq!(unit.config()["iconDir"], "/nbextensions/stix2viz/icons");
        }

        #[test]
        fn test_dimension_precedence() {
            let display = display();

            let unit = display.display(SCENARIO, None, None, None).unwrap();
            assert_eq!(unit.dimensions(), (800, 600));

            let unit = display
                .display(SCENARIO, Some(r#"{"width": 400, "height": 300}"#), None, None)
                .unwrap();
            assert_eq!(unit.dimensions(), (400, 300));

            let unit = display
                .display(SCENARIO, Some(r#"{"width": 400}"#), Some(1024), Some(768))
                .unwrap();
            assert_eq!(unit.dimensions(), (1024, 768));
            assert_eq!(unit.config()["width"], 1024);
            assert!(unit.markup().contains("width:1024px;height:768px;"));
        }

        #[test]
        fn test_pass_through_config_emitted() {
            let unit = display()
                .display(SCENARIO, Some(r#"{"physics": false, "nodes": {"size": 30}}"#), None, None)
                .unwrap();
            assert_eq!(unit.config()["nodes"], json!({"size": 30}));
            assert!(unit.markup().contains(r#""size":30"#));
        }

        #[test]
        fn test_script_injection_is_escaped() {
            let data = json!([{
                "type": "malware",
                "id": "malware--1",
                "name": "</script><script>alert(1)</script>"
            }]);
            let unit = display().display(data, None, None, None).unwrap();
            let html = unit.to_html();

            assert!(!html.contains("<script>alert(1)"));
            assert!(!html.contains("</script><script>"));
            assert!(html.contains("\\u003c/script\\u003e"));
        }

        #[test]
        fn test_unit_wiring() {
            let unit = display().display(SCENARIO, None, None, None).unwrap();

            assert!(unit.markup().starts_with("<div id=\"stix2viz-0\""));
            assert!(unit.markup().contains("id=\"stix2viz-0-data\""));
            assert!(unit.script().contains(r#"require(["nbextensions/stix2viz/stix2viz"]"#));
            assert!(unit.script().contains("stix2viz.bindView(element, payload)"));

            let bundle = unit.mime_bundle();
            assert_eq!(bundle["text/html"], json!(unit.to_html()));
            assert_eq!(bundle["text/plain"], "<stix2viz view 0>");
        }

        #[test]
        fn test_standalone_page() {
            let unit = display().display(SCENARIO, None, None, None).unwrap();
            let page = unit.standalone_page("A & B", "require.js");

            assert!(page.starts_with("<!DOCTYPE html>"));
            assert!(page.contains("<title>A &amp; B</title>"));
            assert!(page.contains("<script src=\"require.js\"></script>"));
        }

        #[test]
        fn test_empty_bundle_displays() {
            let unit = display()
                .display(r#"{"type":"bundle","objects":[]}"#, None, None, None)
                .unwrap();
            assert!(unit.markup().contains(r#""nodes":[]"#));
        }
    }
}
