//! Property tests for graph construction

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use stix2viz_core::{build_graph, normalize, StixObject, ViewConfig};

const TYPES: [&str; 5] = ["malware", "tool", "identity", "indicator", "x-acme-widget"];

fn arb_sdo() -> impl Strategy<Value = Value> {
    (0..TYPES.len(), 0u8..12, proptest::option::of("[a-c]{0,2}(\\([2-4]\\))?")).prop_map(|(t, n, name)| {
        let stix_type = TYPES[t];
        let mut object = json!({"type": stix_type, "id": format!("{}--{}", stix_type, n)});
        if let Some(name) = name {
            object["name"] = Value::String(name);
        }
        object
    })
}

fn arb_relationship() -> impl Strategy<Value = Value> {
    (0..TYPES.len(), 0u8..12, 0..TYPES.len(), 0u8..12, 0u16..500).prop_map(|(s, sn, t, tn, r)| {
        json!({
            "type": "relationship",
            "id": format!("relationship--{}", r),
            "relationship_type": "related-to",
            "source_ref": format!("{}--{}", TYPES[s], sn),
            "target_ref": format!("{}--{}", TYPES[t], tn),
        })
    })
}

fn arb_objects() -> impl Strategy<Value = Vec<StixObject>> {
    (
        prop::collection::vec(arb_sdo(), 0..30),
        prop::collection::vec(arb_relationship(), 0..20),
    )
        .prop_map(|(mut sdos, relationships)| {
            sdos.extend(relationships);
            normalize(Value::Array(sdos)).map(|b| b.objects).unwrap_or_default()
        })
}

proptest! {
    #[test]
    fn build_is_deterministic(objects in arb_objects()) {
        let config = ViewConfig::default();
        let first = build_graph(&objects, &config);
        let second = build_graph(&objects, &config);

        prop_assert_eq!(first.nodes(), second.nodes());
        prop_assert_eq!(first.edges(), second.edges());
    }

    #[test]
    fn one_node_per_distinct_non_relationship_id(objects in arb_objects()) {
        let model = build_graph(&objects, &ViewConfig::default());
        let distinct: HashSet<&str> = objects
            .iter()
            .filter(|o| !o.is_relationship())
            .map(|o| o.id())
            .collect();

        prop_assert_eq!(model.node_count(), distinct.len());
    }

    #[test]
    fn labels_are_unique(objects in arb_objects()) {
        let model = build_graph(&objects, &ViewConfig::default());
        let labels: HashSet<&str> = model.nodes().iter().map(|n| n.label.as_str()).collect();

        prop_assert_eq!(labels.len(), model.node_count());
    }

    #[test]
    fn relationship_edges_keep_their_type(objects in arb_objects()) {
        let config = ViewConfig::from_json_str(r#"{"embeddedRefs": false}"#).unwrap();
        let model = build_graph(&objects, &config);

        for edge in model.edges() {
            prop_assert!(!edge.is_embedded());
            prop_assert_eq!(edge.relationship_type.as_str(), "related-to");
            prop_assert_eq!(edge.dangling, !(model.contains_node(&edge.source) && model.contains_node(&edge.target)));
        }
    }

    #[test]
    fn dropping_dangling_leaves_resolved_edges(objects in arb_objects()) {
        let config = ViewConfig::from_json_str(r#"{"dropDanglingEdges": true}"#).unwrap();
        let model = build_graph(&objects, &config);

        prop_assert_eq!(model.dangling_edge_count(), 0);
        for edge in model.edges() {
            prop_assert!(model.contains_node(&edge.source));
            prop_assert!(model.contains_node(&edge.target));
        }
    }
}
