//! Render frames: the typed node/edge records handed to the rendering library
//!
//! A frame is plain data. Layout math stays with the rendering library; the
//! frame only carries shaped records, legend, options and the object index
//! that click handlers resolve against.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use stix2viz_core::{icon_url, GraphModel, IconTable, LayoutKind, ViewConfig, ViewMode};

/// Seed passed to the layout so re-renders of the same data settle the same way
pub const LAYOUT_SEED: u64 = 1;

/// Color of stub nodes standing in for unresolved references
pub const STUB_COLOR: &str = "#7f7f7f";

/// Graph or list presentation of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Graph,
    List,
}

impl FrameKind {
    /// Resolve the configured view mode against the node count
    pub fn for_config(config: &ViewConfig, node_count: usize) -> Self {
        match config.view {
            ViewMode::Graph => FrameKind::Graph,
            ViewMode::List => FrameKind::List,
            ViewMode::Auto if node_count > config.list_threshold => FrameKind::List,
            ViewMode::Auto => FrameKind::Graph,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub stix_type: String,
    pub group: usize,
    pub color: String,
    /// Full icon URL
    pub image: String,
    pub shape: &'static str,
    /// Synthesized for an id referenced by an edge but absent from the bundle
    pub stub: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    /// `edge-<n>`, stable across re-renders of the same data
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: String,
    pub arrows: &'static str,
    /// Embedded-reference edges are drawn dashed
    pub dashes: bool,
    pub dangling: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub stix_type: String,
    /// Display name, e.g. `Attack-pattern`
    pub label: String,
    pub icon_url: String,
    pub color: String,
    pub count: usize,
}

/// One row of the list view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub stix_type: String,
}

/// Everything the client module needs to draw one graph model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub kind: FrameKind,
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub legend: Vec<LegendEntry>,
    /// Rows sorted by label; filled for list frames only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<ListRow>,
    /// Renderer options, pass-through config merged over the defaults
    pub options: Value,
    /// STIX id -> full object, for click lookups on the client side
    pub objects: BTreeMap<String, Value>,
}

impl RenderFrame {
    /// Shape a graph model into a frame
    pub fn build(model: &GraphModel, config: &ViewConfig, icons: &IconTable) -> Self {
        let icon_dir = config.icon_dir.as_deref();
        let hidden_types: BTreeSet<&str> = config.hidden_types.iter().map(String::as_str).collect();

        let mut nodes: Vec<NodeRecord> = model
            .nodes()
            .iter()
            .map(|node| NodeRecord {
                id: node.id.clone(),
                label: node.label.clone(),
                stix_type: node.stix_type.clone(),
                group: node.group,
                color: node.color.clone(),
                image: icon_url(icon_dir, &node.icon_key),
                shape: "image",
                stub: false,
                hidden: hidden_types.contains(node.stix_type.as_str()),
            })
            .collect();

        // Stub nodes for unresolved endpoints, in order of first reference
        let mut stubbed: HashSet<&str> = HashSet::new();
        for edge in model.edges().iter().filter(|e| e.dangling) {
            for endpoint in [edge.source.as_str(), edge.target.as_str()] {
                if model.contains_node(endpoint) || !stubbed.insert(endpoint) {
                    continue;
                }
                nodes.push(NodeRecord {
                    id: endpoint.to_string(),
                    label: endpoint.to_string(),
                    stix_type: stub_type(endpoint).to_string(),
                    group: model.type_groups().len(),
                    color: STUB_COLOR.to_string(),
                    image: icon_url(icon_dir, icons.fallback()),
                    shape: "image",
                    stub: true,
                    hidden: false,
                });
            }
        }

        let hidden_nodes: HashSet<&str> = nodes.iter().filter(|n| n.hidden).map(|n| n.id.as_str()).collect();
        let edges = model
            .edges()
            .iter()
            .enumerate()
            .map(|(index, edge)| EdgeRecord {
                id: format!("edge-{}", index),
                from: edge.source.clone(),
                to: edge.target.clone(),
                label: edge.relationship_type.clone(),
                arrows: "to",
                dashes: edge.is_embedded(),
                dangling: edge.dangling,
                hidden: hidden_nodes.contains(edge.source.as_str())
                    || hidden_nodes.contains(edge.target.as_str()),
            })
            .collect();

        let legend = model
            .type_groups()
            .iter()
            .filter_map(|stix_type| {
                let first = model.nodes_of_type(stix_type).next()?;
                Some(LegendEntry {
                    stix_type: stix_type.clone(),
                    label: legend_label(stix_type),
                    icon_url: icon_url(icon_dir, &first.icon_key),
                    color: first.color.clone(),
                    count: model.nodes_of_type(stix_type).count(),
                })
            })
            .collect();

        let kind = FrameKind::for_config(config, model.node_count());
        let list = match kind {
            FrameKind::List => list_rows(model),
            FrameKind::Graph => Vec::new(),
        };

        let objects = model
            .objects()
            .map(|object| (object.id().to_string(), object.to_value()))
            .collect();

        RenderFrame {
            kind,
            width: config.effective_width(),
            height: config.effective_height(),
            nodes,
            edges,
            legend,
            list,
            options: renderer_options(config),
            objects,
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn stub_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.stub).count()
    }

    /// Mark nodes of the given types hidden, along with edges touching them
    pub fn set_hidden_types(&mut self, hidden_types: &BTreeSet<String>) {
        for node in &mut self.nodes {
            node.hidden = !node.stub && hidden_types.contains(&node.stix_type);
        }

        let hidden_nodes: HashSet<&str> = self
            .nodes
            .iter()
            .filter(|n| n.hidden)
            .map(|n| n.id.as_str())
            .collect();
        for edge in &mut self.edges {
            edge.hidden = hidden_nodes.contains(edge.from.as_str()) || hidden_nodes.contains(edge.to.as_str());
        }
    }

    /// Ids of currently hidden nodes, in node order
    pub fn hidden_node_ids(&self) -> Vec<String> {
        self.nodes.iter().filter(|n| n.hidden).map(|n| n.id.clone()).collect()
    }
}

/// Type part of a STIX id, or `unknown` if the id is not `<type>--<uuid>`
fn stub_type(id: &str) -> &str {
    match id.split_once("--") {
        Some((stix_type, _)) if !stix_type.is_empty() => stix_type,
        _ => "unknown",
    }
}

/// `attack-pattern` -> `Attack-pattern`
pub fn legend_label(stix_type: &str) -> String {
    let mut chars = stix_type.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn list_rows(model: &GraphModel) -> Vec<ListRow> {
    let mut rows: Vec<ListRow> = model
        .nodes()
        .iter()
        .map(|node| ListRow {
            id: node.id.clone(),
            label: node.label.clone(),
            stix_type: node.stix_type.clone(),
        })
        .collect();
    // Labels are unique, so the order is total
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    rows
}

/// Default renderer options with the pass-through config merged over them
pub fn renderer_options(config: &ViewConfig) -> Value {
    let hierarchical = match config.layout {
        LayoutKind::Force => json!({"enabled": false}),
        LayoutKind::Hierarchical => json!({
            "enabled": true,
            "direction": "UD",
            "sortMethod": "directed"
        }),
    };

    let mut options = json!({
        "layout": {
            "randomSeed": LAYOUT_SEED,
            "hierarchical": hierarchical
        },
        "physics": {"enabled": config.physics},
        "interaction": {"hover": true, "navigationButtons": false},
        "edges": {"arrows": "to", "font": {"align": "middle"}}
    });

    let overlay: Map<String, Value> = config.extra.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    deep_merge(&mut options, &Value::Object(overlay));
    options
}

/// Merge `overlay` into `base`: objects merge key by key, anything else replaces
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
