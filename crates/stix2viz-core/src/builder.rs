//! Graph model construction from normalized STIX objects

use crate::config::ViewConfig;
use crate::error::Warning;
use crate::icons::IconTable;
use crate::model::{EdgeOrigin, GraphEdge, GraphModel, GraphNode, StixObject};
use crate::normalizer::NormalizedBundle;
use crate::refs::{default_embedded_refs, EmbeddedRefTable};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Labels longer than this are truncated
pub const MAX_LABEL_CHARS: usize = 100;

/// 20-color categorical palette, indexed by type group
pub const GROUP_COLORS: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Builds [`GraphModel`]s. Pure: the same objects and config always give the
/// same nodes and edges in the same order.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    icons: IconTable,
    embedded_refs: EmbeddedRefTable,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            icons: IconTable::default(),
            embedded_refs: default_embedded_refs(),
        }
    }

    pub fn with_icons(mut self, icons: IconTable) -> Self {
        self.icons = icons;
        self
    }

    pub fn with_embedded_refs(mut self, embedded_refs: EmbeddedRefTable) -> Self {
        self.embedded_refs = embedded_refs;
        self
    }

    pub fn icons(&self) -> &IconTable {
        &self.icons
    }

    /// Build the graph of the given objects
    pub fn build(&self, objects: &[StixObject], config: &ViewConfig) -> GraphModel {
        let mut index: HashMap<String, StixObject> = HashMap::with_capacity(objects.len());
        let mut node_positions: HashMap<&str, usize> = HashMap::new();
        let mut node_objects: Vec<&StixObject> = Vec::new();

        // Pass 1: nodes. First occurrence fixes the position, last one wins the content.
        for object in objects {
            index.insert(object.id().to_string(), object.clone());

            if object.is_relationship() {
                continue;
            }
            match node_positions.get(object.id()) {
                Some(&pos) => {
                    debug!("Duplicate STIX id {}, keeping the later object", object.id());
                    node_objects[pos] = object;
                }
                None => {
                    node_positions.insert(object.id(), node_objects.len());
                    node_objects.push(object);
                }
            }
        }

        let mut labeler = Labeler::new(config);
        let mut type_groups: Vec<String> = Vec::new();
        let mut nodes = Vec::with_capacity(node_objects.len());

        for object in &node_objects {
            let stix_type = object.stix_type();
            let group = match type_groups.iter().position(|t| t == stix_type) {
                Some(group) => group,
                None => {
                    type_groups.push(stix_type.to_string());
                    type_groups.len() - 1
                }
            };

            nodes.push(GraphNode {
                id: object.id().to_string(),
                label: labeler.label_for(object),
                stix_type: stix_type.to_string(),
                icon_key: self.icon_key(stix_type, config),
                group,
                color: GROUP_COLORS[group % GROUP_COLORS.len()].to_string(),
            });
        }

        let mut edges = EdgeCollector {
            node_ids: node_positions.keys().copied().collect(),
            drop_dangling: config.drop_dangling_edges,
            edges: Vec::new(),
            warnings: Vec::new(),
        };

        // Pass 2: relationship objects, in bundle order
        for (position, object) in objects.iter().enumerate() {
            if !object.is_relationship() {
                continue;
            }

            let endpoints = (
                object.get_str("source_ref"),
                object.get_str("target_ref"),
                object.get_str("relationship_type"),
            );
            match endpoints {
                (Some(source), Some(target), Some(relationship_type)) => edges.push(
                    source,
                    target,
                    relationship_type,
                    EdgeOrigin::Relationship { id: object.id().to_string() },
                ),
                _ => edges.schema_warning(
                    position,
                    object.id(),
                    "relationship needs string 'source_ref', 'target_ref' and 'relationship_type'",
                ),
            }
        }

        // Pass 3: embedded references of node objects
        if config.embedded_refs {
            for object in &node_objects {
                self.collect_embedded(object, &mut edges);
            }
        }

        let EdgeCollector { edges, warnings, .. } = edges;
        debug!(
            "Built graph: {} nodes, {} edges, {} warnings",
            nodes.len(),
            edges.len(),
            warnings.len()
        );

        GraphModel::from_parts(nodes, edges, index, type_groups, warnings)
    }

    /// Build from normalizer output, carrying its warnings into the model
    pub fn build_normalized(&self, bundle: &NormalizedBundle, config: &ViewConfig) -> GraphModel {
        self.build(&bundle.objects, config)
            .with_leading_warnings(bundle.warnings.clone())
    }

    fn icon_key(&self, stix_type: &str, config: &ViewConfig) -> String {
        config
            .type_display(stix_type)
            .and_then(|display| display.display_icon)
            .unwrap_or_else(|| self.icons.icon_key(stix_type).to_string())
    }

    fn collect_embedded(&self, object: &StixObject, edges: &mut EdgeCollector<'_>) {
        for (property, value) in object.properties() {
            let Some(embedded) = self.embedded_refs.lookup(property) else {
                continue;
            };

            let refs: Vec<&str> = match value {
                Value::String(id) => vec![id.as_str()],
                Value::Array(ids) => ids.iter().filter_map(Value::as_str).collect(),
                _ => {
                    debug!("Ignoring non-reference value of {} on {}", property, object.id());
                    continue;
                }
            };

            for referent in refs {
                let (source, target) = if embedded.forward {
                    (object.id(), referent)
                } else {
                    (referent, object.id())
                };
                edges.push(
                    source,
                    target,
                    &embedded.relationship,
                    EdgeOrigin::Embedded { property: property.clone() },
                );
            }
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a graph with the bundled icon and embedded-reference tables
pub fn build_graph(objects: &[StixObject], config: &ViewConfig) -> GraphModel {
    GraphBuilder::new().build(objects, config)
}

struct EdgeCollector<'a> {
    node_ids: HashSet<&'a str>,
    drop_dangling: bool,
    edges: Vec<GraphEdge>,
    warnings: Vec<Warning>,
}

impl EdgeCollector<'_> {
    fn push(&mut self, source: &str, target: &str, relationship_type: &str, origin: EdgeOrigin) {
        let missing = [source, target].into_iter().find(|id| !self.node_ids.contains(id));

        if let Some(missing) = missing {
            let warning = Warning::DanglingReference {
                source: source.to_string(),
                target: target.to_string(),
                relationship_type: relationship_type.to_string(),
                missing: missing.to_string(),
                dropped: self.drop_dangling,
            };
            warn!("{}", warning);
            self.warnings.push(warning);

            if self.drop_dangling {
                return;
            }
        }

        self.edges.push(GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            relationship_type: relationship_type.to_string(),
            origin,
            dangling: missing.is_some(),
        });
    }

    fn schema_warning(&mut self, position: usize, id: &str, reason: &str) {
        let warning = Warning::Schema {
            position,
            id: Some(id.to_string()),
            reason: reason.to_string(),
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Computes unique node labels, in node order
struct Labeler<'c> {
    config: &'c ViewConfig,
    counts: HashMap<String, usize>,
    used: HashSet<String>,
}

impl<'c> Labeler<'c> {
    fn new(config: &'c ViewConfig) -> Self {
        Self {
            config,
            counts: HashMap::new(),
            used: HashSet::new(),
        }
    }

    fn label_for(&mut self, object: &StixObject) -> String {
        let base = truncate_label(&self.base_label(object));

        // Suffixed labels may collide with literal ones
        let count = self.counts.entry(base.clone()).or_insert(1);
        let mut label = base.clone();
        while self.used.contains(&label) {
            *count += 1;
            label = format!("{}({})", base, count);
        }

        self.used.insert(label.clone());
        label
    }

    fn base_label(&self, object: &StixObject) -> String {
        if let Some(label) = self.config.user_label(object.id()) {
            return label.to_string();
        }

        let display_property = self
            .config
            .type_display(object.stix_type())
            .and_then(|display| display.display_property);

        let label = display_property
            .as_deref()
            .into_iter()
            .chain(["name", "value", "path"])
            .find_map(|property| object.get_str(property).filter(|s| !s.is_empty()))
            .unwrap_or(object.stix_type())
            .to_string();
        label
    }
}

/// Cut a label to [`MAX_LABEL_CHARS`] characters, marking the cut with `...`
pub fn truncate_label(label: &str) -> String {
    match label.char_indices().nth(MAX_LABEL_CHARS) {
        Some((byte_pos, _)) => format!("{}...", &label[..byte_pos]),
        None => label.to_string(),
    }
}
