//! Graph data models for STIX visualization

use crate::error::Warning;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Type name of STIX Relationship Objects
pub const RELATIONSHIP_TYPE: &str = "relationship";

/// Type name of STIX bundles
pub const BUNDLE_TYPE: &str = "bundle";

/// A STIX object: a JSON mapping guaranteed to carry string `type` and `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct StixObject(Map<String, Value>);

impl StixObject {
    /// STIX id, `<type>--<uuid>`
    pub fn id(&self) -> &str {
        self.get_str("id").unwrap_or_default()
    }

    /// STIX type
    pub fn stix_type(&self) -> &str {
        self.get_str("type").unwrap_or_default()
    }

    pub fn is_relationship(&self) -> bool {
        self.stix_type() == RELATIONSHIP_TYPE
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a property only if it is a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// All properties, in key order
    pub fn properties(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl TryFrom<Value> for StixObject {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(format!("expected a JSON object, got {}", json_kind(&other))),
        };

        for key in ["type", "id"] {
            match map.get(key) {
                Some(Value::String(s)) if !s.is_empty() => {}
                Some(_) => return Err(format!("property '{}' must be a non-empty string", key)),
                None => return Err(format!("missing required property '{}'", key)),
            }
        }

        Ok(StixObject(map))
    }
}

impl From<StixObject> for Value {
    fn from(object: StixObject) -> Self {
        Value::Object(object.0)
    }
}

/// Human-readable name of a JSON value's kind, for error messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A graph node derived from one non-relationship STIX object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub stix_type: String,
    /// Icon filename, relative to the configured icon directory
    pub icon_key: String,
    /// Type group index, in order of first appearance of the type
    pub group: usize,
    /// Color class derived from the group
    pub color: String,
}

/// Where an edge came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeOrigin {
    /// A STIX Relationship Object
    Relationship { id: String },
    /// An embedded reference property such as `created_by_ref`
    Embedded { property: String },
}

/// A directed, typed graph edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relationship_type: String,
    pub origin: EdgeOrigin,
    /// True if source or target is not a node of the graph
    pub dangling: bool,
}

impl GraphEdge {
    pub fn is_embedded(&self) -> bool {
        matches!(self.origin, EdgeOrigin::Embedded { .. })
    }
}

/// Incoming and outgoing edges of a node
#[derive(Debug, Clone, Default)]
pub struct Connections<'a> {
    pub incoming: Vec<&'a GraphEdge>,
    pub outgoing: Vec<&'a GraphEdge>,
}

impl Connections<'_> {
    pub fn len(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Typed graph of one bundle: nodes, edges and the id to object index.
///
/// Constructed fresh by [`crate::GraphBuilder`] and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    /// node id -> position in `nodes`
    node_index: HashMap<String, usize>,
    /// STIX id -> object, relationships included
    objects: HashMap<String, StixObject>,
    /// node id -> indices into `edges` touching the node
    adjacency: HashMap<String, SmallVec<[usize; 8]>>,
    /// STIX types of nodes, indexed by group
    type_groups: Vec<String>,
    warnings: Vec<Warning>,
}

impl GraphModel {
    pub(crate) fn from_parts(
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        objects: HashMap<String, StixObject>,
        type_groups: Vec<String>,
        warnings: Vec<Warning>,
    ) -> Self {
        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id.clone(), pos))
            .collect();

        let mut adjacency: HashMap<String, SmallVec<[usize; 8]>> = HashMap::new();
        for (index, edge) in edges.iter().enumerate() {
            adjacency.entry(edge.source.clone()).or_insert_with(SmallVec::new).push(index);
            if edge.target != edge.source {
                adjacency.entry(edge.target.clone()).or_insert_with(SmallVec::new).push(index);
            }
        }

        Self {
            nodes,
            edges,
            node_index,
            objects,
            adjacency,
            type_groups,
            warnings,
        }
    }

    pub(crate) fn with_leading_warnings(mut self, mut warnings: Vec<Warning>) -> Self {
        warnings.append(&mut self.warnings);
        self.warnings = warnings;
        self
    }

    /// Nodes in insertion (bundle) order
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Look up the full STIX object behind a node or edge
    pub fn object(&self, id: &str) -> Option<&StixObject> {
        self.objects.get(id)
    }

    /// Every indexed object, relationships included, in no particular order
    pub fn objects(&self) -> impl Iterator<Item = &StixObject> {
        self.objects.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Distinct node types, in group order
    pub fn type_groups(&self) -> &[String] {
        &self.type_groups
    }

    /// Non-fatal issues found while normalizing and building
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn dangling_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.dangling).count()
    }

    /// Edges touching the given node, split by direction
    pub fn connections(&self, id: &str) -> Connections<'_> {
        let mut connections = Connections::default();

        if let Some(indices) = self.adjacency.get(id) {
            for &index in indices {
                let edge = &self.edges[index];
                if edge.source == id {
                    connections.outgoing.push(edge);
                }
                if edge.target == id {
                    connections.incoming.push(edge);
                }
            }
        }

        connections
    }

    /// Nodes whose label contains the keyword, in node order
    pub fn search(&self, keyword: &str) -> Vec<&GraphNode> {
        if keyword.is_empty() {
            return Vec::new();
        }
        self.nodes.iter().filter(|n| n.label.contains(keyword)).collect()
    }

    pub fn nodes_of_type<'a>(&'a self, stix_type: &'a str) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.nodes.iter().filter(move |n| n.stix_type == stix_type)
    }
}
