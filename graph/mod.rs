/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Graph data structures for the workflow editor.
//!
//! Core structures:
//! - `Graph`: Main graph container backed by petgraph::StableGraph
//! - `Node`: Workflow step with position, label, kind, and configuration
//! - `EdgeLink`: Identity payload for a connection between two steps
//!
//! Boundary: topology mutators are `pub(crate)` — the editor app is the
//! single write path so every mutation can be classified for history.

use std::collections::{BTreeMap, HashMap};

use euclid::default::Point2D;
use log::warn;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::types::{PersistedEdge, PersistedNode, WorkflowDocument};

/// Stable node handle (petgraph NodeIndex — survives other deletions)
pub type NodeKey = NodeIndex;

/// Stable edge handle (petgraph EdgeIndex)
pub type EdgeKey = EdgeIndex;

/// The closed set of workflow step kinds.
///
/// Each kind carries its palette metadata, display color, and default
/// configuration record, so adding a kind is a compile-time-checked change
/// rather than a stringly-typed fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    Wait,
    Call,
    Video,
    Email,
    #[serde(rename = "HTTP")]
    Http,
    Code,
    Document,
    Chat,
}

impl StepKind {
    /// Every kind, in palette order.
    pub const ALL: [StepKind; 8] = [
        StepKind::Wait,
        StepKind::Call,
        StepKind::Video,
        StepKind::Email,
        StepKind::Http,
        StepKind::Code,
        StepKind::Document,
        StepKind::Chat,
    ];

    /// Display name; also the default label of a freshly added step.
    pub fn name(self) -> &'static str {
        match self {
            StepKind::Wait => "Wait",
            StepKind::Call => "Call",
            StepKind::Video => "Video",
            StepKind::Email => "Email",
            StepKind::Http => "HTTP",
            StepKind::Code => "Code",
            StepKind::Document => "Document",
            StepKind::Chat => "Chat",
        }
    }

    /// Palette category.
    pub fn category(self) -> &'static str {
        match self {
            StepKind::Wait => "Flow Control",
            StepKind::Call | StepKind::Email | StepKind::Chat => "Communication",
            StepKind::Video => "Media",
            StepKind::Http => "Integration",
            StepKind::Code => "Programming",
            StepKind::Document => "Data",
        }
    }

    /// One-line palette description.
    pub fn description(self) -> &'static str {
        match self {
            StepKind::Wait => "Wait for a specified duration",
            StepKind::Call => "Make an API call",
            StepKind::Video => "Process video content",
            StepKind::Email => "Send an email",
            StepKind::Http => "Make HTTP requests",
            StepKind::Code => "Execute custom code",
            StepKind::Document => "Process documents",
            StepKind::Chat => "Send chat messages",
        }
    }

    /// Display color (CSS hex) used by the canvas and minimap.
    pub fn color(self) -> &'static str {
        match self {
            StepKind::Wait => "#3b82f6",
            StepKind::Call => "#10b981",
            StepKind::Video => "#ef4444",
            StepKind::Email => "#f59e0b",
            StepKind::Http => "#8b5cf6",
            StepKind::Code => "#06b6d4",
            StepKind::Document => "#84cc16",
            StepKind::Chat => "#ec4899",
        }
    }

    /// Default configuration record for a freshly added step of this kind.
    pub fn default_config(self) -> BTreeMap<String, ConfigValue> {
        let mut config = BTreeMap::new();
        match self {
            StepKind::Wait => {
                config.insert("duration".to_string(), ConfigValue::Number(1000.0));
                config.insert("unit".to_string(), ConfigValue::Text("ms".to_string()));
            },
            StepKind::Call => {
                config.insert("url".to_string(), ConfigValue::Text(String::new()));
                config.insert("method".to_string(), ConfigValue::Text("GET".to_string()));
            },
            StepKind::Video => {
                config.insert("source".to_string(), ConfigValue::Text(String::new()));
                config.insert("autoplay".to_string(), ConfigValue::Bool(false));
            },
            StepKind::Email
            | StepKind::Http
            | StepKind::Code
            | StepKind::Document
            | StepKind::Chat => {},
        }
        config
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive configuration value.
///
/// Untagged so documents carry plain JSON primitives, matching what the form
/// layer edits: checkboxes, number inputs, and text inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// A workflow step node in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable node identity.
    pub id: Uuid,

    /// Position in canvas space
    pub position: Point2D<f32>,

    /// User-editable display label (defaults to the kind's name)
    pub label: String,

    /// Step kind
    pub kind: StepKind,

    /// Per-step configuration (seeded from the kind's defaults)
    pub config: BTreeMap<String, ConfigValue>,
}

/// Edge identity payload. Endpoints live in the graph topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLink {
    pub id: Uuid,
}

/// Read-only view of an edge (built from petgraph edge references)
#[derive(Debug, Clone, Copy)]
pub struct EdgeView {
    pub key: EdgeKey,
    pub id: Uuid,
    pub source: NodeKey,
    pub target: NodeKey,
}

/// Main graph structure backed by petgraph::StableGraph
#[derive(Clone)]
pub struct Graph {
    /// The underlying petgraph stable graph
    inner: StableGraph<Node, EdgeLink, Directed>,

    /// Stable UUID to node mapping.
    id_to_node: HashMap<Uuid, NodeKey>,

    /// Stable UUID to edge mapping.
    id_to_edge: HashMap<Uuid, EdgeKey>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            inner: StableGraph::new(),
            id_to_node: HashMap::new(),
            id_to_edge: HashMap::new(),
        }
    }

    // Single-write-path boundary: topology mutators are crate-internal so
    // every mutation flows through the editor app and its history policy.

    /// Add a new step node to the graph
    pub(crate) fn add_node(&mut self, kind: StepKind, position: Point2D<f32>) -> NodeKey {
        self.add_node_with_id(Uuid::new_v4(), kind, position)
    }

    /// Add a node with a pre-existing UUID (document restore path).
    pub(crate) fn add_node_with_id(
        &mut self,
        id: Uuid,
        kind: StepKind,
        position: Point2D<f32>,
    ) -> NodeKey {
        let key = self.inner.add_node(Node {
            id,
            position,
            label: kind.name().to_string(),
            kind,
            config: kind.default_config(),
        });
        self.id_to_node.insert(id, key);
        key
    }

    /// Remove a node and all its connected edges.
    ///
    /// The cascade is atomic with the node removal: incident edges are gone
    /// from both the topology and the id index before this returns, so the
    /// graph never observably contains a dangling edge.
    pub(crate) fn remove_node(&mut self, key: NodeKey) -> bool {
        if !self.inner.contains_node(key) {
            return false;
        }
        let incident: Vec<Uuid> = self
            .inner
            .edges_directed(key, Direction::Outgoing)
            .chain(self.inner.edges_directed(key, Direction::Incoming))
            .map(|edge| edge.weight().id)
            .collect();
        for edge_id in incident {
            self.id_to_edge.remove(&edge_id);
        }
        if let Some(node) = self.inner.remove_node(key) {
            self.id_to_node.remove(&node.id);
            true
        } else {
            false
        }
    }

    /// Update a node's position. Returns false if the node doesn't exist.
    pub(crate) fn set_node_position(&mut self, key: NodeKey, position: Point2D<f32>) -> bool {
        let Some(node) = self.inner.node_weight_mut(key) else {
            return false;
        };
        node.position = position;
        true
    }

    /// Update a node's display label.
    pub(crate) fn set_node_label(&mut self, key: NodeKey, label: String) -> bool {
        let Some(node) = self.inner.node_weight_mut(key) else {
            return false;
        };
        node.label = label;
        true
    }

    /// Set one configuration field on a node.
    pub(crate) fn set_config_value(
        &mut self,
        key: NodeKey,
        field: &str,
        value: ConfigValue,
    ) -> bool {
        let Some(node) = self.inner.node_weight_mut(key) else {
            return false;
        };
        node.config.insert(field.to_string(), value);
        true
    }

    /// Add an edge between two step nodes.
    ///
    /// Rejected (returns `None`) when either endpoint is missing, when the
    /// connection is a self-loop, or when the directed pair already exists.
    pub(crate) fn add_edge(&mut self, source: NodeKey, target: NodeKey) -> Option<EdgeKey> {
        self.add_edge_with_id(Uuid::new_v4(), source, target)
    }

    /// Add an edge with a pre-existing UUID (document restore path).
    pub(crate) fn add_edge_with_id(
        &mut self,
        id: Uuid,
        source: NodeKey,
        target: NodeKey,
    ) -> Option<EdgeKey> {
        if source == target
            || !self.inner.contains_node(source)
            || !self.inner.contains_node(target)
        {
            return None;
        }
        if self.inner.find_edge(source, target).is_some() {
            return None;
        }
        let key = self.inner.add_edge(source, target, EdgeLink { id });
        self.id_to_edge.insert(id, key);
        Some(key)
    }

    /// Remove an edge by key.
    pub(crate) fn remove_edge(&mut self, key: EdgeKey) -> bool {
        if let Some(link) = self.inner.remove_edge(key) {
            self.id_to_edge.remove(&link.id);
            true
        } else {
            false
        }
    }

    /// Get a node by key
    pub fn get_node(&self, key: NodeKey) -> Option<&Node> {
        self.inner.node_weight(key)
    }

    /// Get a mutable node by key
    pub(crate) fn get_node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.inner.node_weight_mut(key)
    }

    /// Get a node by UUID.
    pub fn get_node_by_id(&self, id: Uuid) -> Option<(NodeKey, &Node)> {
        let key = *self.id_to_node.get(&id)?;
        Some((key, self.inner.node_weight(key)?))
    }

    /// Get node key by UUID.
    pub fn get_node_key_by_id(&self, id: Uuid) -> Option<NodeKey> {
        self.id_to_node.get(&id).copied()
    }

    /// Get an edge view by key.
    pub fn get_edge(&self, key: EdgeKey) -> Option<EdgeView> {
        let link = self.inner.edge_weight(key)?;
        let (source, target) = self.inner.edge_endpoints(key)?;
        Some(EdgeView {
            key,
            id: link.id,
            source,
            target,
        })
    }

    /// Get edge key by UUID.
    pub fn get_edge_key_by_id(&self, id: Uuid) -> Option<EdgeKey> {
        self.id_to_edge.get(&id).copied()
    }

    /// Find the directed edge key between two nodes.
    pub fn find_edge_key(&self, source: NodeKey, target: NodeKey) -> Option<EdgeKey> {
        self.inner.find_edge(source, target)
    }

    /// Check if a directed edge exists from `source` to `target`
    pub fn has_edge_between(&self, source: NodeKey, target: NodeKey) -> bool {
        self.inner.find_edge(source, target).is_some()
    }

    /// Iterate over all nodes as (key, node) pairs
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.inner
            .node_indices()
            .map(move |idx| (idx, &self.inner[idx]))
    }

    /// Iterate over all edges as EdgeView
    pub fn edges(&self) -> impl Iterator<Item = EdgeView> + '_ {
        self.inner.edge_references().map(|e| EdgeView {
            key: e.id(),
            id: e.weight().id,
            source: e.source(),
            target: e.target(),
        })
    }

    /// Count of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Count of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Serialize the graph to a persistable document, capture-stamped now.
    pub fn to_document(&self) -> WorkflowDocument {
        let nodes = self
            .nodes()
            .map(|(_, node)| PersistedNode {
                node_id: node.id.to_string(),
                kind: node.kind,
                label: node.label.clone(),
                position_x: node.position.x,
                position_y: node.position.y,
                config: node.config.clone(),
            })
            .collect();

        let edges = self
            .edges()
            .map(|edge| {
                let source_node_id = self
                    .get_node(edge.source)
                    .map(|n| n.id.to_string())
                    .unwrap_or_default();
                let target_node_id = self
                    .get_node(edge.target)
                    .map(|n| n.id.to_string())
                    .unwrap_or_default();
                PersistedEdge {
                    edge_id: edge.id.to_string(),
                    source_node_id,
                    target_node_id,
                }
            })
            .collect();

        WorkflowDocument::new(nodes, edges)
    }

    /// Rebuild a graph from a persisted document.
    ///
    /// Nodes with unparseable ids are skipped; edges whose endpoints are
    /// missing (or whose own id is unparseable) are dropped, so the
    /// edge-references-present-nodes invariant holds for any input.
    pub fn from_document(document: &WorkflowDocument) -> Self {
        let mut graph = Graph::new();

        for pnode in &document.nodes {
            let Ok(node_id) = Uuid::parse_str(&pnode.node_id) else {
                warn!("Skipping persisted node with invalid id: {}", pnode.node_id);
                continue;
            };
            let key = graph.add_node_with_id(
                node_id,
                pnode.kind,
                Point2D::new(pnode.position_x, pnode.position_y),
            );
            if let Some(node) = graph.get_node_mut(key) {
                node.label = pnode.label.clone();
                if !pnode.config.is_empty() {
                    node.config = pnode.config.clone();
                }
            }
        }

        for pedge in &document.edges {
            let edge_id = Uuid::parse_str(&pedge.edge_id).ok();
            let source = Uuid::parse_str(&pedge.source_node_id)
                .ok()
                .and_then(|id| graph.get_node_key_by_id(id));
            let target = Uuid::parse_str(&pedge.target_node_id)
                .ok()
                .and_then(|id| graph.get_node_key_by_id(id));
            match (edge_id, source, target) {
                (Some(id), Some(source), Some(target)) => {
                    let _ = graph.add_edge_with_id(id, source, target);
                },
                _ => {
                    warn!(
                        "Dropping persisted edge {} -> {}: unknown endpoint or invalid id",
                        pedge.source_node_id, pedge.target_node_id
                    );
                },
            }
        }

        graph
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
