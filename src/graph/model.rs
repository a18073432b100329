//! Graph data structures for visualizing resource relationships
//!
//! This module provides the node/edge document handed to a graph-rendering
//! client. Nodes are keyed by id; edges reference those ids.

use super::status::ResourceStatus;
use serde::Serialize;
use std::collections::HashMap;

/// Fill color of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeColor {
    #[serde(rename = "#63f828")]
    Healthy,
    #[serde(rename = "#f10909")]
    Unhealthy,
}

impl NodeColor {
    /// Color for a status, unhealthy exactly when the status is not ok
    pub fn for_status(status: &ResourceStatus) -> Self {
        if status.is_ok() {
            NodeColor::Healthy
        } else {
            NodeColor::Unhealthy
        }
    }

    pub fn as_hex(&self) -> &'static str {
        match self {
            NodeColor::Healthy => "#63f828",
            NodeColor::Unhealthy => "#f10909",
        }
    }
}

/// A node in the resource graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Unique identifier for the node, also used by edges
    pub id: String,
    /// Resource name
    pub title: String,
    /// Resource kind
    pub description: String,
    pub color: NodeColor,
    pub status: ResourceStatus,
}

/// A directed edge from a resource to one it relates to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    /// Source node ID
    pub source: String,
    /// Target node ID
    pub target: String,
}

/// A graph representing resource relationships
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    /// All nodes in the graph, in visitation order
    pub nodes: Vec<GraphNode>,
    /// All edges in the graph, duplicates included
    pub edges: Vec<GraphEdge>,
    /// Map from node ID to index in nodes vector
    #[serde(skip)]
    node_index: HashMap<String, usize>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: GraphNode) {
        let id = node.id.clone();
        let index = self.nodes.len();
        self.node_index.insert(id, index);
        self.nodes.push(node);
    }

    /// Add an edge to the graph
    pub fn add_edge(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.edges.push(GraphEdge {
            source: source.into(),
            target: target.into(),
        });
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&index| &self.nodes[index])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Edges whose target has no node (kinds that are never expanded)
    pub fn dangling_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges
            .iter()
            .filter(|edge| !self.contains_node(&edge.target))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
