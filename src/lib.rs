//! kubedag library
//!
//! This library provides the graph engine behind the kubedag binary. It can
//! be used both as a binary and as a library for testing.

pub mod cli;
pub mod config;
pub mod graph;
pub mod kube;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use graph::{Graph, GraphEdge, GraphError, GraphNode, GraphOptions, NodeColor, build_graph};
pub use kube::{ClusterApi, ClusterError, ClusterSnapshot};
pub use models::{DedupKeyStrategy, ResourceIdentity, ResourceKind};
