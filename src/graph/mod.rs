//! Dependency graph engine
//!
//! Starting from one root resource, discovers every resource transitively
//! related to it and renders the result as a node/edge [`Graph`] annotated
//! with per-resource health.
//!
//! The pieces, leaves first:
//! - [`status`] reduces condition lists to `(ok, message)`
//! - [`resolver`] holds one relationship rule per resource kind
//! - [`visited`] deduplicates nodes and breaks cycles
//! - [`model`] accumulates nodes and edges
//! - [`builder`] drives the depth-first traversal

pub mod age;
mod builder;
pub mod model;
pub mod resolver;
pub mod selector;
pub mod status;
pub mod visited;

pub use builder::{GraphBuilder, build_graph};
pub use model::{Graph, GraphEdge, GraphNode, NodeColor};
pub use status::ResourceStatus;
pub use visited::VisitedSet;

use crate::kube::ClusterError;
use crate::models::{DedupKeyStrategy, ResourceKind};
use std::time::Duration;

/// Errors that abort a traversal
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A resource or a listing needed to discover its relations could not be read
    #[error("unable to get related resources for {kind}")]
    Resolve {
        kind: ResourceKind,
        #[source]
        source: ClusterError,
    },

    #[error("graph construction timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl GraphError {
    pub fn resolve(kind: ResourceKind, source: ClusterError) -> Self {
        GraphError::Resolve { kind, source }
    }
}

/// Knobs for one traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    /// How identities collapse into nodes
    pub dedup_key: DedupKeyStrategy,
    /// Skip a relation category once any resource of that kind has been
    /// visited. Fewer cluster calls, but the graph may miss edges.
    pub skip_visited_kinds: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            dedup_key: DedupKeyStrategy::default(),
            skip_visited_kinds: true,
        }
    }
}
