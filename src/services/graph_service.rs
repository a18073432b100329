//! Graph service
//!
//! Sits between the CLI and the graph engine. Owns the cluster handle, the
//! traversal options and the caller-side timeout that bounds a whole
//! traversal (individual cluster calls are not cancelled on their own).

use crate::graph::{Graph, GraphBuilder, GraphError, GraphOptions};
use crate::kube::ClusterApi;
use crate::models::ResourceIdentity;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// Service for building dependency graphs
pub struct GraphService {
    cluster: Arc<dyn ClusterApi>,
    options: GraphOptions,
    timeout: Option<Duration>,
}

impl GraphService {
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self {
            cluster,
            options: GraphOptions::default(),
            timeout: None,
        }
    }

    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    /// Bound the whole traversal; `None` waits forever
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the dependency graph rooted at `root`
    pub async fn build_graph(&self, root: &ResourceIdentity) -> Result<Graph> {
        tracing::debug!(
            "Building graph for {} (dedup key: {}, skip visited kinds: {})",
            root,
            self.options.dedup_key,
            self.options.skip_visited_kinds
        );

        let builder = GraphBuilder::new(self.cluster.as_ref()).with_options(self.options);
        let traversal = builder.build(root.clone());

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, traversal).await {
                Ok(result) => result,
                Err(_) => Err(GraphError::Timeout(limit)),
            },
            None => traversal.await,
        };

        result.with_context(|| format!("Failed to build dependency graph for {}", root))
    }
}
