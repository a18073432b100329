//! Graph builder
//!
//! Drives the traversal: resolve an identity, add its node and edges, mark it
//! visited, then expand its related identities depth-first. The traversal uses
//! an explicit stack instead of recursion, so deep ownership chains cannot
//! exhaust the call stack. Related identities are pushed in reverse, which pops
//! them in the order the resolver returned them and reproduces recursive
//! depth-first order exactly.

use super::model::{Graph, GraphNode, NodeColor};
use super::resolver::{self, ResolveContext};
use super::visited::VisitedSet;
use super::{GraphError, GraphOptions};
use crate::kube::ClusterApi;
use crate::models::ResourceIdentity;

/// Builds one dependency graph per call to [`GraphBuilder::build`]
pub struct GraphBuilder<'a> {
    cluster: &'a dyn ClusterApi,
    options: GraphOptions,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(cluster: &'a dyn ClusterApi) -> Self {
        Self {
            cluster,
            options: GraphOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the graph rooted at `root`
    ///
    /// All or nothing: the first fatal error aborts the traversal and no
    /// partial graph is returned. Visited state lives only for this call.
    pub async fn build(&self, root: ResourceIdentity) -> Result<Graph, GraphError> {
        let strategy = self.options.dedup_key;
        let mut visited = VisitedSet::new(strategy);
        let mut graph = Graph::new();
        let mut stack = vec![root];

        while let Some(identity) = stack.pop() {
            if visited.contains(&identity) {
                continue;
            }

            let cx = ResolveContext {
                cluster: self.cluster,
                visited: &visited,
                skip_visited_kinds: self.options.skip_visited_kinds,
            };
            let Some(resolution) = resolver::resolve(&cx, &identity).await? else {
                tracing::debug!("No relationship rule for {}, not expanding", identity);
                continue;
            };

            let id = strategy.node_id(&identity);
            for related in &resolution.related {
                graph.add_edge(id.clone(), strategy.node_id(related));
            }
            graph.add_node(GraphNode {
                id,
                title: identity.name.clone(),
                description: resolution.status.kind().to_string(),
                color: NodeColor::for_status(&resolution.status),
                status: resolution.status,
            });

            visited.insert(&identity);
            stack.extend(resolution.related.into_iter().rev());
        }

        tracing::info!(
            "Built graph with {} nodes and {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );

        Ok(graph)
    }
}

/// Build a graph with default options
pub async fn build_graph(
    cluster: &dyn ClusterApi,
    root: ResourceIdentity,
) -> Result<Graph, GraphError> {
    GraphBuilder::new(cluster).build(root).await
}
