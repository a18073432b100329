//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides the
//! [`ClusterApi`] seam the graph engine reads cluster state through.
//!
//! Two implementations are provided:
//! - [`KubeCluster`] talks to a live API server through `kube::Client`
//! - [`ClusterSnapshot`] serves objects loaded from YAML/JSON manifests

mod cluster;
mod snapshot;

pub use cluster::{ClusterApi, ClusterError, KubeCluster};
#[cfg(test)]
pub use cluster::MockClusterApi;
pub use snapshot::ClusterSnapshot;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;
    tracing::debug!("Connecting to cluster at {}", config.cluster_url);
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Initialize a client for a named kubeconfig context
pub async fn create_client_for_context(context: &str) -> Result<Client> {
    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let config = Config::from_kubeconfig(&options)
        .await
        .with_context(|| format!("Failed to load kubeconfig context '{}'", context))?;
    tracing::debug!(
        "Connecting to cluster at {} (context {})",
        config.cluster_url,
        context
    );
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Get the current Kubernetes context name
///
/// Falls back to "in-cluster" when no kubeconfig can be read, which is the
/// case when running inside a pod.
pub fn current_context() -> String {
    Kubeconfig::read()
        .ok()
        .and_then(|kubeconfig| kubeconfig.current_context)
        .unwrap_or_else(|| "in-cluster".to_string())
}
