//! Cluster API client seam
//!
//! Resolvers only ever see resources as JSON values returned by a
//! [`ClusterApi`]; they decode them into `k8s-openapi` types themselves.
//! One round trip per call, no batching, no retries.

use crate::models::ResourceKind;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{
    ConfigMap, PersistentVolumeClaim, Pod, Secret, Service, ServiceAccount,
};
use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::Api;
use kube::api::ListParams;
use serde_json::Value;

/// Errors returned by cluster reads
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("{} \"{name}\" not found", .kind.plural())]
    NotFound {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },

    #[error("{kind} request failed: {error}")]
    Api {
        kind: ResourceKind,
        error: kube::Error,
    },

    #[error("failed to decode {kind}: {error}")]
    Decode {
        kind: ResourceKind,
        error: serde_json::Error,
    },

    #[error("invalid cluster snapshot: {0}")]
    Snapshot(String),
}

/// Read access to cluster state
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fetch one resource by kind, namespace and name
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Value, ClusterError>;

    /// List resources of a kind in a namespace, optionally filtered by an
    /// equality-based label selector such as `app=web,tier=frontend`
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
        label_selector: Option<String>,
    ) -> Result<Vec<Value>, ClusterError>;
}

/// [`ClusterApi`] backed by a live API server
#[derive(Clone)]
pub struct KubeCluster {
    client: kube::Client,
}

impl KubeCluster {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Value, ClusterError> {
        let client = self.client.clone();
        tracing::debug!("GET {} {}/{}", kind, namespace, name);

        macro_rules! get_value {
            ($type:ty) => {{
                let api: Api<$type> = Api::namespaced(client, namespace);
                let object = api
                    .get(name)
                    .await
                    .map_err(|error| ClusterError::Api { kind, error })?;
                serde_json::to_value(&object).map_err(|error| ClusterError::Decode { kind, error })
            }};
        }

        match kind {
            ResourceKind::Deployment => get_value!(Deployment),
            ResourceKind::ReplicaSet => get_value!(ReplicaSet),
            ResourceKind::Pod => get_value!(Pod),
            ResourceKind::Service => get_value!(Service),
            ResourceKind::ServiceAccount => get_value!(ServiceAccount),
            ResourceKind::PersistentVolumeClaim => get_value!(PersistentVolumeClaim),
            ResourceKind::ConfigMap => get_value!(ConfigMap),
            ResourceKind::Secret => get_value!(Secret),
            ResourceKind::Ingress => get_value!(Ingress),
            ResourceKind::NetworkPolicy => get_value!(NetworkPolicy),
            ResourceKind::HorizontalPodAutoscaler => get_value!(HorizontalPodAutoscaler),
            ResourceKind::PodDisruptionBudget => get_value!(PodDisruptionBudget),
        }
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
        label_selector: Option<String>,
    ) -> Result<Vec<Value>, ClusterError> {
        let client = self.client.clone();
        tracing::debug!(
            "LIST {} in {} (selector: {:?})",
            kind,
            namespace,
            label_selector
        );

        let mut params = ListParams::default();
        if let Some(selector) = label_selector.as_deref() {
            params = params.labels(selector);
        }

        macro_rules! list_values {
            ($type:ty) => {{
                let api: Api<$type> = Api::namespaced(client, namespace);
                let list = api
                    .list(&params)
                    .await
                    .map_err(|error| ClusterError::Api { kind, error })?;
                list.items
                    .iter()
                    .map(|item| {
                        serde_json::to_value(item)
                            .map_err(|error| ClusterError::Decode { kind, error })
                    })
                    .collect()
            }};
        }

        match kind {
            ResourceKind::Deployment => list_values!(Deployment),
            ResourceKind::ReplicaSet => list_values!(ReplicaSet),
            ResourceKind::Pod => list_values!(Pod),
            ResourceKind::Service => list_values!(Service),
            ResourceKind::ServiceAccount => list_values!(ServiceAccount),
            ResourceKind::PersistentVolumeClaim => list_values!(PersistentVolumeClaim),
            ResourceKind::ConfigMap => list_values!(ConfigMap),
            ResourceKind::Secret => list_values!(Secret),
            ResourceKind::Ingress => list_values!(Ingress),
            ResourceKind::NetworkPolicy => list_values!(NetworkPolicy),
            ResourceKind::HorizontalPodAutoscaler => list_values!(HorizontalPodAutoscaler),
            ResourceKind::PodDisruptionBudget => list_values!(PodDisruptionBudget),
        }
    }
}
