//! Resource kind definitions
//!
//! This module provides a centralized enum for every Kubernetes kind the graph
//! engine knows about. Besides naming, each kind carries the small policy tables
//! the traversal consults: whether it can be expanded, what happens when it
//! cannot be fetched, and whether an autoscaler can target it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumeration of all resource kinds that can appear in a dependency graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    // apps/v1
    Deployment,
    ReplicaSet,
    // v1
    Pod,
    Service,
    ServiceAccount,
    PersistentVolumeClaim,
    ConfigMap,
    Secret,
    // networking.k8s.io/v1
    Ingress,
    NetworkPolicy,
    // autoscaling/v2
    HorizontalPodAutoscaler,
    // policy/v1
    PodDisruptionBudget,
}

/// What the resolver does when a resource's own fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailurePolicy {
    /// Abort the whole traversal with the fetch error
    Abort,
    /// Keep going and record the error text as an unhealthy status on the node
    MarkUnhealthy,
}

impl ResourceKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "Deployment",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::Pod => "Pod",
            ResourceKind::Service => "Service",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::NetworkPolicy => "NetworkPolicy",
            ResourceKind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            ResourceKind::PodDisruptionBudget => "PodDisruptionBudget",
        }
    }

    /// Lowercase plural used by the API server in URLs and error messages
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "deployments",
            ResourceKind::ReplicaSet => "replicasets",
            ResourceKind::Pod => "pods",
            ResourceKind::Service => "services",
            ResourceKind::ServiceAccount => "serviceaccounts",
            ResourceKind::PersistentVolumeClaim => "persistentvolumeclaims",
            ResourceKind::ConfigMap => "configmaps",
            ResourceKind::Secret => "secrets",
            ResourceKind::Ingress => "ingresses",
            ResourceKind::NetworkPolicy => "networkpolicies",
            ResourceKind::HorizontalPodAutoscaler => "horizontalpodautoscalers",
            ResourceKind::PodDisruptionBudget => "poddisruptionbudgets",
        }
    }

    /// Try to parse a string into a ResourceKind, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all resource kinds
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Deployment,
            ResourceKind::ReplicaSet,
            ResourceKind::Pod,
            ResourceKind::Service,
            ResourceKind::ServiceAccount,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::Ingress,
            ResourceKind::NetworkPolicy,
            ResourceKind::HorizontalPodAutoscaler,
            ResourceKind::PodDisruptionBudget,
        ]
    }

    /// Try to parse a string (case-insensitive) into a ResourceKind
    ///
    /// Accepts the kubectl short names and plurals as well.
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deployment" | "deployments" | "deploy" => Some(ResourceKind::Deployment),
            "replicaset" | "replicasets" | "rs" => Some(ResourceKind::ReplicaSet),
            "pod" | "pods" | "po" => Some(ResourceKind::Pod),
            "service" | "services" | "svc" => Some(ResourceKind::Service),
            "serviceaccount" | "serviceaccounts" | "sa" => Some(ResourceKind::ServiceAccount),
            "persistentvolumeclaim" | "persistentvolumeclaims" | "pvc" => {
                Some(ResourceKind::PersistentVolumeClaim)
            }
            "configmap" | "configmaps" | "cm" => Some(ResourceKind::ConfigMap),
            "secret" | "secrets" => Some(ResourceKind::Secret),
            "ingress" | "ingresses" | "ing" => Some(ResourceKind::Ingress),
            "networkpolicy" | "networkpolicies" | "netpol" => Some(ResourceKind::NetworkPolicy),
            "horizontalpodautoscaler" | "horizontalpodautoscalers" | "hpa" => {
                Some(ResourceKind::HorizontalPodAutoscaler)
            }
            "poddisruptionbudget" | "poddisruptionbudgets" | "pdb" => {
                Some(ResourceKind::PodDisruptionBudget)
            }
            _ => None,
        }
    }

    /// Whether the relationship resolver can expand this kind
    ///
    /// Kinds without a resolver still show up as edge targets, but expanding
    /// them is a no-op: no node, no further traversal.
    pub fn has_resolver(&self) -> bool {
        !matches!(
            self,
            ResourceKind::PodDisruptionBudget | ResourceKind::NetworkPolicy
        )
    }

    /// Per-kind policy applied when the resource itself cannot be fetched
    ///
    /// ConfigMaps and Secrets are often referenced before they exist, so a
    /// missing one is shown as an unhealthy node rather than failing the graph.
    pub fn fetch_failure_policy(&self) -> FetchFailurePolicy {
        match self {
            ResourceKind::ConfigMap | ResourceKind::Secret => FetchFailurePolicy::MarkUnhealthy,
            _ => FetchFailurePolicy::Abort,
        }
    }

    /// Whether a HorizontalPodAutoscaler can name this kind as its scale target
    pub fn can_be_scale_target(&self) -> bool {
        matches!(self, ResourceKind::Deployment | ResourceKind::ReplicaSet)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}
