//! Status normalization
//!
//! Every resource kind reports health differently. This module reduces a
//! resource's condition list to a single `(ok, message)` pair and wraps it in a
//! [`ResourceStatus`] variant carrying the kind-specific fields shown on a node.

use super::age::{elapsed_time_short, parse_timestamp};
use crate::models::ResourceKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One entry of a resource's `status.conditions`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    pub type_: String,
    pub status: String,
    pub message: String,
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            type_: field("type"),
            status: field("status"),
            message: field("message"),
            last_transition_time: value
                .get("lastTransitionTime")
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
        }
    }
}

/// Read `status.conditions` from a raw object
pub fn conditions_of(object: &Value) -> Vec<Condition> {
    object
        .pointer("/status/conditions")
        .and_then(Value::as_array)
        .map(|conditions| conditions.iter().map(Condition::from_value).collect())
        .unwrap_or_default()
}

/// Pick the condition with the most recent transition
///
/// Conditions without a timestamp sort oldest. Among equally recent conditions
/// the one with the smallest type name wins, so the result does not depend on
/// the order the API server returned them in.
pub fn latest_condition(conditions: &[Condition]) -> Option<&Condition> {
    conditions.iter().max_by(|a, b| {
        a.last_transition_time
            .cmp(&b.last_transition_time)
            .then_with(|| b.type_.cmp(&a.type_))
    })
}

/// Interpret a condition status string
///
/// Accepts the usual boolean spellings. Anything else, including the
/// `Unknown` status, counts as healthy.
pub fn parse_condition_status(status: &str) -> bool {
    match status {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
        "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
        _ => true,
    }
}

/// Reduce a condition list to `(ok, message)`
///
/// No conditions means healthy. A healthy resource with an empty message gets
/// `"<Kind> is OK"`; an unhealthy one keeps whatever message it reported.
pub fn normalize(kind: ResourceKind, conditions: &[Condition]) -> (bool, String) {
    let (ok, message) = match latest_condition(conditions) {
        Some(condition) => (
            parse_condition_status(&condition.status),
            condition.message.clone(),
        ),
        None => (true, String::new()),
    };

    if ok && message.is_empty() {
        (ok, ok_message(kind))
    } else {
        (ok, message)
    }
}

fn ok_message(kind: ResourceKind) -> String {
    format!("{} is OK", kind)
}

/// Fields shared by every status variant
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StatusBase {
    pub ok: bool,
    pub namespace: String,
    pub created: String,
    pub message: String,
}

impl StatusBase {
    /// Status derived from the object's own conditions
    pub fn from_conditions(kind: ResourceKind, object: &Value) -> Self {
        let (ok, message) = normalize(kind, &conditions_of(object));
        Self {
            ok,
            message,
            ..Self::from_metadata(object)
        }
    }

    /// Status for kinds that have no conditions and are healthy whenever they exist
    pub fn existing(kind: ResourceKind, object: &Value) -> Self {
        Self {
            ok: true,
            message: ok_message(kind),
            ..Self::from_metadata(object)
        }
    }

    fn from_metadata(object: &Value) -> Self {
        let namespace = object
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let created = object
            .pointer("/metadata/creationTimestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .map(elapsed_time_short)
            .unwrap_or_default();
        Self {
            ok: true,
            namespace,
            created,
            message: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DeploymentStatus {
    #[serde(flatten)]
    pub base: StatusBase,
    pub deployment_strategy: String,
    /// `matchLabels` rendered as `key:value`
    pub selectors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReplicaSetStatus {
    #[serde(flatten)]
    pub base: StatusBase,
    pub current_replicas: String,
    pub desired_replicas: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PodStatus {
    #[serde(flatten)]
    pub base: StatusBase,
    pub service_account: String,
    pub node: String,
    /// Names of the pod's owners
    pub controlled_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ServiceStatus {
    #[serde(flatten)]
    pub base: StatusBase,
    pub session_affinity: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IngressStatus {
    #[serde(flatten)]
    pub base: StatusBase,
    pub default_backend: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AutoscalerStatus {
    #[serde(flatten)]
    pub base: StatusBase,
    /// `Kind/name` of the scaled resource
    pub scale_target: String,
}

/// Health of one resource, one variant per kind
///
/// Serialized untagged: the JSON object is the variant's fields, with the
/// shared [`StatusBase`] fields inlined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceStatus {
    Deployment(DeploymentStatus),
    ReplicaSet(ReplicaSetStatus),
    Pod(PodStatus),
    Service(ServiceStatus),
    ServiceAccount(StatusBase),
    PersistentVolumeClaim(StatusBase),
    ConfigMap(StatusBase),
    Secret(StatusBase),
    Ingress(IngressStatus),
    NetworkPolicy(StatusBase),
    HorizontalPodAutoscaler(AutoscalerStatus),
    PodDisruptionBudget(StatusBase),
}

impl ResourceStatus {
    /// Status of a resource that could not be fetched
    ///
    /// The namespace and age are unknown, so they stay empty.
    pub fn unavailable(kind: ResourceKind, message: impl Into<String>) -> Self {
        Self::with_base(
            kind,
            StatusBase {
                ok: false,
                message: message.into(),
                ..StatusBase::default()
            },
        )
    }

    /// Wrap a base status in the variant for `kind`, leaving kind-specific fields empty
    pub fn with_base(kind: ResourceKind, base: StatusBase) -> Self {
        match kind {
            ResourceKind::Deployment => ResourceStatus::Deployment(DeploymentStatus {
                base,
                ..Default::default()
            }),
            ResourceKind::ReplicaSet => ResourceStatus::ReplicaSet(ReplicaSetStatus {
                base,
                ..Default::default()
            }),
            ResourceKind::Pod => ResourceStatus::Pod(PodStatus {
                base,
                ..Default::default()
            }),
            ResourceKind::Service => ResourceStatus::Service(ServiceStatus {
                base,
                ..Default::default()
            }),
            ResourceKind::Ingress => ResourceStatus::Ingress(IngressStatus {
                base,
                ..Default::default()
            }),
            ResourceKind::HorizontalPodAutoscaler => {
                ResourceStatus::HorizontalPodAutoscaler(AutoscalerStatus {
                    base,
                    ..Default::default()
                })
            }
            ResourceKind::ServiceAccount => ResourceStatus::ServiceAccount(base),
            ResourceKind::PersistentVolumeClaim => ResourceStatus::PersistentVolumeClaim(base),
            ResourceKind::ConfigMap => ResourceStatus::ConfigMap(base),
            ResourceKind::Secret => ResourceStatus::Secret(base),
            ResourceKind::NetworkPolicy => ResourceStatus::NetworkPolicy(base),
            ResourceKind::PodDisruptionBudget => ResourceStatus::PodDisruptionBudget(base),
        }
    }

    pub fn base(&self) -> &StatusBase {
        match self {
            ResourceStatus::Deployment(s) => &s.base,
            ResourceStatus::ReplicaSet(s) => &s.base,
            ResourceStatus::Pod(s) => &s.base,
            ResourceStatus::Service(s) => &s.base,
            ResourceStatus::Ingress(s) => &s.base,
            ResourceStatus::HorizontalPodAutoscaler(s) => &s.base,
            ResourceStatus::ServiceAccount(base)
            | ResourceStatus::PersistentVolumeClaim(base)
            | ResourceStatus::ConfigMap(base)
            | ResourceStatus::Secret(base)
            | ResourceStatus::NetworkPolicy(base)
            | ResourceStatus::PodDisruptionBudget(base) => base,
        }
    }

    /// Whether the resource is healthy
    pub fn is_ok(&self) -> bool {
        self.base().ok
    }

    pub fn message(&self) -> &str {
        &self.base().message
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceStatus::Deployment(_) => ResourceKind::Deployment,
            ResourceStatus::ReplicaSet(_) => ResourceKind::ReplicaSet,
            ResourceStatus::Pod(_) => ResourceKind::Pod,
            ResourceStatus::Service(_) => ResourceKind::Service,
            ResourceStatus::ServiceAccount(_) => ResourceKind::ServiceAccount,
            ResourceStatus::PersistentVolumeClaim(_) => ResourceKind::PersistentVolumeClaim,
            ResourceStatus::ConfigMap(_) => ResourceKind::ConfigMap,
            ResourceStatus::Secret(_) => ResourceKind::Secret,
            ResourceStatus::Ingress(_) => ResourceKind::Ingress,
            ResourceStatus::NetworkPolicy(_) => ResourceKind::NetworkPolicy,
            ResourceStatus::HorizontalPodAutoscaler(_) => ResourceKind::HorizontalPodAutoscaler,
            ResourceStatus::PodDisruptionBudget(_) => ResourceKind::PodDisruptionBudget,
        }
    }
}
