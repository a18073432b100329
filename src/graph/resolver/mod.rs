//! Relationship resolver
//!
//! One rule function per resource kind. Given an identity, a rule fetches the
//! resource, computes its [`ResourceStatus`] and lists the identities of the
//! resources it directly relates to. The fetch-failure policy of the kind is
//! applied here, once, rather than inside each rule.

mod accounts;
mod network;
mod pod;
mod storage;
mod workloads;

use super::GraphError;
use super::selector::Labels;
use super::status::ResourceStatus;
use super::visited::VisitedSet;
use crate::kube::{ClusterApi, ClusterError};
use crate::models::{FetchFailurePolicy, ResourceIdentity, ResourceKind};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What a rule found out about one resource
#[derive(Debug, Clone)]
pub struct Resolution {
    pub status: ResourceStatus,
    /// Directly related resources, in rule-table order, duplicates allowed
    pub related: Vec<ResourceIdentity>,
}

impl Resolution {
    fn leaf(status: ResourceStatus) -> Self {
        Self {
            status,
            related: Vec::new(),
        }
    }
}

/// Read-only view of the traversal handed to each rule
pub struct ResolveContext<'a> {
    pub cluster: &'a dyn ClusterApi,
    pub visited: &'a VisitedSet,
    /// Skip a whole relation category once any resource of that kind was visited
    pub skip_visited_kinds: bool,
}

impl ResolveContext<'_> {
    /// Whether discovery of related `kind` resources is skipped for this call
    ///
    /// This saves listing calls but can leave out edges when the first visited
    /// resource of that kind was unrelated to the current one.
    fn skips(&self, kind: ResourceKind) -> bool {
        self.skip_visited_kinds && self.visited.has_visited_kind(kind)
    }
}

/// Resolve one identity
///
/// Returns `Ok(None)` for kinds without a rule; those are dead ends, not errors.
pub async fn resolve(
    cx: &ResolveContext<'_>,
    identity: &ResourceIdentity,
) -> Result<Option<Resolution>, GraphError> {
    let kind = identity.kind;
    if !kind.has_resolver() {
        return Ok(None);
    }

    let object = match cx
        .cluster
        .get(kind, &identity.namespace, &identity.name)
        .await
    {
        Ok(object) => object,
        Err(err) => match kind.fetch_failure_policy() {
            FetchFailurePolicy::MarkUnhealthy => {
                tracing::warn!("{} could not be fetched: {}", identity, err);
                return Ok(Some(Resolution::leaf(ResourceStatus::unavailable(
                    kind,
                    err.to_string(),
                ))));
            }
            FetchFailurePolicy::Abort => return Err(GraphError::resolve(kind, err)),
        },
    };

    let mut resolution = match kind {
        ResourceKind::Deployment => workloads::deployment(cx, identity, &object).await,
        ResourceKind::ReplicaSet => workloads::replica_set(cx, identity, &object).await,
        ResourceKind::HorizontalPodAutoscaler => Ok(workloads::autoscaler(&object)),
        ResourceKind::Pod => pod::pod(cx, identity, &object).await,
        ResourceKind::Service => network::service(cx, identity, &object).await,
        ResourceKind::Ingress => network::ingress(cx, identity, &object).await,
        ResourceKind::ServiceAccount => accounts::service_account(identity, &object),
        ResourceKind::PersistentVolumeClaim => Ok(storage::persistent_volume_claim(&object)),
        ResourceKind::ConfigMap => Ok(storage::config_map(&object)),
        ResourceKind::Secret => Ok(storage::secret(&object)),
        ResourceKind::NetworkPolicy | ResourceKind::PodDisruptionBudget => return Ok(None),
    }
    .map_err(|err| GraphError::resolve(kind, err))?;

    if kind.can_be_scale_target() {
        let autoscalers = workloads::autoscalers_targeting(cx, identity)
            .await
            .map_err(|err| GraphError::resolve(kind, err))?;
        resolution.related.extend(autoscalers);
    }

    tracing::debug!(
        "Resolved {} (ok: {}, related: {})",
        identity,
        resolution.status.is_ok(),
        resolution.related.len()
    );

    Ok(Some(resolution))
}

/// Name of an object reference, whichever way the API types model it
///
/// Some reference names are plain strings (empty when unset), others are
/// optional. Either way an empty name is treated as no reference.
trait RefName {
    fn ref_name(&self) -> Option<&str>;
}

impl RefName for String {
    fn ref_name(&self) -> Option<&str> {
        (!self.is_empty()).then_some(self.as_str())
    }
}

impl RefName for Option<String> {
    fn ref_name(&self) -> Option<&str> {
        self.as_deref().filter(|name| !name.is_empty())
    }
}

fn decode<K: DeserializeOwned>(kind: ResourceKind, object: &Value) -> Result<K, ClusterError> {
    serde_json::from_value(object.clone()).map_err(|error| ClusterError::Decode { kind, error })
}

fn decode_all<K: DeserializeOwned>(
    kind: ResourceKind,
    objects: Vec<Value>,
) -> Result<Vec<K>, ClusterError> {
    objects
        .into_iter()
        .map(|object| {
            serde_json::from_value(object).map_err(|error| ClusterError::Decode { kind, error })
        })
        .collect()
}

fn labels_of(meta: &ObjectMeta) -> Labels {
    meta.labels.clone().unwrap_or_default()
}

/// Identity of a listed object, falling back to the namespace it was listed in
fn identity_of(kind: ResourceKind, meta: &ObjectMeta, namespace: &str) -> ResourceIdentity {
    ResourceIdentity::new(
        kind,
        meta.namespace.as_deref().unwrap_or(namespace),
        meta.name.as_deref().unwrap_or_default(),
    )
}

fn owned_by(meta: &ObjectMeta, owner_kind: ResourceKind, owner_name: &str) -> bool {
    meta.owner_references
        .iter()
        .flatten()
        .any(|owner| owner.kind == owner_kind.as_str() && owner.name == owner_name)
}

/// Same as [`identity_of`] for objects kept as raw JSON
fn value_identity(kind: ResourceKind, object: &Value, namespace: &str) -> ResourceIdentity {
    let field = |pointer: &str| object.pointer(pointer).and_then(Value::as_str);
    ResourceIdentity::new(
        kind,
        field("/metadata/namespace").unwrap_or(namespace),
        field("/metadata/name").unwrap_or_default(),
    )
}
