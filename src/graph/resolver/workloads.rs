//! Deployments, ReplicaSets and the autoscalers that scale them

use super::{
    RefName, ResolveContext, Resolution, decode, decode_all, identity_of, labels_of, owned_by,
    value_identity,
};
use crate::graph::selector::map_selector_matches;
use crate::graph::status::{
    AutoscalerStatus, DeploymentStatus, ReplicaSetStatus, ResourceStatus, StatusBase,
};
use crate::kube::ClusterError;
use crate::models::{ResourceIdentity, ResourceKind};
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::{PodTemplateSpec, Service};
use serde_json::Value;

pub(super) async fn deployment(
    cx: &ResolveContext<'_>,
    identity: &ResourceIdentity,
    object: &Value,
) -> Result<Resolution, ClusterError> {
    let kind = ResourceKind::Deployment;
    let deployment: Deployment = decode(kind, object)?;
    let spec = deployment.spec.unwrap_or_default();
    let namespace = identity.namespace.as_str();

    let status = ResourceStatus::Deployment(DeploymentStatus {
        base: StatusBase::from_conditions(kind, object),
        deployment_strategy: spec
            .strategy
            .as_ref()
            .and_then(|strategy| strategy.type_.clone())
            .unwrap_or_default(),
        selectors: spec
            .selector
            .match_labels
            .iter()
            .flatten()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect(),
    });

    let skip_replica_sets = cx.skips(ResourceKind::ReplicaSet);
    let (replica_sets, service_account, services) = futures::try_join!(
        async {
            if skip_replica_sets {
                Ok(Vec::new())
            } else {
                cx.cluster
                    .list(ResourceKind::ReplicaSet, namespace, None)
                    .await
            }
        },
        template_service_account(cx, namespace, Some(&spec.template)),
        cx.cluster.list(ResourceKind::Service, namespace, None),
    )?;

    let mut related = Vec::new();

    // Scaled-down ReplicaSets from old rollouts are left out
    for replica_set in decode_all::<ReplicaSet>(ResourceKind::ReplicaSet, replica_sets)? {
        let replicas = replica_set
            .spec
            .as_ref()
            .and_then(|spec| spec.replicas)
            .unwrap_or(1);
        if replicas > 0 && owned_by(&replica_set.metadata, kind, &identity.name) {
            related.push(identity_of(
                ResourceKind::ReplicaSet,
                &replica_set.metadata,
                namespace,
            ));
        }
    }

    related.extend(service_account);

    let labels = labels_of(&deployment.metadata);
    for service in decode_all::<Service>(ResourceKind::Service, services)? {
        let selector = service.spec.as_ref().and_then(|spec| spec.selector.as_ref());
        if map_selector_matches(selector, &labels) {
            related.push(identity_of(
                ResourceKind::Service,
                &service.metadata,
                namespace,
            ));
        }
    }

    Ok(Resolution { status, related })
}

pub(super) async fn replica_set(
    cx: &ResolveContext<'_>,
    identity: &ResourceIdentity,
    object: &Value,
) -> Result<Resolution, ClusterError> {
    let kind = ResourceKind::ReplicaSet;
    let replica_set: ReplicaSet = decode(kind, object)?;
    let namespace = identity.namespace.as_str();

    let current = object
        .pointer("/status/replicas")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let desired = replica_set
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(1);

    let status = ResourceStatus::ReplicaSet(ReplicaSetStatus {
        base: StatusBase::from_conditions(kind, object),
        current_replicas: current.to_string(),
        desired_replicas: desired.to_string(),
    });

    let mut related = Vec::new();

    if !cx.skips(ResourceKind::Deployment) {
        let owners = replica_set
            .metadata
            .owner_references
            .iter()
            .flatten()
            .filter(|owner| owner.kind == ResourceKind::Deployment.as_str());
        for owner in owners {
            let deployment = cx
                .cluster
                .get(ResourceKind::Deployment, namespace, &owner.name)
                .await?;
            related.push(value_identity(
                ResourceKind::Deployment,
                &deployment,
                namespace,
            ));
        }
    }

    let template = replica_set.spec.as_ref().and_then(|spec| spec.template.as_ref());
    let (pods, service_account) = futures::try_join!(
        cx.cluster.list(ResourceKind::Pod, namespace, None),
        template_service_account(cx, namespace, template),
    )?;

    for pod in pods {
        let owned = pod
            .pointer("/metadata/ownerReferences")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .any(|owner| {
                owner.get("kind").and_then(Value::as_str) == Some(kind.as_str())
                    && owner.get("name").and_then(Value::as_str) == Some(identity.name.as_str())
            });
        if owned {
            related.push(value_identity(ResourceKind::Pod, &pod, namespace));
        }
    }

    related.extend(service_account);

    Ok(Resolution { status, related })
}

/// Fetch the service account named by a pod template
///
/// The account is fetched rather than assumed, so a template naming a missing
/// account fails the traversal.
async fn template_service_account(
    cx: &ResolveContext<'_>,
    namespace: &str,
    template: Option<&PodTemplateSpec>,
) -> Result<Option<ResourceIdentity>, ClusterError> {
    let name = template
        .and_then(|template| template.spec.as_ref())
        .and_then(|spec| spec.service_account_name.ref_name());
    let Some(name) = name else {
        return Ok(None);
    };

    let account = cx
        .cluster
        .get(ResourceKind::ServiceAccount, namespace, name)
        .await?;
    Ok(Some(value_identity(
        ResourceKind::ServiceAccount,
        &account,
        namespace,
    )))
}

/// HorizontalPodAutoscalers whose scale target is this resource
///
/// Read from raw JSON so both `autoscaling/v1` and `autoscaling/v2` objects match.
pub(super) async fn autoscalers_targeting(
    cx: &ResolveContext<'_>,
    identity: &ResourceIdentity,
) -> Result<Vec<ResourceIdentity>, ClusterError> {
    let autoscalers = cx
        .cluster
        .list(
            ResourceKind::HorizontalPodAutoscaler,
            &identity.namespace,
            None,
        )
        .await?;

    Ok(autoscalers
        .iter()
        .filter(|hpa| {
            let target = |field: &str| {
                hpa.pointer(&format!("/spec/scaleTargetRef/{}", field))
                    .and_then(Value::as_str)
            };
            target("kind") == Some(identity.kind.as_str())
                && target("name") == Some(identity.name.as_str())
        })
        .map(|hpa| {
            value_identity(
                ResourceKind::HorizontalPodAutoscaler,
                hpa,
                &identity.namespace,
            )
        })
        .collect())
}

/// Status-only rule for autoscalers
pub(super) fn autoscaler(object: &Value) -> Resolution {
    let target = |field: &str| {
        object
            .pointer(&format!("/spec/scaleTargetRef/{}", field))
            .and_then(Value::as_str)
            .unwrap_or_default()
    };
    let scale_target = match (target("kind"), target("name")) {
        ("", "") => String::new(),
        (kind, name) => format!("{}/{}", kind, name),
    };

    Resolution::leaf(ResourceStatus::HorizontalPodAutoscaler(AutoscalerStatus {
        base: StatusBase::from_conditions(ResourceKind::HorizontalPodAutoscaler, object),
        scale_target,
    }))
}
