//! Services and the Ingresses routing to them

use super::{RefName, ResolveContext, Resolution, decode, decode_all, identity_of, labels_of};
use crate::graph::selector::{format_map_selector, map_selector_matches};
use crate::graph::status::{IngressStatus, ResourceStatus, ServiceStatus, StatusBase};
use crate::kube::ClusterError;
use crate::models::{ResourceIdentity, ResourceKind};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressBackend, IngressSpec};
use serde_json::Value;

pub(super) async fn service(
    cx: &ResolveContext<'_>,
    identity: &ResourceIdentity,
    object: &Value,
) -> Result<Resolution, ClusterError> {
    let kind = ResourceKind::Service;
    let service: Service = decode(kind, object)?;
    let spec = service.spec.unwrap_or_default();
    let namespace = identity.namespace.as_str();

    let status = ResourceStatus::Service(ServiceStatus {
        base: StatusBase::from_conditions(kind, object),
        session_affinity: spec.session_affinity.clone().unwrap_or_default(),
    });

    let mut related = Vec::new();

    if !cx.skips(ResourceKind::Ingress) {
        let ingresses = cx
            .cluster
            .list(ResourceKind::Ingress, namespace, None)
            .await?;
        for ingress in decode_all::<Ingress>(ResourceKind::Ingress, ingresses)? {
            let routes_here = ingress
                .spec
                .as_ref()
                .is_some_and(|spec| backend_services(spec).any(|name| name == identity.name));
            if routes_here {
                related.push(identity_of(
                    ResourceKind::Ingress,
                    &ingress.metadata,
                    namespace,
                ));
            }
        }
    }

    // Selected workloads are listed with the selector and checked again
    // locally, so a selector-less Service never pulls in the whole namespace.
    // An empty selector map selects nothing here, although an empty label
    // selector on a list call would match every object.
    let selector = spec.selector.as_ref().filter(|selector| !selector.is_empty());

    if let Some(selector) = selector.filter(|_| !cx.skips(ResourceKind::Pod)) {
        let pods = cx
            .cluster
            .list(ResourceKind::Pod, namespace, Some(format_map_selector(selector)))
            .await?;
        for pod in decode_all::<Pod>(ResourceKind::Pod, pods)? {
            if map_selector_matches(Some(selector), &labels_of(&pod.metadata)) {
                related.push(identity_of(ResourceKind::Pod, &pod.metadata, namespace));
            }
        }
    }

    if let Some(selector) = selector.filter(|_| !cx.skips(ResourceKind::Deployment)) {
        let deployments = cx
            .cluster
            .list(
                ResourceKind::Deployment,
                namespace,
                Some(format_map_selector(selector)),
            )
            .await?;
        for deployment in decode_all::<Deployment>(ResourceKind::Deployment, deployments)? {
            if map_selector_matches(Some(selector), &labels_of(&deployment.metadata)) {
                related.push(identity_of(
                    ResourceKind::Deployment,
                    &deployment.metadata,
                    namespace,
                ));
            }
        }
    }

    Ok(Resolution { status, related })
}

pub(super) async fn ingress(
    cx: &ResolveContext<'_>,
    identity: &ResourceIdentity,
    object: &Value,
) -> Result<Resolution, ClusterError> {
    let kind = ResourceKind::Ingress;
    let ingress: Ingress = decode(kind, object)?;
    let spec = ingress.spec.unwrap_or_default();
    let namespace = identity.namespace.as_str();

    let status = ResourceStatus::Ingress(IngressStatus {
        base: StatusBase::existing(kind, object),
        default_backend: spec
            .default_backend
            .as_ref()
            .and_then(backend_service)
            .unwrap_or_default()
            .to_string(),
    });

    let mut related = Vec::new();

    if !cx.skips(ResourceKind::Service) {
        related.extend(
            backend_services(&spec)
                .map(|name| ResourceIdentity::new(ResourceKind::Service, namespace, name)),
        );
    }

    if !cx.skips(ResourceKind::Secret) {
        related.extend(
            spec.tls
                .iter()
                .flatten()
                .filter_map(|tls| tls.secret_name.ref_name())
                .map(|name| ResourceIdentity::new(ResourceKind::Secret, namespace, name)),
        );
    }

    Ok(Resolution { status, related })
}

fn backend_service(backend: &IngressBackend) -> Option<&str> {
    backend
        .service
        .as_ref()
        .and_then(|service| service.name.ref_name())
}

/// Service names an Ingress routes to: every rule path in order, then the
/// default backend. Rules without an `http` block route nowhere.
fn backend_services(spec: &IngressSpec) -> impl Iterator<Item = &str> {
    let paths = spec
        .rules
        .iter()
        .flatten()
        .filter_map(|rule| rule.http.as_ref())
        .flat_map(|http| http.paths.iter());

    paths
        .filter_map(|path| backend_service(&path.backend))
        .chain(spec.default_backend.as_ref().and_then(backend_service))
}
