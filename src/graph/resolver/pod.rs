//! Pods and everything they mount, reference or are selected by

use super::{
    RefName, ResolveContext, Resolution, decode, decode_all, identity_of, labels_of,
    value_identity,
};
use crate::graph::selector::{label_selector_matches, map_selector_matches};
use crate::graph::status::{PodStatus, ResourceStatus, StatusBase};
use crate::kube::ClusterError;
use crate::models::{ResourceIdentity, ResourceKind};
use k8s_openapi::api::core::v1::{Container, Pod, Service, Volume};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use serde_json::Value;

pub(super) async fn pod(
    cx: &ResolveContext<'_>,
    identity: &ResourceIdentity,
    object: &Value,
) -> Result<Resolution, ClusterError> {
    let kind = ResourceKind::Pod;
    let pod: Pod = decode(kind, object)?;
    let spec = pod.spec.unwrap_or_default();
    let namespace = identity.namespace.as_str();

    let status = ResourceStatus::Pod(PodStatus {
        base: StatusBase::from_conditions(kind, object),
        service_account: spec.service_account_name.clone().unwrap_or_default(),
        node: spec.node_name.clone().unwrap_or_default(),
        controlled_by: pod
            .metadata
            .owner_references
            .iter()
            .flatten()
            .map(|owner| owner.name.clone())
            .collect(),
    });

    let mut refs = References::new(namespace);
    for volume in spec.volumes.iter().flatten() {
        refs.volume(volume);
    }
    for container in spec.containers.iter().chain(spec.init_containers.iter().flatten()) {
        refs.container(container);
    }
    if let Some(name) = spec.service_account_name.ref_name() {
        refs.push(ResourceKind::ServiceAccount, name);
    }
    let mut related = refs.into_identities();

    let (services, budgets, policies) = futures::try_join!(
        cx.cluster.list(ResourceKind::Service, namespace, None),
        cx.cluster
            .list(ResourceKind::PodDisruptionBudget, namespace, None),
        cx.cluster.list(ResourceKind::NetworkPolicy, namespace, None),
    )?;

    let labels = labels_of(&pod.metadata);

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

    // Selectors are read from raw JSON; only the selector shape matters here
    for budget in &budgets {
        if label_selector_matches(selector_at(budget, "/spec/selector").as_ref(), &labels) {
            related.push(value_identity(
                ResourceKind::PodDisruptionBudget,
                budget,
                namespace,
            ));
        }
    }

    for policy in &policies {
        if label_selector_matches(selector_at(policy, "/spec/podSelector").as_ref(), &labels) {
            related.push(value_identity(
                ResourceKind::NetworkPolicy,
                policy,
                namespace,
            ));
        }
    }

    Ok(Resolution { status, related })
}

fn selector_at(object: &Value, pointer: &str) -> Option<LabelSelector> {
    object
        .pointer(pointer)
        .filter(|selector| !selector.is_null())
        .cloned()
        .and_then(|selector| serde_json::from_value(selector).ok())
}

/// Claims, secrets and config maps a pod spec refers to, in declaration order
struct References<'a> {
    namespace: &'a str,
    found: Vec<(ResourceKind, String)>,
}

impl<'a> References<'a> {
    fn new(namespace: &'a str) -> Self {
        Self {
            namespace,
            found: Vec::new(),
        }
    }

    fn push(&mut self, kind: ResourceKind, name: &str) {
        self.found.push((kind, name.to_string()));
    }

    fn volume(&mut self, volume: &Volume) {
        if let Some(name) = volume
            .persistent_volume_claim
            .as_ref()
            .and_then(|claim| claim.claim_name.ref_name())
        {
            self.push(ResourceKind::PersistentVolumeClaim, name);
        }
        if let Some(name) = volume
            .secret
            .as_ref()
            .and_then(|secret| secret.secret_name.ref_name())
        {
            self.push(ResourceKind::Secret, name);
        }
        if let Some(name) = volume
            .config_map
            .as_ref()
            .and_then(|config_map| config_map.name.ref_name())
        {
            self.push(ResourceKind::ConfigMap, name);
        }
        let projections = volume
            .projected
            .as_ref()
            .and_then(|projected| projected.sources.as_ref());
        for projection in projections.into_iter().flatten() {
            if let Some(name) = projection
                .config_map
                .as_ref()
                .and_then(|config_map| config_map.name.ref_name())
            {
                self.push(ResourceKind::ConfigMap, name);
            }
            if let Some(name) = projection
                .secret
                .as_ref()
                .and_then(|secret| secret.name.ref_name())
            {
                self.push(ResourceKind::Secret, name);
            }
        }
    }

    fn container(&mut self, container: &Container) {
        for source in container.env_from.iter().flatten() {
            if let Some(name) = source
                .config_map_ref
                .as_ref()
                .and_then(|config_map| config_map.name.ref_name())
            {
                self.push(ResourceKind::ConfigMap, name);
            }
            if let Some(name) = source
                .secret_ref
                .as_ref()
                .and_then(|secret| secret.name.ref_name())
            {
                self.push(ResourceKind::Secret, name);
            }
        }

        let value_sources = container
            .env
            .iter()
            .flatten()
            .filter_map(|var| var.value_from.as_ref());
        for source in value_sources {
            if let Some(name) = source
                .config_map_key_ref
                .as_ref()
                .and_then(|key| key.name.ref_name())
            {
                self.push(ResourceKind::ConfigMap, name);
            }
            if let Some(name) = source
                .secret_key_ref
                .as_ref()
                .and_then(|key| key.name.ref_name())
            {
                self.push(ResourceKind::Secret, name);
            }
        }
    }

    fn into_identities(self) -> Vec<ResourceIdentity> {
        self.found
            .into_iter()
            .map(|(kind, name)| ResourceIdentity::new(kind, self.namespace, name))
            .collect()
    }
}
