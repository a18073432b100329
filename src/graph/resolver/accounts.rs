//! ServiceAccounts and the secrets they carry

use super::{RefName, Resolution, decode};
use crate::graph::status::{ResourceStatus, StatusBase};
use crate::kube::ClusterError;
use crate::models::{ResourceIdentity, ResourceKind};
use k8s_openapi::api::core::v1::ServiceAccount;
use serde_json::Value;

/// Token secrets first, then image pull secrets
///
/// A token secret reference without a namespace lives next to the account.
pub(super) fn service_account(
    identity: &ResourceIdentity,
    object: &Value,
) -> Result<Resolution, ClusterError> {
    let kind = ResourceKind::ServiceAccount;
    let account: ServiceAccount = decode(kind, object)?;
    let namespace = account
        .metadata
        .namespace
        .as_deref()
        .unwrap_or(&identity.namespace);

    let secrets = account.secrets.iter().flatten().filter_map(|secret| {
        let name = secret.name.ref_name()?;
        let secret_namespace = secret.namespace.ref_name().unwrap_or(namespace);
        Some(ResourceIdentity::new(
            ResourceKind::Secret,
            secret_namespace,
            name,
        ))
    });
    let pull_secrets = account
        .image_pull_secrets
        .iter()
        .flatten()
        .filter_map(|secret| secret.name.ref_name())
        .map(|name| ResourceIdentity::new(ResourceKind::Secret, namespace, name));

    Ok(Resolution {
        status: ResourceStatus::ServiceAccount(StatusBase::existing(kind, object)),
        related: secrets.chain(pull_secrets).collect(),
    })
}
