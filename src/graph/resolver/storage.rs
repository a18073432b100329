//! Leaf kinds: claims, config maps and secrets

use super::Resolution;
use crate::graph::status::{ResourceStatus, StatusBase};
use crate::models::ResourceKind;
use serde_json::Value;

pub(super) fn persistent_volume_claim(object: &Value) -> Resolution {
    let kind = ResourceKind::PersistentVolumeClaim;
    Resolution::leaf(ResourceStatus::PersistentVolumeClaim(
        StatusBase::from_conditions(kind, object),
    ))
}

pub(super) fn config_map(object: &Value) -> Resolution {
    let kind = ResourceKind::ConfigMap;
    Resolution::leaf(ResourceStatus::ConfigMap(StatusBase::existing(kind, object)))
}

pub(super) fn secret(object: &Value) -> Resolution {
    let kind = ResourceKind::Secret;
    Resolution::leaf(ResourceStatus::Secret(StatusBase::existing(kind, object)))
}
