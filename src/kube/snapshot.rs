//! In-memory cluster backed by manifests
//!
//! Loads resources from multi-document YAML or JSON (including `kind: List`
//! wrappers) and answers `get`/`list` the way the API server would. Used for
//! offline graphs (`kubedag graph --from-file`) and throughout the tests.

use super::cluster::{ClusterApi, ClusterError};
use crate::models::ResourceKind;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_NAMESPACE: &str = "default";

type ObjectKey = (ResourceKind, String, String);

/// Cluster state held in memory
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    objects: BTreeMap<ObjectKey, Value>,
}

impl ClusterSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from already-parsed objects
    pub fn from_objects(objects: impl IntoIterator<Item = Value>) -> Result<Self, ClusterError> {
        let mut snapshot = Self::new();
        for object in objects {
            snapshot.insert(object)?;
        }
        Ok(snapshot)
    }

    /// Parse one or more YAML (or JSON) documents separated by `---`
    pub fn from_yaml_str(text: &str) -> Result<Self, ClusterError> {
        let mut snapshot = Self::new();
        for document in serde_yaml::Deserializer::from_str(text) {
            let value = Value::deserialize(document)
                .map_err(|e| ClusterError::Snapshot(format!("failed to parse document: {}", e)))?;
            if value.is_null() {
                continue;
            }
            snapshot.insert(value)?;
        }
        Ok(snapshot)
    }

    /// Read manifests from a file
    pub async fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading cluster snapshot from file: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        let snapshot = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to load manifests from file: {:?}", path))?;

        tracing::debug!(
            "Loaded {} objects from file: {:?}",
            snapshot.len(),
            path
        );

        Ok(snapshot)
    }

    /// Add an object, replacing any previous object with the same identity
    ///
    /// `List` objects are flattened. Kinds the graph engine does not know are
    /// skipped.
    pub fn insert(&mut self, object: Value) -> Result<(), ClusterError> {
        let kind_name = object
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| ClusterError::Snapshot("object is missing kind".to_string()))?;

        if let Some(item_kind) = kind_name.strip_suffix("List") {
            let items = object
                .get("items")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for mut item in items {
                // Typed lists (PodList, ...) may omit kind on their items
                if let Value::Object(fields) = &mut item {
                    if !item_kind.is_empty() && !fields.contains_key("kind") {
                        fields.insert("kind".to_string(), Value::from(item_kind));
                    }
                }
                self.insert(item)?;
            }
            return Ok(());
        }

        let Some(kind) = ResourceKind::parse_optional(kind_name) else {
            tracing::debug!("Skipping unsupported kind in snapshot: {}", kind_name);
            return Ok(());
        };

        let name = object
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ClusterError::Snapshot(format!("{} is missing metadata.name", kind_name))
            })?
            .to_string();
        let namespace = object
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NAMESPACE)
            .to_string();

        self.objects.insert((kind, namespace, name), object);
        Ok(())
    }

    /// Number of objects held
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ClusterApi for ClusterSnapshot {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Value, ClusterError> {
        self.objects
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::NotFound {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
        label_selector: Option<String>,
    ) -> Result<Vec<Value>, ClusterError> {
        let requirements = label_selector
            .as_deref()
            .map(parse_selector)
            .unwrap_or_default();

        Ok(self
            .objects
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && ns == namespace)
            .filter(|(_, object)| {
                let labels = object
                    .pointer("/metadata/labels")
                    .and_then(Value::as_object);
                requirements.iter().all(|req| req.matches(labels))
            })
            .map(|(_, object)| object.clone())
            .collect())
    }
}

/// One clause of an equality-based selector
#[derive(Debug, PartialEq)]
enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    Exists(String),
}

impl Requirement {
    fn matches(&self, labels: Option<&serde_json::Map<String, Value>>) -> bool {
        let label = |key: &str| labels.and_then(|l| l.get(key)).and_then(Value::as_str);
        match self {
            Requirement::Equals(key, value) => label(key) == Some(value.as_str()),
            Requirement::NotEquals(key, value) => label(key) != Some(value.as_str()),
            Requirement::Exists(key) => label(key).is_some(),
        }
    }
}

fn parse_selector(selector: &str) -> Vec<Requirement> {
    selector
        .split(',')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .map(|clause| {
            if let Some((key, value)) = clause.split_once("!=") {
                Requirement::NotEquals(key.trim().to_string(), value.trim().to_string())
            } else if let Some((key, value)) = clause
                .split_once("==")
                .or_else(|| clause.split_once('='))
            {
                Requirement::Equals(key.trim().to_string(), value.trim().to_string())
            } else {
                Requirement::Exists(clause.to_string())
            }
        })
        .collect()
}
