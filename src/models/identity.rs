//! Resource identities and the keys derived from them

use super::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names one concrete cluster resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
}

impl ResourceIdentity {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// Key used to deduplicate nodes during a traversal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisitedKey {
    pub kind: ResourceKind,
    pub namespace: Option<String>,
    pub name: String,
}

/// How identities collapse into graph nodes
///
/// `KindName` ignores the namespace, so two resources of the same kind and name
/// in different namespaces share one node. That is the historical behavior and
/// stays the default; `KindNamespaceName` keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DedupKeyStrategy {
    #[default]
    KindName,
    KindNamespaceName,
}

impl DedupKeyStrategy {
    pub fn visited_key(&self, identity: &ResourceIdentity) -> VisitedKey {
        VisitedKey {
            kind: identity.kind,
            namespace: match self {
                DedupKeyStrategy::KindName => None,
                DedupKeyStrategy::KindNamespaceName => Some(identity.namespace.clone()),
            },
            name: identity.name.clone(),
        }
    }

    /// Node id shared by node creation and edge creation
    pub fn node_id(&self, identity: &ResourceIdentity) -> String {
        match self {
            DedupKeyStrategy::KindName => format!("{}-{}", identity.name, identity.kind),
            DedupKeyStrategy::KindNamespaceName => {
                format!("{}/{}-{}", identity.namespace, identity.name, identity.kind)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DedupKeyStrategy::KindName => "kindName",
            DedupKeyStrategy::KindNamespaceName => "kindNamespaceName",
        }
    }

    /// Parse either the config spelling (`kindName`) or the CLI spelling (`kind-name`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "kindname" => Some(DedupKeyStrategy::KindName),
            "kindnamespacename" => Some(DedupKeyStrategy::KindNamespaceName),
            _ => None,
        }
    }
}

impl fmt::Display for DedupKeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
