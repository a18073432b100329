//! Visited set for one traversal

use crate::models::{DedupKeyStrategy, ResourceIdentity, ResourceKind, VisitedKey};
use std::collections::{HashMap, HashSet};

/// Identities already expanded, plus how many of each kind
///
/// The per-kind counters are updated in the same call that inserts a key, so
/// "has any Pod been visited" is a lookup rather than a scan.
#[derive(Debug, Default)]
pub struct VisitedSet {
    strategy: DedupKeyStrategy,
    keys: HashSet<VisitedKey>,
    per_kind: HashMap<ResourceKind, usize>,
}

impl VisitedSet {
    pub fn new(strategy: DedupKeyStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Record an identity; returns false if it was already present
    pub fn insert(&mut self, identity: &ResourceIdentity) -> bool {
        let inserted = self.keys.insert(self.strategy.visited_key(identity));
        if inserted {
            *self.per_kind.entry(identity.kind).or_default() += 1;
        }
        inserted
    }

    pub fn contains(&self, identity: &ResourceIdentity) -> bool {
        self.keys.contains(&self.strategy.visited_key(identity))
    }

    /// Whether any resource of `kind` has been visited so far
    pub fn has_visited_kind(&self, kind: ResourceKind) -> bool {
        self.visited_of_kind(kind) > 0
    }

    pub fn visited_of_kind(&self, kind: ResourceKind) -> usize {
        self.per_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_counters() {
        let mut visited = VisitedSet::new(DedupKeyStrategy::KindName);
        let pod = ResourceIdentity::new(ResourceKind::Pod, "prod", "web-1");

        assert!(!visited.has_visited_kind(ResourceKind::Pod));
        assert!(visited.insert(&pod));
        assert!(!visited.insert(&pod));
        assert!(visited.contains(&pod));
        assert!(visited.has_visited_kind(ResourceKind::Pod));
        assert_eq!(visited.visited_of_kind(ResourceKind::Pod), 1);
        assert!(!visited.has_visited_kind(ResourceKind::Service));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_strategy_decides_namespace_collisions() {
        let prod = ResourceIdentity::new(ResourceKind::ReplicaSet, "prod", "rs-a");
        let dev = ResourceIdentity::new(ResourceKind::ReplicaSet, "dev", "rs-a");

        let mut by_name = VisitedSet::new(DedupKeyStrategy::KindName);
        by_name.insert(&prod);
        assert!(by_name.contains(&dev));
        assert!(!by_name.insert(&dev));
        assert_eq!(by_name.visited_of_kind(ResourceKind::ReplicaSet), 1);

        let mut by_namespace = VisitedSet::new(DedupKeyStrategy::KindNamespaceName);
        by_namespace.insert(&prod);
        assert!(!by_namespace.contains(&dev));
        assert!(by_namespace.insert(&dev));
        assert_eq!(by_namespace.visited_of_kind(ResourceKind::ReplicaSet), 2);
    }
}
