//! Model layer
//!
//! Resource kinds, identities and the keys the graph engine derives from them.

mod identity;
mod resource_kind;

pub use identity::{DedupKeyStrategy, ResourceIdentity, VisitedKey};
pub use resource_kind::{FetchFailurePolicy, ResourceKind};
