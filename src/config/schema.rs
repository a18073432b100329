//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use crate::graph::GraphOptions;
use crate::models::DedupKeyStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace used when none is given on the command line.
    /// Empty means the namespace of the current kubeconfig context.
    #[serde(default)]
    pub default_namespace: String,

    /// Traversal configuration
    #[serde(default)]
    pub graph: GraphConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Traversal configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    /// How resources collapse into nodes (kindName or kindNamespaceName)
    #[serde(default)]
    pub dedup_key: DedupKeyStrategy,

    /// Skip a relation category once any resource of that kind was visited
    #[serde(default = "default_true")]
    pub skip_visited_kinds: bool,

    /// Upper bound for a whole traversal, 0 disables it
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Pretty-print the JSON document
    #[serde(default = "default_true")]
    pub pretty: bool,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Filter used when RUST_LOG is not set (e.g. "warn", "kubedag=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl GraphConfig {
    pub fn options(&self) -> GraphOptions {
        GraphOptions {
            dedup_key: self.dedup_key,
            skip_visited_kinds: self.skip_visited_kinds,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            dedup_key: DedupKeyStrategy::default(),
            skip_visited_kinds: default_true(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_true(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
