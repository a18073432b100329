//! Configuration system for kubedag
//!
//! A single YAML file in the config directory, overridden by `KUBEDAG_*`
//! environment variables and finally by command-line flags.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, GraphConfig, LoggerConfig, OutputConfig};

use crate::models::DedupKeyStrategy;

/// Every key accepted by [`get_config_value`] and [`set_config_value`]
pub const CONFIG_KEYS: &[&str] = &[
    "defaultNamespace",
    "graph.dedupKey",
    "graph.skipVisitedKinds",
    "graph.timeoutSeconds",
    "output.pretty",
    "logger.level",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "graph.dedupKey" => Ok(config.graph.dedup_key.to_string()),
        "graph.skipVisitedKinds" => Ok(config.graph.skip_visited_kinds.to_string()),
        "graph.timeoutSeconds" => Ok(config.graph.timeout_seconds.to_string()),
        "output.pretty" => Ok(config.output.pretty.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "graph.dedupKey" => {
            config.graph.dedup_key = DedupKeyStrategy::parse(value).ok_or_else(|| {
                anyhow::anyhow!("graph.dedupKey must be 'kindName' or 'kindNamespaceName'")
            })?;
        }
        "graph.skipVisitedKinds" => {
            config.graph.skip_visited_kinds = value
                .parse()
                .context("graph.skipVisitedKinds must be 'true' or 'false'")?;
        }
        "graph.timeoutSeconds" => {
            config.graph.timeout_seconds = value
                .parse()
                .context("graph.timeoutSeconds must be a non-negative number")?;
        }
        "output.pretty" => {
            config.output.pretty = value
                .parse()
                .context("output.pretty must be 'true' or 'false'")?;
        }
        "logger.level" => {
            tracing_subscriber::EnvFilter::try_new(value)
                .with_context(|| format!("logger.level '{}' is not a valid log filter", value))?;
            config.logger.level = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
