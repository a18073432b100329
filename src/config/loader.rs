//! Configuration loading
//!
//! Handles loading configuration from the config file and the environment
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use crate::models::DedupKeyStrategy;
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers applied
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    ///
    /// Command-line flags are applied on top by the caller.
    pub fn load() -> Result<Config> {
        let root_path = paths::root_config_path();
        let config = if root_path.exists() {
            Self::load_file(&root_path)?
        } else {
            Self::load_defaults()
        };

        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the config file at `path`
    ///
    /// Fails on unreadable files, invalid YAML, invalid value types and
    /// log levels that are not valid tracing filters. A missing file is valid.
    pub fn validate(path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let config = Self::load_file(path)?;

        tracing_subscriber::EnvFilter::try_new(&config.logger.level).with_context(|| {
            format!(
                "logger.level '{}' is not a valid log filter",
                config.logger.level
            )
        })?;

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply `KUBEDAG_*` overrides read through `lookup`
    ///
    /// A value that does not parse is an error naming the variable, so a typo
    /// never silently falls back to the file or the defaults.
    pub fn apply_overrides(
        mut config: Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Config> {
        if let Some(namespace) = lookup("KUBEDAG_DEFAULT_NAMESPACE") {
            config.default_namespace = namespace;
        }

        if let Some(dedup_key) = lookup("KUBEDAG_DEDUP_KEY") {
            config.graph.dedup_key = DedupKeyStrategy::parse(&dedup_key).ok_or_else(|| {
                anyhow::anyhow!(
                    "KUBEDAG_DEDUP_KEY must be 'kindName' or 'kindNamespaceName', got '{}'",
                    dedup_key
                )
            })?;
        }

        if let Some(skip) = lookup("KUBEDAG_SKIP_VISITED_KINDS") {
            config.graph.skip_visited_kinds = skip.parse().with_context(|| {
                format!("KUBEDAG_SKIP_VISITED_KINDS must be 'true' or 'false', got '{}'", skip)
            })?;
        }

        if let Some(timeout) = lookup("KUBEDAG_TIMEOUT_SECONDS") {
            config.graph.timeout_seconds = timeout.parse().with_context(|| {
                format!(
                    "KUBEDAG_TIMEOUT_SECONDS must be a non-negative number, got '{}'",
                    timeout
                )
            })?;
        }

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.graph.timeout_seconds, 30);
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::apply_overrides(
            Config::default(),
            env(&[
                ("KUBEDAG_DEFAULT_NAMESPACE", "prod"),
                ("KUBEDAG_DEDUP_KEY", "kind-namespace-name"),
                ("KUBEDAG_SKIP_VISITED_KINDS", "false"),
                ("KUBEDAG_TIMEOUT_SECONDS", "5"),
            ]),
        )
        .unwrap();

        assert_eq!(config.default_namespace, "prod");
        assert_eq!(config.graph.dedup_key, DedupKeyStrategy::KindNamespaceName);
        assert!(!config.graph.skip_visited_kinds);
        assert_eq!(config.graph.timeout_seconds, 5);
    }

    #[test]
    fn test_invalid_env_overrides_are_reported() {
        for (key, value) in [
            ("KUBEDAG_DEDUP_KEY", "uid"),
            ("KUBEDAG_SKIP_VISITED_KINDS", "sometimes"),
            ("KUBEDAG_TIMEOUT_SECONDS", "-1"),
        ] {
            let err = ConfigLoader::apply_overrides(Config::default(), env(&[(key, value)]))
                .unwrap_err();
            let message = format!("{:#}", err);
            assert!(message.contains(key), "{}", message);
            assert!(message.contains(value), "{}", message);
        }
    }
}
