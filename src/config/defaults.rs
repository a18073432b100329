//! Default configuration values
//!
//! Provides default configuration instances and the starter file written by
//! `kubedag config set` when no config file exists yet.

use super::schema::Config;

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}
