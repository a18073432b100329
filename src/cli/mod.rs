//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
mod version;

pub use commands::{
    ConfigSubcommand, GraphArgs, GraphSettings, handle_config_command, handle_graph_command,
    handle_kinds_command,
};
pub use logging::*;
pub use version::display_version;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kubedag - render the dependency graph of a Kubernetes workload
#[derive(Parser, Debug)]
#[command(name = "kubedag")]
#[command(about = "Render the dependency graph of a Kubernetes workload as JSON", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the dependency graph of a resource and print it as JSON
    Graph(GraphArgs),
    /// List supported resource kinds
    Kinds,
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}
