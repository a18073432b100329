//! kubedag - dependency graphs of Kubernetes workloads
//!
//! Starting from one resource, kubedag walks the cluster for everything that
//! resource relates to and prints the result as a JSON node/edge document.

use anyhow::{Context, Result};
use clap::Parser;
use kubedag::cli::{
    Cli, Command, display_version, handle_config_command, handle_graph_command,
    handle_kinds_command, init_logging,
};
use kubedag::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        // Config and version commands run without logging
        Command::Config { subcommand } => handle_config_command(subcommand),
        Command::Version => {
            display_version();
            Ok(())
        }
        Command::Kinds => {
            handle_kinds_command();
            Ok(())
        }
        Command::Graph(graph_args) => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            init_logging(args.debug, args.log_file.as_deref(), &config.logger.level)?;
            tracing::debug!("Loaded configuration: {:?}", config);

            handle_graph_command(graph_args, &config).await
        }
    }
}
