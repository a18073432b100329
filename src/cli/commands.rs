//! CLI command handlers

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ConfigLoader, paths};
use crate::graph::GraphOptions;
use crate::kube::{self, ClusterApi, ClusterSnapshot, KubeCluster};
use crate::models::{DedupKeyStrategy, FetchFailurePolicy, ResourceIdentity, ResourceKind};
use crate::services::GraphService;

/// Arguments of `kubedag graph`
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// Kind of the root resource (e.g. Deployment, deploy, svc)
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Name of the root resource
    pub name: String,

    /// Namespace of the root resource
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, conflicts_with = "from_file")]
    pub context: Option<String>,

    /// Read cluster state from YAML/JSON manifests instead of a live cluster
    #[arg(long)]
    pub from_file: Option<PathBuf>,

    /// Print the document on a single line
    #[arg(long)]
    pub compact: bool,

    /// How resources collapse into nodes (kind-name or kind-namespace-name)
    #[arg(long, value_parser = parse_dedup_key)]
    pub dedup_key: Option<DedupKeyStrategy>,

    /// Discover every relation, even for kinds already seen elsewhere in the graph
    #[arg(long)]
    pub complete: bool,

    /// Abort after this many seconds (0 waits forever)
    #[arg(long)]
    pub timeout: Option<u64>,
}

fn parse_kind(value: &str) -> Result<ResourceKind, String> {
    ResourceKind::from_str_case_insensitive(value).ok_or_else(|| {
        format!(
            "unsupported kind '{}' (run `kubedag kinds` for the list)",
            value
        )
    })
}

fn parse_dedup_key(value: &str) -> Result<DedupKeyStrategy, String> {
    DedupKeyStrategy::parse(value)
        .ok_or_else(|| "expected 'kind-name' or 'kind-namespace-name'".to_string())
}

/// Effective settings of one graph invocation after flags, environment and
/// config file are combined
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSettings {
    pub options: GraphOptions,
    pub timeout: Option<Duration>,
    pub pretty: bool,
    /// Explicit namespace, if any; otherwise the cluster's default applies
    pub namespace: Option<String>,
}

impl GraphSettings {
    pub fn resolve(args: &GraphArgs, config: &Config) -> Self {
        let mut options = config.graph.options();
        if let Some(dedup_key) = args.dedup_key {
            options.dedup_key = dedup_key;
        }
        if args.complete {
            options.skip_visited_kinds = false;
        }
        let timeout = match args.timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => config.graph.timeout(),
        };
        let namespace = args
            .namespace
            .clone()
            .or_else(|| Some(config.default_namespace.clone()).filter(|ns| !ns.is_empty()));

        Self {
            options,
            timeout,
            pretty: config.output.pretty && !args.compact,
            namespace,
        }
    }
}

/// Handle `kubedag graph`
pub async fn handle_graph_command(args: GraphArgs, config: &Config) -> Result<()> {
    let settings = GraphSettings::resolve(&args, config);

    let (cluster, namespace): (Arc<dyn ClusterApi>, String) = match &args.from_file {
        Some(path) => {
            let snapshot = ClusterSnapshot::from_file(path).await?;
            let namespace = settings
                .namespace
                .clone()
                .unwrap_or_else(|| "default".to_string());
            (Arc::new(snapshot), namespace)
        }
        None => {
            let client = match &args.context {
                Some(context) => kube::create_client_for_context(context).await?,
                None => kube::create_client().await?,
            };
            tracing::debug!(
                "Using context: {}",
                args.context.clone().unwrap_or_else(kube::current_context)
            );
            let namespace = settings
                .namespace
                .clone()
                .unwrap_or_else(|| client.default_namespace().to_string());
            (Arc::new(KubeCluster::new(client)), namespace)
        }
    };

    let root = ResourceIdentity::new(args.kind, namespace, args.name.clone());
    let service = GraphService::new(cluster)
        .with_options(settings.options)
        .with_timeout(settings.timeout);

    let graph = service.build_graph(&root).await?;

    let document = if settings.pretty {
        graph.to_json_pretty()
    } else {
        graph.to_json()
    }
    .context("Failed to serialize graph")?;
    println!("{}", document);

    Ok(())
}

/// Handle `kubedag kinds`
pub fn handle_kinds_command() {
    println!("{:<26} {:<26} {:<8} ON FETCH ERROR", "KIND", "RESOURCE", "EXPANDS");
    for kind in ResourceKind::all() {
        let on_error = match kind.fetch_failure_policy() {
            FetchFailurePolicy::Abort => "abort",
            FetchFailurePolicy::MarkUnhealthy => "mark unhealthy",
        };
        println!(
            "{:<26} {:<26} {:<8} {}",
            kind.as_str(),
            kind.plural(),
            if kind.has_resolver() { "yes" } else { "no" },
            on_error
        );
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "defaultNamespace", "graph.dedupKey")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "defaultNamespace", "graph.dedupKey")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            // Load config (will use defaults if no file exists)
            let config = ConfigLoader::load().context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = crate::config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Start from the file alone so environment overrides are not persisted
            let root_path = paths::root_config_path();
            let mut config = if root_path.exists() {
                ConfigLoader::load_file(&root_path)?
            } else {
                ConfigLoader::load_defaults()
            };

            crate::config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;

            ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            for key in crate::config::CONFIG_KEYS {
                println!("{}: {}", key, crate::config::get_config_value(&config, key)?);
            }
        }
        ConfigSubcommand::Path => {
            let config_path = paths::root_config_path();
            println!("{}", config_path.display());
        }
        ConfigSubcommand::Validate => match ConfigLoader::validate(&paths::root_config_path()) {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration validation failed: {:#}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
