//! kubectl-pilot CLI
//!
//! Natural-language `kubectl` plans, pod diagnostics and policy checks from the
//! terminal. Installed as a kubectl plugin (`kubectl pilot ...`).

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use pilot::ai::{create_provider, AiProvider, GenerateOptions};
use pilot::config::PilotConfig;
use pilot::diagnose::DiagnosticsEngine;
use pilot::display;
use pilot::explain::Explainer;
use pilot::k8s::{KubeResourceQuery, ResourceQuery};
use pilot::logging;
use pilot::plan::{Planner, RecordingExecutor};
use pilot::plugins::{PluginRegistry, BUILTIN_PLUGINS};
use pilot::policy::PolicyGate;

/// AI-assisted Kubernetes operations
#[derive(Parser)]
#[command(name = "kubectl-pilot")]
#[command(about = "AI-assisted Kubernetes operations - plans, diagnostics and policy checks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.k8s-pilot.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preview commands instead of applying them
    #[arg(long, global = true, default_value_t = true, action = ArgAction::Set)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Namespace to operate in (overrides config)
    #[arg(short, long, global = true)]
    namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a natural-language request into a kubectl plan
    Run {
        /// What you want to do, e.g. "restart the api pods"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Execute the plan after showing it (dry-run plans are only previewed)
        #[arg(long)]
        apply: bool,
    },
    /// Diagnose a pod, or scan the namespace when no name is given
    Diagnose {
        /// Resource kind (pod); empty scans the namespace
        kind: Option<String>,

        /// Resource name
        name: Option<String>,

        /// Scan all namespaces
        #[arg(short = 'A', long)]
        all_namespaces: bool,
    },
    /// Explain logs, events or a Kubernetes concept
    Explain {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Manage diagnostic plugins
    Plugin {
        #[command(subcommand)]
        action: PluginAction,
    },
    /// Check a command against the policy rules
    Validate {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

#[derive(Subcommand)]
enum PluginAction {
    /// List installed and available plugins
    List,
    /// Install a built-in plugin
    Install { name: String },
    /// Uninstall a plugin
    Uninstall { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        PilotConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(namespace) = &cli.namespace {
        config.kubernetes.namespace.clone_from(namespace);
    }

    logging::init(cli.verbose, &config.logging);
    debug!(provider = %config.ai.provider, namespace = %config.kubernetes.namespace, "Loaded configuration");

    match cli.command {
        Commands::Run { query, apply } => run_plan(&config, &query.join(" "), apply, cli.dry_run).await,
        Commands::Diagnose {
            kind,
            name,
            all_namespaces,
        } => {
            run_diagnose(
                &config,
                kind.as_deref().unwrap_or_default(),
                name.as_deref(),
                all_namespaces,
            )
            .await
        }
        Commands::Explain { query } => run_explain(&config, &query.join(" ")).await,
        Commands::Plugin { action } => run_plugin(&config, action),
        Commands::Validate { command } => {
            run_validate(&command.join(" "));
            Ok(())
        }
    }
}

fn provider(config: &PilotConfig) -> Result<Arc<dyn AiProvider>> {
    create_provider(&config.ai)
        .with_context(|| format!("Failed to initialize AI provider '{}'", config.ai.provider))
}

fn plugin_registry(config: &PilotConfig) -> Result<Arc<PluginRegistry>> {
    let registry = PluginRegistry::new();
    for name in &config.plugins {
        registry
            .install_by_name(name)
            .with_context(|| format!("Failed to install plugin '{name}' from config"))?;
    }
    Ok(Arc::new(registry))
}

async fn run_plan(config: &PilotConfig, query: &str, apply: bool, dry_run: bool) -> Result<()> {
    let planner = Planner::new(
        provider(config)?,
        PolicyGate::new(config.policy.enabled),
        config.kubernetes.namespace.clone(),
        dry_run,
    )
    .with_options(GenerateOptions::from_config(&config.ai));

    let plan = planner.generate(query).await.context("Plan generation failed")?;
    print!("{}", display::render_plan(&plan));

    if apply {
        let result = plan.execute(&RecordingExecutor::new()).await;
        print!("{}", display::render_execution(&result));
        if !result.is_success() {
            anyhow::bail!("{} command(s) failed", result.errors.len());
        }
    }
    Ok(())
}

async fn run_diagnose(
    config: &PilotConfig,
    kind: &str,
    name: Option<&str>,
    all_namespaces: bool,
) -> Result<()> {
    let resources = KubeResourceQuery::connect(&config.kubernetes)
        .await
        .context("Failed to connect to Kubernetes")?;

    let engine = DiagnosticsEngine::new(
        Arc::new(resources),
        provider(config)?,
        config.kubernetes.namespace.clone(),
    )
    .all_namespaces(all_namespaces)
    .with_plugins(plugin_registry(config)?)
    .with_options(GenerateOptions::from_config(&config.ai));

    let report = engine
        .diagnose(kind, name)
        .await
        .context("Diagnostics failed")?;
    print!("{}", display::render_report(&report));
    Ok(())
}

async fn run_explain(config: &PilotConfig, query: &str) -> Result<()> {
    let mut explainer = Explainer::new(provider(config)?, config.kubernetes.namespace.clone())
        .with_options(GenerateOptions::from_config(&config.ai));

    match KubeResourceQuery::connect(&config.kubernetes).await {
        Ok(resources) => {
            let resources: Arc<dyn ResourceQuery> = Arc::new(resources);
            explainer = explainer.with_resources(resources);
        }
        Err(e) => warn!(error = %e, "No cluster connection, logs and events are unavailable"),
    }

    let explanation = explainer.explain(query).await.context("Explain failed")?;
    print!("{}", display::render_explanation(&explanation));
    Ok(())
}

fn run_plugin(config: &PilotConfig, action: PluginAction) -> Result<()> {
    let registry = plugin_registry(config)?;

    match action {
        PluginAction::List => {
            print!("{}", display::render_plugins(&registry));
            println!("\nAvailable: {}", BUILTIN_PLUGINS.join(", "));
        }
        PluginAction::Install { name } => {
            registry
                .install_by_name(&name)
                .with_context(|| format!("Failed to install plugin '{name}'"))?;
            println!("{} {name}", "Installed".green());
            println!("Add it to `plugins:` in your config to enable it for diagnose.");
        }
        PluginAction::Uninstall { name } => {
            registry
                .uninstall(&name)
                .with_context(|| format!("Failed to uninstall plugin '{name}'"))?;
            println!("{} {name}", "Uninstalled".green());
            println!("Remove it from `plugins:` in your config to keep it disabled.");
        }
    }
    Ok(())
}

/// The policy check always runs with the gate enabled.
fn run_validate(command: &str) {
    let result = PolicyGate::new(true).validate(command);
    print!("{}", display::render_validation(command, &result));
}
