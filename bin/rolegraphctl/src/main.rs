//! ---
//! rg_section: "06-cli"
//! rg_subsection: "binary"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Control CLI for administrators editing rolegraph rules."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rolegraph_common::{init_tracing, EngineConfig};
use rolegraph_core::RuleManager;
use tracing::debug;

mod mutate;
mod query;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "rolegraph administrative control utility",
    long_about = None
)]
struct Cli {
    /// Engine configuration file.
    #[arg(long, value_name = "FILE", env = "ROLEGRAPH_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// CSV rule file; overrides `storage.rule_file`.
    #[arg(long, value_name = "FILE", global = true)]
    rules: Option<PathBuf>,
    /// Hop ceiling for role queries; overrides `role_manager.max_hierarchy_depth`.
    #[arg(long, value_name = "HOPS", global = true)]
    depth: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(flatten)]
    Query(query::QueryCommand),
    #[command(flatten)]
    Mutate(mutate::MutateCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;
    init_tracing("rolegraphctl", &config.logging)?;

    let manager = RuleManager::from_config(&config)?;
    let loaded = manager
        .load_policy()
        .context("failed to load rule file")?;
    debug!(rules = loaded, "rule file loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Query(cmd) => query::run(cmd, &manager, &mut out)?,
        Commands::Mutate(cmd) => {
            mutate::run(cmd, &manager, &mut out)?;
            if !config.auto_save {
                manager.save_policy()?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn effective_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(rules) = &cli.rules {
        config.storage.rule_file = Some(rules.clone());
    }
    if let Some(depth) = cli.depth {
        config.role_manager.max_hierarchy_depth = depth;
    }
    if config.storage.rule_file.is_none() {
        return Err(anyhow!(
            "no rule file configured; pass --rules or set storage.rule_file"
        ));
    }
    config.validate()?;
    Ok(config)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = path {
        return EngineConfig::load(&[path]);
    }
    let candidates = [
        PathBuf::from("rolegraph.toml"),
        PathBuf::from("configs/rolegraph.toml"),
    ];
    if candidates.iter().any(|candidate| candidate.exists()) {
        EngineConfig::load(&candidates)
    } else {
        Ok(EngineConfig::default())
    }
}
