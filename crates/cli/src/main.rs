//! ACI check engine runner
//!
//! Stands in for the monitoring host framework: reads recorded agent
//! output, runs discovery and checks from the aci-checks library,
//! persists rate state between polls and renders the results.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;
mod runner;

/// Cisco ACI fabric check runner
#[derive(Parser)]
#[command(name = "acimon")]
#[command(author, version, about = "Cisco ACI fabric check runner", long_about = None)]
pub struct Cli {
    /// Path to the persisted rate-state file
    #[arg(long, env = "ACIMON_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Path to a rules file (TOML or JSON) overriding check parameters
    #[arg(long, env = "ACIMON_RULES")]
    pub rules: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run discovery and list the resulting services
    Discover {
        /// Agent output file (reads stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Run discovery and all checks; exit code is the worst severity
    Check {
        /// Agent output file (reads stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Only check the service with this exact name
        #[arg(long)]
        service: Option<String>,

        /// Include detail blocks in the output
        #[arg(long)]
        details: bool,
    },

    /// List parsed agent output sections and their row counts
    Sections {
        /// Agent output file (reads stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read agent output from {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read agent output from stdin")?;
            Ok(raw)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runner_config = config::RunnerConfig::load()?;

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    if runner_config.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let rules_path = cli.rules.clone().or_else(|| runner_config.rules.clone());
    let rules = config::load_rules(rules_path.as_deref())?;

    match cli.command {
        Commands::Discover { input } => {
            let raw = read_input(input.as_ref())?;
            commands::discover::run(&raw, &rules, cli.format)?;
        }
        Commands::Check {
            input,
            service,
            details,
        } => {
            let raw = read_input(input.as_ref())?;
            let state_path = runner_config.state_file_path(cli.state_file.clone())?;
            let worst = commands::check::run(
                &raw,
                &rules,
                &state_path,
                service.as_deref(),
                details,
                cli.format,
            )?;
            std::process::exit(worst.exit_code());
        }
        Commands::Sections { input } => {
            let raw = read_input(input.as_ref())?;
            commands::sections::run(&raw, cli.format)?;
        }
    }

    Ok(())
}
