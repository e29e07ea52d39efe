//! threatviz -- orchestrates the risk/threat mapping pipeline and renders
//! an AST diagram for every risky call site in the resulting threat map.
//!
//! On failure a one-line diagnostic goes to stderr and the process exits with
//! the failing external tool's exit code (see [`CliError::exit_code`]).

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use threatviz_core::config::{GeneralConfig, WorkflowConfig};
use threatviz_core::error::ThreatvizError;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("threatviz: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let loaded = load_config(&cli).await;

    // `config validate` must still report a broken file, so logging falls back to defaults.
    let general = match &loaded {
        Ok(config) => config.general.clone(),
        Err(_) => GeneralConfig::default(),
    };
    logging::init_tracing(&general)?;

    let writer = OutputWriter::new(cli.format);
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &loaded?, &writer).await,
        Commands::Plan(args) => commands::plan::execute(args, &loaded?, &writer).await,
        Commands::Config(args) => {
            commands::config::execute(args, cli.config.as_deref(), &writer).await
        }
    }
}

/// File (or defaults) + env overrides, then the `--log-level` flag on top.
async fn load_config(cli: &Cli) -> Result<WorkflowConfig, ThreatvizError> {
    let mut config = commands::config::load_effective(cli.config.as_deref()).await?;
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
        config.validate()?;
    }
    Ok(config)
}
