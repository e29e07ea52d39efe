//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use threatviz_core::types::RunPaths;

/// threatviz -- chains the risk/threat mapping tools and renders AST diagrams
/// for every risky call site they find.
///
/// Use `threatviz <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "threatviz", version, about, long_about = None)]
pub struct Cli {
    /// Path to a threatviz.toml configuration file (defaults + env overrides when omitted).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Report format.
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline and render a diagram per threat map entry.
    Run(WorkflowArgs),

    /// Show which stages would run and which diagrams would be rendered, without running anything.
    Plan(WorkflowArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run / plan ----

/// Repository and input locations shared by `run` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct WorkflowArgs {
    /// Path to the risk/threat mapping tool repository.
    #[arg(long)]
    pub lxc_repo: PathBuf,

    /// Path to the AST visualization tool repository.
    #[arg(long)]
    pub ast_repo: PathBuf,

    /// Path to the codebase to scan.
    #[arg(long)]
    pub code: PathBuf,

    /// Path to the SBOM JSON file.
    #[arg(long)]
    pub sbom: PathBuf,

    /// Directory for rendered diagrams.
    #[arg(long, default_value = "output")]
    pub output: PathBuf,
}

impl WorkflowArgs {
    /// Paths as given on the command line, not yet resolved.
    pub fn run_paths(&self) -> RunPaths {
        RunPaths {
            mapping_repo: self.lxc_repo.clone(),
            visualizer_repo: self.ast_repo.clone(),
            codebase: self.code.clone(),
            sbom: self.sbom.clone(),
            output_dir: self.output.clone(),
        }
    }
}

// ---- config ----

/// Manage threatviz configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, tools, artifacts, mapping).
        #[arg(long)]
        section: Option<String>,
    },
}
