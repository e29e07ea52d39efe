//! `threatviz run` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use threatviz_core::config::WorkflowConfig;
use threatviz_core::process::SystemProcessRunner;
use threatviz_pipeline::{StageOutcome, WorkflowReport, run_workflow};

use crate::cli::{OutputFormat, WorkflowArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Paths are made absolute first because the pipeline stages run with the
/// mapping repository as their working directory.
///
/// # Errors
///
/// Returns `CliError::Pipeline` carrying the first failing tool's exit code.
pub async fn execute(
    args: WorkflowArgs,
    config: &WorkflowConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let paths = args.run_paths().resolve()?;
    info!(
        mapping_repo = %paths.mapping_repo.display(),
        visualizer_repo = %paths.visualizer_repo.display(),
        codebase = %paths.codebase.display(),
        sbom = %paths.sbom.display(),
        "starting workflow"
    );

    // JSON reports own stdout, so tool chatter goes to stderr.
    let runner = match writer.format() {
        OutputFormat::Json => SystemProcessRunner::new().stdout_to_stderr(),
        OutputFormat::Text => SystemProcessRunner::new(),
    };
    let report = run_workflow(config, &paths, &runner).await?;
    writer.render(&RunReport { report })?;
    Ok(())
}

/// Result of a completed run.
#[derive(Serialize)]
#[serde(transparent)]
pub struct RunReport {
    pub report: WorkflowReport,
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", "Pipeline".bold())?;
        for stage in &self.report.pipeline.stages {
            let outcome = match stage.outcome {
                StageOutcome::Skipped => "reused".yellow(),
                StageOutcome::Completed => "executed".green(),
            };
            writeln!(
                w,
                "  {:<8} {:<10} {}",
                stage.stage.to_string(),
                outcome,
                stage.output.display()
            )?;
        }

        if let Some(ref visualization) = self.report.visualization {
            writeln!(w)?;
            writeln!(
                w,
                "{} ({} entries, {} skipped) -> {}",
                "Diagrams".bold(),
                visualization.entries_total,
                visualization.entries_skipped,
                visualization.output_dir.display()
            )?;
            for job in &visualization.jobs {
                writeln!(w, "  {}", job.output.display())?;
            }
        }

        writeln!(w)?;
        writeln!(w, "{}", "Workflow complete.".green().bold())?;
        Ok(())
    }
}
