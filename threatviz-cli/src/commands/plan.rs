//! `threatviz plan` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use threatviz_core::config::WorkflowConfig;
use threatviz_core::process::SystemProcessRunner;
use threatviz_pipeline::{StageOutcome, WorkflowReport, plan_workflow};

use crate::cli::WorkflowArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `plan` command.
///
/// Reports what `run` would do with the same arguments. No external tool is
/// started and no directory is created.
pub async fn execute(
    args: WorkflowArgs,
    config: &WorkflowConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let paths = args.run_paths().resolve()?;
    info!(mapping_repo = %paths.mapping_repo.display(), "planning workflow");

    let report = plan_workflow(config, &paths, &SystemProcessRunner::new()).await?;
    writer.render(&PlanReport { report })?;
    Ok(())
}

/// Dry-run result.
#[derive(Serialize)]
#[serde(transparent)]
pub struct PlanReport {
    pub report: WorkflowReport,
}

impl Render for PlanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", "Pipeline plan".bold())?;
        for stage in &self.report.pipeline.stages {
            match stage.outcome {
                StageOutcome::Skipped => writeln!(
                    w,
                    "  {:<8} {:<5} found {}",
                    stage.stage.to_string(),
                    "SKIP".yellow(),
                    stage.output.display()
                )?,
                StageOutcome::Completed => writeln!(
                    w,
                    "  {:<8} {:<5} {}",
                    stage.stage.to_string(),
                    "RUN".green(),
                    stage.command
                )?,
            }
        }

        writeln!(w)?;
        match self.report.visualization {
            Some(ref visualization) => {
                writeln!(
                    w,
                    "{} ({} entries, {} skipped)",
                    "Diagrams".bold(),
                    visualization.entries_total,
                    visualization.entries_skipped
                )?;
                for job in &visualization.jobs {
                    writeln!(
                        w,
                        "  {} [{}] -> {}",
                        job.source.display(),
                        job.target,
                        job.output.display()
                    )?;
                }
            }
            None => writeln!(
                w,
                "{} derived after the threat map is produced",
                "Diagrams".bold()
            )?,
        }
        Ok(())
    }
}
