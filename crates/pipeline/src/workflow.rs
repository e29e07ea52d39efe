//! 전체 워크플로우 — 파이프라인 실행 후 threat map 시각화

use serde::Serialize;
use tracing::info;

use threatviz_core::config::WorkflowConfig;
use threatviz_core::process::ProcessRunner;
use threatviz_core::types::RunPaths;

use crate::controller::{PipelineController, PipelineReport};
use crate::error::PipelineError;
use crate::gate::artifact_exists;
use crate::translator::{MappingTranslator, VisualizationReport};

/// 워크플로우 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub pipeline: PipelineReport,
    /// `plan`에서 threat map이 아직 없으면 `None`
    pub visualization: Option<VisualizationReport>,
}

/// extract → enrich → map 파이프라인을 돌리고 threat map의 각 엔트리를 시각화합니다.
///
/// 첫 실패에서 즉시 중단합니다.
pub async fn run_workflow<R: ProcessRunner>(
    config: &WorkflowConfig,
    paths: &RunPaths,
    runner: &R,
) -> Result<WorkflowReport, PipelineError> {
    let artifacts = paths.artifacts(&config.artifacts);

    let pipeline = PipelineController::new(config, paths, runner).run().await?;

    let visualization = MappingTranslator::new(
        config,
        &paths.visualizer_repo,
        &paths.output_dir,
        runner,
    )
    .run(&artifacts.threat_map)
    .await?;

    info!(
        diagrams = visualization.jobs.len(),
        output_dir = %paths.output_dir.display(),
        "workflow complete"
    );

    Ok(WorkflowReport {
        pipeline,
        visualization: Some(visualization),
    })
}

/// 아무것도 실행하지 않고 워크플로우가 할 일을 보고합니다.
///
/// threat map이 이미 있으면 그로부터 파생될 시각화 작업도 함께 보고합니다.
pub async fn plan_workflow<R: ProcessRunner>(
    config: &WorkflowConfig,
    paths: &RunPaths,
    runner: &R,
) -> Result<WorkflowReport, PipelineError> {
    let artifacts = paths.artifacts(&config.artifacts);

    let pipeline = PipelineController::new(config, paths, runner).plan().await;

    let visualization = if artifact_exists(&artifacts.threat_map).await {
        let translator = MappingTranslator::new(
            config,
            &paths.visualizer_repo,
            &paths.output_dir,
            runner,
        );
        Some(translator.plan(&artifacts.threat_map).await?)
    } else {
        None
    };

    Ok(WorkflowReport {
        pipeline,
        visualization,
    })
}
