//! Pipeline Controller — 세 단계를 고정 순서로 실행
//!
//! extract → enrich → map 순서로 각 단계를 Stage Gate에 통과시킵니다.
//! 한 단계라도 실패하면 나머지 단계는 실행하지 않습니다.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use threatviz_core::config::WorkflowConfig;
use threatviz_core::process::ProcessRunner;
use threatviz_core::types::RunPaths;

use crate::error::PipelineError;
use crate::gate::{artifact_exists, run_gated};
use crate::stage::{Stage, StageKind, StageOutcome};

/// 한 단계의 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: StageKind,
    pub output: PathBuf,
    pub outcome: StageOutcome,
    /// 실행했거나 실행했을 명령줄
    pub command: String,
}

/// 파이프라인 전체 실행 결과
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
}

impl PipelineReport {
    /// 실제로 실행된 단계 수
    pub fn executed(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.outcome == StageOutcome::Completed)
            .count()
    }
}

/// 파이프라인 컨트롤러
///
/// 설정과 경로는 실행 동안 빌려 쓰기만 하며 상태를 남기지 않습니다.
pub struct PipelineController<'a, R> {
    config: &'a WorkflowConfig,
    paths: &'a RunPaths,
    runner: &'a R,
}

impl<'a, R: ProcessRunner> PipelineController<'a, R> {
    pub fn new(config: &'a WorkflowConfig, paths: &'a RunPaths, runner: &'a R) -> Self {
        Self {
            config,
            paths,
            runner,
        }
    }

    /// 정의된 세 단계
    pub fn stages(&self) -> [Stage; 3] {
        Stage::all(self.config, self.paths)
    }

    /// 아무것도 실행하지 않고 각 단계가 건너뛰어질지 보고합니다.
    ///
    /// 앞 단계가 실행될 예정이면 뒤 단계 입력도 새로 만들어지지만,
    /// 뒤 단계의 판단은 오직 자기 산출물 존재 여부로만 결정됩니다.
    pub async fn plan(&self) -> PipelineReport {
        let mut stages = Vec::with_capacity(3);
        for stage in self.stages() {
            let outcome = if artifact_exists(&stage.output).await {
                StageOutcome::Skipped
            } else {
                StageOutcome::Completed
            };
            stages.push(StageReport {
                stage: stage.kind,
                command: stage.command.to_string(),
                output: stage.output,
                outcome,
            });
        }
        PipelineReport { stages }
    }

    /// 세 단계를 순서대로 실행합니다.
    ///
    /// # Errors
    ///
    /// 첫 번째로 실패한 단계의 에러를 그대로 돌려주며, 이후 단계는 평가하지 않습니다.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport::default();

        for stage in self.stages() {
            let runner = self.runner;
            let command = &stage.command;
            let outcome = run_gated(stage.kind, &stage.output, move || runner.run(command)).await?;

            info!(stage = %stage.kind, outcome = ?outcome, "stage finished");
            report.stages.push(StageReport {
                stage: stage.kind,
                command: stage.command.to_string(),
                output: stage.output,
                outcome,
            });
        }

        Ok(report)
    }
}
