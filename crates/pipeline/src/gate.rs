//! Stage Gate — 산출물 존재 여부로 단계 실행을 결정
//!
//! 산출물 파일이 이미 있으면 단계를 건너뛰고, 없으면 작업 클로저를 실행합니다.
//! 내용 해시나 버전은 보지 않습니다. 확인과 실행 사이는 원자적이지 않으므로
//! 같은 산출물 경로에 대해 동시에 여러 실행을 돌리는 것은 지원하지 않습니다.

use std::future::Future;
use std::path::Path;

use tracing::{debug, info};

use threatviz_core::error::ProcessError;

use crate::error::PipelineError;
use crate::stage::{StageKind, StageOutcome};

/// 경로에 파일(또는 디렉토리)이 있는지 확인합니다.
///
/// 메타데이터 조회 자체가 실패하면 없는 것으로 취급합니다.
pub async fn artifact_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// 산출물 게이트를 통과시켜 단계 작업을 실행합니다.
///
/// - `output`이 이미 있으면 재사용 메시지를 남기고 [`StageOutcome::Skipped`]
/// - 없으면 `work`를 실행하고, 성공 후 `output`이 생겼는지 확인
///
/// 작업이 성공했는데 산출물이 없으면 [`PipelineError::ArtifactNotProduced`]를
/// 돌려줍니다. 다음 단계가 존재하지 않는 입력으로 호출되는 일을 막습니다.
pub async fn run_gated<F, Fut>(
    stage: StageKind,
    output: &Path,
    work: F,
) -> Result<StageOutcome, PipelineError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), ProcessError>>,
{
    if artifact_exists(output).await {
        info!(
            %stage,
            "Found existing {}: {}",
            stage.artifact_label(),
            output.display()
        );
        return Ok(StageOutcome::Skipped);
    }

    debug!(%stage, output = %output.display(), "artifact missing, executing stage");
    work().await?;

    if !artifact_exists(output).await {
        return Err(PipelineError::ArtifactNotProduced {
            stage,
            path: output.display().to_string(),
        });
    }

    Ok(StageOutcome::Completed)
}
