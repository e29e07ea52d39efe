//! 파이프라인 에러 타입
//!
//! [`PipelineError`]는 단계 실행과 threat map 시각화 과정의 모든 실패를 나타냅니다.
//! 어떤 실패도 재시도하지 않으며, 호출자는 첫 실패에서 전체 실행을 중단합니다.
//!
//! # 에러 카테고리
//!
//! - **외부 도구 실패**: `Process`
//! - **단계 산출물 누락**: `ArtifactNotProduced`
//! - **threat map 읽기/파싱**: `ThreatMapRead`, `ThreatMapParse`
//! - **출력 디렉토리**: `OutputDir`

use threatviz_core::error::ProcessError;

use crate::stage::StageKind;

/// 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 외부 도구가 실패함
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// 단계는 성공했으나 선언된 산출물이 생기지 않음
    #[error("{stage} stage completed but did not produce {path}")]
    ArtifactNotProduced {
        /// 실행된 단계
        stage: StageKind,
        /// 기대한 산출물 경로
        path: String,
    },

    /// threat map 파일을 읽을 수 없음
    #[error("failed to read threat map {path}: {source}")]
    ThreatMapRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// threat map 내용이 구조적으로 잘못됨
    #[error("malformed threat map {path}: {reason}")]
    ThreatMapParse { path: String, reason: String },

    /// 출력 디렉토리를 만들 수 없음
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// 프로그램 종료 코드
    ///
    /// 외부 도구 실패는 그 도구의 종료 코드를, 나머지는 1을 사용합니다.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Process(e) => e.exit_code(),
            _ => 1,
        }
    }
}
