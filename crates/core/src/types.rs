//! 도메인 타입 — 실행 경로와 산출물 경로

use std::path::{Path, PathBuf};

use crate::config::ArtifactsConfig;

/// 한 번의 실행에 필요한 외부 위치들
///
/// 시작 시 한 번 해석되며 이후 변경되지 않습니다.
#[derive(Debug, Clone)]
pub struct RunPaths {
    /// 위험-위협 매핑 도구 저장소 (추출/보강/매핑 단계의 작업 디렉토리)
    pub mapping_repo: PathBuf,
    /// AST 시각화 도구 저장소
    pub visualizer_repo: PathBuf,
    /// 스캔할 코드베이스
    pub codebase: PathBuf,
    /// SBOM 입력 파일
    pub sbom: PathBuf,
    /// 다이어그램 출력 디렉토리
    pub output_dir: PathBuf,
}

impl RunPaths {
    /// 모든 경로를 현재 작업 디렉토리 기준 절대 경로로 해석합니다.
    ///
    /// 추출/보강/매핑 단계는 저장소 디렉토리에서 실행되므로,
    /// 상대 경로 인자는 미리 절대 경로로 바꿔 두어야 같은 파일을 가리킵니다.
    /// 파일 존재 여부는 확인하지 않습니다.
    pub fn resolve(self) -> std::io::Result<Self> {
        Ok(Self {
            mapping_repo: std::path::absolute(&self.mapping_repo)?,
            visualizer_repo: std::path::absolute(&self.visualizer_repo)?,
            codebase: std::path::absolute(&self.codebase)?,
            sbom: std::path::absolute(&self.sbom)?,
            output_dir: std::path::absolute(&self.output_dir)?,
        })
    }

    /// 매핑 저장소 안의 산출물 경로들
    pub fn artifacts(&self, names: &ArtifactsConfig) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.mapping_repo, names)
    }
}

/// 파이프라인 단계별 산출물 경로
///
/// 파일의 존재 여부가 단계 재사용의 유일한 신호입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub risk_db: PathBuf,
    pub enriched_db: PathBuf,
    pub threat_map: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path, names: &ArtifactsConfig) -> Self {
        Self {
            risk_db: dir.join(&names.risk_db),
            enriched_db: dir.join(&names.enriched_db),
            threat_map: dir.join(&names.threat_map),
        }
    }
}
