//! 파이프라인 단계 정의
//!
//! 각 [`Stage`]는 선언된 산출물 경로와 외부 명령(실행 파일 + 인자 + 작업 디렉토리)을
//! 가집니다. 인자 형태는 고정되어 있습니다.
//!
//! | 단계 | 명령 |
//! |------|------|
//! | Extract | `<py> <extractor> --sbom <sbom> --out <risk_db>` |
//! | Enrich  | `<py> <enricher> <risk_db> --out <enriched_db>` |
//! | Map     | `<py> <mapper> --code <code> --risk <enriched_db> --out <threat_map>` |
//!
//! 세 단계 모두 위험-위협 매핑 저장소를 작업 디렉토리로 사용합니다.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use threatviz_core::config::WorkflowConfig;
use threatviz_core::process::CommandSpec;
use threatviz_core::types::{ArtifactPaths, RunPaths};

/// 파이프라인 단계 종류 (실행 순서대로)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// SBOM → risk DB
    Extract,
    /// risk DB → 보강된 risk DB
    Enrich,
    /// 코드베이스 + 보강된 risk DB → threat map
    Map,
}

impl StageKind {
    /// 재사용 메시지에 쓰이는 산출물 이름
    pub fn artifact_label(self) -> &'static str {
        match self {
            Self::Extract => "risk DB",
            Self::Enrich => "enriched DB",
            Self::Map => "threat map",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Extract => "extract",
            Self::Enrich => "enrich",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// 단계 평가 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOutcome {
    /// 산출물이 이미 있어 실행하지 않음
    Skipped,
    /// 외부 도구를 실행했고 산출물이 생김
    Completed,
}

/// 하나의 파이프라인 단계
#[derive(Debug, Clone)]
pub struct Stage {
    pub kind: StageKind,
    /// 선언된 산출물 경로
    pub output: PathBuf,
    pub command: CommandSpec,
}

impl Stage {
    /// 고정 순서(extract → enrich → map)의 세 단계를 만듭니다.
    ///
    /// 단계 N의 입력은 단계 N-1의 산출물 경로입니다.
    pub fn all(config: &WorkflowConfig, paths: &RunPaths) -> [Stage; 3] {
        let artifacts = paths.artifacts(&config.artifacts);
        [
            Self::extract(config, paths, &artifacts),
            Self::enrich(config, paths, &artifacts),
            Self::map(config, paths, &artifacts),
        ]
    }

    pub fn extract(config: &WorkflowConfig, paths: &RunPaths, artifacts: &ArtifactPaths) -> Self {
        let command = CommandSpec::new(&config.tools.interpreter)
            .arg(&config.tools.extractor)
            .flag("--sbom", &paths.sbom)
            .flag("--out", &artifacts.risk_db)
            .current_dir(&paths.mapping_repo);
        Self {
            kind: StageKind::Extract,
            output: artifacts.risk_db.clone(),
            command,
        }
    }

    pub fn enrich(config: &WorkflowConfig, paths: &RunPaths, artifacts: &ArtifactPaths) -> Self {
        let command = CommandSpec::new(&config.tools.interpreter)
            .arg(&config.tools.enricher)
            .arg(&artifacts.risk_db)
            .flag("--out", &artifacts.enriched_db)
            .current_dir(&paths.mapping_repo);
        Self {
            kind: StageKind::Enrich,
            output: artifacts.enriched_db.clone(),
            command,
        }
    }

    pub fn map(config: &WorkflowConfig, paths: &RunPaths, artifacts: &ArtifactPaths) -> Self {
        let mut command = CommandSpec::new(&config.tools.interpreter)
            .arg(&config.tools.mapper)
            .flag("--code", &paths.codebase)
            .flag("--risk", &artifacts.enriched_db)
            .flag("--out", &artifacts.threat_map)
            .current_dir(&paths.mapping_repo);
        if let Some(epss) = config.mapping.min_epss {
            command = command.flag("--min-epss", epss.to_string());
        }
        if config.mapping.kev_only {
            command = command.arg("--kev-only");
        }
        Self {
            kind: StageKind::Map,
            output: artifacts.threat_map.clone(),
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    fn paths() -> RunPaths {
        RunPaths {
            mapping_repo: PathBuf::from("/lxc"),
            visualizer_repo: PathBuf::from("/astviz"),
            codebase: PathBuf::from("/code"),
            sbom: PathBuf::from("/in/sbom.json"),
            output_dir: PathBuf::from("/out"),
        }
    }

    fn args(stage: &Stage) -> Vec<String> {
        stage
            .command
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn stages_are_in_dependency_order() {
        let stages = Stage::all(&WorkflowConfig::default(), &paths());
        let kinds: Vec<_> = stages.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StageKind::Extract, StageKind::Enrich, StageKind::Map]);
    }

    #[test]
    fn extract_command_shape() {
        let [extract, _, _] = Stage::all(&WorkflowConfig::default(), &paths());
        assert_eq!(extract.command.program, OsString::from("python3"));
        assert_eq!(
            args(&extract),
            vec![
                "nvd_api_extractor.py",
                "--sbom",
                "/in/sbom.json",
                "--out",
                "/lxc/risk_db.json"
            ]
        );
        assert_eq!(extract.command.cwd, Some(PathBuf::from("/lxc")));
        assert_eq!(extract.output, PathBuf::from("/lxc/risk_db.json"));
    }

    #[test]
    fn enrich_takes_risk_db_positionally() {
        let [_, enrich, _] = Stage::all(&WorkflowConfig::default(), &paths());
        assert_eq!(
            args(&enrich),
            vec![
                "llm_api_enricher.py",
                "/lxc/risk_db.json",
                "--out",
                "/lxc/risk_db_llm.json"
            ]
        );
        assert_eq!(enrich.command.cwd, Some(PathBuf::from("/lxc")));
    }

    #[test]
    fn map_consumes_enriched_db() {
        let [_, _, map] = Stage::all(&WorkflowConfig::default(), &paths());
        assert_eq!(
            args(&map),
            vec![
                "threat_api_mapper.py",
                "--code",
                "/code",
                "--risk",
                "/lxc/risk_db_llm.json",
                "--out",
                "/lxc/threat_map.json"
            ]
        );
        assert_eq!(map.output, PathBuf::from("/lxc/threat_map.json"));
    }

    #[test]
    fn map_appends_configured_filters() {
        let mut config = WorkflowConfig::default();
        config.mapping.min_epss = Some(0.5);
        config.mapping.kev_only = true;
        let [_, _, map] = Stage::all(&config, &paths());
        let args = args(&map);
        assert_eq!(&args[7..], ["--min-epss", "0.5", "--kev-only"]);
    }

    #[test]
    fn artifact_labels() {
        assert_eq!(StageKind::Extract.artifact_label(), "risk DB");
        assert_eq!(StageKind::Enrich.artifact_label(), "enriched DB");
        assert_eq!(StageKind::Map.artifact_label(), "threat map");
    }
}
