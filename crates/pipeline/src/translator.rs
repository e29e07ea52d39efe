//! Mapping Translator — threat map 엔트리를 시각화 도구 호출로 변환
//!
//! 각 유효 엔트리에 대해:
//!
//! 1. `code_root`와 `file`을 이어 소스 경로를 만듭니다.
//! 2. 소스 파일 이름에서 확장자를 뺀 base name을 구합니다.
//! 3. `api` 패턴의 양 끝에서 `^`, `$`, `\` 문자를 제거해 target을 만듭니다.
//! 4. `<output_dir>/<base>_<target>.png`로 출력 경로를 정합니다.
//! 5. `<py> <visualizer_repo>/<visualizer> -f <src> --target <target> -o <png>`를 실행합니다.
//!
//! 출력 이름 충돌은 감지하지 않습니다. 같은 이름이면 나중 엔트리가 덮어씁니다.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use threatviz_core::config::WorkflowConfig;
use threatviz_core::process::{CommandSpec, ProcessRunner};

use crate::error::PipelineError;
use crate::threat_map::{ThreatEntry, ThreatMap};

/// 패턴 양 끝에서 제거하는 문자
const BOUNDARY_CHARS: [char; 3] = ['^', '$', '\\'];

/// API 패턴을 파일 이름에 쓸 target 식별자로 정규화합니다.
///
/// 양 끝의 `^`, `$`, `\`만 제거하고 내부 문자는 그대로 둡니다.
/// 정규식을 해석하지 않으므로 복잡한 패턴은 읽기 어려운 이름이 될 수 있습니다.
///
/// ```
/// use threatviz_pipeline::translator::normalize_target;
///
/// assert_eq!(normalize_target(r"^os\.system$"), r"os\.system");
/// assert_eq!(normalize_target("eval"), "eval");
/// ```
pub fn normalize_target(pattern: &str) -> &str {
    pattern.trim_matches(BOUNDARY_CHARS)
}

/// 엔트리 하나에서 파생된 시각화 작업
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualizationJob {
    /// `code_root`와 `file`을 이은 소스 경로
    pub source: PathBuf,
    /// 정규화된 target 식별자
    pub target: String,
    /// 렌더링될 이미지 경로
    pub output: PathBuf,
}

impl VisualizationJob {
    pub fn from_entry(entry: &ThreatEntry, output_dir: &Path) -> Self {
        let source = Path::new(&entry.code_root).join(&entry.file);
        let base = Path::new(&entry.file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = normalize_target(&entry.api).to_owned();
        let output = output_dir.join(format!("{base}_{target}.png"));
        Self {
            source,
            target,
            output,
        }
    }

    /// 시각화 도구 명령을 만듭니다. 작업 디렉토리는 호출자의 것을 상속합니다.
    pub fn command(&self, config: &WorkflowConfig, visualizer_repo: &Path) -> CommandSpec {
        CommandSpec::new(&config.tools.interpreter)
            .arg(visualizer_repo.join(&config.tools.visualizer))
            .flag("-f", &self.source)
            .flag("--target", &self.target)
            .flag("-o", &self.output)
    }
}

/// 시각화 단계 결과
#[derive(Debug, Clone, Default, Serialize)]
pub struct VisualizationReport {
    pub threat_map: PathBuf,
    pub output_dir: PathBuf,
    /// threat map의 전체 엔트리 수
    pub entries_total: usize,
    /// `file`/`api`가 없어 제외된 엔트리 수
    pub entries_skipped: usize,
    /// 작업 목록 (run에서는 생성된 다이어그램, plan에서는 예정된 작업)
    pub jobs: Vec<VisualizationJob>,
}

/// threat map → 시각화 도구 호출 변환기
pub struct MappingTranslator<'a, R> {
    config: &'a WorkflowConfig,
    visualizer_repo: &'a Path,
    output_dir: &'a Path,
    runner: &'a R,
}

impl<'a, R: ProcessRunner> MappingTranslator<'a, R> {
    pub fn new(
        config: &'a WorkflowConfig,
        visualizer_repo: &'a Path,
        output_dir: &'a Path,
        runner: &'a R,
    ) -> Self {
        Self {
            config,
            visualizer_repo,
            output_dir,
            runner,
        }
    }

    /// threat map에서 작업 목록만 만들고 실행하지 않습니다.
    pub async fn plan(&self, threat_map: &Path) -> Result<VisualizationReport, PipelineError> {
        let map = ThreatMap::load(threat_map).await?;
        Ok(self.report(threat_map, &map, self.jobs(&map)))
    }

    /// 출력 디렉토리를 준비하고 엔트리마다 시각화 도구를 실행합니다.
    ///
    /// # Errors
    ///
    /// - 출력 디렉토리를 만들 수 없으면 `OutputDir`
    /// - threat map을 읽거나 파싱할 수 없으면 `ThreatMapRead` / `ThreatMapParse`
    /// - 시각화 도구가 실패하면 `Process` (남은 엔트리는 처리하지 않음)
    pub async fn run(&self, threat_map: &Path) -> Result<VisualizationReport, PipelineError> {
        tokio::fs::create_dir_all(self.output_dir)
            .await
            .map_err(|source| PipelineError::OutputDir {
                path: self.output_dir.display().to_string(),
                source,
            })?;

        let map = ThreatMap::load(threat_map).await?;
        info!(
            entries = map.entries.len(),
            skipped = map.skipped,
            "loaded threat map"
        );

        let jobs = self.jobs(&map);
        for job in &jobs {
            let command = job.command(self.config, self.visualizer_repo);
            self.runner.run(&command).await?;
            info!(
                target_id = %job.target,
                "Generated diagram: {}",
                job.output.display()
            );
        }

        Ok(self.report(threat_map, &map, jobs))
    }

    fn jobs(&self, map: &ThreatMap) -> Vec<VisualizationJob> {
        map.entries
            .iter()
            .map(|entry| VisualizationJob::from_entry(entry, self.output_dir))
            .collect()
    }

    fn report(
        &self,
        threat_map: &Path,
        map: &ThreatMap,
        jobs: Vec<VisualizationJob>,
    ) -> VisualizationReport {
        VisualizationReport {
            threat_map: threat_map.to_path_buf(),
            output_dir: self.output_dir.to_path_buf(),
            entries_total: map.total(),
            entries_skipped: map.skipped,
            jobs,
        }
    }
}
