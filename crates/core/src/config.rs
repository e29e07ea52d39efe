//! 설정 관리 — threatviz.toml 파싱 및 런타임 설정
//!
//! [`WorkflowConfig`]는 워크플로우 전체가 공유하는 불변 설정 값입니다.
//! 시작 시 한 번 구성되고 각 컴포넌트에 참조로 전달됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`THREATVIZ_TOOLS_INTERPRETER=python3.12` 형식)
//! 3. 설정 파일 (`--config threatviz.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), threatviz_core::error::ThreatvizError> {
//! use threatviz_core::config::WorkflowConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = WorkflowConfig::load("threatviz.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = WorkflowConfig::parse("[tools]\ninterpreter = \"python3.12\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ThreatvizError};

/// threatviz 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 외부 도구 실행 설정
    #[serde(default)]
    pub tools: ToolsConfig,
    /// 중간 산출물 파일 이름
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// 매핑 단계 추가 옵션
    #[serde(default)]
    pub mapping: MappingConfig,
}

impl WorkflowConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ThreatvizError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값 + 환경변수 오버라이드로 설정을 구성합니다.
    pub fn from_env() -> Result<Self, ThreatvizError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드와 검증 없음).
    ///
    /// 검증은 오버라이드가 적용된 뒤 [`WorkflowConfig::load`]에서 수행됩니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ThreatvizError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ThreatvizError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ThreatvizError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ThreatvizError> {
        toml::from_str(toml_str).map_err(|e| {
            ThreatvizError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `THREATVIZ_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "THREATVIZ_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "THREATVIZ_GENERAL_LOG_FORMAT");

        // Tools
        override_string(&mut self.tools.interpreter, "THREATVIZ_TOOLS_INTERPRETER");
        override_string(&mut self.tools.extractor, "THREATVIZ_TOOLS_EXTRACTOR");
        override_string(&mut self.tools.enricher, "THREATVIZ_TOOLS_ENRICHER");
        override_string(&mut self.tools.mapper, "THREATVIZ_TOOLS_MAPPER");
        override_string(&mut self.tools.visualizer, "THREATVIZ_TOOLS_VISUALIZER");

        // Artifacts
        override_string(&mut self.artifacts.risk_db, "THREATVIZ_ARTIFACTS_RISK_DB");
        override_string(
            &mut self.artifacts.enriched_db,
            "THREATVIZ_ARTIFACTS_ENRICHED_DB",
        );
        override_string(
            &mut self.artifacts.threat_map,
            "THREATVIZ_ARTIFACTS_THREAT_MAP",
        );

        // Mapping
        override_opt_f64(&mut self.mapping.min_epss, "THREATVIZ_MAPPING_MIN_EPSS");
        override_bool(&mut self.mapping.kev_only, "THREATVIZ_MAPPING_KEV_ONLY");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ThreatvizError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let tools = [
            ("tools.interpreter", &self.tools.interpreter),
            ("tools.extractor", &self.tools.extractor),
            ("tools.enricher", &self.tools.enricher),
            ("tools.mapper", &self.tools.mapper),
            ("tools.visualizer", &self.tools.visualizer),
        ];
        for (field, value) in tools {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
        }

        // 산출물은 저장소 디렉토리 바로 아래의 파일 이름이어야 함
        let artifacts = [
            ("artifacts.risk_db", &self.artifacts.risk_db),
            ("artifacts.enriched_db", &self.artifacts.enriched_db),
            ("artifacts.threat_map", &self.artifacts.threat_map),
        ];
        for (field, value) in artifacts {
            validate_file_name(field, value)?;
        }

        if let Some(epss) = self.mapping.min_epss {
            if !(0.0..=1.0).contains(&epss) {
                return Err(ConfigError::InvalidValue {
                    field: "mapping.min_epss".to_owned(),
                    reason: "must be between 0.0 and 1.0".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

fn validate_file_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: format!("'{value}' must be a plain file name"),
        }),
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 외부 도구 설정
///
/// 네 도구 모두 `interpreter`로 실행되는 스크립트입니다.
/// 추출/보강/매핑 도구는 위험-위협 매핑 저장소 안에서,
/// 시각화 도구는 AST 시각화 저장소 경로로 실행됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// 스크립트 인터프리터
    pub interpreter: String,
    /// SBOM → risk DB 추출 스크립트
    pub extractor: String,
    /// risk DB 보강 스크립트
    pub enricher: String,
    /// 코드베이스 → threat map 매핑 스크립트
    pub mapper: String,
    /// AST 시각화 스크립트
    pub visualizer: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_owned(),
            extractor: "nvd_api_extractor.py".to_owned(),
            enricher: "llm_api_enricher.py".to_owned(),
            mapper: "threat_api_mapper.py".to_owned(),
            visualizer: "astvisualizer.py".to_owned(),
        }
    }
}

/// 중간 산출물 파일 이름 (위험-위협 매핑 저장소 기준)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub risk_db: String,
    pub enriched_db: String,
    pub threat_map: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            risk_db: "risk_db.json".to_owned(),
            enriched_db: "risk_db_llm.json".to_owned(),
            threat_map: "threat_map.json".to_owned(),
        }
    }
}

/// 매핑 단계 추가 옵션
///
/// 설정하지 않으면 매핑 명령은 기본 형태(`--code`, `--risk`, `--out`)만 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// 이 EPSS 점수 미만의 CVE 제외
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_epss: Option<f64>,
    /// CISA KEV 카탈로그에 있는 CVE만 포함
    pub kev_only: bool,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_opt_f64(target: &mut Option<f64>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        if val.trim().is_empty() {
            *target = None;
            return;
        }
        match val.parse::<f64>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}
