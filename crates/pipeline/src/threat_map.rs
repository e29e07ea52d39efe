//! threat map 로딩과 엔트리 검증
//!
//! threat map은 객체 배열인 JSON 문서입니다. 각 객체는 최소한 `file`과
//! `api` 문자열을 가지며 `code_root`는 선택입니다. 매핑 도구가 덧붙이는
//! `line`, `cve`, `severity` 같은 다른 필드는 무시하거나 참고용으로만 읽습니다.
//!
//! 검증은 로드 시점에 한 번만 수행합니다. 객체가 아닌 원소와 `file` 또는
//! `api`가 없거나 비어 있는 엔트리는 에러가 아니라 제외 대상입니다.
//! 필드 타입이 다르면 그 필드가 없는 것으로 봅니다. 따라서 `line`이 `"12"`여도
//! 엔트리는 유지되고, `file`이 숫자면 `MissingFile`로 제외됩니다.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::PipelineError;

/// threat map 원본 레코드 (모든 필드 선택, 타입이 다른 값은 `None`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThreatEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub api: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code_root: Option<String>,
    #[serde(default, deserialize_with = "lenient_line")]
    pub line: Option<u64>,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_line<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.and_then(|v| v.as_u64()))
}

/// 엔트리를 제외한 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingFile,
    MissingApi,
    /// JSON 객체가 아님
    Malformed,
}

/// 검증을 통과한 threat map 엔트리
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatEntry {
    /// `code_root` 기준 상대 소스 경로
    pub file: String,
    /// 매칭된 API 패턴 (정규식 앵커/이스케이프 문자를 포함할 수 있음)
    pub api: String,
    /// `file`의 기준 디렉토리 (없으면 빈 문자열)
    pub code_root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl TryFrom<RawThreatEntry> for ThreatEntry {
    type Error = SkipReason;

    fn try_from(raw: RawThreatEntry) -> Result<Self, Self::Error> {
        let file = raw
            .file
            .filter(|f| !f.is_empty())
            .ok_or(SkipReason::MissingFile)?;
        let api = raw
            .api
            .filter(|a| !a.is_empty())
            .ok_or(SkipReason::MissingApi)?;
        Ok(Self {
            file,
            api,
            code_root: raw.code_root.unwrap_or_default(),
            line: raw.line,
        })
    }
}

/// 검증된 threat map
#[derive(Debug, Clone, Default)]
pub struct ThreatMap {
    /// 유효한 엔트리 (원본 순서 유지)
    pub entries: Vec<ThreatEntry>,
    /// 제외된 엔트리 수
    pub skipped: usize,
}

impl ThreatMap {
    /// JSON 문자열에서 threat map을 파싱합니다.
    ///
    /// 최상위가 배열이 아니거나 JSON이 아니면 에러입니다. `source`는 에러 메시지용입니다.
    pub fn parse(json: &str, source: &str) -> Result<Self, PipelineError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| PipelineError::ThreatMapParse {
                path: source.to_owned(),
                reason: e.to_string(),
            })?;

        let serde_json::Value::Array(items) = value else {
            return Err(PipelineError::ThreatMapParse {
                path: source.to_owned(),
                reason: "expected a JSON array of entries".to_owned(),
            });
        };

        let mut map = Self::default();
        for (index, item) in items.into_iter().enumerate() {
            let validated = if item.is_object() {
                serde_json::from_value::<RawThreatEntry>(item)
                    .map_err(|_| SkipReason::Malformed)
                    .and_then(ThreatEntry::try_from)
            } else {
                Err(SkipReason::Malformed)
            };
            match validated {
                Ok(entry) => map.entries.push(entry),
                Err(reason) => {
                    debug!(index, ?reason, "skipping threat map entry");
                    map.skipped += 1;
                }
            }
        }
        Ok(map)
    }

    /// 파일에서 threat map을 읽습니다.
    pub async fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|source| {
            PipelineError::ThreatMapRead {
                path: path.display().to_string(),
                source,
            }
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// 파일에 있던 전체 엔트리 수
    pub fn total(&self) -> usize {
        self.entries.len() + self.skipped
    }
}
