//! 에러 타입 — 도메인별 에러 정의

/// threatviz 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ThreatvizError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 외부 프로세스 실행 에러
    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThreatvizError {
    /// 프로그램이 종료할 때 사용할 종료 코드
    ///
    /// 외부 프로세스 실패는 해당 프로세스의 종료 코드를 그대로 전달합니다.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Process(e) => e.exit_code(),
            Self::Config(_) => 2,
            Self::Io(_) => 1,
        }
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 외부 프로세스 실행 에러
///
/// 모든 외부 도구 호출은 단일 실패 단위입니다. 재시도는 없습니다.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// 프로세스가 0이 아닌 상태로 종료됨
    #[error("command failed with exit code {code}: {command}")]
    Failed { command: String, code: i32 },

    /// 프로세스를 시작하지 못함 (실행 파일 없음, 권한 등)
    #[error("failed to spawn command: {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessError {
    /// 셸 관례를 따르는 종료 코드
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | n    | 자식 프로세스의 종료 코드 그대로        |
    /// | 126  | 실행 파일은 있으나 시작 실패            |
    /// | 127  | 실행 파일을 찾을 수 없음                |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Failed { code, .. } => *code,
            Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound => 127,
            Self::Spawn { .. } => 126,
        }
    }
}
