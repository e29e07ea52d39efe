//! 외부 프로세스 실행 추상화
//!
//! [`ProcessRunner`] trait은 외부 도구 호출을 추상화합니다.
//! 실제 실행은 [`SystemProcessRunner`]가 담당하고, 테스트에서는
//! 호출을 기록하는 mock 구현으로 대체합니다.
//!
//! ```text
//!   Stage Gate / Mapping Translator
//!                 │
//!                 ▼
//!          ┌─────────────┐
//!          │ProcessRunner│ (trait)
//!          └─────────────┘
//!            │         │
//!            ▼         ▼
//!        ┌──────┐  ┌────┐
//!        │System│  │Mock│
//!        └──┬───┘  └────┘
//!           ▼
//!      OS process
//! ```

use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tracing::{error, info};

use crate::error::ProcessError;

/// 실행할 외부 명령
///
/// 실행 파일, 순서가 있는 인자 목록, 선택적 작업 디렉토리로 구성됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    /// `None`이면 호출자의 작업 디렉토리를 상속
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `--flag value` 쌍을 추가합니다.
    pub fn flag(self, flag: &str, value: impl Into<OsString>) -> Self {
        self.arg(flag).arg(value)
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// 플래그 바로 뒤에 오는 값을 찾습니다.
    pub fn flag_value(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// 외부 프로세스 실행 trait
///
/// 구현체는 프로세스가 끝날 때까지 기다리고, 0이 아닌 종료 상태를
/// [`ProcessError::Failed`]로 돌려줍니다. 타임아웃과 재시도는 없습니다.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> impl Future<Output = Result<(), ProcessError>> + Send;
}

/// OS 프로세스로 명령을 실행하는 기본 구현
///
/// 표준 입출력과 환경변수는 부모 프로세스에서 그대로 상속되므로
/// 외부 도구의 출력은 버퍼링 없이 콘솔로 흘러갑니다.
/// [`SystemProcessRunner::stdout_to_stderr`]를 켜면 도구의 stdout도
/// stderr로 보내 호출자의 stdout을 보고서 전용으로 남겨 둡니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner {
    stdout_to_stderr: bool,
}

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 외부 도구의 stdout을 부모 프로세스의 stderr로 보냅니다.
    pub fn stdout_to_stderr(mut self) -> Self {
        self.stdout_to_stderr = true;
        self
    }

    fn stdout(&self) -> Stdio {
        if self.stdout_to_stderr {
            Stdio::from(std::io::stderr())
        } else {
            Stdio::inherit()
        }
    }
}

impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        let command = spec.to_string();
        info!(command = %command, cwd = ?spec.cwd, "running external command");

        let mut cmd = tokio::process::Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(self.stdout())
            .stderr(Stdio::inherit());
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        let status = cmd.status().await.map_err(|source| {
            error!(command = %command, error = %source, "failed to spawn command");
            ProcessError::Spawn {
                command: command.clone(),
                source,
            }
        })?;

        if status.success() {
            return Ok(());
        }

        let code = exit_code_of(status);
        error!(command = %command, code, "command failed");
        Err(ProcessError::Failed { command, code })
    }
}

/// 종료 상태를 정수 종료 코드로 변환합니다.
///
/// 시그널로 종료된 경우 셸 관례대로 `128 + signal`을 사용합니다.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("python3")
            .arg("nvd_api_extractor.py")
            .flag("--sbom", "sbom.json")
            .flag("--out", "/repo/risk_db.json");
        assert_eq!(
            spec.to_string(),
            "python3 nvd_api_extractor.py --sbom sbom.json --out /repo/risk_db.json"
        );
    }

    #[test]
    fn flag_value_finds_following_arg() {
        let spec = CommandSpec::new("python3").flag("-o", "out.png");
        assert_eq!(spec.flag_value("-o"), Some(&OsString::from("out.png")));
        assert_eq!(spec.flag_value("--out"), None);
    }

    #[test]
    fn flag_value_at_end_is_none() {
        let spec = CommandSpec::new("tool").arg("--out");
        assert_eq!(spec.flag_value("--out"), None);
    }

    #[test]
    fn current_dir_is_recorded() {
        let spec = CommandSpec::new("tool").current_dir("/repo");
        assert_eq!(spec.cwd, Some(PathBuf::from("/repo")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_succeeds_on_zero_exit() {
        let spec = CommandSpec::new("sh").arg("-c").arg("exit 0");
        SystemProcessRunner::new().run(&spec).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_reports_exit_code() {
        let spec = CommandSpec::new("sh").arg("-c").arg("exit 3");
        let err = SystemProcessRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, ProcessError::Failed { code: 3, .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_honours_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("touch marker")
            .current_dir(dir.path());
        SystemProcessRunner::new().run(&spec).await.unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_with_stdout_on_stderr_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("echo chatter; touch marker")
            .current_dir(dir.path());
        let runner = SystemProcessRunner::new().stdout_to_stderr();
        runner.run(&spec).await.unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[tokio::test]
    async fn system_runner_missing_program_is_spawn_error() {
        let spec = CommandSpec::new("threatviz-definitely-missing-tool");
        let err = SystemProcessRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
        assert_eq!(err.exit_code(), 127);
    }

    #[cfg(unix)]
    #[test]
    fn signal_exit_maps_to_128_plus_signal() {
        use std::os::unix::process::ExitStatusExt;
        // SIGKILL(9): 하위 7비트가 시그널 번호인 raw wait 상태
        let status = ExitStatus::from_raw(9);
        assert_eq!(exit_code_of(status), 137);
    }
}
