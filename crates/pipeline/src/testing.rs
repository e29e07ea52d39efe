//! 테스트용 Mock 프로세스 실행기
//!
//! 외부 도구 없이 파이프라인을 검증할 수 있도록 호출을 기록하고,
//! 지정한 도구의 실패나 산출물 생성을 흉내 냅니다.

use std::path::Path;
use std::sync::Mutex;

use threatviz_core::error::ProcessError;
use threatviz_core::process::{CommandSpec, ProcessRunner};

/// 호출을 기록하는 Mock 실행기
#[derive(Default)]
pub struct MockProcessRunner {
    /// 실행된 명령 목록 (호출 순서대로)
    calls: Mutex<Vec<CommandSpec>>,
    /// (명령줄에 포함된 문자열, 종료 코드): 일치하면 실패
    failures: Vec<(String, i32)>,
    /// 성공 시 `--out`/`-o` 경로에 파일을 만들지 여부
    create_outputs: bool,
    /// 생성하는 산출물의 내용
    output_content: String,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            output_content: "[]".to_owned(),
            ..Self::default()
        }
    }

    /// 성공한 명령의 출력 경로에 파일을 만듭니다.
    pub fn creating_outputs(mut self) -> Self {
        self.create_outputs = true;
        self
    }

    /// 생성할 산출물 내용을 지정합니다.
    pub fn with_output_content(mut self, content: &str) -> Self {
        self.output_content = content.to_owned();
        self
    }

    /// 명령줄에 `needle`이 포함되면 `code`로 실패하게 합니다.
    pub fn failing_on(mut self, needle: &str, code: i32) -> Self {
        self.failures.push((needle.to_owned(), code));
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// `needle`을 포함하는 명령이 실행된 횟수
    pub fn count_matching(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.to_string().contains(needle))
            .count()
    }
}

impl ProcessRunner for MockProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        self.calls.lock().unwrap().push(spec.clone());
        let command = spec.to_string();

        if let Some((_, code)) = self.failures.iter().find(|(n, _)| command.contains(n)) {
            return Err(ProcessError::Failed {
                command,
                code: *code,
            });
        }

        if self.create_outputs {
            for flag in ["--out", "-o"] {
                if let Some(out) = spec.flag_value(flag) {
                    let out = Path::new(out);
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent).unwrap();
                    }
                    std::fs::write(out, &self.output_content).unwrap();
                }
            }
        }

        Ok(())
    }
}
