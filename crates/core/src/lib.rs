#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod process;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, ProcessError, ThreatvizError};

// 설정
pub use config::WorkflowConfig;

// 프로세스 실행
pub use process::{CommandSpec, ProcessRunner, SystemProcessRunner};

// 도메인 타입
pub use types::{ArtifactPaths, RunPaths};
