//! CLI-specific error types and exit code mapping

use threatviz_core::error::ThreatvizError;
use threatviz_pipeline::PipelineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a one-line diagnostic on stderr.
/// The `exit_code()` method maps errors to the process exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Pipeline or visualization failure.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// Wrapped domain error from threatviz-core.
    #[error("{0}")]
    Core(#[from] ThreatvizError),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (path resolution, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging subscriber could not be installed.
    #[error("logging error: {0}")]
    Logging(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                    |
    /// |------|--------------------------------------------|
    /// | 0    | Success                                    |
    /// | n    | Exit code of the failing external tool     |
    /// | 1    | General / command error                    |
    /// | 2    | Configuration error                        |
    /// | 126  | External tool could not be started         |
    /// | 127  | External tool not found                    |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Pipeline(e) => e.exit_code(),
            Self::Core(e) => e.exit_code(),
            Self::Command(_) | Self::JsonSerialize(_) | Self::Io(_) | Self::Logging(_) => 1,
        }
    }
}
