//! `threatviz config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use threatviz_core::config::WorkflowConfig;
use threatviz_core::error::ThreatvizError;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Label used as the report source when no file is given.
const ENV_SOURCE: &str = "(defaults + environment)";

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Loads the effective configuration: the file plus env overrides, or
/// defaults plus env overrides when no file is given.
pub async fn load_effective(config_path: Option<&Path>) -> Result<WorkflowConfig, ThreatvizError> {
    match config_path {
        Some(path) => WorkflowConfig::load(path).await,
        None => WorkflowConfig::from_env(),
    }
}

fn source_label(config_path: Option<&Path>) -> String {
    config_path.map_or_else(|| ENV_SOURCE.to_owned(), |p| p.display().to_string())
}

/// Execute the config validate subcommand.
///
/// # Errors
///
/// Returns `CliError::Config` if loading or validation fails. The report is
/// rendered either way.
async fn execute_validate(
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let source = source_label(config_path);
    info!(source = %source, "validating configuration");

    let report = match load_effective(config_path).await {
        Ok(_) => ConfigValidationReport {
            source,
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source,
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the
/// section name is unknown.
async fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let source = source_label(config_path);
    info!(source = %source, "loading configuration");

    let config = load_effective(config_path).await?;

    let config_toml = match section.as_deref() {
        None => toml::to_string_pretty(&config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("tools") => toml::to_string_pretty(&config.tools),
        Some("artifacts") => toml::to_string_pretty(&config.artifacts),
        Some("mapping") => toml::to_string_pretty(&config.mapping),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: general, tools, artifacts, mapping)"
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {e})"));

    writer.render(&ConfigReport {
        source,
        section,
        config_toml,
    })?;

    Ok(())
}

/// Configuration display report.
///
/// `config_toml` is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    /// `None` means the full configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Empty if valid
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_config_report_render_text_specific_section() {
        let report = ConfigReport {
            source: "/etc/threatviz.toml".to_owned(),
            section: Some("tools".to_owned()),
            config_toml: "interpreter = \"python3\"".to_owned(),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("[tools]"), "should show section name");
        assert!(output.contains("interpreter"), "should show config content");
    }

    #[test]
    fn test_config_report_json_skips_toml_body() {
        let report = ConfigReport {
            source: "threatviz.toml".to_owned(),
            section: None,
            config_toml: "[general]".to_owned(),
        };

        let json = serde_json::to_value(&report).expect("JSON serialization should succeed");
        assert_eq!(json["source"].as_str(), Some("threatviz.toml"));
        assert!(json.get("section").is_none(), "None section should be omitted");
        assert!(json.get("config_toml").is_none(), "config_toml should be skipped");
    }

    #[test]
    fn test_config_validation_report_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["failed to parse config".to_owned()],
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("INVALID"));
        assert!(output.contains("failed to parse config"));
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label(None), ENV_SOURCE);
        assert_eq!(
            source_label(Some(Path::new("threatviz.toml"))),
            "threatviz.toml"
        );
    }

    #[tokio::test]
    async fn test_validate_rejects_invalid_file() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("threatviz.toml");
        std::fs::write(&path, "[general]\nlog_format = \"xml\"\n").expect("should write config");

        let writer = OutputWriter::new(OutputFormat::Json);
        let err = execute_validate(Some(path.as_path()), &writer)
            .await
            .expect_err("invalid log format should fail validation");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_show_rejects_unknown_section() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("threatviz.toml");
        std::fs::write(&path, "[tools]\ninterpreter = \"python3\"\n").expect("should write config");

        let writer = OutputWriter::new(OutputFormat::Json);
        let err = execute_show(Some(path.as_path()), Some("ebpf".to_owned()), &writer)
            .await
            .expect_err("unknown section should fail");
        assert!(matches!(err, CliError::Command(_)));
    }
}
