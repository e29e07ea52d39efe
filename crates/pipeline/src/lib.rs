#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`PipelineError`)
//! - [`stage`]: Stage definitions and fixed command shapes (`Stage`, `StageKind`, `StageOutcome`)
//! - [`gate`]: Artifact-existence gate around a stage (`run_gated`)
//! - [`controller`]: Sequential extract → enrich → map driver (`PipelineController`)
//! - [`threat_map`]: Threat map loading and entry validation (`ThreatMap`, `ThreatEntry`)
//! - [`translator`]: Threat entry → visualizer call (`MappingTranslator`, `normalize_target`)
//! - [`workflow`]: Pipeline followed by visualization (`run_workflow`, `plan_workflow`)

pub mod controller;
pub mod error;
pub mod gate;
pub mod stage;
pub mod threat_map;
pub mod translator;
pub mod workflow;

#[cfg(test)]
mod testing;

// --- Public API Re-exports ---

pub use controller::{PipelineController, PipelineReport, StageReport};
pub use error::PipelineError;
pub use gate::{artifact_exists, run_gated};
pub use stage::{Stage, StageKind, StageOutcome};
pub use threat_map::{ThreatEntry, ThreatMap};
pub use translator::{MappingTranslator, VisualizationJob, VisualizationReport, normalize_target};
pub use workflow::{WorkflowReport, plan_workflow, run_workflow};
