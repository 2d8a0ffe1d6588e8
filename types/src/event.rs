//! Events surfaced from the pipeline bus.

use crate::pipeline::PipelineId;
use crate::state::PipelineState;
use serde::{Deserialize, Serialize};

/// Event types broadcast to pipeline observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// The pipeline posted an error; the instance must be torn down
    PipelineError {
        pipeline_id: PipelineId,
        error: String,
        source: Option<String>,
    },
    /// The pipeline posted a warning
    PipelineWarning {
        pipeline_id: PipelineId,
        warning: String,
        source: Option<String>,
    },
    /// End of stream reached the sinks
    PipelineEos { pipeline_id: PipelineId },
    /// The pipeline's lifecycle state changed
    StateChanged {
        pipeline_id: PipelineId,
        old: PipelineState,
        new: PipelineState,
    },
}

impl PipelineEvent {
    /// Short human-readable description for log lines.
    pub fn description(&self) -> String {
        match self {
            Self::PipelineError { error, .. } => format!("pipeline error: {}", error),
            Self::PipelineWarning { warning, .. } => format!("pipeline warning: {}", warning),
            Self::PipelineEos { .. } => "end of stream".to_string(),
            Self::StateChanged { old, new, .. } => format!("state changed: {} -> {}", old, new),
        }
    }
}
