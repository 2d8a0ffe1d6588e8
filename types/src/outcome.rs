//! State-change and buffer-flow outcomes.

use serde::{Deserialize, Serialize};

/// Non-failing result of a state-change request.
///
/// A request that the pipeline rejects outright is reported as an error, not
/// an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChangeOutcome {
    /// The pipeline reached the requested state
    Success,
    /// The transition is still in progress; the caller must wait for the
    /// pipeline to settle before depending on the new state
    Async,
}

/// Normalized result of pushing a frame into the source element.
///
/// The underlying flow codes conflate buffer acceptance with signal
/// delivery; this enum is the four-way split the feed loop branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowOutcome {
    /// The buffer was accepted
    Ok,
    /// The pipeline is shutting down; stop producing
    Flushing,
    /// Unrecoverable; abort the feed loop and tear the pipeline down
    Error,
    /// Caps were never attached or are incompatible; fix caps before retrying
    NotNegotiated,
}

impl FlowOutcome {
    /// Whether the feed loop must abort and escalate to teardown.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Whether the caller may keep pushing frames.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for FlowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Flushing => write!(f, "FLUSHING"),
            Self::Error => write!(f, "ERROR"),
            Self::NotNegotiated => write!(f, "NOT_NEGOTIATED"),
        }
    }
}
