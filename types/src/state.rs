//! Pipeline lifecycle state definitions.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a media pipeline.
///
/// The four states form a strictly ordered chain
/// (NULL → READY → PAUSED → PLAYING). A pipeline moves along the chain one
/// step at a time; [`PipelineState::path_to`] expands a multi-step request
/// into the sequence of single steps the controller has to walk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum PipelineState {
    /// No resources are allocated (initial and final state)
    #[default]
    Null,
    /// Resources are allocated, the pipeline can go to PAUSED
    Ready,
    /// Data is prerolled but the clock is not running
    Paused,
    /// The pipeline is running
    Playing,
}

impl PipelineState {
    /// The next state towards PLAYING, if there is one.
    pub fn up(self) -> Option<Self> {
        match self {
            Self::Null => Some(Self::Ready),
            Self::Ready => Some(Self::Paused),
            Self::Paused => Some(Self::Playing),
            Self::Playing => None,
        }
    }

    /// The next state towards NULL, if there is one.
    pub fn down(self) -> Option<Self> {
        match self {
            Self::Null => None,
            Self::Ready => Some(Self::Null),
            Self::Paused => Some(Self::Ready),
            Self::Playing => Some(Self::Paused),
        }
    }

    /// The single-step transitions needed to reach `target`, in order,
    /// excluding the current state. Empty when the pipeline is already there.
    pub fn path_to(self, target: Self) -> Vec<Self> {
        let mut path = Vec::new();
        let mut current = self;
        while current != target {
            let next = if target > current {
                current.up()
            } else {
                current.down()
            };
            // The chain is total, so `next` is always present until the
            // target is reached.
            match next {
                Some(state) => {
                    path.push(state);
                    current = state;
                }
                None => break,
            }
        }
        path
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Ready => write!(f, "READY"),
            Self::Paused => write!(f, "PAUSED"),
            Self::Playing => write!(f, "PLAYING"),
        }
    }
}
