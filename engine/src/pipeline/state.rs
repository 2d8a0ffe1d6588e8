use super::PipelineController;
use gstreamer as gst;
use gstreamer_app as gst_app;
use inflow_types::{PipelineId, PipelineState};

impl PipelineController {
    /// Current lifecycle state.
    ///
    /// Returns the cached state maintained by the controller and the bus
    /// watch rather than querying the pipeline, which can stall on async
    /// elements mid-transition.
    pub fn state(&self) -> PipelineState {
        *self
            .cached_state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(super) fn set_cached_state(&self, state: PipelineState) {
        *self
            .cached_state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    /// The pipeline's unique id.
    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// The pipeline's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of elements owned by the pipeline bin.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Look up an owned element by id.
    pub fn element(&self, id: &str) -> Option<&gst::Element> {
        self.elements.get(id)
    }

    /// The underlying pipeline (for debugging).
    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    /// The application source element.
    pub(crate) fn source_element(&self) -> &gst_app::AppSrc {
        &self.source
    }
}

/// Map a lifecycle state onto the runtime's state code.
pub(super) fn to_gst(state: PipelineState) -> gst::State {
    match state {
        PipelineState::Null => gst::State::Null,
        PipelineState::Ready => gst::State::Ready,
        PipelineState::Paused => gst::State::Paused,
        PipelineState::Playing => gst::State::Playing,
    }
}

/// Map a runtime state code back onto the lifecycle chain.
pub(super) fn from_gst(state: gst::State) -> PipelineState {
    match state {
        gst::State::Null => PipelineState::Null,
        gst::State::Ready => PipelineState::Ready,
        gst::State::Paused => PipelineState::Paused,
        gst::State::Playing => PipelineState::Playing,
        _ => PipelineState::Null,
    }
}
