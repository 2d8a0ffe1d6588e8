//! Pipeline lifecycle management.

mod bus;
mod construction;
mod lifecycle;
mod properties;
mod state;

use crate::config::EngineSettings;
use crate::events::EventBroadcaster;
use crate::feed::FrameFeeder;
use bus::BusWatch;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use inflow_types::{ElementId, PipelineId, PipelineState};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("media runtime is not initialized; call runtime::init first")]
    RuntimeNotInitialized,

    #[error("failed to create element: {0}")]
    ElementCreation(String),

    #[error("duplicate element id: {0}")]
    DuplicateElement(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("failed to link elements: {0} -> {1}")]
    Link(String, String),

    #[error("invalid property value for {element}.{property}: {reason}")]
    InvalidProperty {
        element: String,
        property: String,
        reason: String,
    },

    #[error("pipeline state change failed: {0}")]
    StateChange(String),

    #[error("pipeline is unusable after a failed state change; tear it down")]
    Poisoned,
}

/// Owns and drives a single application-fed pipeline.
///
/// Construction builds and links the whole topology; a link failure there is
/// final, and a partially constructed pipeline is never handed out. The
/// controller is the only writer of pipeline state; producers interact
/// exclusively through the [`FrameFeeder`] surrendered by
/// [`PipelineController::take_feeder`].
pub struct PipelineController {
    id: PipelineId,
    name: String,
    pipeline: gst::Pipeline,
    elements: HashMap<ElementId, gst::Element>,
    /// The application source; also reachable through `elements`
    source: gst_app::AppSrc,
    /// Surrendered at most once to the single producer
    feeder: Option<FrameFeeder>,
    events: EventBroadcaster,
    settings: EngineSettings,
    /// Maintained by the bus watch; avoids querying async elements
    /// mid-transition
    cached_state: Arc<RwLock<PipelineState>>,
    bus_watch: Option<BusWatch>,
    /// Set when a state change fails; only teardown remains valid
    poisoned: bool,
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        debug!("Dropping pipeline '{}'", self.name);
        // Backstop: a live pipeline leaks runtime resources unless it is
        // driven back to NULL before release.
        let _ = self.pipeline.set_state(gst::State::Null);
        self.stop_bus_watch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime;
    use gstreamer::prelude::*;
    use inflow_types::{
        ElementRole, ElementSpec, Fraction, PipelineSpec, PipelineState, PropertyValue,
        VideoCapsSpec,
    };
    use serial_test::serial;

    fn create_test_spec() -> PipelineSpec {
        let mut spec = PipelineSpec::new("test-pipeline");
        let mut sink = ElementSpec::new("sink", "fakesink", ElementRole::Sink);
        sink.properties
            .insert("sync".to_string(), PropertyValue::Bool(false));
        spec.elements = vec![
            ElementSpec::new("src", "appsrc", ElementRole::Source),
            sink,
        ];
        spec
    }

    fn create_controller(spec: &PipelineSpec) -> Result<PipelineController, PipelineError> {
        PipelineController::new(spec, EngineSettings::default(), EventBroadcaster::default())
    }

    #[test]
    #[serial]
    fn test_create_pipeline() {
        runtime::init().unwrap();
        let controller = create_controller(&create_test_spec());
        assert!(controller.is_ok());
        let controller = controller.unwrap();
        assert_eq!(controller.element_count(), 2);
        assert_eq!(controller.state(), PipelineState::Null);
    }

    #[test]
    #[serial]
    fn test_duplicate_element_id_rejected() {
        runtime::init().unwrap();
        let mut spec = create_test_spec();
        spec.elements.push(ElementSpec::new(
            "sink",
            "fakesink",
            ElementRole::Sink,
        ));
        let result = create_controller(&spec);
        assert!(matches!(result, Err(PipelineError::DuplicateElement(id)) if id == "sink"));
    }

    #[test]
    #[serial]
    fn test_missing_source_rejected() {
        runtime::init().unwrap();
        let mut spec = PipelineSpec::new("no-source");
        spec.elements = vec![ElementSpec::new("sink", "fakesink", ElementRole::Sink)];
        assert!(matches!(
            create_controller(&spec),
            Err(PipelineError::InvalidTopology(_))
        ));
    }

    #[test]
    #[serial]
    fn test_two_sources_rejected() {
        runtime::init().unwrap();
        let mut spec = create_test_spec();
        spec.elements
            .push(ElementSpec::new("src2", "appsrc", ElementRole::Source));
        assert!(matches!(
            create_controller(&spec),
            Err(PipelineError::InvalidTopology(_))
        ));
    }

    #[test]
    #[serial]
    fn test_invalid_factory_rejected() {
        runtime::init().unwrap();
        let mut spec = create_test_spec();
        spec.elements[1].factory = "nonexistentelement".to_string();
        assert!(matches!(
            create_controller(&spec),
            Err(PipelineError::ElementCreation(_))
        ));
    }

    #[test]
    #[serial]
    fn test_unlinkable_topology_fails_at_construction() {
        runtime::init().unwrap();
        let mut spec = create_test_spec();
        // fakesink has no source pad, so chaining anything after it cannot
        // link
        spec.elements.push(ElementSpec::new(
            "sink2",
            "fakesink",
            ElementRole::Sink,
        ));
        assert!(matches!(
            create_controller(&spec),
            Err(PipelineError::Link(_, _))
        ));
    }

    #[test]
    #[serial]
    fn test_element_properties_applied() {
        runtime::init().unwrap();
        let mut spec = create_test_spec();
        spec.elements[1]
            .properties
            .insert("sync".to_string(), PropertyValue::Bool(false));
        spec.elements[1]
            .properties
            .insert("name-suffix".to_string(), PropertyValue::String("x".into()));
        // Unknown property names must fail loudly rather than be ignored
        let result = create_controller(&spec);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidProperty { .. })
        ));

        let mut spec = create_test_spec();
        spec.elements[1]
            .properties
            .insert("sync".to_string(), PropertyValue::Bool(false));
        let controller = create_controller(&spec).unwrap();
        let sink = controller.element("sink").unwrap();
        assert!(!sink.property::<bool>("sync"));
    }

    #[test]
    #[serial]
    fn test_feeder_taken_once() {
        runtime::init().unwrap();
        let mut controller = create_controller(&create_test_spec()).unwrap();
        assert!(controller.take_feeder().is_some());
        assert!(controller.take_feeder().is_none());
    }

    #[test]
    #[serial]
    fn test_start_stop_pipeline() {
        runtime::init().unwrap();
        // Generous settle timeout; preroll timing varies across machines
        let settings = EngineSettings {
            state_change_timeout_ms: 5000,
            ..EngineSettings::default()
        };
        let mut controller = PipelineController::new(
            &create_test_spec(),
            settings,
            EventBroadcaster::default(),
        )
        .unwrap();

        // A non-live application source prerolls on its first buffer, so
        // attach caps and feed one frame before expecting PLAYING
        controller
            .apply_source_caps(&VideoCapsSpec::raw("I420", 320, 240, Fraction::new(30, 1)))
            .unwrap();
        let mut feeder = controller.take_feeder().unwrap();

        let outcome = controller.start();
        assert!(outcome.is_ok());

        let frame = vec![0u8; 320 * 240 * 3 / 2];
        feeder.push_frame(&frame).unwrap();

        controller.wait_until_settled().unwrap();
        assert_eq!(controller.state(), PipelineState::Playing);

        controller.stop().unwrap();
        assert_eq!(controller.state(), PipelineState::Null);

        controller.teardown();
    }
}
