//! End-to-end tests driving a full pipeline: construction, caps, state
//! walks, frame feeding, end of stream, and teardown.

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use inflow::config::EngineSettings;
use inflow::events::EventBroadcaster;
use inflow::feed::FeedError;
use inflow::pipeline::{PipelineController, PipelineError};
use inflow::runtime;
use inflow_types::{
    ElementRole, ElementSpec, FlowOutcome, Fraction, PipelineSpec, PipelineState, PropertyValue,
    VideoCapsSpec,
};
use serial_test::serial;

/// I420 frame payload size for the given dimensions (4:2:0 subsampling).
fn i420_frame_len(width: usize, height: usize) -> usize {
    width * height * 3 / 2
}

fn controller_for(spec: &PipelineSpec) -> PipelineController {
    PipelineController::new(spec, EngineSettings::default(), EventBroadcaster::default())
        .expect("failed to build pipeline")
}

fn source_to_fakesink_spec(name: &str) -> PipelineSpec {
    let mut spec = PipelineSpec::new(name);
    let mut sink = ElementSpec::new("sink", "fakesink", ElementRole::Sink);
    sink.properties
        .insert("sync".to_string(), PropertyValue::Bool(false));
    spec.elements = vec![
        ElementSpec::new("src", "appsrc", ElementRole::Source),
        sink,
    ];
    spec
}

/// Caps for opaque application frames; the sink does not interpret them.
fn opaque_caps() -> VideoCapsSpec {
    VideoCapsSpec {
        media_type: "application/x-frames".to_string(),
        pixel_format: None,
        width: 64,
        height: 64,
        framerate: Fraction::new(30, 1),
        pixel_aspect_ratio: Fraction::new(1, 1),
    }
}

#[test]
#[serial]
fn test_full_playback_scenario() {
    runtime::init().unwrap();

    // source -> converter -> sink, raw video at 1280x720, 30/1, square pixels
    let mut spec = PipelineSpec::new("p1");
    let mut sink = ElementSpec::new("sink", "fakesink", ElementRole::Sink);
    sink.properties
        .insert("sync".to_string(), PropertyValue::Bool(false));
    spec.elements = vec![
        ElementSpec::new("src", "appsrc", ElementRole::Source),
        ElementSpec::new("convert", "videoconvert", ElementRole::Transform),
        sink,
    ];

    let mut controller = controller_for(&spec);
    assert_eq!(controller.name(), "p1");
    assert_eq!(controller.element_count(), 3);

    controller
        .apply_source_caps(&VideoCapsSpec::raw("I420", 1280, 720, Fraction::new(30, 1)))
        .unwrap();

    let mut feeder = controller.take_feeder().unwrap();

    // Explicit upward walk, one step at a time
    for target in [
        PipelineState::Ready,
        PipelineState::Paused,
        PipelineState::Playing,
    ] {
        controller.set_state(target).unwrap();
    }

    let frame = vec![0x80u8; i420_frame_len(1280, 720)];
    assert_eq!(feeder.push_frame(&frame).unwrap(), FlowOutcome::Ok);
    assert_eq!(feeder.frames_pushed(), 1);
    assert_eq!(feeder.bytes_pushed(), frame.len() as u64);

    feeder.end_of_stream().unwrap();
    assert!(feeder.is_finished());

    // Explicit downward walk
    for target in [
        PipelineState::Paused,
        PipelineState::Ready,
        PipelineState::Null,
    ] {
        controller.set_state(target).unwrap();
    }
    assert_eq!(controller.state(), PipelineState::Null);

    controller.teardown();
}

#[test]
#[serial]
fn test_frames_delivered_in_order_and_byte_exact() {
    runtime::init().unwrap();

    let mut spec = PipelineSpec::new("ordered-feed");
    let mut sink = ElementSpec::new("sink", "appsink", ElementRole::Sink);
    sink.properties
        .insert("sync".to_string(), PropertyValue::Bool(false));
    spec.elements = vec![
        ElementSpec::new("src", "appsrc", ElementRole::Source),
        sink,
    ];

    let mut controller = controller_for(&spec);
    controller.apply_source_caps(&opaque_caps()).unwrap();

    let appsink = controller
        .element("sink")
        .unwrap()
        .clone()
        .downcast::<gst_app::AppSink>()
        .unwrap();

    let mut feeder = controller.take_feeder().unwrap();
    controller.start().unwrap();

    let sizes = [1000usize, 2048, 4096, 512];
    for (index, size) in sizes.iter().enumerate() {
        let frame = vec![index as u8; *size];
        assert_eq!(feeder.push_frame(&frame).unwrap(), FlowOutcome::Ok);
    }
    feeder.end_of_stream().unwrap();

    let mut delivered = Vec::new();
    while delivered.len() < sizes.len() {
        let sample = appsink
            .try_pull_sample(gst::ClockTime::from_seconds(5))
            .expect("sink did not deliver all frames");
        let buffer = sample.buffer().expect("sample without buffer");
        let map = buffer.map_readable().unwrap();
        delivered.push((map.len(), map.as_slice()[0]));
    }

    // Push order preserved, sizes byte-exact
    for (index, size) in sizes.iter().enumerate() {
        assert_eq!(delivered[index], (*size, index as u8));
    }
    let total: usize = sizes.iter().sum();
    assert_eq!(feeder.bytes_pushed() as usize, total);

    controller.stop().unwrap();
    controller.teardown();
}

#[test]
#[serial]
fn test_push_before_caps_is_not_negotiated() {
    runtime::init().unwrap();

    let mut controller = controller_for(&source_to_fakesink_spec("no-caps"));
    let mut feeder = controller.take_feeder().unwrap();

    assert_eq!(
        feeder.push_frame(&[0u8; 16]).unwrap(),
        FlowOutcome::NotNegotiated
    );
    assert_eq!(feeder.frames_pushed(), 0);

    controller.teardown();
}

#[test]
#[serial]
fn test_end_of_stream_twice_is_rejected() {
    runtime::init().unwrap();

    let mut controller = controller_for(&source_to_fakesink_spec("eos-twice"));
    controller.apply_source_caps(&opaque_caps()).unwrap();
    let mut feeder = controller.take_feeder().unwrap();
    controller.start().unwrap();

    assert_eq!(feeder.push_frame(&[1u8; 64]).unwrap(), FlowOutcome::Ok);
    feeder.end_of_stream().unwrap();

    assert!(matches!(
        feeder.end_of_stream(),
        Err(FeedError::EndOfStreamAlreadySignalled)
    ));
    assert!(matches!(
        feeder.push_frame(&[2u8; 64]),
        Err(FeedError::AfterEndOfStream)
    ));

    controller.stop().unwrap();
    controller.teardown();
}

#[test]
#[serial]
fn test_push_after_stop_reports_flushing() {
    runtime::init().unwrap();

    let mut controller = controller_for(&source_to_fakesink_spec("flushing"));
    controller.apply_source_caps(&opaque_caps()).unwrap();
    let mut feeder = controller.take_feeder().unwrap();
    controller.start().unwrap();

    assert_eq!(feeder.push_frame(&[1u8; 64]).unwrap(), FlowOutcome::Ok);

    controller.stop().unwrap();

    // The source is flushing now; this is a normal stop signal for the
    // producer, not an application error
    assert_eq!(
        feeder.push_frame(&[2u8; 64]).unwrap(),
        FlowOutcome::Flushing
    );

    controller.teardown();
}

#[test]
#[serial]
fn test_caps_change_refused_once_playing() {
    runtime::init().unwrap();

    let mut controller = controller_for(&source_to_fakesink_spec("caps-lock"));
    controller.apply_source_caps(&opaque_caps()).unwrap();
    controller.start().unwrap();

    assert!(matches!(
        controller.apply_source_caps(&opaque_caps()),
        Err(inflow::caps::CapsError::PipelineActive(_))
    ));

    controller.stop().unwrap();
    controller.teardown();
}

#[test]
#[serial]
fn test_teardown_after_failed_state_change() {
    runtime::init().unwrap();

    // filesink without a location refuses to leave NULL
    let mut spec = PipelineSpec::new("doomed");
    spec.elements = vec![
        ElementSpec::new("src", "appsrc", ElementRole::Source),
        ElementSpec::new("sink", "filesink", ElementRole::Sink),
    ];

    let mut controller = controller_for(&spec);
    let result = controller.start();
    assert!(matches!(result, Err(PipelineError::StateChange(_))));

    // The instance is poisoned; state requests are refused from here on
    assert!(matches!(
        controller.set_state(PipelineState::Playing),
        Err(PipelineError::Poisoned)
    ));

    // Teardown must still release everything
    controller.teardown();
}

#[test]
#[serial]
fn test_state_changed_events_reach_subscribers() {
    runtime::init().unwrap();

    let events = EventBroadcaster::default();
    let mut rx = events.subscribe();

    let spec = source_to_fakesink_spec("events");
    let mut controller =
        PipelineController::new(&spec, EngineSettings::default(), events).unwrap();
    controller.apply_source_caps(&opaque_caps()).unwrap();
    controller.start().unwrap();
    controller.wait_until_settled().unwrap();
    controller.stop().unwrap();
    controller.teardown();

    let mut saw_state_change = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, inflow_types::PipelineEvent::StateChanged { .. }) {
            saw_state_change = true;
        }
    }
    assert!(saw_state_change);
}
