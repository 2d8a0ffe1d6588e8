//! Push synthetically generated video frames through a minimal pipeline.
//!
//! Run with `cargo run --example push_frames`. Needs a display for
//! autovideosink; set `INFLOW_SOURCE__IS_LIVE=true` to present the source as
//! live.

use inflow::config::EngineSettings;
use inflow::events::EventBroadcaster;
use inflow::pipeline::PipelineController;
use inflow_types::{
    ElementRole, ElementSpec, FlowOutcome, Fraction, PipelineSpec, VideoCapsSpec,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const WIDTH: i32 = 320;
const HEIGHT: i32 = 240;
const FRAMES: usize = 90;

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    inflow::runtime::init()?;

    let mut spec = PipelineSpec::new("push-frames");
    spec.elements = vec![
        ElementSpec::new("src", "appsrc", ElementRole::Source),
        ElementSpec::new("convert", "videoconvert", ElementRole::Transform),
        ElementSpec::new("sink", "autovideosink", ElementRole::Sink),
    ];

    let settings = EngineSettings::load()?;
    let events = EventBroadcaster::default();
    let mut event_rx = events.subscribe();

    let mut controller = PipelineController::new(&spec, settings, events)?;
    controller.apply_source_caps(&VideoCapsSpec::raw(
        "I420",
        WIDTH,
        HEIGHT,
        Fraction::new(30, 1),
    ))?;

    let mut feeder = controller.take_feeder().expect("feeder already taken");
    controller.start()?;

    let luma_len = (WIDTH * HEIGHT) as usize;
    let mut frame = vec![0x80u8; luma_len * 3 / 2];
    for n in 0..FRAMES {
        // Animate the luma plane so the output visibly changes
        frame[..luma_len].fill((n * 255 / FRAMES) as u8);
        match feeder.push_frame(&frame)? {
            FlowOutcome::Ok => {}
            FlowOutcome::Flushing => {
                info!("Pipeline is stopping; ending the feed");
                break;
            }
            FlowOutcome::NotNegotiated => {
                warn!("Caps not negotiated; aborting the feed");
                break;
            }
            FlowOutcome::Error => {
                warn!("Fatal flow error; aborting the feed");
                break;
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(33));
    }
    feeder.end_of_stream()?;
    info!(
        "Fed {} frames ({} bytes)",
        feeder.frames_pushed(),
        feeder.bytes_pushed()
    );

    controller.stop()?;
    controller.teardown();

    while let Ok(event) = event_rx.try_recv() {
        info!("Event: {}", event.description());
    }
    Ok(())
}
