//! Application-fed GStreamer pipeline controller.
//!
//! This crate owns the life of one GStreamer pipeline whose first element is
//! an application source: it builds the topology from a declarative
//! description, negotiates a fixed video format on the source, walks the
//! lifecycle state machine up to PLAYING and back down, and hands the caller
//! a [`feed::FrameFeeder`] through which externally produced frames are
//! pushed until end of stream.
//!
//! Typical use:
//!
//! ```no_run
//! use inflow::{config::EngineSettings, events::EventBroadcaster, pipeline::PipelineController};
//! use inflow_types::{ElementRole, ElementSpec, Fraction, PipelineSpec, VideoCapsSpec};
//!
//! # fn main() -> anyhow::Result<()> {
//! inflow::runtime::init()?;
//!
//! let mut spec = PipelineSpec::new("preview");
//! spec.elements = vec![
//!     ElementSpec::new("src", "appsrc", ElementRole::Source),
//!     ElementSpec::new("convert", "videoconvert", ElementRole::Transform),
//!     ElementSpec::new("sink", "fakesink", ElementRole::Sink),
//! ];
//!
//! let mut controller = PipelineController::new(
//!     &spec,
//!     EngineSettings::default(),
//!     EventBroadcaster::default(),
//! )?;
//! controller.apply_source_caps(&VideoCapsSpec::raw("I420", 1280, 720, Fraction::new(30, 1)))?;
//!
//! let mut feeder = controller.take_feeder().expect("feeder already taken");
//! controller.start()?;
//! feeder.push_frame(&[0u8; 4096])?;
//! feeder.end_of_stream()?;
//! controller.stop()?;
//! controller.teardown();
//! # Ok(())
//! # }
//! ```

pub mod caps;
pub mod config;
pub mod events;
pub mod feed;
pub mod pipeline;
pub mod runtime;

pub use caps::CapsError;
pub use config::{EngineSettings, SettingsError, SourceSettings};
pub use events::EventBroadcaster;
pub use feed::{FeedError, FrameFeeder};
pub use pipeline::{PipelineController, PipelineError};
pub use runtime::RuntimeError;
