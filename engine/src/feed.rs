//! Buffer feed protocol for the application source.
//!
//! A [`FrameFeeder`] is the single hand-off point between a frame producer
//! and a playing pipeline. It is surrendered once by
//! [`PipelineController::take_feeder`](crate::pipeline::PipelineController::take_feeder);
//! pushes take `&mut self`, so producer access is serialized by ownership
//! rather than by a lock around the source element.

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use inflow_types::{FlowOutcome, PipelineId};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("buffer allocation failed: {0}")]
    Allocation(String),

    #[error("buffer holds {available} bytes, frame needs {requested}")]
    ShortWrite { available: usize, requested: usize },

    #[error("cannot push frames after end of stream")]
    AfterEndOfStream,

    #[error("end of stream was already signalled")]
    EndOfStreamAlreadySignalled,

    #[error("end-of-stream event was rejected: {0}")]
    EndOfStreamRejected(String),
}

/// Pushes externally produced frames into the pipeline's source element.
///
/// Not `Clone`: one feeder per source element, one producer per feeder.
/// With the default settings a push blocks while the source queue is full,
/// keeping at most one frame in flight from the caller's perspective.
pub struct FrameFeeder {
    source: gst_app::AppSrc,
    pipeline_id: PipelineId,
    eos_sent: bool,
    frames_pushed: u64,
    bytes_pushed: u64,
}

impl FrameFeeder {
    pub(crate) fn new(source: gst_app::AppSrc, pipeline_id: PipelineId) -> Self {
        Self {
            source,
            pipeline_id,
            eos_sent: false,
            frames_pushed: 0,
            bytes_pushed: 0,
        }
    }

    /// Copy `bytes` into a freshly allocated buffer and hand it to the
    /// source element.
    ///
    /// Blocks until the pipeline accepts or rejects the buffer; ownership of
    /// the buffer transfers on push. Flow conditions the caller is expected
    /// to branch on ([`FlowOutcome::Flushing`], [`FlowOutcome::NotNegotiated`])
    /// come back as outcomes, not errors.
    pub fn push_frame(&mut self, bytes: &[u8]) -> Result<FlowOutcome, FeedError> {
        if self.eos_sent {
            return Err(FeedError::AfterEndOfStream);
        }
        // Without caps the source cannot negotiate; the underlying push
        // would only report it after the buffer is queued, so refuse here.
        if self.source.caps().is_none() {
            debug!(
                "Push on source '{}' without caps attached",
                self.source.name()
            );
            return Ok(FlowOutcome::NotNegotiated);
        }

        let mut buffer = gst::Buffer::with_size(bytes.len())
            .map_err(|e| FeedError::Allocation(e.to_string()))?;
        {
            let buffer_mut = buffer
                .get_mut()
                .ok_or_else(|| FeedError::Allocation("buffer is not writable".to_string()))?;
            let mut map = buffer_mut
                .map_writable()
                .map_err(|e| FeedError::Allocation(e.to_string()))?;
            let dst = map.as_mut_slice();
            if dst.len() < bytes.len() {
                return Err(FeedError::ShortWrite {
                    available: dst.len(),
                    requested: bytes.len(),
                });
            }
            dst[..bytes.len()].copy_from_slice(bytes);
        }

        match self.source.push_buffer(buffer) {
            Ok(_) => {
                self.frames_pushed += 1;
                self.bytes_pushed += bytes.len() as u64;
                Ok(FlowOutcome::Ok)
            }
            Err(gst::FlowError::Flushing) => {
                debug!("Pipeline {} is flushing; stop producing", self.pipeline_id);
                Ok(FlowOutcome::Flushing)
            }
            Err(gst::FlowError::NotNegotiated) => Ok(FlowOutcome::NotNegotiated),
            Err(gst::FlowError::Eos) => Err(FeedError::AfterEndOfStream),
            Err(e) => {
                warn!("Push into pipeline {} failed: {:?}", self.pipeline_id, e);
                Ok(FlowOutcome::Error)
            }
        }
    }

    /// Announce that no further frames will follow.
    ///
    /// Must be called exactly once, after the last successful push. A second
    /// call is rejected rather than silently duplicating the end marker.
    pub fn end_of_stream(&mut self) -> Result<(), FeedError> {
        if self.eos_sent {
            return Err(FeedError::EndOfStreamAlreadySignalled);
        }
        match self.source.end_of_stream() {
            Ok(_) => {
                debug!(
                    "End of stream signalled on pipeline {} after {} frames",
                    self.pipeline_id, self.frames_pushed
                );
                self.eos_sent = true;
                Ok(())
            }
            Err(gst::FlowError::Flushing) => {
                // The pipeline is already shutting down; the marker is moot
                debug!(
                    "End of stream on flushing pipeline {}; treated as done",
                    self.pipeline_id
                );
                self.eos_sent = true;
                Ok(())
            }
            Err(e) => Err(FeedError::EndOfStreamRejected(format!("{:?}", e))),
        }
    }

    /// Whether end of stream has been signalled.
    pub fn is_finished(&self) -> bool {
        self.eos_sent
    }

    /// Frames accepted by the pipeline so far.
    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    /// Payload bytes accepted by the pipeline so far.
    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }
}
