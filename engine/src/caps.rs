//! Caps negotiation helper.
//!
//! Builds a fixed capability descriptor for the application source and
//! attaches it before the pipeline leaves the NULL/READY states.

use crate::pipeline::PipelineController;
use gstreamer as gst;
use gstreamer_video as gst_video;
use inflow_types::{PipelineState, VideoCapsSpec};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CapsError {
    #[error("invalid caps field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error("caps cannot change while the pipeline is {0}")]
    PipelineActive(PipelineState),
}

/// Build fixed caps from a descriptor. Pure construction, no side effects.
pub fn build_caps(spec: &VideoCapsSpec) -> Result<gst::Caps, CapsError> {
    validate(spec)?;

    let framerate = gst::Fraction::new(spec.framerate.numerator, spec.framerate.denominator);
    let par = gst::Fraction::new(
        spec.pixel_aspect_ratio.numerator,
        spec.pixel_aspect_ratio.denominator,
    );

    if spec.media_type == "video/x-raw" {
        let mut builder = gst_video::VideoCapsBuilder::new()
            .width(spec.width)
            .height(spec.height)
            .framerate(framerate)
            .pixel_aspect_ratio(par);
        if let Some(name) = &spec.pixel_format {
            let format = gst_video::VideoFormat::from_string(name);
            if format == gst_video::VideoFormat::Unknown {
                return Err(CapsError::UnsupportedFormat(name.clone()));
            }
            builder = builder.format(format);
        }
        Ok(builder.build())
    } else {
        Ok(gst::Caps::builder(spec.media_type.as_str())
            .field("width", spec.width)
            .field("height", spec.height)
            .field("framerate", framerate)
            .field("pixel-aspect-ratio", par)
            .build())
    }
}

fn validate(spec: &VideoCapsSpec) -> Result<(), CapsError> {
    if spec.media_type.is_empty() {
        return Err(CapsError::InvalidField {
            field: "media_type",
            reason: "must not be empty".to_string(),
        });
    }
    if spec.width <= 0 {
        return Err(CapsError::InvalidField {
            field: "width",
            reason: format!("{} is not positive", spec.width),
        });
    }
    if spec.height <= 0 {
        return Err(CapsError::InvalidField {
            field: "height",
            reason: format!("{} is not positive", spec.height),
        });
    }
    if !spec.framerate.is_positive() {
        return Err(CapsError::InvalidField {
            field: "framerate",
            reason: format!("{} is not positive", spec.framerate),
        });
    }
    if !spec.pixel_aspect_ratio.is_positive() {
        return Err(CapsError::InvalidField {
            field: "pixel_aspect_ratio",
            reason: format!("{} is not positive", spec.pixel_aspect_ratio),
        });
    }
    Ok(())
}

impl PipelineController {
    /// Attach fixed caps to the application source.
    ///
    /// Must happen before the pipeline leaves NULL/READY; changing caps on a
    /// pipeline that is PAUSED or PLAYING is a programming error, not a
    /// retryable condition.
    pub fn apply_source_caps(&self, spec: &VideoCapsSpec) -> Result<(), CapsError> {
        let state = self.state();
        if state > PipelineState::Ready {
            return Err(CapsError::PipelineActive(state));
        }
        let caps = build_caps(spec)?;
        self.source_element().set_caps(Some(&caps));
        debug!("Caps attached to source of '{}': {}", self.name(), caps);
        Ok(())
    }
}
