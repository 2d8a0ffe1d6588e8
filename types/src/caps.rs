//! Capability descriptors for the application source.

use serde::{Deserialize, Serialize};

/// A rational number, as used for frame rates and pixel aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i32,
    pub denominator: i32,
}

impl Fraction {
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Both parts strictly positive.
    pub fn is_positive(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Immutable description of the media format produced by the application
/// source.
///
/// Built once, attached to exactly one source element before playback
/// starts. Once the pipeline has left the NULL state the attached caps must
/// not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCapsSpec {
    /// Media type string (e.g., "video/x-raw")
    pub media_type: String,
    /// Pixel format name (e.g., "I420", "RGB"); optional for non-raw types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_format: Option<String>,
    pub width: i32,
    pub height: i32,
    pub framerate: Fraction,
    pub pixel_aspect_ratio: Fraction,
}

impl VideoCapsSpec {
    /// Raw video caps with a square pixel aspect ratio.
    pub fn raw(
        pixel_format: impl Into<String>,
        width: i32,
        height: i32,
        framerate: Fraction,
    ) -> Self {
        Self {
            media_type: "video/x-raw".to_string(),
            pixel_format: Some(pixel_format.into()),
            width,
            height,
            framerate,
            pixel_aspect_ratio: Fraction::new(1, 1),
        }
    }
}
