//! Process-wide media runtime bootstrap.
//!
//! GStreamer must be initialized before any pipeline work, and the library
//! makes no promise about repeat initialization. [`init`] guards the call
//! with a process-wide flag and records the first outcome; later calls
//! observe that outcome instead of touching the library again.

use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("GStreamer initialization failed: {0}")]
    Init(String),
}

/// Initialize the media runtime.
///
/// Safe to call from multiple threads; only the first call runs the
/// bootstrap. Returns the recorded outcome on every call.
pub fn init() -> Result<(), RuntimeError> {
    let outcome = INIT.get_or_init(|| match gstreamer::init() {
        Ok(()) => {
            info!("GStreamer initialized");
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    });
    outcome.clone().map_err(RuntimeError::Init)
}

/// Whether [`init`] has completed successfully.
///
/// Pipeline construction checks this to turn "media subsystem uninitialized"
/// into a reportable error instead of undefined behavior further down.
pub fn is_initialized() -> bool {
    matches!(INIT.get(), Some(Ok(())))
}
