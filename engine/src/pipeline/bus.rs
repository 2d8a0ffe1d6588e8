use super::{state, PipelineController};
use gstreamer as gst;
use gstreamer::prelude::*;
use inflow_types::PipelineEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Handle to the bus watcher thread.
pub(super) struct BusWatch {
    handle: thread::JoinHandle<()>,
    stop: Arc<AtomicBool>,
}

impl PipelineController {
    /// Spawn the bus watcher.
    ///
    /// The watcher drains the pipeline bus, keeps the cached lifecycle
    /// state current, and broadcasts errors, warnings, and end-of-stream to
    /// subscribers. Idempotent while a watcher is already running.
    pub(super) fn spawn_bus_watch(&mut self) {
        if self.bus_watch.is_some() {
            return;
        }
        let Some(bus) = self.pipeline.bus() else {
            warn!("Pipeline '{}' has no bus; messages will be lost", self.name);
            return;
        };

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let events = self.events.clone();
        let cached_state = Arc::clone(&self.cached_state);
        let pipeline_id = self.id;
        let name = self.name.clone();

        let spawned = thread::Builder::new()
            .name(format!("bus-{}", self.name))
            .spawn(move || {
                while !stop_flag.load(Ordering::Relaxed) {
                    let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(100)) else {
                        continue;
                    };
                    match msg.view() {
                        gst::MessageView::Error(err) => {
                            let error_msg = err.error().to_string();
                            let source = err.src().map(|s| s.name().to_string());
                            error!(
                                "Pipeline '{}' error: {} (debug: {:?}, source: {:?})",
                                name,
                                error_msg,
                                err.debug(),
                                source
                            );
                            events.broadcast(PipelineEvent::PipelineError {
                                pipeline_id,
                                error: error_msg,
                                source,
                            });
                        }
                        gst::MessageView::Warning(w) => {
                            let warning_msg = w.error().to_string();
                            let source = w.src().map(|s| s.name().to_string());
                            warn!(
                                "Pipeline '{}' warning: {} (source: {:?})",
                                name, warning_msg, source
                            );
                            events.broadcast(PipelineEvent::PipelineWarning {
                                pipeline_id,
                                warning: warning_msg,
                                source,
                            });
                        }
                        gst::MessageView::Eos(_) => {
                            info!("Pipeline '{}' reached end of stream", name);
                            events.broadcast(PipelineEvent::PipelineEos { pipeline_id });
                        }
                        gst::MessageView::StateChanged(changed) => {
                            let Some(source) = msg.src() else { continue };
                            if source.type_() != gst::Pipeline::static_type() {
                                // Element-level transitions are debug noise
                                debug!(
                                    "Element '{}' in '{}' changed: {:?} -> {:?}",
                                    source.name(),
                                    name,
                                    changed.old(),
                                    changed.current()
                                );
                                continue;
                            }
                            let old = state::from_gst(changed.old());
                            let new = state::from_gst(changed.current());
                            info!("Pipeline '{}' state changed: {} -> {}", name, old, new);
                            *cached_state
                                .write()
                                .unwrap_or_else(|poisoned| poisoned.into_inner()) = new;
                            events.broadcast(PipelineEvent::StateChanged {
                                pipeline_id,
                                old,
                                new,
                            });
                        }
                        _ => {}
                    }
                }
            });

        match spawned {
            Ok(handle) => self.bus_watch = Some(BusWatch { handle, stop }),
            Err(e) => warn!("Failed to spawn bus watcher for '{}': {}", self.name, e),
        }
    }

    /// Stop and join the bus watcher. Idempotent.
    pub(super) fn stop_bus_watch(&mut self) {
        if let Some(watch) = self.bus_watch.take() {
            watch.stop.store(true, Ordering::Relaxed);
            if watch.handle.join().is_err() {
                warn!("Bus watcher for '{}' panicked", self.name);
            }
        }
    }
}
