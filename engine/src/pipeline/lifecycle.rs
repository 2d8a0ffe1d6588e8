use super::{state, PipelineController, PipelineError};
use gstreamer as gst;
use gstreamer::prelude::*;
use inflow_types::{PipelineState, StateChangeOutcome};
use tracing::{debug, error, info, warn};

impl PipelineController {
    /// Drive the pipeline to `target`, walking the state chain one
    /// underlying call per step.
    ///
    /// Returns [`StateChangeOutcome::Async`] when any step left a transition
    /// in progress; resolve it with [`PipelineController::wait_until_settled`].
    /// A failed step poisons the controller: the pipeline cannot be retried
    /// in place and must be torn down.
    pub fn set_state(
        &mut self,
        target: PipelineState,
    ) -> Result<StateChangeOutcome, PipelineError> {
        if self.poisoned {
            return Err(PipelineError::Poisoned);
        }

        let current = self.state();
        let path = current.path_to(target);
        if path.is_empty() {
            return Ok(StateChangeOutcome::Success);
        }
        debug!(
            "Pipeline '{}': walking {} -> {} ({} steps)",
            self.name,
            current,
            target,
            path.len()
        );

        let mut outcome = StateChangeOutcome::Success;
        for step in path {
            match self.pipeline.set_state(state::to_gst(step)) {
                Ok(gst::StateChangeSuccess::Success) => {
                    debug!("Pipeline '{}' reached {}", self.name, step);
                }
                Ok(gst::StateChangeSuccess::Async) => {
                    debug!("Pipeline '{}': transition to {} is async", self.name, step);
                    outcome = StateChangeOutcome::Async;
                }
                Ok(gst::StateChangeSuccess::NoPreroll) => {
                    // Live sources settle on their own timeline; treat like
                    // an async transition
                    debug!(
                        "Pipeline '{}': transition to {} returned no-preroll",
                        self.name, step
                    );
                    outcome = StateChangeOutcome::Async;
                }
                Err(e) => {
                    error!(
                        "Pipeline '{}' failed to reach {}: {}",
                        self.name, step, e
                    );
                    self.poisoned = true;
                    return Err(PipelineError::StateChange(format!(
                        "failed to reach {}: {}",
                        step, e
                    )));
                }
            }
            // Optimistic; the bus watch confirms async transitions
            self.set_cached_state(step);
        }

        Ok(outcome)
    }

    /// Start the pipeline (walk to PLAYING).
    pub fn start(&mut self) -> Result<StateChangeOutcome, PipelineError> {
        info!("Starting pipeline '{}'", self.name);
        // The watch must be live before the first transition so no error or
        // state message is missed
        self.spawn_bus_watch();
        self.set_state(PipelineState::Playing)
    }

    /// Stop the pipeline (walk back to NULL).
    pub fn stop(&mut self) -> Result<(), PipelineError> {
        info!("Stopping pipeline '{}'", self.name);
        let result = self.set_state(PipelineState::Null);
        self.stop_bus_watch();
        if result.is_ok() {
            // Late bus messages from the downward walk may have moved the
            // cached state; the walk completed, so NULL is authoritative
            self.set_cached_state(PipelineState::Null);
        }
        result.map(|_| ())
    }

    /// Block until an in-progress state change settles, up to the configured
    /// timeout. This is the only suspension point the controller has.
    pub fn wait_until_settled(&self) -> Result<PipelineState, PipelineError> {
        let timeout = gst::ClockTime::from_mseconds(self.settings.state_change_timeout_ms);
        let (result, current, pending) = self.pipeline.state(timeout);
        match result {
            Ok(_) => {
                let settled = state::from_gst(current);
                self.set_cached_state(settled);
                debug!("Pipeline '{}' settled in {}", self.name, settled);
                Ok(settled)
            }
            Err(e) => Err(PipelineError::StateChange(format!(
                "state change did not settle: {} (current: {:?}, pending: {:?})",
                e, current, pending
            ))),
        }
    }

    /// Release the pipeline and everything it owns.
    ///
    /// Consuming `self` makes a second teardown unrepresentable. The
    /// downward walk is best-effort: when a step fails (including after a
    /// poisoned state change) the pipeline is jumped straight to NULL so
    /// resources are released regardless.
    pub fn teardown(mut self) {
        info!("Tearing down pipeline '{}'", self.name);

        let mut walked = true;
        for step in self.state().path_to(PipelineState::Null) {
            if let Err(e) = self.pipeline.set_state(state::to_gst(step)) {
                warn!(
                    "Pipeline '{}': teardown walk failed at {}: {}; forcing NULL",
                    self.name, step, e
                );
                walked = false;
                break;
            }
            self.set_cached_state(step);
        }
        if !walked {
            if let Err(e) = self.pipeline.set_state(gst::State::Null) {
                warn!("Pipeline '{}': forced NULL failed: {}", self.name, e);
            }
            self.set_cached_state(PipelineState::Null);
        }

        self.stop_bus_watch();
        // Dropping self releases the pipeline and its elements
    }
}
