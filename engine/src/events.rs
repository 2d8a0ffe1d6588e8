//! Event broadcasting for pipeline observers.

use inflow_types::PipelineEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Fan-out channel for [`PipelineEvent`]s.
///
/// Observers may come and go; broadcasting never blocks, and events sent
/// while nobody is subscribed are dropped.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: Arc<broadcast::Sender<PipelineEvent>>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with the given buffer size.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Broadcast an event to all subscribers.
    pub fn broadcast(&self, event: PipelineEvent) {
        debug!("Broadcasting event: {}", event.description());
        // send returns the receiver count; nobody listening is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to events.
    ///
    /// The receiver works from both sync (`blocking_recv`) and async
    /// (`recv`) contexts.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
