use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::EditorialEvent;

/// In-process event bus backed by `tokio::broadcast`.
/// Single-node; one editing session's listeners share a channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<EditorialEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers. Returns the number of
    /// receivers; an error just means nobody is listening.
    pub fn publish(
        &self,
        event: EditorialEvent,
    ) -> Result<usize, broadcast::error::SendError<EditorialEvent>> {
        self.sender.send(event)
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorialEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
