use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::CategoryEvent;

/// In-process event bus backed by `tokio::broadcast`.
/// Single-node; every document store write goes through here.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<CategoryEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers. Returns how many received it;
    /// zero when nobody is listening.
    pub fn publish(&self, event: CategoryEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<CategoryEvent> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Placement;
    use crate::events::ChangeKind;

    fn deleted(id: &str) -> CategoryEvent {
        CategoryEvent::deleted(
            id,
            Placement::new("Modern", "Kitchen", "Lighting"),
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(deleted("c1")), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Deleted);
        assert_eq!(event.category_id, "c1");
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(deleted("c2"));

        assert_eq!(rx1.recv().await.unwrap().category_id, "c2");
        assert_eq!(rx2.recv().await.unwrap().category_id, "c2");
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(deleted("c3")), 0);
    }
}
