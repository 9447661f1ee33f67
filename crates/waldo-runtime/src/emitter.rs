//! Broadcast-based emitter for [`AgentEvent`] dispatch.

use tokio::sync::broadcast;
use waldo_core::events::AgentEvent;

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 256;

/// Non-blocking fan-out of agent events.
///
/// `emit` never awaits and never fails the loop: with no subscribers the
/// event is dropped, and a slow receiver lags out rather than blocking the
/// sender. Delivery failures are the sink's problem, not the loop's.
pub struct EventEmitter {
    tx: broadcast::Sender<AgentEvent>,
}

impl EventEmitter {
    /// Create an emitter with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an emitter with a custom channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Returns the receiver count.
    pub fn emit(&self, event: AgentEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to events emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_with_no_subscribers_is_dropped() {
        let emitter = EventEmitter::new();
        assert_eq!(emitter.emit(AgentEvent::Aborted), 0);
    }

    #[tokio::test]
    async fn emit_and_receive_in_order() {
        let emitter = EventEmitter::new();
        let mut rx = emitter.subscribe();

        let _ = emitter.emit(AgentEvent::Status {
            message: "Thinking…".into(),
        });
        let _ = emitter.emit(AgentEvent::Text { text: "hi".into() });

        assert_eq!(rx.recv().await.unwrap().event_type(), "status");
        assert_eq!(rx.recv().await.unwrap().event_type(), "text");
    }

    #[tokio::test]
    async fn slow_receiver_lags_instead_of_blocking() {
        let emitter = EventEmitter::with_capacity(2);
        let mut rx = emitter.subscribe();

        for _ in 0..3 {
            let _ = emitter.emit(AgentEvent::Aborted);
        }
        assert!(rx.recv().await.is_err());
    }

    #[test]
    fn subscriber_count_tracks_drops() {
        let emitter = EventEmitter::new();
        assert_eq!(emitter.subscriber_count(), 0);
        let rx = emitter.subscribe();
        assert_eq!(emitter.subscriber_count(), 1);
        drop(rx);
        assert_eq!(emitter.subscriber_count(), 0);
    }
}
