//! Event types for the BGM event system
//!
//! Provides the shared event definition and EventBus used to broadcast
//! player state to UI listeners.

mod state_types;

pub use state_types::PublicState;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// BGM event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Player state changed
    ///
    /// Emitted exactly once per logical state change (no batching or
    /// debouncing).
    StateUpdate {
        /// Full public state after the change
        state: PublicState,
        /// When the change happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Build a state update stamped with the current time
    pub fn state_update(state: PublicState) -> Self {
        PlayerEvent::StateUpdate {
            state,
            timestamp: chrono::Utc::now(),
        }
    }

    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::StateUpdate { .. } => "StateUpdate",
        }
    }
}

/// Central event distribution
///
/// Thin wrapper over a tokio broadcast channel. Delivery is fire-and-forget:
/// listeners that are not subscribed when an event is emitted never see it.
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before slow receivers lag
    ///
    /// # Examples
    ///
    /// ```
    /// use bgm_common::events::{EventBus, PlayerEvent, PublicState};
    ///
    /// let event_bus = EventBus::new(100);
    /// let mut rx = event_bus.subscribe();
    /// event_bus.emit_lossy(PlayerEvent::state_update(PublicState::default()));
    /// assert!(rx.try_recv().is_ok());
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_lossy() {
        let bus = EventBus::new(10);
        // Must not panic
        bus.emit_lossy(PlayerEvent::state_update(PublicState::default()));

        // Late subscribers never see earlier events
        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        for volume in [0.1_f32, 0.2, 0.3] {
            let state = PublicState {
                volume,
                ..PublicState::default()
            };
            bus.emit_lossy(PlayerEvent::state_update(state));
        }

        for expected in [0.1_f32, 0.2, 0.3] {
            let PlayerEvent::StateUpdate { state, .. } = rx.recv().await.unwrap();
            assert_eq!(state.volume, expected);
        }
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = PlayerEvent::state_update(PublicState::default());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "StateUpdate");
        assert_eq!(json["state"]["current_index"], -1);
        assert_eq!(json["state"]["source"], "trending");
        assert_eq!(event.event_type(), "StateUpdate");
    }
}
