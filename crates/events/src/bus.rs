//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] carries [`RealtimeEvent`]s from the notification dispatcher
//! to the WebSocket relay. Delivery is best-effort: events published while
//! nobody is subscribed are dropped, and slow subscribers may lag.

use chrono::{DateTime, Utc};
use hostel_core::outbox::{RealtimePush, Room};
use hostel_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RealtimeEvent
// ---------------------------------------------------------------------------

/// A message addressed to one realtime room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeEvent {
    /// Room key, e.g. `"admin"` or `"user:42"`.
    pub room: String,

    /// Client-facing event name, e.g. `"complaintStatusChanged"`.
    pub event: String,

    /// Optional id of the user whose action produced the event.
    pub actor_user_id: Option<DbId>,

    /// Event-specific JSON body.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl RealtimeEvent {
    /// Create an event for `room` with an empty payload.
    pub fn new(room: Room, event: impl Into<String>) -> Self {
        Self {
            room: room.key(),
            event: event.into(),
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// The wire frame sent to clients: `{"event": ..., "data": ...}`.
    pub fn to_frame(&self) -> serde_json::Value {
        serde_json::json!({
            "event": self.event,
            "data": self.payload,
            "timestamp": self.timestamp,
        })
    }
}

impl From<RealtimePush> for RealtimeEvent {
    fn from(push: RealtimePush) -> Self {
        RealtimeEvent::new(push.room, push.event).with_payload(push.payload)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use hostel_core::outbox::Room;
/// use hostel_events::bus::{EventBus, RealtimeEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RealtimeEvent::new(Room::Admin, "complaintCreated"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it; zero is not an error.
    pub fn publish(&self, event: RealtimeEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(
                    room = %event.room,
                    event = %event.event,
                    "No realtime subscribers"
                );
                0
            }
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hostel_core::outbox::EVENT_COMPLAINT_DELETED;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = RealtimeEvent::new(Room::User(7), "complaintStatusChanged")
            .with_actor(1)
            .with_payload(serde_json::json!({"id": 3}));
        assert_eq!(bus.publish(event), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.room, "user:7");
        assert_eq!(received.event, "complaintStatusChanged");
        assert_eq!(received.actor_user_id, Some(1));
        assert_eq!(received.payload["id"], 3);
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(RealtimeEvent::new(Room::Admin, "complaintCreated"));

        assert_eq!(rx1.recv().await.unwrap().room, "admin");
        assert_eq!(rx2.recv().await.unwrap().room, "admin");
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(RealtimeEvent::new(Room::Admin, "complaintCreated")), 0);
    }

    #[test]
    fn push_converts_to_event_and_frame() {
        let push = RealtimePush {
            room: Room::User(5),
            event: EVENT_COMPLAINT_DELETED,
            payload: serde_json::json!({"complaint_id": 9}),
        };
        let event = RealtimeEvent::from(push);
        assert_eq!(event.room, "user:5");

        let frame = event.to_frame();
        assert_eq!(frame["event"], "complaintDeleted");
        assert_eq!(frame["data"]["complaint_id"], 9);
    }

    #[tokio::test]
    async fn lagged_receiver_reports_skipped_events() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..4 {
            bus.publish(RealtimeEvent::new(Room::Admin, "complaintCreated"));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
    }
}
