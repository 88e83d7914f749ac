//! Notification delivery.
//!
//! - [`NotificationDispatcher`] drains a lifecycle [`Outbox`](hostel_core::outbox::Outbox):
//!   it persists notification rows and publishes realtime events on the bus.
//! - [`RealtimeRelay`] subscribes to the bus and forwards each event to the
//!   WebSocket connections in its room.

pub mod dispatcher;
pub mod relay;

pub use dispatcher::NotificationDispatcher;
pub use relay::RealtimeRelay;
