//! Hostel complaint tracker realtime event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RealtimeEvent`]: the envelope pushed to WebSocket rooms.

pub mod bus;

pub use bus::{EventBus, RealtimeEvent};
