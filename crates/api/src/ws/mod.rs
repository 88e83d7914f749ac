//! WebSocket infrastructure for realtime complaint updates.
//!
//! Provides the room-aware connection registry, heartbeat monitoring, and the
//! authenticated HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
