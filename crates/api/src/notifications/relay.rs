//! Event bus to WebSocket bridge.

use std::sync::Arc;

use axum::extract::ws::Message;
use hostel_events::RealtimeEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Forwards every bus event to the connections in the event's room.
pub struct RealtimeRelay {
    ws_manager: Arc<WsManager>,
}

impl RealtimeRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop.
    ///
    /// Exits when the channel is closed (i.e. the
    /// [`EventBus`](hostel_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<RealtimeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.deliver(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Realtime relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, realtime relay shutting down");
                    break;
                }
            }
        }
    }

    /// Send one event to its room. Returns the number of connections reached.
    pub async fn deliver(&self, event: &RealtimeEvent) -> usize {
        let frame = Message::Text(event.to_frame().to_string().into());
        let sent = self.ws_manager.send_to_room(&event.room, frame).await;
        tracing::trace!(room = %event.room, event = %event.event, sent, "Relayed realtime event");
        sent
    }
}
