//! Keep-alive for realtime complaint subscribers.
//!
//! Students and wardens often leave the dashboard open for hours between
//! complaint updates. Proxies drop idle sockets, so every connection gets a
//! ping on a fixed cadence whether or not any event was pushed to its rooms.

use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn the ping loop. `main` aborts the returned handle on shutdown before
/// closing the remaining sockets.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately; nobody needs a ping yet.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            let subscribers = ws_manager.connection_count().await;
            if subscribers == 0 {
                continue;
            }
            tracing::debug!(subscribers, "Pinging realtime subscribers");
            ws_manager.ping_all().await;
        }
    })
}
