use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use hostel_core::error::CoreError;
use hostel_core::outbox::Room;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppQuery;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::manager::WsManager;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// Rooms a user joins on connect: their own room, plus `admin` for admins.
fn rooms_for(user: &AuthUser) -> Vec<Room> {
    let mut rooms = vec![Room::User(user.user_id)];
    if user.is_admin() {
        rooms.push(Room::Admin);
    }
    rooms
}

/// HTTP handler that authenticates `?token=` and upgrades to WebSocket.
///
/// Browsers cannot set headers on the upgrade request, so the JWT travels in
/// the query string. Invalid tokens are rejected before the upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<WsParams>,
) -> AppResult<Response> {
    let token = params.token.filter(|t| !t.is_empty()).ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Missing token".into()))
    })?;
    let user = AuthUser::from_token(&token, &state.config.jwt)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, user)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection and its rooms with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Drains inbound frames on the current task until the client leaves.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, user: AuthUser) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let rooms = rooms_for(&user);
    tracing::info!(
        conn_id = %conn_id,
        user_id = user.user_id,
        rooms = rooms.len(),
        "WebSocket connected"
    );

    let mut rx = ws_manager.add(conn_id.clone(), user.user_id, &rooms).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // The channel is server-to-client; inbound frames only signal liveness.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id = user.user_id, "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn students_join_only_their_room() {
        let user = AuthUser {
            user_id: 7,
            role: "student".into(),
        };
        assert_eq!(rooms_for(&user), vec![Room::User(7)]);
    }

    #[test]
    fn admins_also_join_admin_room() {
        let user = AuthUser {
            user_id: 1,
            role: "admin".into(),
        };
        assert_eq!(rooms_for(&user), vec![Room::User(1), Room::Admin]);
    }
}
