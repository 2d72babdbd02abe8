use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Extension;
use tokio::sync::broadcast::error::RecvError;

use crate::api::ws_types::WsMessage;
use crate::models::AuthUser;
use crate::AppState;

pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user.id))
}

/// Forward dashboard and proposal updates to one client. Proposal updates
/// belonging to other users are skipped.
async fn handle_socket(mut socket: WebSocket, state: AppState, user_id: String) {
    tracing::info!(user_id = %user_id, "Dashboard WebSocket client connected");

    let mut rx = state.ws_tx.subscribe();

    // Send the cached snapshot straight away so the client need not wait a poll.
    if let Some(snapshot) = state.dashboard.get().await {
        let msg = WsMessage::DashboardUpdate(snapshot);
        if let Ok(json) = serde_json::to_string(&msg) {
            if socket.send(Message::Text(json)).await.is_err() {
                return;
            }
        }
    }

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Ok(ws_msg) if !ws_msg.visible_to(&user_id) => {}
                    Ok(ws_msg) => match serde_json::to_string(&ws_msg) {
                        Ok(json) => {
                            if socket.send(Message::Text(json)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize WsMessage");
                        }
                    },
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(user_id = %user_id, skipped = n, "Dashboard WS client lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            client_msg = socket.recv() => {
                match client_msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    tracing::info!(user_id = %user_id, "Dashboard WebSocket client disconnected");
}
