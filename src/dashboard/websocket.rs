use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use super::state::DashboardState;
use crate::panels::PanelEvent;

/// Axum handler that upgrades an HTTP request to a WebSocket connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<DashboardState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Next notification from either panel; `None` once both channels are closed.
async fn next_event(
    stats_rx: &mut broadcast::Receiver<PanelEvent>,
    messages_rx: &mut broadcast::Receiver<PanelEvent>,
) -> Option<PanelEvent> {
    loop {
        let received = tokio::select! {
            r = stats_rx.recv() => r,
            r = messages_rx.recv() => r,
        };
        match received {
            Ok(event) => return Some(event),
            // A missed notification only means a stale page; the next one catches up.
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Manages a single WebSocket connection: subscribes to both panels and
/// forwards their `PanelEvent`s as JSON to the client.
async fn handle_socket(socket: WebSocket, state: Arc<DashboardState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut stats_rx = state.stats.subscribe();
    let mut messages_rx = state.messages.subscribe();

    // Task: forward panel events → WebSocket client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = next_event(&mut stats_rx, &mut messages_rx).await {
            if let Ok(json) = serde_json::to_string(&event) {
                if sender.send(Message::Text(json)).await.is_err() {
                    break; // client disconnected
                }
            }
        }
    });

    // Task: read from WebSocket (handle close / ping-pong)
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    // Wait for either task to finish, then abort the other to prevent leaks
    tokio::select! {
        _ = &mut send_task => { recv_task.abort(); },
        _ = &mut recv_task => { send_task.abort(); },
    }
}
