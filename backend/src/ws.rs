//! WebSocket transport
//!
//! Each socket is split: a writer task drains the connection's bounded
//! outbound queue, while the read loop decodes commands, resolves the
//! caller's token and hands the command to the coordinator. Closing the
//! socket (or any read error) disconnects the connection from every game it
//! joined. A client that stops reading fills its queue and is dropped from
//! its game on the next broadcast.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use shared::{ClientCommand, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::AppState;
use crate::error::GameError;
use crate::sessions::{ConnectionHandle, OUTBOUND_CAPACITY};
use crate::types::ConnectionId;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn = ConnectionId::new();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_CAPACITY);
    let handle = ConnectionHandle::new(conn, tx);
    info!("[WS] Connection {} opened", conn);

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match message.encode() {
                Ok(json) => json,
                Err(e) => {
                    error!("[WS] Could not encode message for {}: {}", conn, e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(Message::Text(t)) => t.to_string(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("[WS] Read error on {}: {}", conn, e);
                break;
            }
        };
        handle_text(&state, &handle, &text).await;
    }

    info!("[WS] Connection {} closed", conn);
    state.coordinator.disconnect(conn).await;
    writer.abort();
}

async fn handle_text(state: &AppState, handle: &ConnectionHandle, text: &str) {
    let command = match ClientCommand::decode(text) {
        Ok(command) => command,
        Err(e) => {
            debug!("[WS] Malformed command from {}: {}", handle.id(), e);
            state
                .coordinator
                .reject(handle, &GameError::MalformedCommand(e.to_string()));
            return;
        }
    };

    match state.auth.resolve_identity(command.auth_token()) {
        Ok(identity) => state.coordinator.dispatch(handle, &identity, command).await,
        Err(err) => state.coordinator.reject(handle, &err),
    }
}
