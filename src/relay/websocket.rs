//! WebSocket endpoint for viewers.
//!
//! # Data Flow
//! ```text
//! Broadcaster ──frame──→ per-connection queue ──→ writer task ──→ Viewer
//! Viewer ──close/error──→ reader loop ──→ unregister
//! ```
//!
//! Server→client only: inbound frames are read solely to notice close and
//! errors. Ping/pong is answered by axum.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};

use crate::http::server::AppState;
use crate::relay::broadcaster::{Broadcaster, ConnectionHandle};

/// Upgrade handler mounted at `/ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.broadcaster))
}

/// Serve one viewer until it disconnects.
pub async fn handle_socket(socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    let (mut sender, mut receiver) = socket.split();
    let (handle, mut frames) = ConnectionHandle::channel();
    let id = broadcaster.register(handle);

    tracing::info!(connection = %id, "Viewer connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    // Either side ending closes the connection.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    broadcaster.unregister(id);
    tracing::info!(connection = %id, "Viewer disconnected");
}
