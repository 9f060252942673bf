//! Viewer connection to the relay's `/ws` endpoint.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::payments::TipData;
use crate::viewer::presenter::NotificationPresenter;
use crate::viewer::surface::NotificationSurface;
use crate::viewer::ViewerError;

const DECODE_ERROR: &str = "Error processing notification";
const TRANSPORT_ERROR: &str = "Server connection error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Connecting,
    Open,
    Closed,
}

/// `ws://host:port` → `ws://host:port/ws`.
pub fn ws_endpoint(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    if base.ends_with("/ws") {
        base.to_string()
    } else {
        format!("{base}/ws")
    }
}

pub struct ClientRelay {
    url: String,
    presenter: NotificationPresenter,
    surface: Arc<dyn NotificationSurface>,
    error_display: Duration,
    state_tx: watch::Sender<RelayState>,
}

impl ClientRelay {
    pub fn new(server_url: &str, presenter: NotificationPresenter, error_display: Duration) -> Self {
        let (state_tx, _) = watch::channel(RelayState::Connecting);
        Self {
            url: ws_endpoint(server_url),
            surface: presenter.surface(),
            presenter,
            error_display,
            state_tx,
        }
    }

    pub fn state(&self) -> RelayState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RelayState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: RelayState) {
        self.state_tx.send_replace(state);
        self.surface.set_connected(state == RelayState::Open);
    }

    /// Connect and process frames until the server goes away.
    ///
    /// Returns once the relay is `Closed`; it does not reconnect.
    pub async fn run(&self) -> Result<(), ViewerError> {
        self.state_tx.send_replace(RelayState::Connecting);
        tracing::info!(url = %self.url, "Connecting to relay");

        let (stream, _) = match connect_async(self.url.as_str()).await {
            Ok(connected) => connected,
            Err(e) => {
                tracing::error!(error = %e, "WebSocket connect failed");
                self.show_error(TRANSPORT_ERROR);
                self.set_state(RelayState::Closed);
                return Err(e.into());
            }
        };

        self.set_state(RelayState::Open);
        tracing::info!("Connected to notification server");

        let (_write, mut read) = stream.split();
        let mut result = Ok(());
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if let Err(e) = self.handle_frame(text.as_str()) {
                        tracing::warn!(error = %e, "Error processing message");
                        self.show_error(DECODE_ERROR);
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "WebSocket error");
                    self.show_error(TRANSPORT_ERROR);
                    result = Err(e.into());
                    break;
                }
            }
        }

        self.set_state(RelayState::Closed);
        tracing::info!("Disconnected from notification server");
        result
    }

    /// Decode one text frame and dispatch it.
    ///
    /// Only invalid JSON, or a `tip` frame whose payload does not decode, is
    /// an error. Any other JSON value without `"type": "tip"` is ignored.
    pub fn handle_frame(&self, text: &str) -> Result<(), ViewerError> {
        let mut frame: Value = serde_json::from_str(text)?;
        match frame.get("type").and_then(Value::as_str) {
            Some("tip") => {
                let data = frame
                    .get_mut("data")
                    .map(Value::take)
                    .unwrap_or(Value::Null);
                let tip: TipData = serde_json::from_value(data)?;
                self.presenter.present(tip);
            }
            kind => tracing::debug!(kind = ?kind, "Ignoring frame"),
        }
        Ok(())
    }

    fn show_error(&self, message: &str) {
        self.surface.show_error(message);
        let surface = Arc::clone(&self.surface);
        let hold = self.error_display;
        tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            surface.clear_error();
        });
    }
}
