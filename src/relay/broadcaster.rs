//! Fan-out of tip events to every open viewer connection.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Utf8Bytes;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::observability::metrics;
use crate::payments::types::{ManualTip, RelayMessage};

static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a viewer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Errors raised while relaying an event.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A manual submission lacked `from`, `amount` or `txId`.
    #[error("Missing required fields")]
    Validation,

    /// The event could not be encoded.
    #[error("failed to encode event: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sending half of one viewer connection.
///
/// The socket writer task owns the receiving half; once it exits the handle
/// reports closed and is skipped by `publish`.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    tx: mpsc::UnboundedSender<Utf8Bytes>,
}

impl ConnectionHandle {
    /// Create a handle and the queue its writer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Utf8Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, frame: Utf8Bytes) -> bool {
        self.tx.send(frame).is_ok()
    }
}

/// Owner of the connection set.
#[derive(Debug)]
pub struct Broadcaster {
    connections: DashMap<ConnectionId, ConnectionHandle>,
    tip_message: String,
}

impl Broadcaster {
    /// `tip_message` is stamped on manually submitted tips.
    pub fn new(tip_message: impl Into<String>) -> Self {
        Self {
            connections: DashMap::new(),
            tip_message: tip_message.into(),
        }
    }

    /// Add a connection. No capacity limit.
    pub fn register(&self, handle: ConnectionHandle) -> ConnectionId {
        let id = ConnectionId::next();
        self.connections.insert(id, handle);
        metrics::record_connections(self.connections.len());
        tracing::debug!(connection = %id, open = self.connections.len(), "Viewer registered");
        id
    }

    /// Remove a connection. Removing an unknown id is a no-op.
    pub fn unregister(&self, id: ConnectionId) {
        if self.connections.remove(&id).is_some() {
            metrics::record_connections(self.connections.len());
            tracing::debug!(connection = %id, open = self.connections.len(), "Viewer unregistered");
        }
    }

    /// Number of registered connections, open or not yet reaped.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Serialize once and hand the frame to every open connection.
    ///
    /// Returns how many connections accepted the frame. Closed connections
    /// are skipped without error; nothing is buffered for later joiners.
    pub fn publish(&self, message: &RelayMessage) -> Result<usize, RelayError> {
        let frame = Utf8Bytes::from(serde_json::to_string(message)?);

        let mut delivered = 0;
        for entry in self.connections.iter() {
            let handle = entry.value();
            if !handle.is_open() {
                continue;
            }
            if handle.send(frame.clone()) {
                delivered += 1;
            } else {
                tracing::debug!(connection = %entry.key(), "Skipping closed viewer");
            }
        }

        metrics::record_deliveries(delivered);
        match message {
            RelayMessage::Tip(tip) => tracing::info!(
                tx_id = %tip.tx_id,
                amount = %tip.amount,
                delivered,
                "Tip sent to viewers"
            ),
        }
        Ok(delivered)
    }

    /// Secondary inbound interface: publish a hand-built tip.
    pub fn submit_manual(&self, tip: ManualTip) -> Result<usize, RelayError> {
        let tip = tip.into_tip(&self.tip_message).ok_or(RelayError::Validation)?;
        metrics::record_tip_forwarded("manual");
        self.publish(&RelayMessage::Tip(tip))
    }
}
