//! Event relay subsystem.
//!
//! # Data Flow
//! ```text
//! PaymentMonitor ─┐
//!                 ├→ Broadcaster::publish → ConnectionSet → websocket.rs → viewers
//! POST /notify ───┘
//! ```
//!
//! # Design Decisions
//! - One serialization per event, shared by every connection
//! - Unbounded per-connection queues so a slow viewer never delays others
//! - Best effort: no acknowledgement, no replay for late joiners

pub mod broadcaster;
pub mod websocket;

pub use broadcaster::{Broadcaster, ConnectionHandle, ConnectionId, RelayError};
