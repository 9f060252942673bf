//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs (/health, /notify)
//!     → relay::websocket (/ws upgrade)
//!     → static assets (fallback, optional)
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
