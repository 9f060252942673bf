//! Ledger tip relay library.
//!
//! Polls a ledger gateway for incoming transfers to one address and pushes
//! each new one to every connected WebSocket viewer.

pub mod config;
pub mod http;
pub mod ledger;
pub mod lifecycle;
pub mod observability;
pub mod payments;
pub mod relay;
pub mod viewer;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
