//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate (fatal on error) → Logging → Metrics
//!     → Payment monitor → HTTP server
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → trigger → monitor exits, server drains
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::listen_for_signals;
