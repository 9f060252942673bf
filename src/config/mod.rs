//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse, .env, WALLET_ADDRESS / PORT overrides)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → cloned into each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so a bare `WALLET_ADDRESS` is enough to run
//! - A missing watched address is the only fatal startup condition

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_env_file, read_config, ConfigError};
pub use schema::{
    BroadcastConfig, LedgerConfig, ListenerConfig, LogFormat, ObservabilityConfig, PollConfig,
    RelayConfig, ViewerConfig,
};
