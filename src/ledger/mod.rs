//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway (GraphQL primary, REST history fallback)
//!     → client.rs (requests with timeout, fallback chain)
//!     → types.rs (response shapes → TransactionRecord)
//!     → amount.rs (AR decimal ↔ winston integer)
//! ```
//!
//! # Constraints
//! - All gateway calls have a timeout
//! - Failures degrade to an empty result, never to an error for the caller

pub mod amount;
pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::LedgerReader;
pub use types::{LedgerError, TransactionRecord};

/// Anything that can list recent incoming transfers for an address.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Recent transfers addressed to `address`. Ordering is unspecified.
    /// Upstream failures are logged and yield an empty vec.
    async fn fetch_incoming(&self, address: &str) -> Vec<TransactionRecord>;
}
