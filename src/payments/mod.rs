//! Payment monitoring module.
//!
//! # Data Flow
//! ```text
//! LedgerSource → monitor.rs (filter) → dedup.rs (claim id) → Broadcaster
//! ```

pub mod dedup;
pub mod monitor;
pub mod types;

pub use dedup::{DedupStore, InMemoryDedupStore};
pub use monitor::{PaymentMonitor, PollOutcome, PollStatus};
pub use types::{ManualTip, RelayMessage, TipData};
