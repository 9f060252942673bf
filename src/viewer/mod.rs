//! Viewer side of the relay.
//!
//! # Data Flow
//! ```text
//! /ws frames
//!     → relay.rs (ClientRelay: Connecting → Open → Closed, decode)
//!     → presenter.rs (Hidden → Visible → FadingOut → Hidden)
//!     → surface.rs (rendering), price.rs (USD estimate), audio.rs (cue)
//! ```
//!
//! # Design Decisions
//! - No automatic reconnect; a closed relay stays closed
//! - Price lookup and audio cue are best effort and never block state
//! - One notification slot; a new tip replaces the current one

pub mod audio;
pub mod presenter;
pub mod price;
pub mod relay;
pub mod surface;

use thiserror::Error;

pub use audio::{AudioCue, TerminalBell};
pub use presenter::{ActiveNotification, NotificationPresenter, NotificationState, Phase, PresenterTimings};
pub use price::{CoinGeckoPrice, PriceSource, RateCache};
pub use relay::{ClientRelay, RelayState};
pub use surface::{NotificationSurface, TerminalSurface};

/// Errors raised on the viewer side. None of them stop the presenter.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("price lookup failed: {0}")]
    Price(String),

    #[error("audio cue failed: {0}")]
    Audio(String),
}
