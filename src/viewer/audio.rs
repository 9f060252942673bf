//! Audio cue played on every tip.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;

use crate::viewer::ViewerError;

/// Something that makes a sound.
#[async_trait]
pub trait AudioCue: Send + Sync {
    async fn play(&self) -> Result<(), ViewerError>;
}

/// Terminal bell. The configured sound URL is only logged; a terminal has
/// no way to play it.
#[derive(Debug, Clone)]
pub struct TerminalBell {
    sound_url: String,
}

impl TerminalBell {
    pub fn new(sound_url: impl Into<String>) -> Self {
        Self {
            sound_url: sound_url.into(),
        }
    }
}

#[async_trait]
impl AudioCue for TerminalBell {
    async fn play(&self) -> Result<(), ViewerError> {
        let mut out = std::io::stdout().lock();
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| ViewerError::Audio(e.to_string()))?;
        tracing::debug!(sound = %self.sound_url, "Bell rung");
        Ok(())
    }
}

/// Fire and forget: failures are logged and otherwise ignored.
pub fn play_detached(cue: Arc<dyn AudioCue>) {
    tokio::spawn(async move {
        match cue.play().await {
            Ok(()) => tracing::debug!("Audio cue played"),
            Err(e) => tracing::warn!(error = %e, "Error playing audio cue"),
        }
    });
}
