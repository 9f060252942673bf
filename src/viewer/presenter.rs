//! Single-slot notification display.
//!
//! Each tip is rendered at once with the last known rate, then a display
//! chain refreshes the rate, holds, fades and hides. A newer tip aborts the running chain and bumps the generation; every state
//! write checks the generation under the lock, so a superseded chain can
//! never dismiss the notification that replaced it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::ViewerConfig;
use crate::payments::TipData;
use crate::viewer::audio::{self, AudioCue};
use crate::viewer::price::{usd_value, RateCache};
use crate::viewer::surface::NotificationSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Visible,
    FadingOut,
}

/// What is currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveNotification {
    pub amount: String,
    pub from_address: String,
    /// `amount * rate`, two decimals.
    pub usd_value: String,
    pub displayed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationState {
    pub phase: Phase,
    pub notification: Option<ActiveNotification>,
}

impl NotificationState {
    fn hidden() -> Self {
        Self {
            phase: Phase::Hidden,
            notification: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PresenterTimings {
    pub hold: Duration,
    pub fade: Duration,
}

impl PresenterTimings {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            hold: Duration::from_secs(config.hold_secs),
            fade: Duration::from_millis(config.fade_ms),
        }
    }
}

impl Default for PresenterTimings {
    fn default() -> Self {
        Self {
            hold: Duration::from_secs(15),
            fade: Duration::from_millis(500),
        }
    }
}

#[derive(Default)]
struct Chain {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    surface: Arc<dyn NotificationSurface>,
    rates: Arc<RateCache>,
    timings: PresenterTimings,
    chain: Mutex<Chain>,
    state_tx: watch::Sender<NotificationState>,
}

impl Shared {
    /// Push `next` to the surface and the watch channel. Callers hold the
    /// chain lock.
    fn apply(&self, next: NotificationState) {
        match (next.phase, next.notification.as_ref()) {
            (Phase::Visible, Some(n)) => self.surface.render(n),
            (Phase::FadingOut, _) => self.surface.fade_out(),
            _ => self.surface.hide(),
        }
        self.state_tx.send_replace(next);
    }

    /// Apply a transition if `generation` is still current.
    fn transition(&self, generation: u64, next: NotificationState) -> bool {
        let chain = self.chain.lock().unwrap_or_else(PoisonError::into_inner);
        if chain.generation != generation {
            return false;
        }
        self.apply(next);
        true
    }

    /// Refresh the USD estimate, hold, fade, hide.
    ///
    /// The notification is already visible when this starts; the hold is
    /// measured from `shown_at`, not from when the rate lookup returns.
    async fn run_chain(
        self: Arc<Self>,
        generation: u64,
        mut notification: ActiveNotification,
        shown_at: Instant,
    ) {
        let rate = self.rates.current_rate().await;
        let refreshed = usd_value(&notification.amount, rate);
        if refreshed != notification.usd_value {
            notification.usd_value = refreshed;
            let visible = NotificationState {
                phase: Phase::Visible,
                notification: Some(notification.clone()),
            };
            if !self.transition(generation, visible) {
                return;
            }
        }

        time::sleep_until(shown_at + self.timings.hold).await;
        let fading = NotificationState {
            phase: Phase::FadingOut,
            notification: Some(notification),
        };
        if !self.transition(generation, fading) {
            return;
        }

        time::sleep(self.timings.fade).await;
        self.transition(generation, NotificationState::hidden());
    }
}

/// Cheap to clone; all clones drive the same slot.
#[derive(Clone)]
pub struct NotificationPresenter {
    shared: Arc<Shared>,
    audio: Arc<dyn AudioCue>,
}

impl NotificationPresenter {
    pub fn new(
        surface: Arc<dyn NotificationSurface>,
        rates: Arc<RateCache>,
        audio: Arc<dyn AudioCue>,
        timings: PresenterTimings,
    ) -> Self {
        let (state_tx, _) = watch::channel(NotificationState::hidden());
        Self {
            shared: Arc::new(Shared {
                surface,
                rates,
                timings,
                chain: Mutex::new(Chain::default()),
                state_tx,
            }),
            audio,
        }
    }

    pub fn state(&self) -> NotificationState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.shared.state_tx.subscribe()
    }

    pub fn surface(&self) -> Arc<dyn NotificationSurface> {
        Arc::clone(&self.shared.surface)
    }

    /// Show `tip`, superseding anything currently displayed.
    ///
    /// The slot switches to the new tip before this returns, priced at the
    /// last known rate; the fresh rate is patched in by the display chain.
    pub fn present(&self, tip: TipData) {
        let mut chain = self
            .shared
            .chain
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        chain.generation += 1;
        if let Some(previous) = chain.task.take() {
            previous.abort();
        }

        tracing::info!(from = %tip.from, amount = %tip.amount, "Tip received");
        audio::play_detached(Arc::clone(&self.audio));

        let shown_at = Instant::now();
        let displayed_at = Utc::now();
        let hold = chrono::Duration::from_std(self.shared.timings.hold)
            .unwrap_or_else(|_| chrono::Duration::zero());
        let notification = ActiveNotification {
            usd_value: usd_value(&tip.amount, self.shared.rates.last_rate()),
            amount: tip.amount,
            from_address: tip.from,
            displayed_at,
            expires_at: displayed_at + hold,
        };
        self.shared.apply(NotificationState {
            phase: Phase::Visible,
            notification: Some(notification.clone()),
        });

        let shared = Arc::clone(&self.shared);
        let generation = chain.generation;
        chain.task = Some(tokio::spawn(shared.run_chain(
            generation,
            notification,
            shown_at,
        )));
    }
}
