//! Payment monitoring service.
//!
//! Polls the ledger for transfers to the watched address and relays every
//! transfer not seen before.
//!
//! # States
//! ```text
//! Idle ──tick──→ Polling ──pass complete (always)──→ Idle
//! ```
//! A failed or empty pass is not retried; the next tick is the retry.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::RelayConfig;
use crate::ledger::{LedgerSource, TransactionRecord};
use crate::observability::metrics;
use crate::payments::dedup::DedupStore;
use crate::payments::types::{iso_timestamp, RelayMessage, TipData};
use crate::relay::Broadcaster;

/// Completion time of the most recent poll pass, shared with `/health`.
#[derive(Debug, Default)]
pub struct PollStatus {
    /// Unix millis; 0 until the first pass completes.
    last_checked_ms: AtomicI64,
}

impl PollStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_checked(&self, at: DateTime<Utc>) {
        self.last_checked_ms
            .store(at.timestamp_millis(), Ordering::Relaxed);
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        match self.last_checked_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Utc.timestamp_millis_opt(ms).single(),
        }
    }
}

/// Counts from one poll pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Records returned by the ledger.
    pub seen: usize,
    /// Records relayed to viewers.
    pub forwarded: usize,
}

/// Timer-driven poller feeding the broadcaster.
pub struct PaymentMonitor {
    source: Arc<dyn LedgerSource>,
    store: Arc<dyn DedupStore>,
    broadcaster: Arc<Broadcaster>,
    status: Arc<PollStatus>,
    watched_address: String,
    interval: Duration,
    fetch_deadline: Duration,
    tip_message: String,
}

impl PaymentMonitor {
    /// Create a new payment monitor.
    pub fn new(
        config: &RelayConfig,
        source: Arc<dyn LedgerSource>,
        store: Arc<dyn DedupStore>,
        broadcaster: Arc<Broadcaster>,
        status: Arc<PollStatus>,
    ) -> Self {
        Self {
            source,
            store,
            broadcaster,
            status,
            watched_address: config.ledger.watched_address.clone(),
            interval: Duration::from_secs(config.poll.interval_secs),
            fetch_deadline: Duration::from_secs(config.poll.fetch_deadline_secs),
            tip_message: config.broadcast.tip_message.clone(),
        }
    }

    /// Run the monitor loop: one pass immediately, then one per interval,
    /// until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            address = %self.watched_address,
            interval_secs = self.interval.as_secs(),
            "Starting payment monitor"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Payment monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One Idle → Polling → Idle pass.
    pub async fn poll_once(&self) -> PollOutcome {
        tracing::debug!(address = %self.watched_address, "Looking for transactions");

        let records = match time::timeout(
            self.fetch_deadline,
            self.source.fetch_incoming(&self.watched_address),
        )
        .await
        {
            Ok(records) => records,
            Err(_) => {
                tracing::warn!(
                    deadline_secs = self.fetch_deadline.as_secs(),
                    "Ledger fetch exceeded deadline"
                );
                Vec::new()
            }
        };

        let mut outcome = PollOutcome {
            seen: records.len(),
            forwarded: 0,
        };

        if records.is_empty() {
            tracing::info!(
                address = %self.watched_address,
                "No transactions found for the watched address"
            );
        }

        for record in &records {
            if self.forward_if_new(record) {
                outcome.forwarded += 1;
            }
        }

        self.status.mark_checked(Utc::now());
        metrics::record_poll(outcome.seen);
        tracing::debug!(seen = outcome.seen, forwarded = outcome.forwarded, "Poll pass complete");
        outcome
    }

    /// Apply the filter and, if the record qualifies, claim its id and
    /// publish it.
    fn forward_if_new(&self, record: &TransactionRecord) -> bool {
        let Some(tx_id) = record.tx_id() else {
            return false;
        };
        if self.store.contains(tx_id)
            || record.recipient != self.watched_address
            || record.quantity_raw == 0
        {
            return false;
        }
        if !self.store.insert_if_new(tx_id) {
            return false;
        }

        let Some(tip) = TipData::from_record(record, &self.tip_message) else {
            return false;
        };

        tracing::info!(
            amount = %tip.amount,
            from = %truncate(&record.sender, 6),
            tx_id = %truncate(tx_id, 8),
            block = ?record.block_height,
            timestamp = %record
                .block_timestamp
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
                .map(iso_timestamp)
                .unwrap_or_else(|| "pending".to_string()),
            "New transaction"
        );

        metrics::record_tip_forwarded("poll");
        if let Err(e) = self.broadcaster.publish(&RelayMessage::Tip(tip)) {
            tracing::error!(tx_id = %tx_id, error = %e, "Failed to publish tip");
        }
        true
    }
}

fn truncate(value: &str, chars: usize) -> String {
    let prefix: String = value.chars().take(chars).collect();
    format!("{prefix}...")
}
