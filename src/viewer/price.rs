//! AR/USD rate lookup for the display-only USD estimate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::viewer::ViewerError;

/// One-shot USD price lookup.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn usd_price(&self) -> Result<f64, ViewerError>;
}

#[derive(Debug, Deserialize)]
struct AssetPrice {
    usd: Option<f64>,
}

/// Simple-price style endpoint: `{ "<asset>": { "usd": <number> } }`.
#[derive(Debug, Clone)]
pub struct CoinGeckoPrice {
    http: reqwest::Client,
    url: String,
    asset: String,
}

impl CoinGeckoPrice {
    pub fn new(url: impl Into<String>, asset: impl Into<String>, timeout: Duration) -> Result<Self, ViewerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ViewerError::Price(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
            asset: asset.into(),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoPrice {
    async fn usd_price(&self) -> Result<f64, ViewerError> {
        let body: HashMap<String, AssetPrice> = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ViewerError::Price(e.to_string()))?
            .json()
            .await
            .map_err(|e| ViewerError::Price(e.to_string()))?;

        body.get(&self.asset)
            .and_then(|price| price.usd)
            .ok_or_else(|| ViewerError::Price(format!("no usd price for {}", self.asset)))
    }
}

/// Last known rate, refreshed on every lookup.
///
/// Stored as `f64` bits; 0.0 until the first successful lookup.
pub struct RateCache {
    source: Arc<dyn PriceSource>,
    last_rate: AtomicU64,
}

impl RateCache {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            last_rate: AtomicU64::new(0f64.to_bits()),
        }
    }

    pub fn last_rate(&self) -> f64 {
        f64::from_bits(self.last_rate.load(Ordering::Relaxed))
    }

    /// Fetch a fresh rate; on failure fall back to the last known one.
    pub async fn current_rate(&self) -> f64 {
        match self.source.usd_price().await {
            Ok(rate) if rate.is_finite() && rate >= 0.0 => {
                self.last_rate.store(rate.to_bits(), Ordering::Relaxed);
                rate
            }
            Ok(rate) => {
                tracing::warn!(rate, "Ignoring nonsensical exchange rate");
                self.last_rate()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error updating exchange rate");
                self.last_rate()
            }
        }
    }
}

/// `amount * rate` with two decimals. Unparseable amounts count as zero.
pub fn usd_value(amount: &str, rate: f64) -> String {
    let amount: f64 = amount.trim().parse().unwrap_or(0.0);
    format!("{:.2}", amount * rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Scripted(Mutex<Vec<Result<f64, ViewerError>>>);

    #[async_trait]
    impl PriceSource for Scripted {
        async fn usd_price(&self) -> Result<f64, ViewerError> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ViewerError::Price("exhausted".into())))
        }
    }

    #[tokio::test]
    async fn test_rate_defaults_to_zero() {
        let cache = RateCache::new(Arc::new(Scripted(Mutex::new(vec![]))));
        assert_eq!(cache.current_rate().await, 0.0);
    }

    #[tokio::test]
    async fn test_failure_keeps_last_rate() {
        // Popped from the back: 12.5 first, then the error.
        let cache = RateCache::new(Arc::new(Scripted(Mutex::new(vec![
            Err(ViewerError::Price("down".into())),
            Ok(12.5),
        ]))));
        assert_eq!(cache.current_rate().await, 12.5);
        assert_eq!(cache.current_rate().await, 12.5);
        assert_eq!(cache.last_rate(), 12.5);
    }

    #[test]
    fn test_usd_value() {
        assert_eq!(usd_value("1.500000", 10.0), "15.00");
        assert_eq!(usd_value("0.333333", 3.0), "1.00");
        assert_eq!(usd_value("abc", 10.0), "0.00");
        assert_eq!(usd_value("2", 0.0), "0.00");
    }
}
