//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the tip relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, static assets).
    pub listener: ListenerConfig,

    /// Ledger gateway and the watched address.
    pub ledger: LedgerConfig,

    /// Poll loop cadence.
    pub poll: PollConfig,

    /// Outbound event settings.
    pub broadcast: BroadcastConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Settings used by the `tip-cli watch` viewer.
    pub viewer: ViewerConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Directory of static UI assets served as the router fallback.
    pub static_dir: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            static_dir: None,
        }
    }
}

/// Ledger gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Gateway base URL. GraphQL lives at `/graphql`, the REST history at
    /// `/tx/history/{address}`.
    pub gateway_url: String,

    /// The single address whose incoming transfers are relayed.
    pub watched_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Number of most recent transactions requested per poll.
    pub page_size: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            gateway_url: "https://arweave.net".to_string(),
            watched_address: String::new(),
            request_timeout_secs: 15,
            page_size: 10,
        }
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between poll passes.
    pub interval_secs: u64,

    /// Hard deadline for a single fetch, on top of the per-request timeout.
    pub fetch_deadline_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            fetch_deadline_secs: 20,
        }
    }
}

/// Outbound event configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Text carried in the `message` field of every tip event.
    pub tip_message: String,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            tip_message: "🎉 New AR tip. Awesome!".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Viewer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Relay server base URL (`ws://` or `wss://`).
    pub server_url: String,

    /// Price endpoint returning `{ "<asset>": { "usd": <number> } }`.
    pub price_url: String,

    /// Asset key looked up in the price response.
    pub price_asset: String,

    /// Audio cue played on every tip.
    pub sound_url: String,

    /// Seconds a notification stays fully visible.
    pub hold_secs: u64,

    /// Milliseconds between fade start and hide.
    pub fade_ms: u64,

    /// Seconds a transient error stays on screen.
    pub error_secs: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:3000".to_string(),
            price_url: "https://api.coingecko.com/api/v3/simple/price?ids=arweave&vs_currencies=usd"
                .to_string(),
            price_asset: "arweave".to_string(),
            sound_url: "https://cdn.streamlabs.com/users/80245534/library/cash-register-2.mp3"
                .to_string(),
            hold_secs: 15,
            fade_ms: 500,
            error_secs: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.ledger.request_timeout_secs, 15);
        assert_eq!(config.ledger.page_size, 10);
        assert_eq!(config.poll.interval_secs, 60);
        assert_eq!(config.viewer.hold_secs, 15);
        assert_eq!(config.viewer.fade_ms, 500);
        assert!(config.ledger.watched_address.is_empty());
    }

    #[test]
    fn test_partial_toml() {
        let config: RelayConfig = toml::from_str(
            r#"
            [ledger]
            watched_address = "abc123"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger.watched_address, "abc123");
        assert_eq!(config.ledger.gateway_url, "https://arweave.net");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }
}
