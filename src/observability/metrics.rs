//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tip_relay_polls_total` (counter): completed poll passes
//! - `tip_relay_poll_records_total` (counter): records returned by the ledger
//! - `tip_relay_tips_forwarded_total` (counter): tips published, by source
//! - `tip_relay_deliveries_total` (counter): frames handed to connections
//! - `tip_relay_ws_connections` (gauge): open viewer connections
//! - `tip_relay_dedup_size` (gauge): ids in the dedup store
//! - `tip_relay_ledger_fallback_total` (counter): REST fallbacks taken
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Failures are logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

pub fn record_poll(records: usize) {
    metrics::counter!("tip_relay_polls_total").increment(1);
    metrics::counter!("tip_relay_poll_records_total").increment(records as u64);
}

pub fn record_tip_forwarded(source: &'static str) {
    metrics::counter!("tip_relay_tips_forwarded_total", "source" => source).increment(1);
}

pub fn record_deliveries(count: usize) {
    metrics::counter!("tip_relay_deliveries_total").increment(count as u64);
}

pub fn record_connections(open: usize) {
    metrics::gauge!("tip_relay_ws_connections").set(open as f64);
}

pub fn record_dedup_size(size: usize) {
    metrics::gauge!("tip_relay_dedup_size").set(size as f64);
}

pub fn record_ledger_fallback() {
    metrics::counter!("tip_relay_ledger_fallback_total").increment(1);
}
