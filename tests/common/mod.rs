//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use tip_relay::config::RelayConfig;
use tip_relay::http::{AppState, HttpServer};
use tip_relay::payments::InMemoryDedupStore;
use tip_relay::Shutdown;

pub const WATCHED: &str = "watched-address-0000000000000000000000000000";

/// Canned gateway replies plus hit counters.
pub struct GatewayScript {
    pub graphql: (u16, Value),
    pub history: (u16, Value),
    /// Applied before every reply.
    pub delay: Duration,
    pub graphql_hits: AtomicUsize,
    pub history_hits: AtomicUsize,
}

impl GatewayScript {
    pub fn new(graphql: (u16, Value), history: (u16, Value)) -> Arc<Self> {
        Self::delayed(graphql, history, Duration::ZERO)
    }

    pub fn delayed(graphql: (u16, Value), history: (u16, Value), delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            graphql,
            history,
            delay,
            graphql_hits: AtomicUsize::new(0),
            history_hits: AtomicUsize::new(0),
        })
    }
}

async fn graphql(State(script): State<Arc<GatewayScript>>) -> (StatusCode, Json<Value>) {
    script.graphql_hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(script.delay).await;
    let (status, body) = &script.graphql;
    (StatusCode::from_u16(*status).unwrap(), Json(body.clone()))
}

async fn history(State(script): State<Arc<GatewayScript>>) -> (StatusCode, Json<Value>) {
    script.history_hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(script.delay).await;
    let (status, body) = &script.history;
    (StatusCode::from_u16(*status).unwrap(), Json(body.clone()))
}

/// Start a mock ledger gateway serving `/graphql` and `/tx/history/{address}`.
pub async fn start_mock_gateway(script: Arc<GatewayScript>) -> String {
    let app = Router::new()
        .route("/graphql", post(graphql))
        .route("/tx/history/{address}", get(history))
        .with_state(script);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

pub fn test_config(gateway_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.ledger.watched_address = WATCHED.to_string();
    config.ledger.gateway_url = gateway_url.to_string();
    config.ledger.request_timeout_secs = 5;
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// A running relay: HTTP server only, no poll loop.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
}

impl RunningRelay {
    pub fn http_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

pub async fn start_relay(config: &RelayConfig) -> RunningRelay {
    let state = AppState::new(config, Arc::new(InMemoryDedupStore::new()));
    let shutdown = Shutdown::new();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, state.clone());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    RunningRelay {
        addr,
        state,
        shutdown,
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
