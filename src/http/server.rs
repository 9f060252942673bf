//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: `/health`, `/notify`, `/ws`, static fallback
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::handlers::{get_health, post_notify};
use crate::payments::{DedupStore, PollStatus};
use crate::relay::websocket::ws_handler;
use crate::relay::Broadcaster;

/// Per-request deadline for the plain HTTP routes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub broadcaster: Arc<Broadcaster>,
    pub dedup: Arc<dyn DedupStore>,
    pub poll_status: Arc<PollStatus>,
    pub watched_address: Arc<str>,
}

impl AppState {
    /// Fresh broadcaster and poll status around an existing dedup store.
    pub fn new(config: &RelayConfig, dedup: Arc<dyn DedupStore>) -> Self {
        Self {
            broadcaster: Arc::new(Broadcaster::new(config.broadcast.tip_message.clone())),
            dedup,
            poll_status: Arc::new(PollStatus::new()),
            watched_address: Arc::from(config.ledger.watched_address.as_str()),
        }
    }
}

/// HTTP + WebSocket server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &RelayConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(get_health))
            .route("/notify", post(post_notify))
            .route("/ws", get(ws_handler));

        if let Some(dir) = &config.listener.static_dir {
            router = router.fallback_service(ServeDir::new(dir));
        }

        router
            .with_state(state)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
