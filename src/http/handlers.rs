//! Administrative HTTP handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::http::server::AppState;
use crate::payments::types::{iso_timestamp, ManualTip};
use crate::relay::RelayError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub address: String,
    pub processed_txs: usize,
    pub last_checked: String,
}

#[derive(Debug, Serialize)]
pub struct NotifyAccepted {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: error.into() })).into_response()
}

/// `GET /health`
pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    let last_checked = state.poll_status.last_checked().unwrap_or_else(Utc::now);

    Json(HealthStatus {
        status: "active",
        address: state.watched_address.to_string(),
        processed_txs: state.dedup.len(),
        last_checked: iso_timestamp(last_checked),
    })
}

/// `POST /notify`
pub async fn post_notify(
    State(state): State<AppState>,
    payload: Result<Json<ManualTip>, JsonRejection>,
) -> Response {
    let Json(tip) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected manual tip body");
            return error_response(StatusCode::BAD_REQUEST, RelayError::Validation.to_string());
        }
    };

    match state.broadcaster.submit_manual(tip) {
        Ok(delivered) => {
            tracing::info!(delivered, "Manual tip relayed");
            Json(NotifyAccepted {
                success: true,
                message: "Notification sent",
            })
            .into_response()
        }
        Err(e @ RelayError::Validation) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to relay manual tip");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
