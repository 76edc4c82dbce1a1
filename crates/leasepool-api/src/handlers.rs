//! HTTP handlers.
//!
//! Every failure, whether a missing parameter or an out-of-range value,
//! is answered with the same `{ "error": "..." }` body.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::warn;

use leasepool_core::{AcquireOutcome, PoolError, ResourceId};

use crate::ApiState;

/// Raw query of `/get_slaves`. Parsed by hand, and extractor rejections
/// are caught too, so that all bad input gets the uniform error body.
#[derive(Debug, Default, Deserialize)]
pub struct LeaseQuery {
    pub amount: Option<String>,
    pub duration: Option<String>,
}

/// Body of a successful `/get_slaves` call.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SlavesResponse {
    pub slaves: Vec<ResourceId>,
    /// Seconds to wait before retrying. Present only when nothing was granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub come_back: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(msg: &str, status: StatusCode) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

fn pool_error_response(err: &PoolError) -> axum::response::Response {
    let status = match err {
        PoolError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        PoolError::SchedulerClosed => StatusCode::SERVICE_UNAVAILABLE,
        PoolError::InvariantViolation(_) | PoolError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(&err.to_string(), status)
}

fn parse_param(name: &str, value: Option<&str>) -> Result<i64, String> {
    let raw = value.ok_or_else(|| format!("missing query parameter `{name}`"))?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| format!("`{name}` must be an integer, got `{raw}`"))
}

// ── Leasing ────────────────────────────────────────────────────

/// GET /get_slaves?amount=N&duration=S
pub async fn get_slaves(
    State(state): State<ApiState>,
    query: Result<Query<LeaseQuery>, QueryRejection>,
) -> impl IntoResponse {
    let parsed = query.map_err(|e| e.body_text()).and_then(|Query(query)| {
        let amount = parse_param("amount", query.amount.as_deref())?;
        Ok((amount, parse_param("duration", query.duration.as_deref())?))
    });
    let (amount, duration) = match parsed {
        Ok(v) => v,
        Err(msg) => {
            state.allocator.metrics().record_rejection();
            warn!(error = %msg, "malformed lease request");
            return error_response(&msg, StatusCode::BAD_REQUEST);
        }
    };

    match state.allocator.acquire(amount, duration).await {
        Ok(AcquireOutcome::Granted(batch)) => Json(SlavesResponse {
            slaves: batch.resources,
            come_back: None,
        })
        .into_response(),
        Ok(AcquireOutcome::Wait { retry_after_secs }) => Json(SlavesResponse {
            slaves: Vec::new(),
            come_back: Some(retry_after_secs),
        })
        .into_response(),
        Err(e) => pool_error_response(&e),
    }
}

// ── Status ─────────────────────────────────────────────────────

/// GET /api/v1/pool
pub async fn pool_status(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.allocator.snapshot().await)
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// ── Prometheus ─────────────────────────────────────────────────

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.allocator.snapshot().await;
    let body = leasepool_metrics::render_prometheus(state.allocator.metrics(), &snapshot);
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
