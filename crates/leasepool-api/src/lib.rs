//! leasepool-api — HTTP surface of the lease pool.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/get_slaves?amount=N&duration=S` | Lease N resources for S seconds |
//! | GET | `/api/v1/pool` | Pool snapshot |
//! | GET | `/healthz` | Liveness probe |
//! | GET | `/metrics` | Prometheus exposition |

pub mod handlers;

use axum::Router;
use axum::routing::get;
use leasepool_scheduler::LeaseAllocator;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub allocator: LeaseAllocator,
}

/// Build the complete API router.
pub fn build_router(allocator: LeaseAllocator) -> Router {
    let state = ApiState { allocator };

    Router::new()
        .route("/get_slaves", get(handlers::get_slaves))
        .route("/api/v1/pool", get(handlers::pool_status))
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(state)
}
