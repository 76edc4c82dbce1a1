//! Daemon bootstrap — builds the pool, starts the release loop, and
//! serves the API until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use leasepool_core::{LeasePoolConfig, PoolState};
use leasepool_metrics::PoolMetrics;
use leasepool_scheduler::LeaseAllocator;

pub async fn run(config: LeasePoolConfig) -> anyhow::Result<()> {
    info!(
        port = config.server.port,
        debug = config.server.debug,
        "LeasePool daemon starting"
    );

    // ── Pool ───────────────────────────────────────────────────

    let resources = config.pool.resource_ids()?;
    let first = resources.first().map(|r| r.to_string()).unwrap_or_default();
    let last = resources.last().map(|r| r.to_string()).unwrap_or_default();
    let state = PoolState::new(resources)?;
    info!(size = state.size(), %first, %last, "resource pool initialized");

    let metrics = Arc::new(PoolMetrics::new());
    let (allocator, scheduler) = LeaseAllocator::new(state, metrics);

    // ── Release loop ───────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let release_handle = tokio::spawn(scheduler.run(shutdown_rx));

    // ── API server ─────────────────────────────────────────────

    let router = leasepool_api::build_router(allocator);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl-C, shutting down");
            }
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    join_release_loop(release_handle).await;

    info!("LeasePool daemon stopped");
    Ok(())
}

/// Wait for the release loop to finish. Returns false if it panicked or
/// was cancelled.
async fn join_release_loop(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "release loop terminated abnormally");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clean_release_loop_exit_joins() {
        let handle = tokio::spawn(async {});
        assert!(join_release_loop(handle).await);
    }

    #[tokio::test]
    async fn panicked_release_loop_is_reported() {
        let handle = tokio::spawn(async { panic!("release loop blew up") });
        assert!(!join_release_loop(handle).await);
    }

    #[tokio::test]
    async fn aborted_release_loop_is_reported() {
        let handle = tokio::spawn(std::future::pending::<()>());
        handle.abort();
        assert!(!join_release_loop(handle).await);
    }
}
