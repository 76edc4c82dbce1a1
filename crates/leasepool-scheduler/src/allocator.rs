//! Lease allocator — the request-facing side of the pool.
//!
//! `acquire` validates its arguments, then decides under one lock
//! whether to grant. A grant is all-or-nothing and is queued for release
//! before the lock is dropped. A refusal carries a wait hint and leaves
//! the pool untouched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn, Level};

use leasepool_core::*;
use leasepool_metrics::PoolMetrics;

use crate::release::{ReleaseHandle, ReleaseScheduler};
use crate::SharedPool;

/// Longest lease accepted, in seconds.
pub const MAX_LEASE_SECS: i64 = u32::MAX as i64;

/// Grants leases out of a shared pool. Cheap to clone.
#[derive(Clone)]
pub struct LeaseAllocator {
    pool: SharedPool,
    releases: ReleaseHandle,
    /// Pool size, fixed at construction.
    size: usize,
    metrics: Arc<PoolMetrics>,
}

impl LeaseAllocator {
    /// Wrap `state` and create the release loop that serves it.
    ///
    /// The returned scheduler must be spawned with `ReleaseScheduler::run`,
    /// otherwise granted resources never come back.
    pub fn new(state: PoolState, metrics: Arc<PoolMetrics>) -> (Self, ReleaseScheduler) {
        let size = state.size();
        let pool: SharedPool = Arc::new(Mutex::new(state));
        let (scheduler, releases) = ReleaseScheduler::new(pool.clone(), metrics.clone());
        let allocator = Self {
            pool,
            releases,
            size,
            metrics,
        };
        (allocator, scheduler)
    }

    pub fn pool_size(&self) -> usize {
        self.size
    }

    pub fn metrics(&self) -> &Arc<PoolMetrics> {
        &self.metrics
    }

    /// Lease `amount` resources for `duration` seconds, or say how long to wait.
    ///
    /// Never blocks waiting for resources. Arguments are signed so that
    /// negative values reach validation and come back as `InvalidRequest`.
    pub async fn acquire(&self, amount: i64, duration: i64) -> PoolResult<AcquireOutcome> {
        let (amount, lease_for) = match self.validate(amount, duration) {
            Ok(v) => v,
            Err(e) => {
                self.metrics.record_rejection();
                warn!(amount, duration, error = %e, "acquire rejected");
                return Err(e);
            }
        };

        let mut pool = self.pool.lock().await;
        let now = Instant::now();
        let available = pool.available_count();

        let outcome = if amount <= available {
            let batch = pool.grant(amount, now + lease_for)?;
            if let Err(e) = self.releases.schedule(batch.clone()) {
                // No one would ever return these, so undo the grant.
                pool.release(batch.id, &batch.resources)?;
                warn!(batch = batch.id, "release scheduler closed, grant rolled back");
                return Err(e);
            }
            self.metrics.record_grant(batch.len());
            info!(
                batch = batch.id,
                amount,
                duration,
                available = pool.available_count(),
                "lease granted"
            );
            AcquireOutcome::Granted(batch)
        } else {
            let shortfall = amount - available;
            let retry_after_secs = pool.estimate_wait(shortfall, now);
            self.metrics.record_wait();
            info!(amount, available, retry_after_secs, "not enough resources, come back later");
            AcquireOutcome::Wait { retry_after_secs }
        };

        if tracing::enabled!(Level::DEBUG) {
            let snapshot = pool.snapshot(now);
            debug!(
                result = ?outcome.resources(),
                available = ?snapshot.available,
                leased = ?snapshot.leased,
                "pool state after acquire"
            );
        }

        Ok(outcome)
    }

    /// Current view of the pool.
    pub async fn snapshot(&self) -> PoolSnapshot {
        self.pool.lock().await.snapshot(Instant::now())
    }

    /// Check the available/leased partition. Intended for tests and diagnostics.
    pub async fn check_invariants(&self) -> PoolResult<()> {
        self.pool.lock().await.check_invariants()
    }

    fn validate(&self, amount: i64, duration: i64) -> PoolResult<(usize, Duration)> {
        if amount <= 0 || duration <= 0 {
            return Err(PoolError::InvalidRequest(
                "amount and duration must be positive integers".into(),
            ));
        }
        if amount as u64 > self.size as u64 {
            return Err(PoolError::InvalidRequest(format!(
                "amount {amount} exceeds pool size {}",
                self.size
            )));
        }
        if duration > MAX_LEASE_SECS {
            return Err(PoolError::InvalidRequest(format!(
                "duration {duration} exceeds maximum of {MAX_LEASE_SECS} seconds"
            )));
        }
        Ok((amount as usize, Duration::from_secs(duration as u64)))
    }
}
