//! Request counters for the lease pool.
//!
//! Lock-free: every counter is an `AtomicU64` updated with relaxed
//! ordering. Counters are monotonic for the lifetime of the process.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

/// Process-wide counters, shared between the allocator and the release loop.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Requests that passed or failed validation.
    requests: AtomicU64,
    /// Requests answered with a grant.
    grants: AtomicU64,
    /// Resources handed out across all grants.
    units_granted: AtomicU64,
    /// Requests answered with a wait hint.
    waits: AtomicU64,
    /// Requests rejected as invalid.
    rejections: AtomicU64,
    /// Batches returned to the pool.
    releases: AtomicU64,
    /// Resources returned across all releases.
    units_released: AtomicU64,
}

/// Plain copy of the counters at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub grants: u64,
    pub units_granted: u64,
    pub waits: u64,
    pub rejections: u64,
    pub releases: u64,
    pub units_released: u64,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_grant(&self, units: usize) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.grants.fetch_add(1, Ordering::Relaxed);
        self.units_granted.fetch_add(units as u64, Ordering::Relaxed);
        trace!(units, "grant recorded");
    }

    pub fn record_wait(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_release(&self, units: usize) {
        self.releases.fetch_add(1, Ordering::Relaxed);
        self.units_released.fetch_add(units as u64, Ordering::Relaxed);
        trace!(units, "release recorded");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            grants: self.grants.load(Ordering::Relaxed),
            units_granted: self.units_granted.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            units_released: self.units_released.load(Ordering::Relaxed),
        }
    }
}
