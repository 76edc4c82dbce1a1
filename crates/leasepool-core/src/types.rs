//! Domain types for the lease pool.
//!
//! Deadlines are monotonic `tokio::time::Instant`s so that paused-clock
//! tests drive them deterministically. Only `PoolSnapshot` crosses the
//! wire; it reports remaining time in whole seconds instead.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Opaque identifier of one leasable resource (e.g. `192.168.0.101`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of one granted batch. Assigned in grant order, never reused.
pub type LeaseId = u64;

// ── Leases ─────────────────────────────────────────────────────────

/// One leased resource and the batch that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub resource: ResourceId,
    pub batch: LeaseId,
    pub deadline: Instant,
}

/// All resources handed out by a single successful `acquire`.
///
/// They share one deadline and are returned together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseBatch {
    pub id: LeaseId,
    pub resources: Vec<ResourceId>,
    pub deadline: Instant,
}

impl LeaseBatch {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Result of an `acquire` call that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// All requested resources were leased.
    Granted(LeaseBatch),
    /// Not enough resources are free; retry after roughly this many seconds.
    Wait { retry_after_secs: u64 },
}

impl AcquireOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AcquireOutcome::Granted(_))
    }

    /// Granted identifiers, empty for `Wait`.
    pub fn resources(&self) -> &[ResourceId] {
        match self {
            AcquireOutcome::Granted(batch) => &batch.resources,
            AcquireOutcome::Wait { .. } => &[],
        }
    }
}

// ── Snapshots ──────────────────────────────────────────────────────

/// A leased entry as reported by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeasedEntry {
    pub resource: ResourceId,
    pub batch: LeaseId,
    /// Whole seconds until the deadline, rounded up.
    pub remaining_secs: u64,
}

/// Point-in-time view of the pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub size: usize,
    pub available: Vec<ResourceId>,
    /// Sorted by deadline, soonest first.
    pub leased: Vec<LeasedEntry>,
}

impl PoolSnapshot {
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn leased_count(&self) -> usize {
        self.leased.len()
    }
}
