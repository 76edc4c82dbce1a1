//! PoolState — the available/leased partition of a fixed resource set.
//!
//! Every resource is in exactly one of `available` or `leased` at all
//! times. Mutating operations validate their preconditions before they
//! touch either collection, so a rejected call leaves the pool unchanged.

use std::collections::{HashMap, HashSet, VecDeque};

use tokio::time::Instant;
use tracing::{debug, error};

use crate::error::{PoolError, PoolResult};
use crate::estimator::{ceil_secs, estimate_wait_secs};
use crate::types::*;

/// Bookkeeping for a fixed pool of resources.
///
/// Not synchronized. Wrap in one mutex and run each decide-and-mutate
/// sequence under a single guard.
#[derive(Debug)]
pub struct PoolState {
    /// Every resource, in configuration order. Never changes.
    resources: Vec<ResourceId>,
    /// Grantable resources. Grants take from the front, releases push to the back.
    available: VecDeque<ResourceId>,
    /// Active leases keyed by resource.
    leased: HashMap<ResourceId, Lease>,
    next_batch: LeaseId,
}

impl PoolState {
    /// Build a pool where every resource starts out available.
    ///
    /// The list must be non-empty and free of duplicates.
    pub fn new(resources: Vec<ResourceId>) -> PoolResult<Self> {
        if resources.is_empty() {
            return Err(PoolError::Config("pool must contain at least one resource".into()));
        }

        let mut seen = HashSet::with_capacity(resources.len());
        for id in &resources {
            if !seen.insert(id) {
                return Err(PoolError::Config(format!("duplicate resource id: {id}")));
            }
        }

        debug!(size = resources.len(), "pool state created");
        Ok(Self {
            available: resources.iter().cloned().collect(),
            leased: HashMap::with_capacity(resources.len()),
            resources,
            next_batch: 1,
        })
    }

    /// Total number of resources (N).
    pub fn size(&self) -> usize {
        self.resources.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn leased_count(&self) -> usize {
        self.leased.len()
    }

    pub fn is_available(&self, id: &ResourceId) -> bool {
        self.available.contains(id)
    }

    pub fn lease_of(&self, id: &ResourceId) -> Option<&Lease> {
        self.leased.get(id)
    }

    /// Lease the first `amount` available resources until `deadline`.
    ///
    /// Callers must have checked `amount <= available_count()`; breaking
    /// that, or finding a queued resource that is already leased, is an
    /// invariant violation and nothing is changed.
    pub fn grant(&mut self, amount: usize, deadline: Instant) -> PoolResult<LeaseBatch> {
        if amount == 0 || amount > self.available.len() {
            return Err(self.violation(format!(
                "grant of {amount} with {} available",
                self.available.len()
            )));
        }

        if let Some(id) = self.available.iter().take(amount).find(|id| self.leased.contains_key(*id)) {
            let msg = format!("{id} is queued as available but already leased");
            return Err(self.violation(msg));
        }

        let batch = self.next_batch;
        self.next_batch += 1;

        let resources: Vec<ResourceId> = self.available.drain(..amount).collect();
        for id in &resources {
            self.leased.insert(
                id.clone(),
                Lease {
                    resource: id.clone(),
                    batch,
                    deadline,
                },
            );
        }

        debug!(batch, amount, available = self.available.len(), "resources granted");
        Ok(LeaseBatch {
            id: batch,
            resources,
            deadline,
        })
    }

    /// Return exactly the given resources of `batch` to the available queue.
    ///
    /// Every id must currently be leased to `batch`. Leases owned by other
    /// batches are never touched, whatever their deadlines.
    pub fn release(&mut self, batch: LeaseId, ids: &[ResourceId]) -> PoolResult<()> {
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id) {
                return Err(self.violation(format!("{id} listed twice in batch {batch}")));
            }
            match self.leased.get(id) {
                Some(lease) if lease.batch == batch => {}
                Some(lease) => {
                    let msg = format!("{id} belongs to batch {}, not {batch}", lease.batch);
                    return Err(self.violation(msg));
                }
                None => {
                    return Err(self.violation(format!("{id} released by batch {batch} but not leased")));
                }
            }
        }

        for id in ids {
            self.leased.remove(id);
            self.available.push_back(id.clone());
        }

        debug!(batch, released = ids.len(), available = self.available.len(), "resources released");
        Ok(())
    }

    /// Seconds until `shortfall` more resources are expected back.
    pub fn estimate_wait(&self, shortfall: usize, now: Instant) -> u64 {
        let deadlines: Vec<Instant> = self.leased.values().map(|l| l.deadline).collect();
        estimate_wait_secs(&deadlines, shortfall, now)
    }

    /// Verify the available/leased partition against the fixed resource set.
    pub fn check_invariants(&self) -> PoolResult<()> {
        if self.available.len() + self.leased.len() != self.resources.len() {
            return Err(PoolError::InvariantViolation(format!(
                "{} available + {} leased != {}",
                self.available.len(),
                self.leased.len(),
                self.resources.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.resources.len());
        for id in self.available.iter().chain(self.leased.keys()) {
            if !seen.insert(id) {
                return Err(PoolError::InvariantViolation(format!(
                    "{id} is both available and leased"
                )));
            }
        }

        if let Some(id) = self.resources.iter().find(|id| !seen.contains(id)) {
            return Err(PoolError::InvariantViolation(format!("{id} is missing from the pool")));
        }

        Ok(())
    }

    pub fn snapshot(&self, now: Instant) -> PoolSnapshot {
        let mut leases: Vec<&Lease> = self.leased.values().collect();
        leases.sort_by(|a, b| a.deadline.cmp(&b.deadline).then_with(|| a.resource.cmp(&b.resource)));

        PoolSnapshot {
            size: self.resources.len(),
            available: self.available.iter().cloned().collect(),
            leased: leases
                .into_iter()
                .map(|l| LeasedEntry {
                    resource: l.resource.clone(),
                    batch: l.batch,
                    remaining_secs: ceil_secs(l.deadline.saturating_duration_since(now)),
                })
                .collect(),
        }
    }

    fn violation(&self, msg: String) -> PoolError {
        error!(
            available = self.available.len(),
            leased = self.leased.len(),
            "{msg}"
        );
        PoolError::InvariantViolation(msg)
    }
}
