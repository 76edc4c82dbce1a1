//! Release scheduler — returns lease batches to the pool at their deadline.
//!
//! One task owns a min-heap of pending batches. It sleeps until the
//! earliest deadline, then takes the pool lock and releases every batch
//! that is due. New batches arrive over an unbounded channel, so the
//! allocator never waits on the scheduler.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info};

use leasepool_core::{LeaseBatch, PoolError, PoolResult};
use leasepool_metrics::PoolMetrics;

use crate::SharedPool;

/// Sending side of the release queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReleaseHandle {
    tx: mpsc::UnboundedSender<LeaseBatch>,
}

impl ReleaseHandle {
    /// Queue a batch for release at its deadline.
    ///
    /// Fails with `SchedulerClosed` once the release loop has stopped.
    pub fn schedule(&self, batch: LeaseBatch) -> PoolResult<()> {
        self.tx.send(batch).map_err(|_| PoolError::SchedulerClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Heap entry ordered by deadline, then batch id.
#[derive(Debug)]
struct PendingRelease(LeaseBatch);

impl PendingRelease {
    fn key(&self) -> (Instant, u64) {
        (self.0.deadline, self.0.id)
    }
}

impl PartialEq for PendingRelease {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PendingRelease {}

impl PartialOrd for PendingRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// The background task that honors lease deadlines.
pub struct ReleaseScheduler {
    pool: SharedPool,
    rx: mpsc::UnboundedReceiver<LeaseBatch>,
    pending: BinaryHeap<Reverse<PendingRelease>>,
    metrics: Arc<PoolMetrics>,
}

impl ReleaseScheduler {
    /// Create the scheduler and the handle used to feed it.
    pub fn new(pool: SharedPool, metrics: Arc<PoolMetrics>) -> (Self, ReleaseHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            pool,
            rx,
            pending: BinaryHeap::new(),
            metrics,
        };
        (scheduler, ReleaseHandle { tx })
    }

    /// Run until the shutdown signal fires.
    ///
    /// If every handle is dropped the loop keeps going until the batches
    /// already queued have been released, then exits. Batches still
    /// pending at shutdown are discarded along with the pool.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("release scheduler started");
        let mut accepting = true;

        loop {
            let next_deadline = self.pending.peek().map(|Reverse(p)| p.0.deadline);
            if !accepting && next_deadline.is_none() {
                debug!("all release handles dropped and queue drained");
                break;
            }

            tokio::select! {
                batch = self.rx.recv(), if accepting => match batch {
                    Some(batch) => self.enqueue(batch),
                    None => accepting = false,
                },
                _ = sleep_until_next(next_deadline) => {
                    self.release_due().await;
                }
                _ = shutdown.changed() => {
                    info!(pending = self.pending.len(), "release scheduler shutting down");
                    break;
                }
            }
        }
    }

    fn enqueue(&mut self, batch: LeaseBatch) {
        debug!(
            batch = batch.id,
            resources = batch.len(),
            pending = self.pending.len() + 1,
            "release scheduled"
        );
        self.pending.push(Reverse(PendingRelease(batch)));
    }

    /// Release every batch whose deadline has passed.
    ///
    /// The lock is taken only after the wait is over, and only once for
    /// all batches that fell due together.
    async fn release_due(&mut self) {
        let now = Instant::now();
        let mut due = Vec::new();
        // `sleep_until` wakes at the deadline, never before it. Equality
        // must count as due or the loop would spin on the same deadline.
        while self
            .pending
            .peek()
            .is_some_and(|Reverse(p)| p.0.deadline <= now)
        {
            if let Some(Reverse(PendingRelease(batch))) = self.pending.pop() {
                due.push(batch);
            }
        }

        if due.is_empty() {
            return;
        }

        let mut pool = self.pool.lock().await;
        for batch in due {
            match pool.release(batch.id, &batch.resources) {
                Ok(()) => {
                    self.metrics.record_release(batch.len());
                    info!(
                        batch = batch.id,
                        released = batch.len(),
                        available = pool.available_count(),
                        "lease expired, resources returned"
                    );
                }
                Err(e) => {
                    error!(batch = batch.id, error = %e, "release rejected, pool left unchanged");
                }
            }
        }
    }
}

async fn sleep_until_next(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
