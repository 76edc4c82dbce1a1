//! leasepool-scheduler — lease allocation and deferred release.
//!
//! The allocator answers `acquire(amount, duration)` immediately with a
//! grant or a wait hint. Every grant is handed to the release loop, a
//! single background task that returns each batch to the pool once its
//! deadline has passed.
//!
//! # Architecture
//!
//! ```text
//! LeaseAllocator ──acquire()──► Mutex<PoolState>
//!       │                            ▲
//!       └─ReleaseHandle──► ReleaseScheduler (one task, min-heap by deadline)
//! ```
//!
//! Both sides take the same mutex, and neither sleeps while holding it.

pub mod allocator;
pub mod release;

use std::sync::Arc;

use tokio::sync::Mutex;

use leasepool_core::PoolState;

pub use allocator::{LeaseAllocator, MAX_LEASE_SECS};
pub use release::{ReleaseHandle, ReleaseScheduler};

/// The pool state shared by the allocator and the release loop.
pub type SharedPool = Arc<Mutex<PoolState>>;
