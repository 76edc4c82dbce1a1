//! leasepool-core — pool bookkeeping for LeasePool.
//!
//! Holds a fixed set of interchangeable resources (worker addresses) and
//! tracks which of them are leased, to which batch, and until when.
//!
//! # Architecture
//!
//! ```text
//! PoolState
//!   ├── available: VecDeque<ResourceId>   (grant order = front first)
//!   ├── leased: HashMap<ResourceId, Lease> (identity-scoped release)
//!   └── estimate_wait() → estimator::estimate_wait_secs()
//! ```
//!
//! `PoolState` is a plain synchronous structure; callers wrap it in a
//! single mutex (see `leasepool-scheduler`) so every decide-and-mutate
//! sequence is linearized.

pub mod config;
pub mod error;
pub mod estimator;
pub mod pool;
pub mod types;

pub use config::{LeasePoolConfig, PoolConfig, ServerConfig};
pub use error::{PoolError, PoolResult};
pub use estimator::estimate_wait_secs;
pub use pool::PoolState;
pub use types::*;
