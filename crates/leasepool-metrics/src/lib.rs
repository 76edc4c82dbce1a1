//! leasepool-metrics — observability for the lease pool.
//!
//! Counts requests and their outcomes, and renders them together with a
//! pool snapshot in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! PoolMetrics (atomics, shared via Arc)
//!   ├── record_grant() / record_wait() / record_rejection() ← allocator
//!   └── record_release()                                   ← release loop
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod collector;
pub mod prometheus;

pub use collector::{MetricsSnapshot, PoolMetrics};
pub use prometheus::render_prometheus;
