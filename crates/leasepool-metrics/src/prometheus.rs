//! Prometheus text exposition format.
//!
//! Renders the pool gauges and request counters for scraping by a
//! Prometheus server or compatible agent.

use std::fmt::Write;

use leasepool_core::PoolSnapshot;

use crate::collector::PoolMetrics;

/// Render pool gauges and request counters into Prometheus text format.
pub fn render_prometheus(metrics: &PoolMetrics, pool: &PoolSnapshot) -> String {
    let c = metrics.snapshot();
    let mut out = String::new();

    gauge(&mut out, "leasepool_pool_size", "Total number of resources in the pool.", pool.size as u64);
    gauge(&mut out, "leasepool_available", "Resources currently available.", pool.available_count() as u64);
    gauge(&mut out, "leasepool_leased", "Resources currently leased.", pool.leased_count() as u64);

    counter(&mut out, "leasepool_requests_total", "Acquire requests received.", c.requests);
    counter(&mut out, "leasepool_grants_total", "Acquire requests answered with a grant.", c.grants);
    counter(&mut out, "leasepool_units_granted_total", "Resources handed out.", c.units_granted);
    counter(&mut out, "leasepool_waits_total", "Acquire requests answered with a wait hint.", c.waits);
    counter(&mut out, "leasepool_rejections_total", "Acquire requests rejected as invalid.", c.rejections);
    counter(&mut out, "leasepool_releases_total", "Lease batches returned to the pool.", c.releases);
    counter(&mut out, "leasepool_units_released_total", "Resources returned to the pool.", c.units_released);

    out
}

fn gauge(out: &mut String, name: &str, help: &str, value: u64) {
    metric(out, name, help, "gauge", value);
}

fn counter(out: &mut String, name: &str, help: &str, value: u64) {
    metric(out, name, help, "counter", value);
}

fn metric(out: &mut String, name: &str, help: &str, kind: &str, value: u64) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
    let _ = writeln!(out, "{name} {value}");
}
