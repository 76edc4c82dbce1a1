//! Router-level regression tests.
//!
//! Drives the full HTTP stack (router, allocator, release loop) with
//! `oneshot` requests. Timing tests run on tokio's paused clock.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::watch;
use tower::ServiceExt;

use leasepool_api::build_router;
use leasepool_core::{PoolConfig, PoolState};
use leasepool_metrics::PoolMetrics;
use leasepool_scheduler::LeaseAllocator;

/// Router over the default ten-address pool, with the release loop running.
fn test_router() -> (Router, watch::Sender<bool>) {
    let ids = PoolConfig::default().resource_ids().unwrap();
    let (allocator, scheduler) =
        LeaseAllocator::new(PoolState::new(ids).unwrap(), Arc::new(PoolMetrics::new()));
    let (tx, rx) = watch::channel(false);
    tokio::spawn(scheduler.run(rx));
    (build_router(allocator), tx)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn slaves(body: &Value) -> Vec<String> {
    body["slaves"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn end_to_end_full_pool_wait_and_reuse() {
    let (router, _shutdown) = test_router();

    let (status, body) = get(&router, "/get_slaves?amount=10&duration=5").await;
    assert_eq!(status, StatusCode::OK);
    let first: HashSet<String> = slaves(&body).into_iter().collect();
    assert_eq!(first.len(), 10);
    assert!(first.contains("192.168.0.101"));
    assert!(first.contains("192.168.0.110"));

    let (status, body) = get(&router, "/get_slaves?amount=1&duration=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(slaves(&body).is_empty());
    assert_eq!(body["come_back"], 5);

    tokio::time::sleep(Duration::from_millis(5_001)).await;

    let (status, body) = get(&router, "/get_slaves?amount=1&duration=1").await;
    assert_eq!(status, StatusCode::OK);
    let again = slaves(&body);
    assert_eq!(again.len(), 1);
    assert!(first.contains(&again[0]));
    assert!(body.get("come_back").is_none());
}

#[tokio::test(start_paused = true)]
async fn boundary_requests_rejected_and_pool_unchanged() {
    let (router, _shutdown) = test_router();

    for uri in [
        "/get_slaves?amount=0&duration=5",
        "/get_slaves?amount=11&duration=5",
        "/get_slaves?amount=1&duration=0",
        "/get_slaves?amount=1&duration=-1",
        "/get_slaves?amount=abc&duration=5",
        "/get_slaves?duration=5",
    ] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
    }

    let (_, pool) = get(&router, "/api/v1/pool").await;
    assert_eq!(pool["available"].as_array().unwrap().len(), 10);
    assert!(pool["leased"].as_array().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn wait_hint_tracks_second_soonest_lease() {
    let (router, _shutdown) = test_router();

    get(&router, "/get_slaves?amount=8&duration=60").await;
    get(&router, "/get_slaves?amount=1&duration=7").await;
    get(&router, "/get_slaves?amount=1&duration=3").await;

    let (_, body) = get(&router, "/get_slaves?amount=1&duration=1").await;
    assert_eq!(body["come_back"], 3);
    let (_, body) = get(&router, "/get_slaves?amount=2&duration=1").await;
    assert_eq!(body["come_back"], 7);
    let (_, body) = get(&router, "/get_slaves?amount=3&duration=1").await;
    assert_eq!(body["come_back"], 60);
}

#[tokio::test(start_paused = true)]
async fn short_lease_does_not_release_long_lease() {
    let (router, _shutdown) = test_router();

    let (_, long) = get(&router, "/get_slaves?amount=4&duration=30").await;
    let long: HashSet<String> = slaves(&long).into_iter().collect();
    get(&router, "/get_slaves?amount=6&duration=2").await;

    tokio::time::sleep(Duration::from_millis(2_001)).await;

    let (_, pool) = get(&router, "/api/v1/pool").await;
    let available: HashSet<String> = pool["available"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(available.len(), 6);
    assert!(available.is_disjoint(&long));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_never_share_a_resource() {
    let (router, _shutdown) = test_router();

    let mut handles = Vec::new();
    for _ in 0..12 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            get(&router, "/get_slaves?amount=4&duration=300").await
        }));
    }

    let mut seen = HashSet::new();
    for h in handles {
        let (status, body) = h.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        for id in slaves(&body) {
            assert!(seen.insert(id.clone()), "{id} leased twice");
        }
    }
    assert_eq!(seen.len(), 8);
}

#[tokio::test]
async fn metrics_endpoint_reflects_requests() {
    let (router, _shutdown) = test_router();
    get(&router, "/get_slaves?amount=2&duration=60").await;
    get(&router, "/get_slaves?amount=0&duration=60").await;

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("leasepool_pool_size 10\n"));
    assert!(text.contains("leasepool_leased 2\n"));
    assert!(text.contains("leasepool_requests_total 2\n"));
    assert!(text.contains("leasepool_rejections_total 1\n"));
}

#[tokio::test]
async fn undecodable_query_gets_json_error_and_is_counted() {
    let (router, _shutdown) = test_router();

    let (status, body) = get(&router, "/get_slaves?amount=1&amount=2&duration=3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "unexpected body: {body}");
    assert!(body.get("slaves").is_none());

    let (_, pool) = get(&router, "/api/v1/pool").await;
    assert_eq!(pool["available"].as_array().unwrap().len(), 10);

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("leasepool_rejections_total 1\n"));
}

#[tokio::test]
async fn healthz_responds() {
    let (router, _shutdown) = test_router();
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
