//! Integration tests for the limiter

use gotools_resources::Limiter;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Run `ops` operations through a limiter of `capacity` and return the
/// highest number observed running at once and the number that finished.
async fn run_workload(capacity: usize, ops: usize) -> (usize, usize) {
    let limiter = Limiter::new("workload", capacity);
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));

    for i in 0..ops {
        let permit = limiter.acquire().await.unwrap();
        let active = active.clone();
        let peak = peak.clone();
        let finished = finished.clone();
        tokio::spawn(async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis((i % 3) as u64)).await;
            active.fetch_sub(1, Ordering::SeqCst);
            finished.fetch_add(1, Ordering::SeqCst);
            drop(permit);
        });
    }

    limiter.join().await;
    assert_eq!(limiter.in_flight(), 0);
    assert_eq!(limiter.available(), limiter.capacity());
    (
        peak.load(Ordering::SeqCst),
        finished.load(Ordering::SeqCst),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn caps_concurrency_at_capacity() {
    let (peak, finished) = run_workload(2, 3).await;
    assert!(peak <= 2, "peak {peak} exceeded capacity");
    assert_eq!(finished, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn join_waits_for_every_release() {
    let limiter = Limiter::new("join", 4);
    let finished = Arc::new(AtomicUsize::new(0));

    for _ in 0..8 {
        let permit = limiter.acquire().await.unwrap();
        let finished = finished.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            finished.fetch_add(1, Ordering::SeqCst);
            permit.release();
        });
    }

    limiter.join().await;
    assert_eq!(finished.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn permit_released_when_task_panics() {
    let limiter = Limiter::new("panic", 1);
    let permit = limiter.acquire().await.unwrap();

    let handle = tokio::spawn(async move {
        let _permit = permit;
        panic!("worker blew up");
    });
    assert!(handle.await.is_err());

    limiter.join().await;
    assert_eq!(limiter.available(), 1);
    assert!(limiter.acquire().await.is_ok());
}

#[tokio::test]
async fn permit_released_when_task_aborted() {
    let limiter = Limiter::new("abort", 1);
    let permit = limiter.acquire().await.unwrap();

    let handle = tokio::spawn(async move {
        let _permit = permit;
        tokio::time::sleep(Duration::from_secs(60)).await;
    });
    handle.abort();
    let _ = handle.await;

    limiter.join().await;
    assert_eq!(limiter.in_flight(), 0);
}

#[tokio::test]
async fn limiter_is_reusable_after_join() {
    let limiter = Limiter::new("reuse", 1);
    limiter.acquire().await.unwrap().release();
    limiter.join().await;

    let permit = limiter.acquire().await.unwrap();
    assert_eq!(limiter.in_flight(), 1);
    drop(permit);
    limiter.join().await;
    assert_eq!(limiter.in_flight(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn never_exceeds_capacity(capacity in 1usize..6, ops in 0usize..24) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_time()
            .build()
            .unwrap();
        let (peak, finished) = runtime.block_on(run_workload(capacity, ops));
        prop_assert!(peak <= capacity);
        prop_assert_eq!(finished, ops);
    }
}
