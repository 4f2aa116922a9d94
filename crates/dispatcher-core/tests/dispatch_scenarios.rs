//! End-to-end dispatch scenarios against a real `demos::echo` worker pool.
//!
//! These spawn actual `dispatcher-worker` subprocesses, so they require the
//! workspace to have been built first (the worker binary must sit next to
//! the test binary's own executable directory) and are marked `#[ignore]`,
//! the convention used throughout this workspace for tests that need a
//! real process or VM startup.
//!
//! Run with: `cargo test -p dispatcher-core --test dispatch_scenarios -- --ignored`

use dispatcher_core::pool::WorkerPool;
use dispatcher_core::scheduler::{DispatchOutcome, Scheduler};
use std::sync::Arc;
use std::time::Duration;

fn scheduler(num_gpus: u32, max_req_per_gpu: u32) -> Scheduler {
    let pool = WorkerPool::new("demos::echo".to_string()).expect("dispatcher-worker binary built alongside tests");
    Scheduler::new(pool, num_gpus, max_req_per_gpu)
}

fn sleepy_scheduler(num_gpus: u32, max_req_per_gpu: u32) -> Scheduler {
    let pool = WorkerPool::new("demos::sleep".to_string()).expect("dispatcher-worker binary built alongside tests");
    Scheduler::new(pool, num_gpus, max_req_per_gpu)
}

fn millis(n: u64) -> Vec<u8> {
    n.to_le_bytes().to_vec()
}

/// S1: single request against an empty pool cold-starts GPU 0.
#[test]
#[ignore = "slow: spawns real subprocesses"]
fn test_s1_single_request_empty_pool_cold_starts() {
    let scheduler = scheduler(2, 2);
    match scheduler.dispatch(b"0123456789abcdef") {
        DispatchOutcome::Served { cold_start, response } => {
            assert!(cold_start);
            assert_eq!(response, b"0123456789abcdef");
        }
        DispatchOutcome::Saturated => panic!("expected a served response"),
    }
    scheduler.shutdown();
}

/// S3: with G=1, M=1, the second of two concurrent long requests is
/// reported as saturated while the first succeeds.
#[test]
#[ignore = "slow: spawns real subprocesses and sleeps on real timers"]
fn test_s3_saturation_with_single_worker() {
    let scheduler = Arc::new(scheduler(1, 1));

    let s1 = Arc::clone(&scheduler);
    let first = std::thread::spawn(move || s1.dispatch(b"first"));
    std::thread::sleep(Duration::from_millis(50));
    let second = scheduler.dispatch(b"second");

    assert!(matches!(second, DispatchOutcome::Saturated));
    let first_result = first.join().expect("first dispatch thread panicked");
    assert!(matches!(first_result, DispatchOutcome::Served { cold_start: true, .. }));

    scheduler.shutdown();
}

/// S2: with G=2, M=2, three concurrent 500ms requests fill GPU 0 first
/// (cold-start, then reuse) and overflow onto GPU 1 (a second cold-start).
#[test]
#[ignore = "slow: spawns real subprocesses and sleeps on real timers"]
fn test_s2_fill_one_gpu_then_overflow() {
    let scheduler = Arc::new(sleepy_scheduler(2, 2));

    let s1 = Arc::clone(&scheduler);
    let r1 = std::thread::spawn(move || s1.dispatch(&millis(500)));
    std::thread::sleep(Duration::from_millis(100));

    let s2 = Arc::clone(&scheduler);
    let r2 = std::thread::spawn(move || s2.dispatch(&millis(500)));
    std::thread::sleep(Duration::from_millis(100));

    let r3 = scheduler.dispatch(&millis(500));

    let r1 = r1.join().expect("first dispatch thread panicked");
    let r2 = r2.join().expect("second dispatch thread panicked");

    assert!(matches!(r1, DispatchOutcome::Served { cold_start: true, .. }));
    assert!(matches!(r2, DispatchOutcome::Served { cold_start: false, .. }));
    assert!(matches!(r3, DispatchOutcome::Served { cold_start: true, .. }));

    scheduler.shutdown();
}

/// S5: a shutdown mid-flight kills the busy worker rather than blocking
/// forever on its 1-second join deadline.
#[test]
#[ignore = "slow: spawns real subprocesses and sleeps on real timers"]
fn test_s5_shutdown_kills_a_busy_worker() {
    let scheduler = Arc::new(sleepy_scheduler(1, 1));

    let s1 = Arc::clone(&scheduler);
    let in_flight = std::thread::spawn(move || s1.dispatch(&millis(2000)));
    std::thread::sleep(Duration::from_millis(100));

    let started = std::time::Instant::now();
    scheduler.shutdown();
    assert!(started.elapsed() < Duration::from_millis(1500), "shutdown should kill within its 1s deadline");

    let result = in_flight.join().expect("in-flight dispatch thread panicked");
    assert!(matches!(result, DispatchOutcome::Saturated), "killed worker surfaces as a failed IPC round-trip");
}

/// S4: after both in-flight requests on a 2-worker GPU complete, a third
/// request reuses worker 0 without triggering a new cold start.
#[test]
#[ignore = "slow: spawns real subprocesses"]
fn test_s4_post_drain_reuse_is_not_a_cold_start() {
    let scheduler = scheduler(1, 2);

    let first = scheduler.dispatch(b"one");
    assert!(matches!(first, DispatchOutcome::Served { cold_start: true, .. }));
    let second = scheduler.dispatch(b"two");
    assert!(matches!(second, DispatchOutcome::Served { cold_start: false, .. }));

    let third = scheduler.dispatch(b"three");
    assert!(matches!(third, DispatchOutcome::Served { cold_start: false, .. }));

    scheduler.shutdown();
}
