use compute::{ComputeError, WorkerPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[test]
fn returns_only_after_all_items_complete() {
    let pool = WorkerPool::new(4).unwrap();
    let done = AtomicUsize::new(0);
    let items: Vec<u64> = (0..40).collect();

    pool.for_each(&items, |&i| {
        // Stagger the work so late finishers would be observable.
        std::thread::sleep(Duration::from_micros(50 * (i % 5)));
        done.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(done.load(Ordering::SeqCst), items.len());
}

#[test]
fn consecutive_calls_act_as_barriers() {
    let pool = WorkerPool::new(3).unwrap();
    let phase_one = AtomicUsize::new(0);
    let items: Vec<usize> = (0..100).collect();

    pool.for_each(&items, |_| {
        phase_one.fetch_add(1, Ordering::SeqCst);
    });
    pool.for_each(&items, |_| {
        assert_eq!(phase_one.load(Ordering::SeqCst), 100);
    });
}

#[test]
fn default_pool_has_workers() {
    let pool = compute::default_pool();
    assert!(pool.workers() >= 1);
}

#[test]
fn zero_worker_error_displays() {
    let err = WorkerPool::new(0).unwrap_err();
    assert!(matches!(err, ComputeError::ZeroWorkers));
    assert!(err.to_string().contains("at least one worker"));
}
