use crossbeam::channel::{bounded, Receiver, Sender};
use fifopool::{
    metrics::{AtomicMetricsCollector, ThreadPoolMetrics},
    PoolError, ThreadPool, ThreadPoolBuilder,
};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bump(counter: Arc<AtomicUsize>) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// Submits a task that reports when it starts and then blocks until released.
fn submit_blocker(pool: &ThreadPool, started: Sender<()>, release: Receiver<()>) {
    pool.spawn(move || {
        started.send(()).unwrap();
        release.recv().unwrap();
    })
    .unwrap();
}

fn release_later(release: Sender<()>, times: usize) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        for _ in 0..times {
            release.send(()).unwrap();
        }
    })
}

#[test]
fn test_join_all_finishes_claimed_task() {
    init_logger();
    let pool = ThreadPool::new(1).unwrap();
    let (started_tx, started_rx) = bounded(1);
    let (release_tx, release_rx) = bounded(1);
    let first_done = Arc::new(AtomicBool::new(false));
    let second = Arc::new(AtomicUsize::new(0));

    let done = Arc::clone(&first_done);
    pool.spawn(move || {
        started_tx.send(()).unwrap();
        release_rx.recv().unwrap();
        done.store(true, Ordering::SeqCst);
    })
    .unwrap();
    pool.submit(Some(bump), Arc::clone(&second)).unwrap();

    started_rx.recv().unwrap();
    let releaser = release_later(release_tx, 1);
    pool.join_all();
    releaser.join().unwrap();

    assert!(first_done.load(Ordering::SeqCst));
    assert!(!pool.is_running());
    // The second task was never claimed and stays queued until destroy.
    assert_eq!(second.load(Ordering::SeqCst), 0);
    assert_eq!(pool.queued_len(), 1);
    assert_eq!(Arc::strong_count(&second), 2);

    pool.destroy();
    assert_eq!(second.load(Ordering::SeqCst), 0);
    assert_eq!(Arc::strong_count(&second), 1);
}

#[test]
fn test_join_all_leaves_backlog_unexecuted() {
    init_logger();
    let metrics = Arc::new(ThreadPoolMetrics::new());
    let collector = Arc::new(AtomicMetricsCollector::new(Arc::clone(&metrics)));
    let pool = ThreadPoolBuilder::new()
        .num_threads(2)
        .with_metrics_collector(collector)
        .build()
        .unwrap();

    let (started_tx, started_rx) = bounded(2);
    let (release_tx, release_rx) = bounded(2);
    submit_blocker(&pool, started_tx.clone(), release_rx.clone());
    submit_blocker(&pool, started_tx, release_rx);

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..10 {
        pool.submit(Some(bump), Arc::clone(&counter)).unwrap();
    }

    started_rx.recv().unwrap();
    started_rx.recv().unwrap();
    let releaser = release_later(release_tx, 2);
    pool.join_all();
    releaser.join().unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(pool.queued_len(), 10);
    assert_eq!(metrics.completed_tasks.load(Ordering::SeqCst), 2);
    assert_eq!(metrics.active_threads.load(Ordering::SeqCst), 0);

    pool.destroy();
    assert_eq!(metrics.discarded_tasks.load(Ordering::SeqCst), 10);
    assert_eq!(metrics.queued_tasks.load(Ordering::SeqCst), 0);
    assert_eq!(Arc::strong_count(&counter), 1);
}

#[test]
fn test_join_all_is_idempotent() {
    init_logger();
    let pool = ThreadPool::new(3).unwrap();
    pool.join_all();
    pool.join_all();
    assert!(!pool.is_running());
    pool.destroy();
}

#[test]
fn test_submit_after_shutdown_is_rejected() {
    init_logger();
    let pool = ThreadPool::new(2).unwrap();
    pool.join_all();

    let counter = Arc::new(AtomicUsize::new(0));
    let err = pool.submit(Some(bump), Arc::clone(&counter)).unwrap_err();
    assert!(matches!(err, PoolError::PoolShutdown));
    assert_eq!(pool.queued_len(), 0);
    assert_eq!(Arc::strong_count(&counter), 1);
    pool.destroy();
}

#[test]
fn test_wait_all_after_join_all_returns() {
    init_logger();
    let pool = ThreadPool::new(0).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    pool.submit(Some(bump), Arc::clone(&counter)).unwrap();

    pool.join_all();
    // Nothing can run any more, so there is nothing to wait for.
    pool.wait_all();
    assert_eq!(pool.queued_len(), 1);
    pool.destroy();
}

#[test]
fn test_join_all_wakes_drain_waiter() {
    init_logger();
    let pool = Arc::new(ThreadPool::new(1).unwrap());
    let (started_tx, started_rx) = bounded(1);
    let (release_tx, release_rx) = bounded(1);
    submit_blocker(&pool, started_tx, release_rx);
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        pool.submit(Some(bump), Arc::clone(&counter)).unwrap();
    }
    started_rx.recv().unwrap();

    let waiter = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.wait_all())
    };
    let releaser = release_later(release_tx, 1);
    pool.join_all();
    releaser.join().unwrap();
    waiter.join().unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 0);
    Arc::try_unwrap(pool).unwrap().destroy();
    assert_eq!(Arc::strong_count(&counter), 1);
}

#[test]
fn test_drop_releases_everything() {
    init_logger();
    let metrics = Arc::new(ThreadPoolMetrics::new());
    let collector = Arc::new(AtomicMetricsCollector::new(Arc::clone(&metrics)));
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(0)
            .with_metrics_collector(collector)
            .build()
            .unwrap();
        for _ in 0..4 {
            pool.submit(Some(bump), Arc::clone(&counter)).unwrap();
        }
    }
    assert_eq!(Arc::strong_count(&counter), 1);
    assert_eq!(metrics.discarded_tasks.load(Ordering::SeqCst), 4);
}

#[test]
fn test_destroy_after_wait_all_discards_nothing() {
    init_logger();
    let metrics = Arc::new(ThreadPoolMetrics::new());
    let collector = Arc::new(AtomicMetricsCollector::new(Arc::clone(&metrics)));
    let pool = ThreadPoolBuilder::new()
        .num_threads(4)
        .with_metrics_collector(collector)
        .build()
        .unwrap();
    assert_eq!(metrics.active_threads.load(Ordering::SeqCst), 4);

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..100 {
        pool.submit(Some(bump), Arc::clone(&counter)).unwrap();
    }
    pool.wait_all();
    pool.destroy();

    assert_eq!(counter.load(Ordering::SeqCst), 100);
    assert_eq!(metrics.completed_tasks.load(Ordering::SeqCst), 100);
    assert_eq!(metrics.discarded_tasks.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.running_tasks.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.active_threads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_task_dropping_last_handle_tears_pool_down() {
    init_logger();
    let metrics = Arc::new(ThreadPoolMetrics::new());
    let collector = Arc::new(AtomicMetricsCollector::new(Arc::clone(&metrics)));
    let pool = Arc::new(
        ThreadPoolBuilder::new()
            .num_threads(2)
            .with_metrics_collector(collector)
            .build()
            .unwrap(),
    );

    let (release_tx, release_rx) = bounded::<()>(1);
    let (done_tx, done_rx) = bounded(1);
    let counter = Arc::new(AtomicUsize::new(0));

    let inner = Arc::clone(&pool);
    let c = Arc::clone(&counter);
    pool.spawn(move || {
        release_rx.recv().unwrap();
        // Last handle: teardown runs on this worker.
        drop(inner);
        c.fetch_add(1, Ordering::SeqCst);
        done_tx.send(()).unwrap();
    })
    .unwrap();

    drop(pool);
    release_tx.send(()).unwrap();
    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("task body did not finish");
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // The other worker was joined during teardown; the tearing-down worker
    // exits on its own once its task returns.
    let mut waited = Duration::ZERO;
    while metrics.active_threads.load(Ordering::SeqCst) > 0 {
        assert!(waited < Duration::from_secs(5), "workers did not exit");
        thread::sleep(Duration::from_millis(10));
        waited += Duration::from_millis(10);
    }
    assert_eq!(metrics.completed_tasks.load(Ordering::SeqCst), 1);
}
