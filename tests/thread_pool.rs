use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_utils::sync::WaitGroup;
use hkpool::{PoolError, SharedQueueThreadPool, TaskError, MAX_WORKERS};

const TASK_NUM: usize = 1000;

/// Panic payload for tasks that are expected to panic.
struct ExpectedPanic;

#[test]
fn valid_sizes_start_every_worker() {
    for threads in [1, 2, 7, MAX_WORKERS] {
        let pool = SharedQueueThreadPool::new(threads).unwrap();
        assert_eq!(pool.threads(), threads);
        assert_eq!(pool.live_workers(), threads as usize);

        let handle = pool.submit(|| ()).unwrap();
        handle.join().unwrap();
    }
}

#[test]
fn invalid_sizes_are_rejected() {
    for threads in [0, MAX_WORKERS + 1, u32::MAX] {
        match SharedQueueThreadPool::new(threads) {
            Err(PoolError::InvalidWorkerCount { requested, max }) => {
                assert_eq!(requested, threads);
                assert_eq!(max, MAX_WORKERS);
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("pool with {threads} threads should not build"),
        }
    }
}

#[test]
fn single_worker_runs_in_submission_order() {
    let pool = SharedQueueThreadPool::new(1).unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));

    // Hold the worker so every task is queued before the first one runs.
    let gate = Arc::new(Barrier::new(2));
    let worker_gate = Arc::clone(&gate);
    let (started_tx, started) = mpsc::channel();
    pool.spawn(move || {
        started_tx.send(()).unwrap();
        worker_gate.wait();
    })
    .unwrap();
    started.recv().unwrap();

    let handles: Vec<_> = (1..=10)
        .map(|i| {
            let order = Arc::clone(&order);
            pool.submit(move || {
                order.lock().unwrap().push(i);
                i
            })
            .unwrap()
        })
        .collect();
    assert_eq!(pool.queued(), 10);
    gate.wait();

    let results: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, (1..=10).collect::<Vec<_>>());
    assert_eq!(*order.lock().unwrap(), (1..=10).collect::<Vec<_>>());
}

#[test]
fn counter_increments_exactly_once_per_task() {
    let pool = SharedQueueThreadPool::new(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let wg = WaitGroup::new();

    for _ in 0..TASK_NUM {
        let counter = Arc::clone(&counter);
        let wg = wg.clone();
        pool.spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(wg);
        })
        .unwrap();
    }

    wg.wait();
    assert_eq!(counter.load(Ordering::SeqCst), TASK_NUM);
}

#[test]
fn failures_stay_with_their_handle() {
    panic_control::chain_hook_ignoring::<ExpectedPanic>();
    let pool = SharedQueueThreadPool::new(2).unwrap();

    let panicked = pool.submit(|| -> u32 { std::panic::panic_any(ExpectedPanic) }).unwrap();
    let failed = pool
        .submit_fallible(|| "forty-two".parse::<u32>())
        .unwrap();

    assert!(matches!(panicked.join(), Err(TaskError::Panicked(_))));
    match failed.join() {
        Err(TaskError::Failed(e)) => assert_eq!(e.to_string(), "invalid digit found in string"),
        other => panic!("expected a failed task, got {other:?}"),
    }

    // Every worker survives: keep both busy at once.
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            pool.submit(move || {
                barrier.wait();
                i * 10
            })
            .unwrap()
        })
        .collect();
    let results: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![0, 10]);
    assert_eq!(pool.live_workers(), 2);
}

#[test]
fn panic_message_is_reported() {
    let pool = SharedQueueThreadPool::new(1).unwrap();
    let handle = pool.submit(|| -> u8 { panic!("task {} blew up", 3) }).unwrap();

    match handle.join() {
        Err(TaskError::Panicked(msg)) => assert_eq!(msg, "task 3 blew up"),
        other => panic!("expected a panic, got {other:?}"),
    }
}

#[test]
fn fire_and_forget_panic_keeps_worker_alive() {
    panic_control::chain_hook_ignoring::<ExpectedPanic>();
    let pool = SharedQueueThreadPool::new(1).unwrap();

    pool.spawn(|| std::panic::panic_any(ExpectedPanic)).unwrap();
    let handle = pool.submit(|| "still running").unwrap();

    assert_eq!(handle.join().unwrap(), "still running");
    assert_eq!(pool.live_workers(), 1);
}

#[test]
fn drop_drains_queued_tasks() {
    const QUEUED: usize = 50;
    let pool = SharedQueueThreadPool::new(2).unwrap();
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..QUEUED {
        let done = Arc::clone(&done);
        pool.spawn(move || {
            thread::sleep(Duration::from_millis(1));
            done.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    drop(pool);
    assert_eq!(done.load(Ordering::SeqCst), QUEUED);
}

#[test]
fn handles_outlive_the_pool() {
    let pool = SharedQueueThreadPool::new(3).unwrap();
    let handles: Vec<_> = (0..20u64).map(|i| pool.submit(move || i * i).unwrap()).collect();
    drop(pool);

    for (i, handle) in handles.into_iter().enumerate() {
        assert!(handle.is_finished());
        assert_eq!(handle.join().unwrap(), (i * i) as u64);
    }
}

#[test]
fn submit_after_shutdown_is_rejected() {
    let mut pool = SharedQueueThreadPool::new(2).unwrap();
    pool.shutdown();

    assert_eq!(pool.live_workers(), 0);
    assert!(matches!(pool.submit(|| 1), Err(PoolError::ShutDown)));
    assert!(matches!(pool.spawn(|| ()), Err(PoolError::ShutDown)));

    // A second shutdown, and the one run by drop, are no-ops.
    pool.shutdown();
}

#[test]
fn concurrent_submitters_each_task_runs_once() {
    const SUBMITTERS: usize = 8;
    const PER_SUBMITTER: usize = 250;

    let pool = Arc::new(SharedQueueThreadPool::new(4).unwrap());
    let (tx, rx) = mpsc::channel();

    let submitters: Vec<_> = (0..SUBMITTERS)
        .map(|s| {
            let pool = Arc::clone(&pool);
            let tx = tx.clone();
            thread::spawn(move || {
                for i in 0..PER_SUBMITTER {
                    let tx = tx.clone();
                    pool.spawn(move || tx.send(s * PER_SUBMITTER + i).unwrap()).unwrap();
                }
            })
        })
        .collect();
    for submitter in submitters {
        submitter.join().unwrap();
    }
    drop(tx);

    let pool = Arc::try_unwrap(pool).ok().expect("submitters have finished");
    drop(pool);

    let mut seen: Vec<usize> = rx.iter().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..SUBMITTERS * PER_SUBMITTER).collect::<Vec<_>>());
}

#[test]
fn join_timeout_waits_for_slow_task() {
    let pool = SharedQueueThreadPool::new(1).unwrap();
    let (release, gate) = mpsc::channel::<()>();
    let handle = pool
        .submit(move || {
            gate.recv().unwrap();
            "released"
        })
        .unwrap();

    let handle = handle
        .join_timeout(Duration::from_millis(20))
        .expect_err("task is still blocked");
    release.send(()).unwrap();

    let outcome = handle
        .join_timeout(Duration::from_secs(5))
        .expect("task was released");
    assert_eq!(outcome.unwrap(), "released");
}

#[test]
fn builder_names_worker_threads() {
    let pool = SharedQueueThreadPool::builder()
        .threads(2)
        .name_prefix("decoder")
        .stack_size(256 * 1024)
        .build()
        .unwrap();

    let name = pool
        .submit(|| thread::current().name().map(str::to_owned))
        .unwrap()
        .join()
        .unwrap()
        .unwrap();
    assert!(name.starts_with("decoder-"), "unexpected name {name}");
}
