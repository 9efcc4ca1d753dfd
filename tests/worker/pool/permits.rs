use super::*;

/// Tests invariant 6 from spec §8: `active_tasks() + get_pending_tasks()` never exceeds
/// the number of submitted-but-not-yet-terminal tasks, bounded by pool size plus queue
/// depth.
///
/// Expected: with a single worker and three queued long-running tasks, at most one is
/// active at a time while the rest sit pending.
#[tokio::test]
async fn single_worker_runs_one_task_at_a_time() {
    let TestPool { pool, .. } = started_pool(1).await;

    pool.submit(task("sleep 1", 5.0, false)).await;
    pool.submit(task("sleep 1", 5.0, false)).await;
    pool.submit(task("sleep 1", 5.0, false)).await;

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let active = pool.active_tasks().await;
    let pending = pool.get_pending_tasks().await;
    assert_eq!(active, 1, "exactly one worker should be busy");
    assert_eq!(pending, 2, "the rest should still be queued");

    pool.stop(true).await;
}

/// Tests that a wider pool drains its queue in parallel.
///
/// Expected: with two workers and two short tasks, both run concurrently and the queue
/// empties without serialization.
#[tokio::test]
async fn wider_pool_runs_tasks_concurrently() {
    let TestPool { pool, mut rx } = started_pool(2).await;

    pool.submit(task("echo a", 0.0, false)).await;
    pool.submit(task("echo b", 0.0, false)).await;

    for _ in 0..4 {
        rx.recv().await.expect("expected start/end for both tasks");
    }
    assert_eq!(pool.get_pending_tasks().await, 0);
    assert_eq!(pool.active_tasks().await, 0);

    pool.stop(true).await;
}

/// Tests that `stop()` releases one shutdown token per worker, waking every worker
/// blocked on the queue semaphore within one signal cycle.
///
/// Expected: stop() returns promptly even with idle workers waiting on an empty queue.
#[tokio::test]
async fn stop_wakes_idle_workers_waiting_on_the_queue() {
    let TestPool { pool, .. } = started_pool(4).await;

    let result = tokio::time::timeout(std::time::Duration::from_secs(3), pool.stop(true)).await;
    assert!(result.is_ok(), "stop() should not hang with idle workers");
}
