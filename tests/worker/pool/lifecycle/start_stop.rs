use super::*;

/// Tests that a freshly constructed pool can be started and stopped.
///
/// Expected: `start()` followed by `stop()` completes without hanging.
#[tokio::test]
async fn starts_and_stops_successfully() {
    let TestPool { pool, .. } = started_pool(2).await;
    pool.stop(true).await;
}

/// Tests that calling `start()` twice does not spawn a second set of workers.
///
/// Expected: active/pending counters behave the same as a single start.
#[tokio::test]
async fn start_is_idempotent() {
    let TestPool { pool, .. } = started_pool(2).await;

    pool.start().await;
    assert_eq!(pool.get_pending_tasks().await, 0);

    pool.stop(true).await;
}

/// Tests that calling `stop()` twice does not panic or hang.
///
/// Expected: the second stop is a no-op.
#[tokio::test]
async fn stop_is_idempotent() {
    let TestPool { pool, .. } = started_pool(1).await;

    pool.stop(true).await;
    pool.stop(true).await;
}

/// Tests that `stop()` before any `start()` is a safe no-op.
///
/// Expected: no panic, no hang.
#[tokio::test]
async fn stop_without_start_is_safe() {
    let TestPool { pool, .. } = started_pool(1).await;
    pool.stop(true).await;
    // A pool that was never started at all:
    let bare = injectd::Pool::new(
        test_config(1),
        std::sync::Arc::new(injectd::NullEventSink),
    );
    bare.stop(true).await;
}

/// Tests that a pool can go through multiple start/stop cycles.
///
/// Expected: `start(); stop(); start(); stop();` is safe and leaks nothing.
#[tokio::test]
async fn can_restart_after_stop() {
    let TestPool { pool, .. } = started_pool(1).await;

    pool.stop(true).await;
    pool.start().await;
    pool.submit(task("echo hi", 0.0, false)).await;

    // Give the restarted worker a moment to pick the task back up.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    pool.stop(true).await;
}

/// Tests that submitting before `start()` is a logged no-op rather than a panic.
///
/// Expected: the task never reaches the queue.
#[tokio::test]
async fn submit_before_start_is_a_noop() {
    let pool = injectd::Pool::new(
        test_config(1),
        std::sync::Arc::new(injectd::NullEventSink),
    );

    pool.submit(task("echo hi", 0.0, false)).await;
    assert_eq!(pool.get_pending_tasks().await, 0);
}
