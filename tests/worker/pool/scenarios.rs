//! End-to-end scenarios S1-S6 from spec §8, driven against a real [`injectd::Pool`].

use super::*;

/// S1 - simple benchmark: one worker, task due immediately, no duration limit.
///
/// Expected: exactly `start` then `end` with captured output `"hi\n"`.
#[tokio::test]
async fn s1_simple_benchmark() {
    let TestPool { pool, mut rx } = started_pool(1).await;

    pool.submit(task("echo hi", 0.0, false)).await;

    let start = rx.recv().await.expect("start event");
    assert!(matches!(start, injectd::Event::Start { .. }));

    let end = rx.recv().await.expect("end event");
    match end {
        injectd::Event::End { output, .. } => assert_eq!(output.as_deref(), Some("hi\n")),
        other => panic!("expected End, got {other:?}"),
    }

    pool.stop(true).await;
}

/// S2 - fault with duration: killed at its deadline, reported as success, output
/// suppressed by the fault policy.
///
/// Expected: `start`, then `end` with code 0 roughly at the duration mark.
#[tokio::test]
async fn s2_fault_with_duration() {
    let TestPool { pool, mut rx } = started_pool(1).await;

    pool.submit(task("sleep 10", 1.0, true)).await;

    let _start = rx.recv().await.expect("start event");
    let end = tokio::time::timeout(std::time::Duration::from_secs(3), rx.recv())
        .await
        .expect("end event within the duration+slack window")
        .unwrap();
    match end {
        injectd::Event::End { output, .. } => assert_eq!(output, None),
        other => panic!("expected End, got {other:?}"),
    }

    pool.stop(true).await;
}

/// S3 - early exit with retry: a task that exits immediately is respawned until its
/// duration budget runs out.
///
/// Expected: `start`, at least one `restart`, then a terminal event.
#[tokio::test]
async fn s3_early_exit_with_retry() {
    let mut config = test_config(1);
    config.retry_tasks = true;
    config.retry_on_error = true;
    let TestPool { pool, mut rx } = started_pool_with_config(config).await;

    pool.submit(task("true", 1.0, false)).await;

    let start = rx.recv().await.expect("start event");
    assert!(matches!(start, injectd::Event::Start { .. }));

    let mut saw_restart = false;
    loop {
        let event = tokio::time::timeout(std::time::Duration::from_secs(3), rx.recv())
            .await
            .expect("terminal event within budget")
            .unwrap();
        match event {
            injectd::Event::Restart { .. } => saw_restart = true,
            injectd::Event::End { .. } | injectd::Event::Error { .. } => break,
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert!(saw_restart, "expected at least one restart leg");

    pool.stop(true).await;
}

/// S4 - early exit without retry: the same early-exiting task finishes promptly when
/// retries are disabled.
///
/// Expected: `start` then `end` with code 0, well before the duration budget elapses.
#[tokio::test]
async fn s4_early_exit_without_retry() {
    let mut config = test_config(1);
    config.retry_tasks = false;
    let TestPool { pool, mut rx } = started_pool_with_config(config).await;

    pool.submit(task("true", 5.0, false)).await;

    let _start = rx.recv().await.expect("start event");
    let end = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
        .await
        .expect("end event well before the 5s duration budget")
        .unwrap();
    assert!(matches!(end, injectd::Event::End { .. }));

    pool.stop(true).await;
}

/// S5 - expired-skip: the session origin is set far enough in the past that a
/// `timestamp=0` task is already expired at dequeue.
///
/// Expected: exactly one `error(-1)` event, no process spawned.
#[tokio::test]
async fn s5_expired_skip() {
    let TestPool { pool, mut rx } = started_pool(1).await;
    pool.reset_session(0.0, wall_now() - 100.0).await;

    pool.submit(task("echo hi", 0.0, false)).await;

    let event = rx.recv().await.expect("error event");
    match event {
        injectd::Event::Error { exit_code, output, .. } => {
            assert_eq!(exit_code, -1);
            assert_eq!(output, None);
        }
        other => panic!("expected Error, got {other:?}"),
    }
    assert_eq!(pool.active_tasks().await, 0);

    pool.stop(true).await;
}

/// S6 - shutdown mid-task: a long-running task is killed by `stop(kill_abruptly=true)`
/// while it is being supervised.
///
/// Expected: `stop()` returns within the shutdown timeout and no child remains running.
/// The spec allows suppressing the terminal event entirely in this case.
#[tokio::test]
async fn s6_shutdown_mid_task() {
    let TestPool { pool, .. } = started_pool(1).await;

    pool.submit(task("sleep 30", 60.0, false)).await;
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(pool.active_tasks().await, 1, "task should be running by now");

    let result = tokio::time::timeout(std::time::Duration::from_secs(3), pool.stop(true)).await;
    assert!(result.is_ok(), "stop() should not hang on a supervised task");
    assert_eq!(pool.active_tasks().await, 0);
}
