use super::*;

/// Tests `is_empty()` across a submit/pop cycle.
///
/// Expected: empty before any submission and again after the sole task is popped.
#[tokio::test]
async fn is_empty_tracks_queue_contents() {
    let queue = test_queue();
    assert!(queue.is_empty().await);

    queue.submit(task("echo hi", 0.0, false)).await;
    assert!(!queue.is_empty().await);

    queue.pop().await;
    assert!(queue.is_empty().await);
}
