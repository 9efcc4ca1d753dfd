use super::*;

/// Tests that `submit` never blocks, even when called many times with no consumer.
///
/// Expected: all submissions complete and are reflected in the queue length.
#[tokio::test]
async fn submit_never_blocks() {
    let queue = test_queue();

    for i in 0..50 {
        queue.submit(task(&format!("echo {i}"), 0.0, false)).await;
    }

    assert_eq!(queue.len().await, 50);
}
