use super::*;

/// Tests that `len()` reflects pending (not yet popped) tasks only.
///
/// Expected: length increases on submit, decreases on pop.
#[tokio::test]
async fn len_reflects_pending_tasks() {
    let queue = test_queue();
    assert_eq!(queue.len().await, 0);

    queue.submit(task("echo a", 0.0, false)).await;
    queue.submit(task("echo b", 0.0, false)).await;
    assert_eq!(queue.len().await, 2);

    queue.pop().await;
    assert_eq!(queue.len().await, 1);
}
