//! Scheduled executor (C4): the per-task supervision algorithm.
//!
//! Drives one task from its scheduled start through to a terminal event: waits until
//! due (or skips if expired), shapes and spawns the command, supervises it against its
//! duration budget with restart-on-early-exit, and emits the lifecycle events.

use std::time::Duration;

use crate::clock::{wall_now, ClockCorrector};
use crate::config::PoolConfig;
use crate::events::{Event, EventSink};
use crate::format::{is_shell_script, TaskFormatter};
use crate::pool::worker::WorkerUnit;
use crate::task::Task;

/// Runs one task to completion against `worker`, per the procedure in C4.
///
/// `shutdown` is the pool-wide shared sleep condition: a single [`tokio::sync::Notify`]
/// that every waiting worker listens on, so `stop()` can wake every worker blocked in
/// step 2 with one `notify_waiters()` call instead of racing per-worker cancellation.
pub async fn execute_task(
    mut task: Task,
    worker: &WorkerUnit,
    clock: &ClockCorrector,
    formatter: &TaskFormatter,
    sink: &dyn EventSink,
    config: &PoolConfig,
    shutdown: &tokio::sync::Notify,
) {
    // Step 1-2: compute delay, then wait, skip, or proceed.
    let time_to_task = clock.time_to_task(task.timestamp).await;
    if time_to_task > 0.0 {
        // A wake from `shutdown` is a spurious wakeup as far as this task is concerned:
        // we fall through either way and let the spawn step's terminate check decide.
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs_f64(time_to_task)) => {}
            _ = shutdown.notified() => {}
        }
    } else if time_to_task < 0.0 && config.skip_expired {
        tracing::warn!(task = %task.args, "starting time of task expired, skipping");
        let timestamp = clock.to_workload_time(wall_now()).await;
        sink.emit(Event::Error {
            task,
            timestamp,
            exit_code: -1,
            output: None,
        });
        return;
    }

    // Step 3: shape the command.
    let is_script = is_shell_script(&task.args);
    let argv = match formatter.format_task_args(&mut task, is_script) {
        Ok(argv) => argv,
        Err(e) => {
            tracing::error!(task = %task.args, error = %e, "could not format task arguments");
            let timestamp = clock.to_workload_time(wall_now()).await;
            sink.emit(Event::Error {
                task,
                timestamp,
                exit_code: -1,
                output: None,
            });
            return;
        }
    };

    // Step 4: configuration smell warning, log only.
    if task.has_no_duration_limit() && task.is_fault {
        tracing::warn!(task = %task.args, "task is a fault but has undefined duration");
    }

    // Step 5: spawn.
    let task_start_wall = wall_now();
    let mut child = match worker.start_process(&argv, is_script, config.root).await {
        Some(child) => child,
        None => {
            if !worker.has_to_terminate().await {
                tracing::error!(task = %task.args, "error while starting task, check if command is correct");
                let timestamp = clock.to_workload_time(wall_now()).await;
                sink.emit(Event::Error {
                    task,
                    timestamp,
                    exit_code: -1,
                    output: None,
                });
            }
            return;
        }
    };

    // Step 6: emit start, stamped with workload time.
    let start_ts = clock.to_workload_time(task_start_wall).await;
    task.timestamp = start_ts;
    tracing::info!(task = %task.args, "executing new task");
    sink.emit(Event::Start {
        task: task.clone(),
        timestamp: start_ts,
    });

    let mut output = String::new();

    // Step 7: duration supervision loop.
    let exit_code: i32 = if task.has_no_duration_limit() {
        let status = child.wait().await;
        worker.clear_pid().await;
        status.ok().and_then(|s| s.code()).unwrap_or(-1)
    } else {
        let mut remaining = task.duration;
        loop {
            let outcome =
                tokio::time::timeout(Duration::from_secs_f64(remaining.max(0.0)), child.wait())
                    .await;

            match outcome {
                Err(_elapsed) => {
                    // Duration deadline reached: kill and treat as success.
                    worker.force_stop_process().await;
                    let _ = child.wait().await;
                    worker.clear_pid().await;
                    break 0;
                }
                Ok(status_result) => {
                    worker.clear_pid().await;
                    let code = status_result.ok().and_then(|s| s.code()).unwrap_or(-1);
                    remaining = task.duration - (wall_now() - task_start_wall);

                    let restart_allowed = remaining > 0.0
                        && config.retry_tasks
                        && !(code != 0 && !config.retry_on_error);

                    if !restart_allowed {
                        break code;
                    }
                    if code != 0 {
                        tracing::warn!(task = %task.args, "sub-task terminated unexpectedly");
                    }

                    match worker.start_process(&argv, is_script, config.root).await {
                        Some(new_child) => {
                            let finished = std::mem::replace(&mut child, new_child);
                            output.push_str(&finished.take_output().await);

                            let restart_ts = clock.to_workload_time(wall_now()).await;
                            task.timestamp = restart_ts;
                            tracing::info!(task = %task.args, "restarting task");
                            sink.emit(Event::Restart {
                                task: task.clone(),
                                timestamp: restart_ts,
                                prior_exit_code: if code == 0 { None } else { Some(code) },
                            });
                        }
                        // Could not respawn (shutdown in progress, or a spawn error).
                        // Distinct from the prior leg's code so a clean leg followed by
                        // a failed respawn isn't reported as success.
                        None => break -1,
                    }
                }
            }
        }
    };

    // Step 8: collect any remaining output from the final child.
    output.push_str(&child.take_output().await);

    // Step 9: emit the terminal event, unless the pool is shutting down.
    if worker.has_to_terminate().await {
        return;
    }

    let end_ts = clock.to_workload_time(wall_now()).await;
    task.timestamp = end_ts;
    let output = if !config.log_outputs || task.is_fault || output.is_empty() {
        None
    } else {
        Some(output)
    };

    if exit_code != 0 {
        tracing::error!(task = %task.args, exit_code, "task terminated unexpectedly");
        sink.emit(Event::Error {
            task,
            timestamp: end_ts,
            exit_code,
            output,
        });
    } else {
        tracing::info!(task = %task.args, "task terminated normally");
        sink.emit(Event::End {
            task,
            timestamp: end_ts,
            output,
        });
    }
}
