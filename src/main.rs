use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use injectd::{BroadcastEventSink, Event, Pool, PoolConfig, Task};
use tracing_subscriber::EnvFilter;

/// Standalone runner for the injectd execution pool.
///
/// There is no network listener here: submitting tasks and receiving events over the
/// wire is a controller-side concern out of scope for this core. This binary exists to
/// run the pool against a local task batch for manual testing.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Optional JSON file containing an array of tasks to submit at startup.
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Pool size, overriding `INJECTD_MAX_REQUESTS`.
    #[arg(long)]
    max_requests: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), injectd::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = PoolConfig::from_env()?;
    if let Some(max_requests) = cli.max_requests {
        config = PoolConfig::new(max_requests);
    }

    let sink = Arc::new(BroadcastEventSink::new(256));
    log_events(sink.clone());

    let wall_now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs_f64();

    let pool = Pool::new(config, sink);
    pool.reset_session(0.0, wall_now).await;
    pool.start().await;

    if let Some(path) = cli.tasks {
        let bytes = std::fs::read(&path)?;
        let tasks: Vec<Task> = serde_json::from_slice(&bytes).map_err(std::io::Error::from)?;
        tracing::info!(count = tasks.len(), path = %path.display(), "submitting tasks");
        for task in tasks {
            pool.submit(task).await;
        }
    }

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to install SIGTERM handler");
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.expect("failed to listen for ctrl-c");
            tracing::info!("SIGINT received");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received");
        }
    }

    pool.stop(true).await;
    Ok(())
}

/// Spawns a background task that just logs every emitted event, so a standalone run has
/// visible output even with no real controller attached.
fn log_events(sink: Arc<BroadcastEventSink>) {
    let mut rx = sink.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                Event::Start { task, timestamp } => {
                    tracing::info!(task = %task.args, timestamp, "start")
                }
                Event::Restart {
                    task,
                    timestamp,
                    prior_exit_code,
                } => {
                    tracing::info!(task = %task.args, timestamp, ?prior_exit_code, "restart")
                }
                Event::End { task, timestamp, .. } => {
                    tracing::info!(task = %task.args, timestamp, "end")
                }
                Event::Error {
                    task,
                    timestamp,
                    exit_code,
                    ..
                } => {
                    tracing::error!(task = %task.args, timestamp, exit_code, "error")
                }
            }
        }
    });
}
