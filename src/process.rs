//! Subprocess facility: spawns a child with combined stdout/stderr capture, waits with
//! timeout, and supports out-of-band termination by PID.
//!
//! The child's stdout and stderr are captured on two separate piped streams, each
//! drained by its own background task into a shared buffer, then concatenated at drain
//! time. Reading both streams independently avoids the pipe-buffer deadlock that can
//! occur if stdout and stderr are interleaved onto one native pipe and only one side is
//! read at a time.

use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A spawned child process together with its output-draining tasks.
pub struct ChildProcess {
    child: Child,
    output: std::sync::Arc<Mutex<Vec<u8>>>,
    readers: Vec<JoinHandle<()>>,
}

impl ChildProcess {
    /// Spawns `argv` as a child process. If `shell` is set, `argv` is joined into a
    /// single string and run via `/bin/sh -c`; otherwise `argv[0]` is exec'd directly
    /// with the remaining elements as arguments.
    pub fn spawn(argv: &[String], shell: bool) -> std::io::Result<Self> {
        let mut command = if shell {
            let mut c = Command::new("/bin/sh");
            c.arg("-c").arg(argv.join(" "));
            c
        } else {
            let mut c = Command::new(&argv[0]);
            c.args(&argv[1..]);
            c
        };

        command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn()?;
        let output = std::sync::Arc::new(Mutex::new(Vec::new()));
        let mut readers = Vec::with_capacity(2);

        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(drain_into(stdout, output.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(drain_into(stderr, output.clone())));
        }

        Ok(Self {
            child,
            output,
            readers,
        })
    }

    /// OS process id, if the child hasn't already been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Waits for the child to exit, yielding its exit status.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Non-blocking check for whether the child has already exited.
    pub fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Drains the output buffer, joining the reader tasks first so every byte already
    /// written by the child has been collected.
    pub async fn take_output(self) -> String {
        for reader in self.readers {
            let _ = reader.await;
        }
        let bytes = std::sync::Arc::try_unwrap(self.output)
            .map(|m| m.into_inner())
            .unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

async fn drain_into<R>(mut reader: R, buf: std::sync::Arc<Mutex<Vec<u8>>>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.lock().await.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Sends `SIGTERM` to a process by PID. Used by the pool's forced-shutdown path so a
/// worker's own in-flight `wait()` can observe and reap the exit, instead of racing two
/// tasks over the same `Child`.
pub fn terminate_pid(pid: u32) -> std::io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(std::io::Error::from)
}
