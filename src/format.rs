//! Task command-line shaping and CPU-affinity arbitration (C6).

use crate::error::format::FormatError;
use crate::task::{Task, CORES_ALL};

const SHELL_SCRIPT_SUFFIXES: [&str; 2] = [".sh", ".bash"];

/// `true` if `args` should be run through a shell rather than tokenized and exec'd
/// directly: either it begins with a shebang, or its first token names a path with a
/// recognized shell-script suffix.
pub fn is_shell_script(args: &str) -> bool {
    let trimmed = args.trim_start();
    if trimmed.starts_with("#!") {
        return true;
    }
    let first_token = trimmed.split_whitespace().next().unwrap_or("");
    SHELL_SCRIPT_SUFFIXES
        .iter()
        .any(|suffix| first_token.ends_with(suffix))
}

/// Prepends a CPU-pinning command prefix to `argv`.
pub fn format_numa_command(mut argv: Vec<String>, cores: &str) -> Vec<String> {
    let mut wrapped = vec!["numactl".to_string(), format!("--physcpubind={cores}")];
    wrapped.append(&mut argv);
    wrapped
}

/// Pool-wide affinity policy: one selector per task class.
#[derive(Debug, Clone, Default)]
pub struct AffinityConfig {
    pub fault_cores: Option<String>,
    pub bench_cores: Option<String>,
}

/// Tokenizes a task's command line and applies CPU-affinity arbitration between the
/// pool-wide policy and the task's own request.
pub struct TaskFormatter {
    affinity: AffinityConfig,
}

impl TaskFormatter {
    pub fn new(affinity: AffinityConfig) -> Self {
        Self { affinity }
    }

    /// Returns the argv for `task`, wrapped in a CPU-pinning prefix if a pool policy
    /// applies. Mutates `task.cores` to record the effective selection, which then
    /// appears in downstream events.
    ///
    /// `is_script` must match [`is_shell_script`] for the same `task.args`. Script tasks
    /// are handed to the caller as a single untokenized element, since they are run
    /// through a shell: re-tokenizing with [`shlex`] and rejoining with spaces would
    /// discard the original quoting around any argument containing whitespace.
    pub fn format_task_args(
        &self,
        task: &mut Task,
        is_script: bool,
    ) -> Result<Vec<String>, FormatError> {
        let default_cores = if task.is_fault {
            self.affinity.fault_cores.as_deref()
        } else {
            self.affinity.bench_cores.as_deref()
        };

        // The pool-wide policy always wins, except when it explicitly yields to the
        // task's own request via the "all cores" sentinel.
        let effective_cores = if task.cores.is_some() && default_cores == Some(CORES_ALL) {
            task.cores.clone()
        } else {
            default_cores.map(str::to_string)
        };

        if effective_cores != task.cores && task.cores.is_some() {
            tracing::warn!(
                task = %task.args,
                "NUMA policy for task is overridden by pool-wide policy"
            );
        }
        task.cores = effective_cores;

        if is_script {
            let trimmed = task.args.trim();
            if trimmed.is_empty() {
                return Err(FormatError::EmptyCommand(task.args.clone()));
            }
            let command = match task.cores.as_deref() {
                Some(cores) => format!("numactl --physcpubind={cores} {trimmed}"),
                None => trimmed.to_string(),
            };
            return Ok(vec![command]);
        }

        let mut args = shlex::split(&task.args)
            .ok_or_else(|| FormatError::UnparsableCommand(task.args.clone()))?;
        if args.is_empty() {
            return Err(FormatError::EmptyCommand(task.args.clone()));
        }

        if default_cores.is_some() {
            args = format_numa_command(args, task.cores.as_deref().unwrap_or(""));
        }

        Ok(args)
    }
}
