//! Launching external processes and streaming their output.
mod handle;
pub use handle::{Canceller, ExitStatus, RunHandle, RunId, RunState, StopReason};

mod output;
pub use output::{LineSink, OutputStream, drain_into};

use std::{
    io::PipeReader,
    path::PathBuf,
    process::Stdio,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use splash_model::RunRequest;
use tokio::{
    process::{Child, Command},
    sync::{mpsc, watch},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{ExecError, LogConfig, utils};

/// Tunables shared by every process a [`CommandRunner`] launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Lines buffered between the reader worker and the consumer.
    pub channel_capacity: usize,
    /// Time between SIGTERM and SIGKILL when a process group is cancelled.
    pub kill_grace_ms: u64,
    /// Output line handling.
    pub log: LogConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            kill_grace_ms: 5_000,
            log: LogConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.channel_capacity == 0 {
            return Err(ExecError::InvalidRunnerConfig(
                "channel_capacity cannot be zero".into(),
            ));
        }
        if self.log.max_line_length == 0 {
            return Err(ExecError::InvalidRunnerConfig(
                "log.max_line_length cannot be zero".into(),
            ));
        }
        Ok(())
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

/// Launches external processes described by [`RunRequest`].
///
/// The runner does not serialize launches; callers that need "one job at a
/// time" enforce it themselves.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    config: RunnerConfig,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunnerConfig) -> Result<Self, ExecError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Start `req` and return a handle to the running process.
    ///
    /// Checks, in order: request validity, working directory, script presence,
    /// execute permission. Nothing is spawned when any of them fails.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn launch(&self, req: &RunRequest) -> Result<RunHandle, ExecError> {
        req.validate()
            .map_err(|e| ExecError::InvalidRequest(e.to_string()))?;

        if !req.cwd.is_dir() {
            return Err(ExecError::WorkDirNotFound(req.cwd.clone()));
        }
        let program = match req.script_path() {
            Some(script) => Some(self.prepare_script(script, req.mark_executable)?),
            None => None,
        };

        let id = RunId::next();
        trace!(
            run = %id,
            program = %req.program,
            args = ?req.args,
            cwd = ?req.cwd,
            "spawning process",
        );

        // stdout and stderr share one pipe so lines keep their emission order.
        let (reader, writer) = std::io::pipe()?;
        let mut cmd = match &program {
            Some(path) => Command::new(path),
            None => Command::new(&req.program),
        };
        cmd.args(&req.args)
            .current_dir(&req.cwd)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|source| ExecError::Launch {
            program: req.program.clone(),
            source,
        })?;
        // Release the parent's copies of the write end, otherwise the reader never sees EOF.
        drop(cmd);

        let pid = child.id();
        let cancel = CancellationToken::new();
        let (line_tx, line_rx) = mpsc::channel(self.config.channel_capacity);
        let (state_tx, state_rx) = watch::channel(RunState::Running);

        spawn_reader(id, reader, line_tx, cancel.clone(), self.config.log);
        tokio::spawn(watch_exit(
            id,
            child,
            pid,
            req.timeout,
            self.config.kill_grace(),
            cancel.clone(),
            state_tx,
        ));

        debug!(run = %id, pid = ?pid, program = %req.program, "process launched");
        Ok(RunHandle::new(
            id,
            pid,
            OutputStream::new(id, line_rx, cancel.clone()),
            state_rx,
            cancel,
        ))
    }

    fn prepare_script(&self, script: PathBuf, mark_executable: bool) -> Result<PathBuf, ExecError> {
        if !script.is_file() {
            return Err(ExecError::ScriptNotFound(script));
        }
        if mark_executable {
            utils::ensure_executable(&script)?;
        }
        // Absolute, so the program does not depend on how `current_dir` is applied.
        Ok(std::fs::canonicalize(&script)?)
    }
}

/// Blocking worker: pipe -> bounded channel, one line at a time.
fn spawn_reader(
    id: RunId,
    reader: PipeReader,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
    log: LogConfig,
) {
    tokio::task::spawn_blocking(move || {
        use std::io::BufRead;

        let mut reader = std::io::BufReader::new(reader);
        let mut raw = Vec::new();
        let mut forward = true;
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(run = %id, "output read failed: {e}");
                    break;
                }
            }
            if cancel.is_cancelled() {
                trace!(run = %id, "cancelled; dropping remaining output");
                break;
            }
            if !forward {
                continue;
            }
            let line = log.clip(&raw);
            if log.echo {
                tracing::info!(run = %id, "{line}");
            } else {
                trace!(run = %id, "{line}");
            }
            // Keep draining after the consumer goes away so the child never blocks on a full pipe.
            if tx.blocking_send(line).is_err() {
                trace!(run = %id, "output consumer dropped");
                forward = false;
            }
        }
        trace!(run = %id, "output stream closed");
    });
}

/// Waiter task: resolves the run state once the process exits or is stopped.
async fn watch_exit(
    id: RunId,
    mut child: Child,
    pid: Option<u32>,
    timeout: Option<Duration>,
    grace: Duration,
    cancel: CancellationToken,
    state: watch::Sender<RunState>,
) {
    let deadline = async {
        match timeout {
            Some(t) => tokio::time::sleep(t).await,
            None => std::future::pending().await,
        }
    };

    let stop = tokio::select! {
        res = child.wait() => {
            let code = match res {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(run = %id, "wait failed: {e}");
                    None
                }
            };
            debug!(run = %id, code = ?code, "process exited");
            state.send_replace(RunState::Completed { code });
            return;
        }
        _ = cancel.cancelled() => StopReason::Cancelled,
        _ = deadline => StopReason::TimedOut,
    };

    debug!(run = %id, reason = %stop, "stopping process group");
    // The reader and the output stream share this token, so nothing is delivered past this point.
    cancel.cancel();
    terminate(id, &mut child, pid, grace).await;
    state.send_replace(RunState::Terminated { reason: stop });
}

/// SIGTERM to the group, then SIGKILL to the whole group once the leader has
/// exited or `grace` has elapsed. Members that ignore SIGTERM would otherwise
/// keep the output pipe open.
async fn terminate(id: RunId, child: &mut Child, pid: Option<u32>, grace: Duration) {
    #[cfg(unix)]
    if let Some(pgid) = pid {
        if let Err(e) = utils::signal_group(pgid, libc::SIGTERM) {
            debug!(run = %id, "SIGTERM to process group failed: {e}");
        }
        if tokio::time::timeout(grace, child.wait()).await.is_err() {
            debug!(run = %id, "grace period elapsed");
        }
        // The group outlives its leader until every member is gone.
        if let Err(e) = utils::signal_group(pgid, libc::SIGKILL) {
            debug!(run = %id, "SIGKILL to process group failed: {e}");
        }
    }
    #[cfg(not(unix))]
    let _ = (pid, grace);

    if matches!(child.try_wait(), Ok(Some(_))) {
        return;
    }
    if let Err(e) = child.kill().await {
        debug!(run = %id, "failed to kill process: {e}");
    }
}
