use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{ExecError, runner::OutputStream};

static NEXT_RUN: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a launched process, used as the log correlation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    pub(crate) fn next() -> Self {
        Self(NEXT_RUN.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{:04x}", self.0)
    }
}

/// Why a process was stopped before it exited on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    TimedOut,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::Cancelled => "was cancelled",
            StopReason::TimedOut => "timed out",
        })
    }
}

/// Lifecycle of a launched process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Exited on its own. `code` is `None` when an outside signal killed it.
    Completed { code: Option<i32> },
    /// Killed through [`RunHandle::cancel`] or the request timeout.
    Terminated { reason: StopReason },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

/// Final status reported by [`RunHandle::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    code: Option<i32>,
    stop: Option<StopReason>,
}

impl ExitStatus {
    fn from_state(state: RunState) -> Option<Self> {
        match state {
            RunState::Running => None,
            RunState::Completed { code } => Some(Self { code, stop: None }),
            RunState::Terminated { reason } => Some(Self {
                code: None,
                stop: Some(reason),
            }),
        }
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// `true` iff the process exited on its own with code 0.
    pub fn success(&self) -> bool {
        self.stop.is_none() && self.code == Some(0)
    }

    /// Turn anything but a clean exit into an error.
    pub fn check(self) -> Result<Self, ExecError> {
        if let Some(reason) = self.stop {
            return Err(ExecError::Terminated { reason });
        }
        match self.code {
            Some(0) => Ok(self),
            Some(code) => Err(ExecError::NonZeroExit { code }),
            None => Err(ExecError::Signaled),
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stop, self.code) {
            (Some(reason), _) => write!(f, "{reason}"),
            (None, Some(code)) => write!(f, "exit code {code}"),
            (None, None) => f.write_str("killed by signal"),
        }
    }
}

/// Cloneable cancellation capability for a running process.
///
/// Lets one task drain output while another decides to stop the process.
#[derive(Debug, Clone)]
pub struct Canceller {
    token: CancellationToken,
    state: watch::Receiver<RunState>,
}

impl Canceller {
    /// Request termination of the whole process group.
    ///
    /// Idempotent; does nothing once the process has finished.
    pub fn cancel(&self) {
        if self.state.borrow().is_running() {
            self.token.cancel();
        }
    }
}

/// Handle to an in-flight process returned by [`crate::CommandRunner::launch`].
#[derive(Debug)]
pub struct RunHandle {
    id: RunId,
    pid: Option<u32>,
    output: Option<OutputStream>,
    canceller: Canceller,
}

impl RunHandle {
    pub(crate) fn new(
        id: RunId,
        pid: Option<u32>,
        output: OutputStream,
        state: watch::Receiver<RunState>,
        token: CancellationToken,
    ) -> Self {
        Self {
            id,
            pid,
            output: Some(output),
            canceller: Canceller { token, state },
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    /// OS process id (also the process group id on Unix).
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Take the combined output stream. Returns `None` after the first call.
    pub fn take_output(&mut self) -> Option<OutputStream> {
        self.output.take()
    }

    pub fn state(&self) -> RunState {
        *self.canceller.state.borrow()
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// See [`Canceller::cancel`].
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// Suspend until the process has exited or been stopped.
    pub async fn wait(&self) -> Result<ExitStatus, ExecError> {
        let mut state = self.canceller.state.clone();
        let done = state
            .wait_for(|s| !s.is_running())
            .await
            .map_err(|_| ExecError::Internal(format!("{}: exit watcher stopped", self.id)))?;
        ExitStatus::from_state(*done)
            .ok_or_else(|| ExecError::Internal(format!("{}: still running", self.id)))
    }
}
