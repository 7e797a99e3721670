//! Job admission: at most one job per slot.
//!
//! A second request for a busy slot is refused with
//! [`CoreError::JobRunning`]; nothing is queued and the running job is left
//! alone.
use std::{
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use splash_exec::{Canceller, ExitStatus, LineSink, RunHandle, RunId, drain_into};
use tracing::{debug, info, warn};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Mesh,
    Simulation,
    Command,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobKind::Mesh => "mesh",
            JobKind::Simulation => "simulation",
            JobKind::Command => "command",
        })
    }
}

/// A slot that admits one job at a time.
#[derive(Debug, Clone, Default)]
pub struct JobSlot {
    active: Arc<Mutex<Option<JobKind>>>,
}

impl JobSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `kind`; the claim lasts as long as the guard.
    pub fn try_acquire(&self, kind: JobKind) -> Result<JobGuard, CoreError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = *active {
            debug!(running = %running, requested = %kind, "slot busy; request refused");
            return Err(CoreError::JobRunning(running));
        }
        *active = Some(kind);
        Ok(JobGuard {
            slot: Arc::clone(&self.active),
            kind,
        })
    }

    /// Kind of the job holding the slot, if any.
    pub fn active(&self) -> Option<JobKind> {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases its slot on drop.
#[derive(Debug)]
pub struct JobGuard {
    slot: Arc<Mutex<Option<JobKind>>>,
    kind: JobKind,
}

impl JobGuard {
    pub fn kind(&self) -> JobKind {
        self.kind
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// A launched process plus the slot it occupies.
#[derive(Debug)]
pub struct Job {
    kind: JobKind,
    handle: RunHandle,
    guard: JobGuard,
    touch_on_finish: Option<PathBuf>,
}

impl Job {
    pub(crate) fn new(handle: RunHandle, guard: JobGuard) -> Self {
        Self {
            kind: guard.kind(),
            handle,
            guard,
            touch_on_finish: None,
        }
    }

    /// Bump the mtime of `path` once the process has finished.
    pub(crate) fn touch_on_finish(mut self, path: PathBuf) -> Self {
        self.touch_on_finish = Some(path);
        self
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn id(&self) -> RunId {
        self.handle.id()
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.pid()
    }

    /// Stops the process group from another task while [`Job::drive`] runs.
    pub fn canceller(&self) -> Canceller {
        self.handle.canceller()
    }

    /// Stream every output line into `sink`, then wait for the exit status.
    ///
    /// The slot is released before returning, whatever the outcome. Anything
    /// but a clean exit becomes an error.
    pub async fn drive<S>(mut self, sink: &mut S) -> Result<ExitStatus, CoreError>
    where
        S: LineSink + ?Sized,
    {
        let id = self.handle.id();
        let lines = match self.handle.take_output() {
            Some(mut output) => drain_into(&mut output, sink).await,
            None => 0,
        };
        let status = self.handle.wait().await;

        if let Some(path) = &self.touch_on_finish {
            if let Err(e) = splash_props::touch(path) {
                warn!(run = %id, path = ?path, error = %e, "could not touch file after run");
            }
        }
        drop(self.guard);

        let status = status?;
        info!(run = %id, kind = %self.kind, lines, status = %status, "job finished");
        Ok(status.check()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused_until_release() {
        let slot = JobSlot::new();
        let guard = slot.try_acquire(JobKind::Simulation).unwrap();
        assert_eq!(slot.active(), Some(JobKind::Simulation));

        let err = slot.try_acquire(JobKind::Mesh).unwrap_err();
        assert!(matches!(err, CoreError::JobRunning(JobKind::Simulation)));

        drop(guard);
        assert_eq!(slot.active(), None);
        assert!(slot.try_acquire(JobKind::Mesh).is_ok());
    }

    #[test]
    fn clones_share_the_slot() {
        let slot = JobSlot::new();
        let other = slot.clone();
        let _guard = slot.try_acquire(JobKind::Command).unwrap();
        assert!(other.try_acquire(JobKind::Command).is_err());
    }

    #[test]
    fn kind_display() {
        assert_eq!(JobKind::Mesh.to_string(), "mesh");
        assert_eq!(
            CoreError::JobRunning(JobKind::Simulation).to_string(),
            "a simulation job is already running"
        );
    }
}
