//! Command runner for the external meshing and solver scripts.
//!
//! A launched process gets its own process group and a single pipe shared by
//! stdout and stderr. A blocking worker reads that pipe line by line and feeds a
//! bounded channel; the caller drains it through [`OutputStream`] while a waiter
//! task watches for exit, cancellation, or the optional deadline.
mod error;
pub use error::ExecError;

mod logger;
pub use logger::LogConfig;

mod runner;
pub use runner::{Canceller, CommandRunner, ExitStatus, RunHandle, RunId, RunState, RunnerConfig, StopReason};
pub use runner::{LineSink, OutputStream, drain_into};

mod utils;
pub use utils::{ensure_executable, probe_tool, spawn_detached};
