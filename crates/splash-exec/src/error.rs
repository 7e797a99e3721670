use std::{io, path::PathBuf};

use thiserror::Error;

use crate::runner::StopReason;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid run request: {0}")]
    InvalidRequest(String),

    #[error("invalid runner configuration: {0}")]
    InvalidRunnerConfig(String),

    #[error("working directory not found: {}", .0.display())]
    WorkDirNotFound(PathBuf),

    #[error("script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("cannot mark {} executable: {source}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("process exited with non-zero code: {code}")]
    NonZeroExit { code: i32 },

    #[error("process terminated by signal")]
    Signaled,

    #[error("process {reason}")]
    Terminated { reason: StopReason },

    #[error("external tool '{tool}' is unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ExecError {
    /// Missing script, working directory, or executable.
    pub fn is_not_found(&self) -> bool {
        match self {
            ExecError::WorkDirNotFound(_) | ExecError::ScriptNotFound(_) => true,
            ExecError::Launch { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_paths_and_missing_programs() {
        assert!(ExecError::ScriptNotFound("/x/Allrun".into()).is_not_found());
        assert!(ExecError::WorkDirNotFound("/x".into()).is_not_found());
        assert!(
            ExecError::Launch {
                program: "nope".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .is_not_found()
        );
        assert!(!ExecError::NonZeroExit { code: 1 }.is_not_found());
    }

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            ExecError::NonZeroExit { code: 3 }.to_string(),
            "process exited with non-zero code: 3"
        );
        assert_eq!(
            ExecError::Terminated { reason: StopReason::TimedOut }.to_string(),
            "process timed out"
        );
    }
}
