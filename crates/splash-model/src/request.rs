use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{ModelError, ModelResult};

/// Description of one external process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Program to execute: a bare name resolved via `PATH` (`"sh"`) or a path
    /// relative to `cwd` (`"./Allrun"`).
    pub program: String,
    /// Command-line arguments.
    pub args: Vec<String>,
    /// Working directory of the process. Must exist.
    pub cwd: PathBuf,
    /// Kill the process group once this much time has passed. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Add execute permission to the program file before launching.
    pub mark_executable: bool,
}

impl RunRequest {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            timeout: None,
            mark_executable: false,
        }
    }

    /// Run a script that lives in `cwd`, e.g. `Allrun`.
    pub fn script(cwd: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            mark_executable: true,
            ..Self::new(format!("./{name}"), cwd)
        }
    }

    /// Run a user-entered command line through `shell -c`.
    pub fn shell(cwd: impl Into<PathBuf>, shell: &str, line: &str) -> Self {
        Self::new(shell, cwd).with_args(["-c", line])
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolved path of the program when it names a file rather than a `PATH` lookup.
    pub fn script_path(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 || program.is_absolute() {
            Some(self.cwd.join(program))
        } else {
            None
        }
    }

    /// Rules:
    /// - `program` is not empty or whitespace-only;
    /// - `timeout`, when set, is not zero.
    pub fn validate(&self) -> ModelResult<()> {
        if self.program.trim().is_empty() {
            return Err(ModelError::Invalid("run request program is empty".into()));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ModelError::Invalid("run request timeout cannot be zero".into()));
        }
        Ok(())
    }
}

impl fmt::Display for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RunRequest(program='{}', args={}, cwd={:?}, timeout={:?})",
            self.program,
            self.args.len(),
            self.cwd,
            self.timeout,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use super::RunRequest;

    #[test]
    fn script_requests_are_relative_and_marked_executable() {
        let req = RunRequest::script("/cases/pipe", "Allrun");
        assert_eq!(req.program, "./Allrun");
        assert!(req.mark_executable);
        assert_eq!(req.script_path(), Some(PathBuf::from("/cases/pipe/./Allrun")));
    }

    #[test]
    fn bare_program_names_are_looked_up_on_path() {
        let req = RunRequest::new("xmgrace", "/tmp");
        assert_eq!(req.script_path(), None);
        assert!(!req.mark_executable);
    }

    #[test]
    fn shell_wraps_line_in_dash_c() {
        let req = RunRequest::shell("/tmp", "sh", "echo hi; ls");
        assert_eq!(req.program, "sh");
        assert_eq!(req.args, vec!["-c".to_string(), "echo hi; ls".to_string()]);
    }

    #[test]
    fn validate_rejects_blank_program_and_zero_timeout() {
        assert!(RunRequest::new("  ", "/tmp").validate().is_err());
        assert!(
            RunRequest::new("ls", "/tmp")
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            RunRequest::new("ls", "/tmp")
                .with_timeout(Duration::from_secs(1))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn display_is_compact() {
        let req = RunRequest::new("ls", "/tmp").with_args(["-l", "-a"]);
        assert_eq!(
            req.to_string(),
            r#"RunRequest(program='ls', args=2, cwd="/tmp", timeout=None)"#
        );
    }
}
