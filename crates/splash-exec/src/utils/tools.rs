//! Third-party programs that are started but not supervised: CAD/mesh viewers
//! and the plotting tool.
use std::{
    ffi::OsStr,
    io,
    path::Path,
    process::{Command as StdCommand, Stdio},
};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::ExecError;

/// Check that `program` is installed by running it with `args` (e.g. `--version`).
///
/// Any failure to start, or a non-zero exit, yields [`ExecError::ToolUnavailable`].
pub async fn probe_tool(program: &str, args: &[&str]) -> Result<(), ExecError> {
    let unavailable = |reason: String| ExecError::ToolUnavailable {
        tool: program.to_string(),
        reason,
    };

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    if status.success() {
        trace!(tool = program, "tool probe succeeded");
        Ok(())
    } else {
        Err(unavailable(format!("probe exited with {status}")))
    }
}

/// Start `program` in its own process group and return its pid without waiting.
///
/// A missing program is reported as [`ExecError::ToolUnavailable`]. The child
/// is reaped by a background thread once it exits.
pub fn spawn_detached<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Result<u32, ExecError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = StdCommand::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Ctrl-C in the launching terminal must not close the viewer.
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ExecError::ToolUnavailable {
            tool: program.to_string(),
            reason: "not installed or not in PATH".into(),
        },
        _ => ExecError::Launch {
            program: program.to_string(),
            source,
        },
    })?;

    let pid = child.id();
    debug!(tool = program, pid, "detached tool started");
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(pid)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_succeeds_for_installed_tool() {
        probe_tool("sh", &["-c", "exit 0"]).await.unwrap();
    }

    #[tokio::test]
    async fn probe_reports_missing_tool() {
        let err = probe_tool("splash-no-such-plotter", &["--version"]).await.unwrap_err();
        assert!(matches!(err, ExecError::ToolUnavailable { ref tool, .. } if tool == "splash-no-such-plotter"));
    }

    #[tokio::test]
    async fn probe_reports_failing_tool() {
        let err = probe_tool("sh", &["-c", "exit 2"]).await.unwrap_err();
        assert!(matches!(err, ExecError::ToolUnavailable { .. }));
    }

    #[test]
    fn detached_spawn_returns_pid() {
        let pid = spawn_detached("sh", ["-c", "exit 0"], None).unwrap();
        assert!(pid > 0);
    }

    #[test]
    fn detached_spawn_of_missing_viewer_is_unavailable() {
        let err = spawn_detached("splash-no-such-viewer", ["CAD.stl"], None).unwrap_err();
        assert!(matches!(err, ExecError::ToolUnavailable { .. }));
    }
}
