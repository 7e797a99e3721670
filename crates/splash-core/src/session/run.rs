use splash_exec::{probe_tool, spawn_detached};
use splash_model::{ModelError, RunRequest};
use splash_props::{PropsError, read_text, request_stop, restore_end_time};
use tracing::{info, warn};

use crate::{
    error::CoreError,
    job::{Job, JobKind},
    session::CaseSession,
};

impl CaseSession {
    /// Launch the case's run script.
    ///
    /// A `writeNow` left over from an earlier stop is turned back into
    /// `endTime` first, and the control dictionary is touched once the run
    /// ends.
    pub fn start_simulation(&self) -> Result<Job, CoreError> {
        let case = self.require_case()?;
        let guard = self.solver.try_acquire(JobKind::Simulation)?;

        let control = case.join(&self.config.control_dict);
        match restore_end_time(&control) {
            Ok(0) => {}
            Ok(count) => info!(path = ?control, count, "stop sentinel cleared"),
            Err(PropsError::NotFound(path)) => {
                warn!(path = ?path, "control dictionary not found; starting anyway")
            }
            Err(e) => return Err(e.into()),
        }

        let handle = self
            .runner
            .launch(&RunRequest::script(case, &self.config.run_script))?;
        info!(run = %handle.id(), case = ?case, "simulation started");
        Ok(Job::new(handle, guard).touch_on_finish(control))
    }

    /// Ask a running solver to write its current state and stop.
    ///
    /// Works through the control dictionary, so it also reaches a solver
    /// started outside this session. Returns `false` when there was no
    /// `endTime` left to replace.
    pub fn stop_simulation(&self) -> Result<bool, CoreError> {
        let control = self.require_case()?.join(&self.config.control_dict);
        Ok(request_stop(&control)?)
    }

    /// Run `line` through the configured shell, in the case directory when
    /// one is selected and the current directory otherwise.
    pub fn execute_command(&self, line: &str) -> Result<Job, CoreError> {
        if line.trim().is_empty() {
            return Err(ModelError::Invalid("command line is empty".into()).into());
        }
        let cwd = match self.case_dir() {
            Some(case) => case.to_path_buf(),
            None => std::env::current_dir().map_err(|e| CoreError::io(".", e))?,
        };
        let guard = self.command.try_acquire(JobKind::Command)?;
        let handle = self
            .runner
            .launch(&RunRequest::shell(cwd, &self.config.tools.shell, line))?;
        info!(run = %handle.id(), command = line, "command started");
        Ok(Job::new(handle, guard))
    }

    /// Start the plotting tool in the case directory after checking that it
    /// is installed.
    pub async fn plot_results(&self) -> Result<u32, CoreError> {
        let plot = &self.config.tools.plot;
        probe_tool(plot, &["--version"]).await?;
        Ok(spawn_detached(plot, std::iter::empty::<&str>(), self.case_dir())?)
    }

    /// Contents of the solver log.
    pub fn read_log(&self) -> Result<String, CoreError> {
        let path = self.require_case()?.join(&self.config.log_file);
        Ok(read_text(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path, time::Duration};

    use splash_exec::{ExecError, StopReason};

    use super::*;
    use crate::config::SessionConfig;

    fn case() -> (tempfile::TempDir, CaseSession) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("system")).unwrap();
        let mut session = CaseSession::new(SessionConfig::default()).unwrap();
        session.select_case(dir.path()).unwrap();
        (dir, session)
    }

    fn write_control(dir: &Path, body: &str) {
        fs::write(dir.join("system/controlDict"), body).unwrap();
    }

    #[test]
    fn stop_writes_the_sentinel_once() {
        let (dir, session) = case();
        write_control(dir.path(), "stopAt endTime;\nendTime 1;\n");

        assert!(session.stop_simulation().unwrap());
        assert_eq!(
            fs::read_to_string(dir.path().join("system/controlDict")).unwrap(),
            "stopAt writeNow;\nendTime 1;\n"
        );
    }

    #[test]
    fn stop_without_case_or_control_dict_fails() {
        let session = CaseSession::new(SessionConfig::default()).unwrap();
        assert!(matches!(session.stop_simulation(), Err(CoreError::NoCase)));

        let (_dir, session) = case();
        let err = session.stop_simulation().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn read_log_returns_contents() {
        let (dir, session) = case();
        assert!(session.read_log().unwrap_err().is_not_found());
        fs::write(dir.path().join("log"), "Time = 0.1\n").unwrap();
        assert_eq!(session.read_log().unwrap(), "Time = 0.1\n");
    }

    #[tokio::test]
    async fn missing_plot_tool_is_unavailable() {
        let mut cfg = SessionConfig::default();
        cfg.tools.plot = "splash-no-such-plotter".into();
        let session = CaseSession::new(cfg).unwrap();
        let err = session.plot_results().await.unwrap_err();
        assert!(matches!(err, CoreError::Exec(ExecError::ToolUnavailable { .. })));
    }

    #[test]
    fn empty_command_is_rejected() {
        let session = CaseSession::new(SessionConfig::default()).unwrap();
        assert!(matches!(
            session.execute_command("   "),
            Err(CoreError::Model(ModelError::Invalid(_)))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn simulation_clears_sentinel_and_holds_the_solver_slot() {
        let (dir, mut session) = case();
        session.select_meshing_dir(dir.path()).unwrap();
        write_control(dir.path(), "stopAt writeNow;\n");
        fs::write(
            dir.path().join("Allrun"),
            "#!/bin/sh\ngrep stopAt system/controlDict\necho done > log\n",
        )
        .unwrap();

        let job = session.start_simulation().unwrap();
        assert!(matches!(
            session.start_simulation(),
            Err(CoreError::JobRunning(JobKind::Simulation))
        ));
        assert!(matches!(
            session.start_mesh(splash_model::MeshType::Cartesian, &Default::default()),
            Err(CoreError::JobRunning(JobKind::Simulation))
        ));

        let mut lines: Vec<String> = Vec::new();
        job.drive(&mut lines).await.unwrap();
        assert_eq!(lines, vec!["stopAt endTime;"]);
        assert_eq!(session.read_log().unwrap(), "done\n");
        assert_eq!(session.solver_slot().active(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_run_script_reports_exit_code() {
        let (dir, session) = case();
        fs::write(dir.path().join("Allrun"), "#!/bin/sh\necho boom >&2\nexit 3\n").unwrap();

        let job = session.start_simulation().unwrap();
        let mut lines: Vec<String> = Vec::new();
        let err = job.drive(&mut lines).await.unwrap_err();
        assert!(matches!(err, CoreError::Exec(ExecError::NonZeroExit { code: 3 })));
        assert_eq!(lines, vec!["boom"]);
        assert_eq!(session.solver_slot().active(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_runs_in_case_dir_and_can_be_cancelled() {
        let (dir, session) = case();
        fs::write(dir.path().join("marker"), "").unwrap();

        let job = session.execute_command("ls marker").unwrap();
        let mut lines: Vec<String> = Vec::new();
        job.drive(&mut lines).await.unwrap();
        assert_eq!(lines, vec!["marker"]);

        let job = session.execute_command("echo started; sleep 30").unwrap();
        assert!(matches!(
            session.execute_command("true"),
            Err(CoreError::JobRunning(JobKind::Command))
        ));
        let canceller = job.canceller();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            canceller.cancel();
        });
        let mut lines: Vec<String> = Vec::new();
        let err = job.drive(&mut lines).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Exec(ExecError::Terminated { reason: StopReason::Cancelled })
        ));
        assert_eq!(lines, vec!["started"]);
        assert_eq!(session.command_slot().active(), None);
    }
}
