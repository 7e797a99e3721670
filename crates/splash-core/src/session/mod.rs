//! Explicit session state and the user actions built on it.
//!
//! Every action reads the selections it needs from [`CaseSession`] and fails
//! with `NoCase`, `NoGeometry`, or `NoPropertiesFile` when one is missing.
mod geometry;
mod properties;
mod run;

pub use properties::PropertiesView;

use std::path::{Path, PathBuf};

use splash_exec::CommandRunner;
use tracing::info;

use crate::{config::SessionConfig, error::CoreError, job::JobSlot};

#[derive(Debug)]
pub struct CaseSession {
    config: SessionConfig,
    runner: CommandRunner,
    case_dir: Option<PathBuf>,
    geometry_dir: Option<PathBuf>,
    geometry_file: Option<PathBuf>,
    properties_file: Option<PathBuf>,
    /// Mesh generation and simulation; never both at once.
    solver: JobSlot,
    /// Free-form user commands.
    command: JobSlot,
}

impl CaseSession {
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let runner = CommandRunner::with_config(config.runner)?;
        Ok(Self {
            config,
            runner,
            case_dir: None,
            geometry_dir: None,
            geometry_file: None,
            properties_file: None,
            solver: JobSlot::new(),
            command: JobSlot::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn case_dir(&self) -> Option<&Path> {
        self.case_dir.as_deref()
    }

    /// Directory holding the imported geometry and the mesh script.
    pub fn geometry_dir(&self) -> Option<&Path> {
        self.geometry_dir.as_deref()
    }

    pub fn geometry_file(&self) -> Option<&Path> {
        self.geometry_file.as_deref()
    }

    pub fn properties_file(&self) -> Option<&Path> {
        self.properties_file.as_deref()
    }

    pub fn solver_slot(&self) -> &JobSlot {
        &self.solver
    }

    pub fn command_slot(&self) -> &JobSlot {
        &self.command
    }

    /// Point the session at a case directory.
    pub fn select_case(&mut self, dir: &Path) -> Result<&Path, CoreError> {
        let dir = existing_dir(dir)?;
        info!(case = ?dir, "case directory selected");
        Ok(self.case_dir.insert(dir).as_path())
    }

    fn require_case(&self) -> Result<&Path, CoreError> {
        self.case_dir.as_deref().ok_or(CoreError::NoCase)
    }

    fn require_geometry_dir(&self) -> Result<&Path, CoreError> {
        self.geometry_dir.as_deref().ok_or(CoreError::NoGeometry)
    }

    fn require_properties(&self) -> Result<&Path, CoreError> {
        self.properties_file
            .as_deref()
            .ok_or(CoreError::NoPropertiesFile)
    }
}

/// Canonical form of `dir`, which must exist and be a directory.
fn existing_dir(dir: &Path) -> Result<PathBuf, CoreError> {
    let dir = dir.canonicalize().map_err(|e| CoreError::io(dir, e))?;
    if !dir.is_dir() {
        return Err(CoreError::NotADirectory(dir));
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_without_selection_report_what_is_missing() {
        let session = CaseSession::new(SessionConfig::default()).unwrap();
        assert!(matches!(session.read_log(), Err(CoreError::NoCase)));
        assert!(matches!(session.read_mesh_check(), Err(CoreError::NoGeometry)));
        assert!(matches!(session.properties(), Err(CoreError::NoPropertiesFile)));
    }

    #[test]
    fn select_case_requires_an_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = CaseSession::new(SessionConfig::default()).unwrap();

        let missing = dir.path().join("nope");
        assert!(matches!(session.select_case(&missing), Err(CoreError::NotFound(_))));

        let file = dir.path().join("Allrun");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(session.select_case(&file), Err(CoreError::NotADirectory(_))));

        let selected = session.select_case(dir.path()).unwrap().to_path_buf();
        assert_eq!(selected, dir.path().canonicalize().unwrap());
        assert_eq!(session.case_dir(), Some(selected.as_path()));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = SessionConfig::default();
        cfg.runner.log.max_line_length = 0;
        assert!(CaseSession::new(cfg).is_err());
    }
}
