use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use splash_exec::RunnerConfig;
use splash_model::ModelError;

use crate::error::CoreError;

/// File names and tools a session works with.
///
/// Paths are relative: `control_dict`, `constant_dir`, and `log_file` to the
/// case directory, `mesh_script` and `mesh_check_file` to the meshing
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub run_script: String,
    pub mesh_script: String,
    pub control_dict: String,
    /// Created next to an imported geometry file.
    pub meshing_dir: String,
    /// Imported geometry is stored as `<geometry_stem>.<ext>`.
    pub geometry_stem: String,
    pub properties_base: String,
    pub constant_dir: String,
    pub log_file: String,
    pub mesh_check_file: String,
    pub runner: RunnerConfig,
    pub tools: ToolsConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            run_script: "Allrun".into(),
            mesh_script: "AllmeshCartesian".into(),
            control_dict: "system/controlDict".into(),
            meshing_dir: "Meshing".into(),
            geometry_stem: "CAD".into(),
            properties_base: "physicalProperties".into(),
            constant_dir: "constant".into(),
            log_file: "log".into(),
            mesh_check_file: "meshChecked".into(),
            runner: RunnerConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        let names = [
            ("run_script", &self.run_script),
            ("mesh_script", &self.mesh_script),
            ("control_dict", &self.control_dict),
            ("meshing_dir", &self.meshing_dir),
            ("geometry_stem", &self.geometry_stem),
            ("properties_base", &self.properties_base),
            ("constant_dir", &self.constant_dir),
            ("log_file", &self.log_file),
            ("mesh_check_file", &self.mesh_check_file),
        ];
        if let Some((field, _)) = names.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ModelError::Invalid(format!("{field} cannot be empty")).into());
        }
        if self.runner.channel_capacity == 0 {
            return Err(ModelError::Invalid("runner.channel_capacity cannot be zero".into()).into());
        }
        self.runner.validate()?;
        self.tools.validate()
    }
}

/// Programs launched on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub freecad: String,
    pub gmsh: String,
    pub paraview: String,
    pub plot: String,
    /// Interpreter for free-form commands, invoked as `<shell> -c <line>`.
    pub shell: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            freecad: "freecad".into(),
            gmsh: "gmsh".into(),
            paraview: "paraview".into(),
            plot: "xmgrace".into(),
            shell: "sh".into(),
        }
    }
}

impl ToolsConfig {
    pub fn viewer(&self, viewer: Viewer) -> &str {
        match viewer {
            Viewer::FreeCad => &self.freecad,
            Viewer::Gmsh => &self.gmsh,
            Viewer::ParaView => &self.paraview,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        let tools = [&self.freecad, &self.gmsh, &self.paraview, &self.plot, &self.shell];
        if tools.iter().any(|t| t.trim().is_empty()) {
            return Err(ModelError::Invalid("tool programs cannot be empty".into()).into());
        }
        Ok(())
    }
}

/// Geometry viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    FreeCad,
    Gmsh,
    ParaView,
}

impl FromStr for Viewer {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freecad" => Ok(Viewer::FreeCad),
            "gmsh" => Ok(Viewer::Gmsh),
            "paraview" => Ok(Viewer::ParaView),
            _ => Err(ModelError::Invalid(format!(
                "unknown viewer: {s} (expected: freecad|gmsh|paraview)"
            ))),
        }
    }
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Viewer::FreeCad => "freecad",
            Viewer::Gmsh => "gmsh",
            Viewer::ParaView => "paraview",
        })
    }
}
