use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use splash_exec::spawn_detached;
use splash_model::{MESH_PARAMS, MeshType, ModelError, RunRequest};
use splash_props::{read_mesh_params, read_text, update_mesh_params, write_text};
use tracing::{info, warn};

use crate::{
    config::Viewer,
    error::CoreError,
    job::{Job, JobKind},
    session::{CaseSession, existing_dir},
};

impl CaseSession {
    /// Copy `file` to `<parent>/<meshing_dir>/<geometry_stem>.<ext>`.
    ///
    /// The extension is lowercased. The meshing directory is created when
    /// missing and becomes the session's geometry directory. Returns the
    /// destination path.
    pub fn import_geometry(&mut self, file: &Path) -> Result<PathBuf, CoreError> {
        let source = file.canonicalize().map_err(|e| CoreError::io(file, e))?;
        if !source.is_file() {
            return Err(CoreError::NotFound(source));
        }
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                ModelError::Invalid(format!("geometry file has no extension: {}", source.display()))
            })?;
        let parent = source.parent().unwrap_or(Path::new("/"));
        let meshing = parent.join(&self.config.meshing_dir);
        std::fs::create_dir_all(&meshing).map_err(|e| CoreError::io(&meshing, e))?;

        let dest = meshing.join(format!("{}.{ext}", self.config.geometry_stem));
        std::fs::copy(&source, &dest).map_err(|e| CoreError::io(&dest, e))?;
        info!(from = ?source, to = ?dest, "geometry imported");

        self.geometry_dir = Some(meshing);
        self.geometry_file = Some(dest.clone());
        Ok(dest)
    }

    /// Use an already populated meshing directory.
    ///
    /// The first `<geometry_stem>.*` file in it, if any, becomes the geometry
    /// file for the viewers.
    pub fn select_meshing_dir(&mut self, dir: &Path) -> Result<&Path, CoreError> {
        let dir = existing_dir(dir)?;
        let prefix = format!("{}.", self.config.geometry_stem);
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map_err(|e| CoreError::io(&dir, e))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        candidates.sort();
        self.geometry_file = candidates.into_iter().next();
        Ok(self.geometry_dir.insert(dir).as_path())
    }

    /// Current values in the mesh script.
    pub fn mesh_params(&self) -> Result<BTreeMap<String, String>, CoreError> {
        let script = self.require_geometry_dir()?.join(&self.config.mesh_script);
        Ok(read_mesh_params(&read_text(&script)?)?)
    }

    /// Write `params` into the mesh script, then launch it in the meshing
    /// directory. Empty values leave the script's setting alone.
    pub fn start_mesh(
        &self,
        mesh_type: MeshType,
        params: &BTreeMap<String, String>,
    ) -> Result<Job, CoreError> {
        let dir = self.require_geometry_dir()?;
        if !mesh_type.is_supported() {
            return Err(CoreError::UnsupportedMesh(mesh_type));
        }
        if let Some(unknown) = params.keys().find(|k| !MESH_PARAMS.contains(&k.as_str())) {
            return Err(ModelError::Invalid(format!("unknown mesh parameter: {unknown}")).into());
        }
        let guard = self.solver.try_acquire(JobKind::Mesh)?;

        if params.values().any(|v| !v.trim().is_empty()) {
            let script = dir.join(&self.config.mesh_script);
            let (text, missing) = update_mesh_params(&read_text(&script)?, params)?;
            for param in &missing {
                warn!(param = %param, script = ?script, "no line for mesh parameter; left out");
            }
            write_text(&script, &text)?;
        }

        let handle = self
            .runner
            .launch(&RunRequest::script(dir, &self.config.mesh_script))?;
        info!(run = %handle.id(), mesh = %mesh_type, "meshing started");
        Ok(Job::new(handle, guard))
    }

    /// Open the imported geometry in `viewer` without waiting for it.
    pub fn open_viewer(&self, viewer: Viewer) -> Result<u32, CoreError> {
        let file = self.geometry_file.as_deref().ok_or(CoreError::NoGeometry)?;
        let program = self.config.tools.viewer(viewer);
        Ok(spawn_detached(program, [file], file.parent())?)
    }

    /// Contents of the mesh quality report.
    pub fn read_mesh_check(&self) -> Result<String, CoreError> {
        let path = self.require_geometry_dir()?.join(&self.config.mesh_check_file);
        Ok(read_text(&path)?)
    }
}
