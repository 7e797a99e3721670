use std::{io, path::PathBuf};

use splash_exec::ExecError;
use splash_model::{MeshType, ModelError};
use splash_props::PropsError;
use thiserror::Error;

use crate::job::JobKind;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no case directory selected")]
    NoCase,

    #[error("no geometry imported")]
    NoGeometry,

    #[error("no properties file selected")]
    NoPropertiesFile,

    #[error("{} is not a {base} file", path.display())]
    NotAPropertiesFile { path: PathBuf, base: String },

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("a {0} job is already running")]
    JobRunning(JobKind),

    #[error("{0} meshing is not supported")]
    UnsupportedMesh(MeshType),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Props(#[from] PropsError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            CoreError::NotFound(path)
        } else {
            CoreError::Io { path, source }
        }
    }

    /// Anything the user can fix by pointing at an existing file or directory.
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::NoCase | CoreError::NoGeometry | CoreError::NoPropertiesFile => true,
            CoreError::NotFound(_) => true,
            CoreError::Exec(e) => e.is_not_found(),
            CoreError::Props(PropsError::NotFound(_)) => true,
            _ => false,
        }
    }
}
