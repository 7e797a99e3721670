use std::{io, path::PathBuf};

use splash_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropsError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid substitution token: {0:?}")]
    InvalidToken(String),

    #[error("invalid key pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl PropsError {
    /// Wrap an I/O error, turning `NotFound` into [`PropsError::NotFound`].
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            PropsError::NotFound(path)
        } else {
            PropsError::Io { path, source }
        }
    }
}

pub type PropsResult<T> = Result<T, PropsError>;
