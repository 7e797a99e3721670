//! Execute permission for scripts shipped inside case directories.
//!
//! Case templates are often copied around without their mode bits, so the
//! runner re-adds `+x` before launching a script.
use std::path::Path;

use tracing::debug;

use crate::ExecError;

/// Add user/group/other execute bits to `path` if any are missing.
///
/// Failure is fatal for the launch that requested it ([`ExecError::Permission`]).
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> Result<(), ExecError> {
    use std::os::unix::fs::PermissionsExt;

    let permission_error = |source| ExecError::Permission {
        path: path.to_path_buf(),
        source,
    };

    let mut perms = std::fs::metadata(path).map_err(permission_error)?.permissions();
    let mode = perms.mode();
    if mode & 0o111 == 0o111 {
        return Ok(());
    }
    perms.set_mode(mode | 0o111);
    std::fs::set_permissions(path, perms).map_err(permission_error)?;
    debug!(path = ?path, old_mode = mode, "marked script executable");
    Ok(())
}

/// Execute permission is not a file mode outside Unix; only presence is checked.
#[cfg(not(unix))]
pub fn ensure_executable(path: &Path) -> Result<(), ExecError> {
    std::fs::metadata(path)
        .map(|_| ())
        .map_err(|source| ExecError::Permission {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(all(test, unix))]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt};

    use super::*;

    #[test]
    fn adds_missing_execute_bits_and_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Allrun");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        ensure_executable(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o751);
    }

    #[test]
    fn missing_file_is_a_permission_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_executable(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ExecError::Permission { .. }));
    }
}
