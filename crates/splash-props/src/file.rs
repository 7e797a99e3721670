use std::path::Path;

use crate::{PropsError, PropsResult};

/// Read a whole text file; a missing file is [`PropsError::NotFound`].
pub fn read_text(path: &Path) -> PropsResult<String> {
    std::fs::read_to_string(path).map_err(|e| PropsError::io(path, e))
}

/// Replace the contents of `path`. No locking: the last writer wins.
pub fn write_text(path: &Path, text: &str) -> PropsResult<()> {
    std::fs::write(path, text).map_err(|e| PropsError::io(path, e))
}
