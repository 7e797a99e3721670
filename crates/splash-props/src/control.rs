//! Run-control sentinels in `system/controlDict`.
//!
//! The solver re-reads its control dictionary while running. Turning the
//! first `endTime` into `writeNow` makes it write a checkpoint and exit; the
//! next run needs the reverse substitution.
use std::{fs::File, path::Path, time::SystemTime};

use tracing::{debug, info};

use crate::{PropsError, PropsResult, file};

/// Sentinel for "run to the configured end time".
pub const END_TIME: &str = "endTime";

/// Sentinel for "write now and stop".
pub const WRITE_NOW: &str = "writeNow";

/// Replace the first `endTime` with `writeNow`.
///
/// Returns `false` when the file holds no `endTime` (nothing was written).
pub fn request_stop(path: &Path) -> PropsResult<bool> {
    let text = file::read_text(path)?;
    if !text.contains(END_TIME) {
        debug!(path = ?path, "no endTime sentinel; stop request skipped");
        return Ok(false);
    }
    file::write_text(path, &text.replacen(END_TIME, WRITE_NOW, 1))?;
    info!(path = ?path, "stop requested via writeNow");
    Ok(true)
}

/// Replace every `writeNow` with `endTime`; returns how many were replaced.
pub fn restore_end_time(path: &Path) -> PropsResult<usize> {
    let text = file::read_text(path)?;
    let count = text.matches(WRITE_NOW).count();
    if count > 0 {
        file::write_text(path, &text.replace(WRITE_NOW, END_TIME))?;
        debug!(path = ?path, count, "restored endTime sentinel");
    }
    Ok(count)
}

/// Bump the modification time so the solver notices the file changed.
///
/// Unlike `touch(1)` a missing file is an error, not created.
pub fn touch(path: &Path) -> PropsResult<()> {
    let file = File::options()
        .write(true)
        .open(path)
        .map_err(|e| PropsError::io(path, e))?;
    file.set_modified(SystemTime::now())
        .map_err(|e| PropsError::io(path, e))
}
