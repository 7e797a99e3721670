use std::io;

/// Send `signal` to every process in group `pgid`.
///
/// A group that no longer exists (`ESRCH`) counts as success.
pub(crate) fn signal_group(pgid: u32, signal: libc::c_int) -> io::Result<()> {
    let pgid = libc::pid_t::try_from(pgid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pgid out of range"))?;
    // SAFETY: killpg has no memory-safety preconditions.
    let rc = unsafe { libc::killpg(pgid, signal) };
    if rc == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::signal_group;

    #[test]
    fn vanished_group_is_not_an_error() {
        // pid_t max is never handed out as a live group on a test machine.
        assert!(signal_group(i32::MAX as u32, 0).is_ok());
    }

    #[test]
    fn out_of_range_pgid_is_rejected() {
        assert!(signal_group(u32::MAX, 0).is_err());
    }
}
