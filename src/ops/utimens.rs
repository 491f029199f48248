//! Timestamp updates.

use std::time::SystemTime;

use filetime::FileTime;
use libc::c_int;
use tracing::debug;

use crate::tree::{lookup, special, Mount, NodeKind};

/// Apply timestamps to a staged file's scratch copy. For everything else
/// (uncached files, directories) the call is accepted with no effect;
/// the remote namespace does not carry timestamps.
pub fn utimens(
    ctx: &Mount,
    path: &str,
    atime: Option<SystemTime>,
    mtime: Option<SystemTime>,
) -> Result<(), c_int> {
    debug!(path, "utimens");

    if special::is_special(ctx, path) {
        return Err(libc::EACCES);
    }
    let node = lookup(ctx, path).map_err(|_| libc::ENOENT)?;
    let _guard = node.lock();

    if node.kind() != NodeKind::File {
        return Ok(());
    }
    let state = node.state();
    let Some(scratch) = state.scratch() else {
        return Ok(());
    };

    if let Some(atime) = atime {
        filetime::set_file_atime(scratch.path(), FileTime::from_system_time(atime))
            .map_err(|err| err.raw_os_error().unwrap_or(libc::EIO))?;
    }
    if let Some(mtime) = mtime {
        filetime::set_file_mtime(scratch.path(), FileTime::from_system_time(mtime))
            .map_err(|err| err.raw_os_error().unwrap_or(libc::EIO))?;
    }
    Ok(())
}
