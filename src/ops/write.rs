//! Writes into the staged scratch copy.

use std::os::unix::fs::FileExt;

use libc::c_int;
use tracing::debug;

use crate::tree::{file, lookup, special, Mount, NodeKind};

pub fn write(ctx: &Mount, path: &str, offset: u64, data: &[u8]) -> Result<u32, c_int> {
    debug!(path, offset, len = data.len(), "write");

    if special::is_special(ctx, path) {
        return Err(libc::EACCES);
    }
    let node = lookup(ctx, path).map_err(|_| libc::ENOENT)?;
    if node.kind() != NodeKind::File {
        return Err(libc::ENOENT);
    }

    let _guard = node.lock();
    file::download_locked(ctx, &node).map_err(|err| err.errno())?;

    {
        let state = node.state();
        let scratch = state.scratch().ok_or(libc::EIO)?;
        scratch
            .as_file()
            .write_all_at(data, offset)
            .map_err(|err| err.raw_os_error().unwrap_or(libc::EIO))?;
    }
    node.state().dirty = true;
    Ok(data.len() as u32)
}
