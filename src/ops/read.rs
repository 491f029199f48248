//! Reads, from scratch files, synthetic entries or the backend.

use std::os::unix::fs::FileExt;

use libc::c_int;
use tracing::debug;

use crate::tree::{lookup, special, Mount, NodeKind};

pub fn read(ctx: &Mount, path: &str, offset: u64, size: u32) -> Result<Vec<u8>, c_int> {
    debug!(path, offset, size, "read");

    match special::read(ctx, path) {
        Ok(Some(content)) => {
            let bytes = content.as_bytes();
            if offset >= bytes.len() as u64 {
                return Ok(Vec::new());
            }
            let start = offset as usize;
            let end = (start + size as usize).min(bytes.len());
            return Ok(bytes[start..end].to_vec());
        }
        Ok(None) => {}
        Err(err) => return Err(err.errno()),
    }

    let node = lookup(ctx, path).map_err(|_| libc::ENOENT)?;
    if node.kind() != NodeKind::File {
        return Err(libc::ENOENT);
    }
    let _guard = node.lock();

    // Staged files answer from the scratch copy.
    {
        let state = node.state();
        if let Some(scratch) = state.scratch() {
            let mut buf = vec![0u8; size as usize];
            let mut filled = 0;
            while filled < buf.len() {
                match scratch.as_file().read_at(&mut buf[filled..], offset + filled as u64) {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    Err(err) => return Err(err.raw_os_error().unwrap_or(libc::EIO)),
                }
            }
            buf.truncate(filled);
            return Ok(buf);
        }
    }

    // Otherwise a partial download of just the requested range.
    let uri = node.state().uri.clone().ok_or(libc::EIO)?;
    if offset >= uri.size() {
        return Ok(Vec::new());
    }
    let want = (size as u64).min(uri.size() - offset) as usize;
    ctx.store()
        .get_range(&uri, offset, want, ctx.closing())
        .map_err(|err| err.errno())
}
