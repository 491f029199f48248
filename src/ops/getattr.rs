//! Attribute reporting.

use std::os::unix::fs::MetadataExt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libc::c_int;
use tracing::debug;

use crate::tree::{lookup, special, Mount, NodeKind};

/// Attributes of one node as the dispatcher wants them.
#[derive(Debug, Clone, Copy)]
pub struct Attr {
    pub kind: NodeKind,
    pub size: u64,
    pub perm: u16,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub ctime: SystemTime,
}

pub fn getattr(ctx: &Mount, path: &str) -> Result<Attr, c_int> {
    debug!(path, "getattr");

    if special::is_special(ctx, path) {
        // Fixed-size read-only regular file, the way sysfs reports
        // variable-sized attribute files.
        return Ok(Attr {
            kind: NodeKind::File,
            size: 4096,
            perm: 0o555,
            atime: UNIX_EPOCH,
            mtime: UNIX_EPOCH,
            ctime: UNIX_EPOCH,
        });
    }

    let node = lookup(ctx, path).map_err(|err| err.errno())?;
    let _guard = node.lock();

    // A staged file reports its scratch copy.
    if node.kind() == NodeKind::File {
        let state = node.state();
        if let Some(scratch) = state.scratch() {
            let meta = scratch.as_file().metadata().map_err(|_| libc::EIO)?;
            return Ok(Attr {
                kind: NodeKind::File,
                size: meta.len(),
                perm: (meta.mode() & 0o7777) as u16,
                atime: meta.accessed().unwrap_or(UNIX_EPOCH),
                mtime: meta.modified().unwrap_or(UNIX_EPOCH),
                ctime: UNIX_EPOCH + Duration::new(meta.ctime().max(0) as u64, 0),
            });
        }
    }

    let size = node.state().uri.as_ref().map(|uri| uri.size()).unwrap_or(0);
    Ok(Attr {
        kind: node.kind(),
        size,
        perm: 0o777,
        atime: UNIX_EPOCH,
        mtime: UNIX_EPOCH,
        ctime: UNIX_EPOCH,
    })
}
