//! Open checks. No per-handle state is kept; everything is path-keyed.

use libc::c_int;
use tracing::debug;

use crate::tree::{lookup, special, Mount, NodeKind};

const CREATE_EXCLUSIVE: u32 = (libc::O_CREAT | libc::O_EXCL) as u32;

pub fn open(ctx: &Mount, path: &str, flags: u32) -> Result<(), c_int> {
    debug!(path, flags, "open");

    if special::is_special(ctx, path) {
        if flags & libc::O_WRONLY as u32 != 0 {
            return Err(libc::EACCES);
        }
        if flags & CREATE_EXCLUSIVE == CREATE_EXCLUSIVE {
            return Err(libc::EEXIST);
        }
        return Ok(());
    }

    let node = lookup(ctx, path).map_err(|_| libc::ENOENT)?;
    if node.kind() != NodeKind::File {
        return Err(libc::ENOENT);
    }
    if flags & CREATE_EXCLUSIVE == CREATE_EXCLUSIVE {
        return Err(libc::EEXIST);
    }
    Ok(())
}
