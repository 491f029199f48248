//! File removal.

use libc::c_int;
use tracing::debug;

use crate::tree::dir;
use crate::tree::{lookup, special, split, Mount, NodeKind};

pub fn unlink(ctx: &Mount, path: &str) -> Result<(), c_int> {
    debug!(path, "unlink");

    if special::is_special(ctx, path) {
        return Err(libc::EPERM);
    }
    let child = lookup(ctx, path).map_err(|_| libc::ENOENT)?;
    if child.kind() != NodeKind::File {
        return Err(libc::EPERM);
    }

    let (parent_path, _) = split(path);
    let parent = lookup(ctx, parent_path).map_err(|_| libc::ENOENT)?;
    dir::remove(ctx, &parent, &child).map_err(|err| err.errno())
}
