//! Removal of empty directories.

use libc::c_int;
use tracing::debug;

use crate::tree::dir;
use crate::tree::{lookup, special, split, Mount, NodeKind};

pub fn rmdir(ctx: &Mount, path: &str) -> Result<(), c_int> {
    debug!(path, "rmdir");

    if special::is_special(ctx, path) {
        return Err(libc::ENOTDIR);
    }
    let child = lookup(ctx, path).map_err(|_| libc::ENOENT)?;
    if child.kind() != NodeKind::Dir {
        return Err(libc::ENOTDIR);
    }
    if !dir::children(ctx, &child).map_err(|err| err.errno())?.is_empty() {
        return Err(libc::ENOTEMPTY);
    }

    let (parent_path, _) = split(path);
    let parent = lookup(ctx, parent_path).map_err(|_| libc::ENOENT)?;
    dir::remove(ctx, &parent, &child).map_err(|err| err.errno())
}
