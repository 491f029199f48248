//! Rename and move.

use libc::c_int;
use tracing::debug;

use crate::tree::dir;
use crate::tree::{lookup, special, split, Mount, NodeKind};

pub fn rename(ctx: &Mount, from: &str, to: &str) -> Result<(), c_int> {
    debug!(from, to, "rename");

    if special::is_special(ctx, from) || special::is_special(ctx, to) {
        return Err(libc::EACCES);
    }

    let source = lookup(ctx, from).map_err(|_| libc::ENOENT)?;

    // Look at the target before touching anything: kind swaps are
    // refused, an existing directory target must be empty.
    let target = lookup(ctx, to).ok();
    if let Some(target) = &target {
        if source.kind() == NodeKind::File && target.kind() == NodeKind::Dir {
            return Err(libc::EISDIR);
        }
        if source.kind() == NodeKind::Dir && target.kind() == NodeKind::File {
            return Err(libc::ENOTDIR);
        }
        if target.kind() == NodeKind::Dir
            && !dir::children(ctx, target).map_err(|err| err.errno())?.is_empty()
        {
            return Err(libc::ENOTEMPTY);
        }
    }

    let (from_parent_path, _) = split(from);
    let from_parent = lookup(ctx, from_parent_path).map_err(|_| libc::ENOENT)?;
    dir::remove(ctx, &from_parent, &source).map_err(|err| err.errno())?;

    // The source is out of the registry now; move it (and any cached
    // descendants) to the new path before re-inserting.
    dir::rekey(ctx, &source, to);

    let (to_parent_path, _) = split(to);
    let to_parent = lookup(ctx, to_parent_path).map_err(|_| libc::EIO)?;

    // There is no atomic remove-and-insert; between these two steps the
    // target parent briefly holds neither entry.
    if let Some(target) = &target {
        dir::remove(ctx, &to_parent, target).map_err(|_| libc::EIO)?;
    }
    dir::insert(ctx, &to_parent, &source).map_err(|_| libc::EIO)
}
