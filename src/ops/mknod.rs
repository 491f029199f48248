//! Creation of regular files.

use libc::c_int;
use tracing::debug;

use crate::error::Error;
use crate::tree::{lookup, special, split, Meta, Mount, Node, META_FILENAME};
use crate::tree::dir;

pub fn mknod(ctx: &Mount, path: &str, mode: u32) -> Result<(), c_int> {
    debug!(path, mode, "mknod");

    // Only regular files exist in the remote namespace.
    if mode & libc::S_IFMT != libc::S_IFREG {
        return Err(libc::ENOTSUP);
    }
    if special::is_special(ctx, path) {
        return Err(libc::EEXIST);
    }
    if lookup(ctx, path).is_ok() {
        return Err(libc::EEXIST);
    }

    let (parent_path, name) = split(path);
    let parent = lookup(ctx, parent_path).map_err(|_| libc::ENOENT)?;

    let mut meta = Meta::new();
    meta.insert(META_FILENAME, name);
    let node = Node::new_file(path, meta);

    dir::insert(ctx, &parent, &node).map_err(|err| match err {
        Error::Exists => libc::EEXIST,
        other => other.errno(),
    })
}
