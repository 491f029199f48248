//! Creation of directories.

use libc::c_int;
use tracing::debug;

use crate::error::Error;
use crate::tree::dir;
use crate::tree::{lookup, special, split, Meta, Mount, Node, DIR_MIME, META_FILENAME, META_MIME};

pub fn mkdir(ctx: &Mount, path: &str) -> Result<(), c_int> {
    debug!(path, "mkdir");

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
    meta.insert(META_MIME, DIR_MIME);
    let node = Node::new_dir(path, meta);

    dir::insert(ctx, &parent, &node).map_err(|err| match err {
        Error::Exists => libc::EEXIST,
        other => other.errno(),
    })
}
