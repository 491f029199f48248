//! Directory listing.

use libc::c_int;
use tracing::debug;

use crate::tree::dir;
use crate::tree::{lookup, special, Mount, NodeKind};

pub fn readdir(ctx: &Mount, path: &str) -> Result<Vec<(String, NodeKind)>, c_int> {
    debug!(path, "readdir");

    let node = lookup(ctx, path).map_err(|_| libc::ENOENT)?;
    if node.kind() != NodeKind::Dir {
        return Err(libc::ENOENT);
    }
    let children = dir::children(ctx, &node).map_err(|err| err.errno())?;

    let mut entries = Vec::with_capacity(children.len() + 3);
    entries.push((".".to_owned(), NodeKind::Dir));
    entries.push(("..".to_owned(), NodeKind::Dir));
    if ctx.uri_files() {
        entries.push((special::URI_NAME.to_owned(), NodeKind::File));
        for (name, _) in &children {
            entries.push((format!(".uri.{name}"), NodeKind::File));
        }
    }
    for (name, child) in &children {
        entries.push((name.clone(), child.kind()));
    }
    Ok(entries)
}
