//! Synthetic `.uri` entries exposing the current URI of any path.
//!
//! For a path `P`, `P/.uri` names the URI of `P` itself and
//! `P/.uri.NAME` the URI of the child `NAME` within `P`. Reading one
//! forces a republish of the target if it is dirty, so the returned URI
//! always matches the committed state.

use tracing::debug;

use crate::error::{Error, Result};

use super::lock::{lock_path, ReleaseMode};
use super::node::NodeKind;
use super::walk::lookup;
use super::{dir, file, join, split, Mount};

/// Basename of the synthetic URI entry.
pub const URI_NAME: &str = ".uri";
const URI_PREFIX: &str = ".uri.";

/// The path whose URI a synthetic name would expose, if `path` has the
/// shape of one.
fn target_of(path: &str) -> Option<String> {
    let (parent, base) = split(path);
    if base == URI_NAME {
        return Some(parent.to_owned());
    }
    match base.strip_prefix(URI_PREFIX) {
        Some(name) if !name.is_empty() => Some(join(parent, name)),
        _ => None,
    }
}

/// Whether `path` names a synthetic entry. A plain `.uri` is always
/// synthetic; `.uri.NAME` only when `NAME` resolves in the parent.
pub fn is_special(ctx: &Mount, path: &str) -> bool {
    let (parent, base) = split(path);
    if base == URI_NAME {
        return true;
    }
    match base.strip_prefix(URI_PREFIX) {
        Some(name) if !name.is_empty() => lookup(ctx, &join(parent, name)).is_ok(),
        _ => false,
    }
}

/// Produce the contents of a synthetic entry: the target's URI followed
/// by a newline. Returns `Ok(None)` when `path` is not synthetic at all.
///
/// A dirty directory target is republished in place (its ancestors were
/// already marked dirty by whatever dirtied it). A dirty file target is
/// republished under a path lock released ancestors-dirty, exactly as a
/// release would do.
pub fn read(ctx: &Mount, path: &str) -> Result<Option<String>> {
    let Some(target) = target_of(path) else {
        return Ok(None);
    };
    debug!(path, target = %target, "reading synthetic uri entry");
    // No target means the name is not synthetic after all; the caller
    // falls back to regular resolution.
    let node = match lookup(ctx, &target) {
        Ok(node) => node,
        Err(Error::NotFound) => return Ok(None),
        Err(err) => return Err(err),
    };

    let uri = match node.kind() {
        NodeKind::Dir => {
            let _guard = node.lock();
            if node.state().dirty {
                dir::upload_locked(ctx, &node)?;
            }
            node.state().uri.clone()
        }
        NodeKind::File => {
            let lock = lock_path(ctx, &node)?;
            if node.state().dirty {
                match file::upload_locked(ctx, &node) {
                    Ok(()) => {
                        let uri = node.state().uri.clone();
                        lock.release(ReleaseMode::AncestorsDirty);
                        uri
                    }
                    Err(err) => {
                        lock.release(ReleaseMode::Clean);
                        return Err(err);
                    }
                }
            } else {
                let uri = node.state().uri.clone();
                lock.release(ReleaseMode::Clean);
                uri
            }
        }
    };

    let uri = uri.ok_or(Error::NotFound)?;
    Ok(Some(format!("{uri}\n")))
}
