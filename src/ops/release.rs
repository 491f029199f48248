//! Close-time republish of modified files.

use libc::c_int;
use tracing::{debug, warn};

use crate::tree::{file, lock_path, lookup, special, Mount, NodeKind, ReleaseMode};

/// Republish a file on its last close. The file itself comes out clean
/// with a fresh URI; every ancestor is marked dirty so the next `.uri`
/// read (or unmount) rewrites the chain up to the root.
///
/// Release never reports failure: an upload error leaves the file dirty
/// for a later retry, which is all the caller could do anyway.
pub fn release(ctx: &Mount, path: &str) -> Result<(), c_int> {
    debug!(path, "release");

    if special::is_special(ctx, path) {
        return Ok(());
    }
    let Ok(node) = lookup(ctx, path) else {
        return Ok(());
    };
    if node.kind() != NodeKind::File {
        return Ok(());
    }

    let Ok(lock) = lock_path(ctx, &node) else {
        return Ok(());
    };
    match file::upload_locked(ctx, &node) {
        Ok(()) => lock.release(ReleaseMode::AncestorsDirty),
        Err(err) => {
            warn!(path, %err, "release republish failed, keeping file dirty");
            lock.release(ReleaseMode::Clean);
        }
    }
    Ok(())
}
