//! Truncation of files.

use libc::c_int;
use tracing::{debug, warn};

use crate::error::Error;
use crate::tree::{file, lock_path, lookup, special, Mount, NodeKind, ReleaseMode};

pub fn truncate(ctx: &Mount, path: &str, size: u64) -> Result<(), c_int> {
    debug!(path, size, "truncate");

    if special::is_special(ctx, path) {
        return Err(libc::EACCES);
    }
    let node = lookup(ctx, path).map_err(|_| libc::ENOENT)?;
    if node.kind() != NodeKind::File {
        return Err(libc::EISDIR);
    }

    let lock = lock_path(ctx, &node).map_err(|err| err.errno())?;

    let truncated: Result<(), Error> = (|| {
        file::download_locked(ctx, &node)?;
        {
            let state = node.state();
            let scratch = state
                .scratch()
                .ok_or_else(|| Error::backend("staged file lost its scratch"))?;
            scratch.as_file().set_len(size)?;
        }
        node.state().dirty = true;
        Ok(())
    })();
    if let Err(err) = truncated {
        lock.release(ReleaseMode::Clean);
        return Err(err.errno());
    }

    // Republish right away. On failure the file stays dirty and so must
    // its whole path, so a later republish retries.
    match file::upload_locked(ctx, &node) {
        Ok(()) => {
            lock.release(ReleaseMode::AncestorsDirty);
            Ok(())
        }
        Err(err) => {
            warn!(path, %err, "truncate republish failed");
            lock.release(ReleaseMode::AllDirty);
            Err(libc::EIO)
        }
    }
}
