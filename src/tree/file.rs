//! Staging and republishing of file contents.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};

use super::node::Node;
use super::Mount;

/// Stage a file's committed bytes into a local scratch file. No-op if
/// already cached. The caller holds the file's entry lock.
pub(crate) fn download_locked(ctx: &Mount, file: &Arc<Node>) -> Result<()> {
    if file.state().scratch().is_some() {
        return Ok(());
    }
    let uri = file
        .state()
        .uri
        .clone()
        .ok_or_else(|| Error::backend("file has no committed uri to download"))?;

    let scratch = tempfile::Builder::new().prefix("casfs.").tempfile_in(ctx.scratch_dir())?;
    ctx.store().get_to_file(&uri, scratch.as_file(), ctx.closing())?;
    debug!(path = %file.path_get(), size = uri.size(), "staged file into scratch");

    if let Some(slot) = file.state().scratch_slot() {
        *slot = Some(scratch);
    }
    Ok(())
}

/// Upload a dirty file's scratch contents and clear both flags. The
/// caller holds the file's entry lock.
///
/// The cached→uncached transition is deliberate: once republished, the
/// backend is the authoritative source again and the scratch file is
/// reclaimed. Later reads re-download on demand.
pub(crate) fn upload_locked(ctx: &Mount, file: &Arc<Node>) -> Result<()> {
    if !file.state().dirty {
        return Ok(());
    }
    let scratch_path = file
        .state()
        .scratch()
        .map(|tmp| tmp.path().to_owned())
        .ok_or_else(|| Error::backend("dirty file has no scratch file"))?;

    let uri = ctx.store().put_file(&scratch_path, ctx.publish())?;
    debug!(path = %file.path_get(), uri = %uri, "republished file");

    let mut state = file.state();
    state.uri = Some(uri);
    state.dirty = false;
    if let Some(slot) = state.scratch_slot() {
        // Drop closes and unlinks the scratch file.
        *slot = None;
    }
    Ok(())
}
