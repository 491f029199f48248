//! Lazy materialisation and mutation of directories.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::wire;

use super::lock::{lock_path, ReleaseMode};
use super::node::{Node, NodeKind};
use super::{join, Mount};

/// Populate a directory's child map from its committed listing. No-op if
/// already cached. The caller holds the directory's entry lock.
pub(crate) fn materialise_locked(ctx: &Mount, dir: &Arc<Node>) -> Result<()> {
    let uri = {
        let state = dir.state();
        if state.children().is_some() {
            return Ok(());
        }
        state.uri.clone()
    };
    // A directory with no committed URI has no listing to fetch; it
    // starts out empty. Freshly created directories never hit this
    // because they are built cached.
    let records = match &uri {
        None => Vec::new(),
        Some(uri) => {
            let data = ctx.store().get_range(uri, 0, uri.size() as usize, ctx.closing())?;
            wire::parse_listing(&data)?
        }
    };

    let dir_path = dir.path_get();
    let mut children = HashMap::with_capacity(records.len());
    for rec in records {
        let child_path = join(&dir_path, &rec.name);
        let child = match ctx.registry().get(&child_path) {
            Some(existing) => existing,
            None => {
                let node = Node::from_listing(&child_path, rec.kind, rec.uri, rec.meta);
                // The lock on this directory is enough to rule out a
                // concurrent registration of the same child: the only
                // way to observe the child is through this directory.
                ctx.registry().insert(&node);
                node
            }
        };
        children.insert(rec.name, child);
    }

    debug!(path = %dir_path, count = children.len(), "materialised directory");
    if let Some(slot) = dir.state().children_slot() {
        *slot = Some(children);
    }
    Ok(())
}

/// Return a referenced child by basename, or `None` if the name does not
/// resolve (including when `parent` is not a directory).
pub fn find(ctx: &Mount, parent: &Arc<Node>, name: &str) -> Result<Option<Arc<Node>>> {
    if parent.kind() != NodeKind::Dir {
        return Ok(None);
    }
    let _guard = parent.lock();
    materialise_locked(ctx, parent)?;
    Ok(parent.state().children().and_then(|c| c.get(name).cloned()))
}

/// Snapshot of a directory's children, sorted by basename. Materialises
/// on first access.
pub fn children(ctx: &Mount, dir: &Arc<Node>) -> Result<Vec<(String, Arc<Node>)>> {
    if dir.kind() != NodeKind::Dir {
        return Err(Error::WrongKind { expected: NodeKind::Dir });
    }
    let _guard = dir.lock();
    materialise_locked(ctx, dir)?;
    let state = dir.state();
    let mut entries: Vec<(String, Arc<Node>)> = state
        .children()
        .map(|c| c.iter().map(|(name, node)| (name.clone(), node.clone())).collect())
        .unwrap_or_default();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Attach `child` into `parent` under the child's basename and register
/// it, leaving the whole path dirty.
pub fn insert(ctx: &Mount, parent: &Arc<Node>, child: &Arc<Node>) -> Result<()> {
    let lock = lock_path(ctx, parent)?;
    match insert_locked(ctx, parent, child) {
        Ok(()) => {
            lock.release(ReleaseMode::AllDirty);
            Ok(())
        }
        Err(err) => {
            lock.release(ReleaseMode::Clean);
            Err(err)
        }
    }
}

fn insert_locked(ctx: &Mount, parent: &Arc<Node>, child: &Arc<Node>) -> Result<()> {
    if parent.kind() != NodeKind::Dir {
        return Err(Error::WrongKind { expected: NodeKind::Dir });
    }
    materialise_locked(ctx, parent)?;
    let name = child.basename();
    {
        let mut state = parent.state();
        let children = state
            .children_mut()
            .ok_or_else(|| Error::backend("directory lost its child map"))?;
        if children.contains_key(&name) {
            return Err(Error::Exists);
        }
        children.insert(name, child.clone());
    }
    ctx.registry().insert(child);
    Ok(())
}

/// Detach `child` from `parent` and unregister it, leaving the whole
/// path dirty. The caller's reference keeps the child alive.
pub fn remove(ctx: &Mount, parent: &Arc<Node>, child: &Arc<Node>) -> Result<()> {
    let lock = lock_path(ctx, parent)?;
    match remove_locked(ctx, parent, child) {
        Ok(()) => {
            lock.release(ReleaseMode::AllDirty);
            Ok(())
        }
        Err(err) => {
            lock.release(ReleaseMode::Clean);
            Err(err)
        }
    }
}

fn remove_locked(ctx: &Mount, parent: &Arc<Node>, child: &Arc<Node>) -> Result<()> {
    if parent.kind() != NodeKind::Dir {
        return Err(Error::WrongKind { expected: NodeKind::Dir });
    }
    materialise_locked(ctx, parent)?;
    let name = child.basename();
    {
        let mut state = parent.state();
        let children = state
            .children_mut()
            .ok_or_else(|| Error::backend("directory lost its child map"))?;
        if children.remove(&name).is_none() {
            warn!(name = %name, "removal target not found in child map");
            return Err(Error::NotFound);
        }
    }
    ctx.registry().remove(child);
    Ok(())
}

/// Republish a dirty directory bottom-up and clear its dirty bit. The
/// caller holds the directory's entry lock.
///
/// Children that are themselves dirty directories are republished first;
/// dirty files contribute their last committed URI (their release will
/// re-dirty this directory), and a file with no committed URI at all is
/// left out of the listing.
pub(crate) fn upload_locked(ctx: &Mount, dir: &Arc<Node>) -> Result<()> {
    if !dir.state().dirty {
        return Ok(());
    }
    materialise_locked(ctx, dir)?;

    let mut snapshot: Vec<(String, Arc<Node>)> = dir
        .state()
        .children()
        .map(|c| c.iter().map(|(name, node)| (name.clone(), node.clone())).collect())
        .unwrap_or_default();
    snapshot.sort_by(|a, b| a.0.cmp(&b.0));

    let mut records = Vec::with_capacity(snapshot.len());
    for (name, child) in &snapshot {
        let _child_guard = child.lock();
        if child.state().dirty && child.kind() == NodeKind::Dir {
            upload_locked(ctx, child)?;
        }
        let state = child.state();
        let Some(uri) = state.uri.clone() else {
            debug!(name = %name, "child has no committed uri yet, omitting from listing");
            continue;
        };
        records.push(wire::Record {
            name: name.clone(),
            kind: child.kind(),
            uri,
            meta: state.meta.clone(),
        });
    }

    let blob = wire::build_listing(&records)?;
    let uri = ctx.store().put(&blob, ctx.publish())?;
    debug!(path = %dir.path_get(), entries = records.len(), uri = %uri, "republished directory");

    let mut state = dir.state();
    state.uri = Some(uri);
    state.dirty = false;
    Ok(())
}

/// Point `node` (already detached from the registry) and its cached
/// descendants at a new path, re-keying the descendants' registry
/// entries. Used by rename so that registered paths keep matching the
/// tree shape.
pub(crate) fn rekey(ctx: &Mount, node: &Arc<Node>, new_path: &str) {
    node.path_set(new_path);
    if node.kind() != NodeKind::Dir {
        return;
    }
    let _guard = node.lock();
    let children: Vec<(String, Arc<Node>)> = node
        .state()
        .children()
        .map(|c| c.iter().map(|(name, child)| (name.clone(), child.clone())).collect())
        .unwrap_or_default();
    for (name, child) in children {
        let child_path = join(new_path, &name);
        ctx.registry().remove(&child);
        rekey(ctx, &child, &child_path);
        ctx.registry().insert(&child);
    }
}
