//! Entry locks and the whole-path locking protocol.
//!
//! Each entry owns one exclusive lock that serialises every observable
//! state transition and may be held across backend I/O. [`lock_path`]
//! acquires the locks of every entry from the root down to a target,
//! always in that order; release happens in the same order, applying a
//! dirty mode chosen at release time. Deadlock freedom follows from the
//! strict hierarchical order: no thread ever holds a descendant's lock
//! while waiting for an ancestor's.

use std::sync::{Arc, Condvar, Mutex};

use tracing::debug;

use crate::error::{Error, Result};

use super::node::Node;
use super::Mount;

/// Exclusive lock decoupled from lock-guard lifetimes, so a chain of
/// acquisitions can be carried in a value and released non-lexically.
pub(crate) struct EntryLock {
    held: Mutex<bool>,
    cv: Condvar,
}

impl EntryLock {
    pub fn new() -> EntryLock {
        EntryLock { held: Mutex::new(false), cv: Condvar::new() }
    }

    pub fn acquire(&self) {
        let mut held = self.held.lock().unwrap();
        while *held {
            held = self.cv.wait(held).unwrap();
        }
        *held = true;
    }

    pub fn release(&self) {
        let mut held = self.held.lock().unwrap();
        *held = false;
        self.cv.notify_one();
    }
}

/// Entry-lock guard for single-entry critical sections.
pub(crate) struct EntryGuard<'a> {
    node: &'a Node,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.node.entry_lock().release();
    }
}

impl Node {
    /// Acquire this entry's exclusive lock for the guard's lifetime.
    pub(crate) fn lock(&self) -> EntryGuard<'_> {
        self.entry_lock().acquire();
        EntryGuard { node: self }
    }
}

/// Dirty mode applied to the visited entries when a path lock is
/// released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReleaseMode {
    /// No dirty change.
    Clean,
    /// Mark every visited entry except the target as dirty.
    AncestorsDirty,
    /// Mark every visited entry, target included, as dirty.
    AllDirty,
}

/// The chain of entry locks held from the root down to a target.
///
/// Dropping the guard releases the chain clean; [`PathLock::release`]
/// picks the dirty mode explicitly.
pub(crate) struct PathLock {
    chain: Vec<Arc<Node>>,
}

impl PathLock {
    /// The target entry of the locked path.
    pub fn target(&self) -> &Arc<Node> {
        self.chain.last().expect("a path lock always holds at least the root")
    }

    /// Unlock root-to-leaf, applying `mode` to each visited entry.
    pub fn release(mut self, mode: ReleaseMode) {
        self.apply(mode);
    }

    fn apply(&mut self, mode: ReleaseMode) {
        let last = self.chain.len().saturating_sub(1);
        for (idx, node) in self.chain.iter().enumerate() {
            let make_dirty = match mode {
                ReleaseMode::Clean => false,
                ReleaseMode::AllDirty => true,
                ReleaseMode::AncestorsDirty => idx != last,
            };
            if make_dirty {
                node.state().dirty = true;
            }
            node.entry_lock().release();
        }
        self.chain.clear();
    }
}

impl Drop for PathLock {
    fn drop(&mut self) {
        if !self.chain.is_empty() {
            self.apply(ReleaseMode::Clean);
        }
    }
}

/// Lock every entry from the root down to `target`, in order.
///
/// Resolution uses the registry only: entries along an already-resolved
/// path are pinned there, so a miss means the path mutated underneath the
/// caller and the acquisition backs out, releasing everything taken so
/// far.
pub(crate) fn lock_path(ctx: &Mount, target: &Arc<Node>) -> Result<PathLock> {
    if ctx.closing().is_set() {
        return Err(Error::Shutdown);
    }
    let path = target.path_get();
    debug!(path = %path, "locking path");

    let root = ctx.root().clone();
    root.entry_lock().acquire();
    let mut lock = PathLock { chain: vec![root] };

    let mut prefix = String::new();
    for component in path.split('/').filter(|c| !c.is_empty()) {
        prefix.push('/');
        prefix.push_str(component);
        let Some(next) = ctx.registry().get(&prefix) else {
            debug!(path = %path, prefix = %prefix, "path mutated during lock, backing out");
            drop(lock);
            return Err(Error::NotFound);
        };
        next.entry_lock().acquire();
        lock.chain.push(next);
    }
    Ok(lock)
}
