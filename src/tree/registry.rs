//! Path → live-entry mapping with deduplication.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::node::Node;

/// The per-mount entry registry. Two handlers resolving the same path
/// always end up with the same node, which is what makes per-path
/// exclusion possible without global serialisation.
///
/// Entries stay registered (and therefore cached) until removed from
/// their parent; there is no eviction.
#[derive(Default)]
pub struct Registry {
    entries: Mutex<HashMap<String, Arc<Node>>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Look up a registered entry, taking a reference on it.
    pub fn get(&self, path: &str) -> Option<Arc<Node>> {
        self.entries.lock().unwrap().get(path).cloned()
    }

    /// Register an entry under its current path. The entry must not be
    /// present; the map's clone is the registry's self-reference.
    pub fn insert(&self, node: &Arc<Node>) {
        let path = node.path_get();
        let prev = self.entries.lock().unwrap().insert(path.clone(), node.clone());
        assert!(prev.is_none(), "duplicate registry entry for {path}");
    }

    /// Detach an entry, dropping the self-reference. The caller's own
    /// reference keeps the node alive through cleanup.
    pub fn remove(&self, node: &Arc<Node>) {
        let path = node.path_get();
        let mut entries = self.entries.lock().unwrap();
        if entries.get(&path).is_some_and(|found| Arc::ptr_eq(found, node)) {
            entries.remove(&path);
        }
    }
}
