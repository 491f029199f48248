//! The in-memory tree cache: per-path entries, path-level locking,
//! dirty propagation and republish-on-release.

pub mod dir;
pub mod file;
mod lock;
mod node;
mod registry;
pub mod special;
mod walk;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use node::{Meta, Node, NodeKind, DIR_MIME, META_FILENAME, META_MIME};
pub use registry::Registry;
pub use walk::{lookup, walk, Walk};

pub(crate) use lock::{lock_path, ReleaseMode};

use crate::store::{CancelFlag, PublishOptions, Store, Uri};

/// Join a normalised parent path and a basename.
pub fn join(parent: &str, name: &str) -> String {
    if parent == "/" || parent.is_empty() {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Split a normalised path into its parent and basename. The parent of a
/// top-level name (and of `/` itself) is `/`.
pub fn split(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) | None => ("/", path.strip_prefix('/').unwrap_or(path)),
        Some(idx) => (&path[..idx], &path[idx + 1..]),
    }
}

/// Knobs for a mount, resolved from CLI flags and the config file.
#[derive(Debug, Clone)]
pub struct MountOptions {
    pub publish: PublishOptions,
    /// Whether `readdir` synthesises the `.uri` entries.
    pub uri_files: bool,
    /// Directory where scratch files are staged.
    pub scratch_dir: PathBuf,
}

impl Default for MountOptions {
    fn default() -> Self {
        MountOptions {
            publish: PublishOptions::default(),
            uri_files: false,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// Process-wide mount state shared by every handler: the backend, the
/// entry registry, the root entry and the closing flag.
pub struct Mount {
    store: Arc<dyn Store>,
    registry: Registry,
    root: Arc<Node>,
    closing: CancelFlag,
    options: MountOptions,
}

impl Mount {
    /// Build the mount state. `root_uri` is the committed root listing
    /// from the sidecar, or `None` to start from an empty namespace.
    pub fn new(store: Arc<dyn Store>, root_uri: Option<Uri>, options: MountOptions) -> Arc<Mount> {
        let root = Node::root(root_uri);
        let registry = Registry::new();
        registry.insert(&root);
        Arc::new(Mount { store, registry, root, closing: CancelFlag::new(), options })
    }

    /// The root entry; lives for the lifetime of the mount.
    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn closing(&self) -> &CancelFlag {
        &self.closing
    }

    pub fn publish(&self) -> &PublishOptions {
        &self.options.publish
    }

    pub fn uri_files(&self) -> bool {
        self.options.uri_files
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.options.scratch_dir
    }

    /// Raise the closing flag: in-flight downloads cancel, new path
    /// locks are refused. Uploads still run so the final republish can
    /// persist the root URI.
    pub fn set_closing(&self) {
        self.closing.set();
    }
}
