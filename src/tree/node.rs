//! In-memory representation of one node of the mounted tree.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tempfile::NamedTempFile;

use crate::store::Uri;

use super::lock::EntryLock;

/// Metadata key carrying the entry's basename through listings.
pub const META_FILENAME: &str = "filename";
/// Metadata key carrying the entry's MIME type.
pub const META_MIME: &str = "mime";
/// MIME type marking serialised directories.
pub const DIR_MIME: &str = "application/x-casfs-directory";

/// What a node is. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => f.write_str("file"),
            NodeKind::Dir => f.write_str("directory"),
        }
    }
}

/// Opaque key/value bag carried through directory listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta(BTreeMap<String, String>);

impl Meta {
    pub fn new() -> Meta {
        Meta::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_owned(), value.to_owned());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Kind-specific cached storage. The node is *cached* when the inner
/// option is populated.
pub(crate) enum Body {
    File {
        /// Local staging copy of the file bytes. Closing and unlinking
        /// on destruction is the temp file's drop.
        scratch: Option<NamedTempFile>,
    },
    Dir {
        /// Child map keyed by basename; each child is owned by one
        /// reference held here.
        children: Option<HashMap<String, Arc<Node>>>,
    },
}

/// State protected by the entry lock.
pub(crate) struct NodeState {
    /// Committed URI of the current contents; absent while a new
    /// directory has never been uploaded.
    pub uri: Option<Uri>,
    pub meta: Meta,
    /// Local state differs from what `uri` represents. Implies cached.
    pub dirty: bool,
    pub body: Body,
}

impl NodeState {
    pub fn is_cached(&self) -> bool {
        match &self.body {
            Body::File { scratch } => scratch.is_some(),
            Body::Dir { children } => children.is_some(),
        }
    }

    pub fn children(&self) -> Option<&HashMap<String, Arc<Node>>> {
        match &self.body {
            Body::Dir { children } => children.as_ref(),
            Body::File { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut HashMap<String, Arc<Node>>> {
        match &mut self.body {
            Body::Dir { children } => children.as_mut(),
            Body::File { .. } => None,
        }
    }

    pub fn scratch(&self) -> Option<&NamedTempFile> {
        match &self.body {
            Body::File { scratch } => scratch.as_ref(),
            Body::Dir { .. } => None,
        }
    }

    /// Mutable access to a directory's child-map slot.
    pub fn children_slot(&mut self) -> Option<&mut Option<HashMap<String, Arc<Node>>>> {
        match &mut self.body {
            Body::Dir { children } => Some(children),
            Body::File { .. } => None,
        }
    }

    /// Mutable access to a file's scratch slot.
    pub fn scratch_slot(&mut self) -> Option<&mut Option<NamedTempFile>> {
        match &mut self.body {
            Body::File { scratch } => Some(scratch),
            Body::Dir { .. } => None,
        }
    }
}

/// One node (file or directory) currently of interest.
///
/// Reference counting is `Arc`: the registry holds the self-reference, a
/// parent's child map holds one reference per child, and live handles
/// hold the rest. When the last reference drops, the scratch file (if
/// any) is closed and unlinked.
///
/// Locking: `path` has its own mutex so walkers can read paths without
/// the entry lock; `state` is mutated only while the [`EntryLock`] is
/// held, which is what serialises observable transitions and may be held
/// across backend I/O. The state mutex itself guards only the individual
/// accesses and is never held across I/O.
pub struct Node {
    kind: NodeKind,
    path: Mutex<String>,
    lock: EntryLock,
    state: Mutex<NodeState>,
}

impl Node {
    fn build(kind: NodeKind, path: &str, state: NodeState) -> Arc<Node> {
        Arc::new(Node {
            kind,
            path: Mutex::new(path.to_owned()),
            lock: EntryLock::new(),
            state: Mutex::new(state),
        })
    }

    /// Node constructed from a directory listing: clean, not cached,
    /// committed URI known.
    pub(crate) fn from_listing(path: &str, kind: NodeKind, uri: Uri, meta: Meta) -> Arc<Node> {
        let body = match kind {
            NodeKind::File => Body::File { scratch: None },
            NodeKind::Dir => Body::Dir { children: None },
        };
        Node::build(kind, path, NodeState { uri: Some(uri), meta, dirty: false, body })
    }

    /// Freshly created file. Carries the empty-object sentinel URI, so it
    /// is clean until first write and publishable by its parent.
    pub(crate) fn new_file(path: &str, meta: Meta) -> Arc<Node> {
        Node::build(
            NodeKind::File,
            path,
            NodeState {
                uri: Some(Uri::empty_file().clone()),
                meta,
                dirty: false,
                body: Body::File { scratch: None },
            },
        )
    }

    /// Freshly created directory: no URI yet, cached empty child map,
    /// dirty until first republish.
    pub(crate) fn new_dir(path: &str, meta: Meta) -> Arc<Node> {
        Node::build(
            NodeKind::Dir,
            path,
            NodeState {
                uri: None,
                meta,
                dirty: true,
                body: Body::Dir { children: Some(HashMap::new()) },
            },
        )
    }

    /// Root entry for a mount: either an existing namespace addressed by
    /// `uri` or a fresh empty directory.
    pub(crate) fn root(uri: Option<Uri>) -> Arc<Node> {
        match uri {
            Some(uri) => Node::from_listing("/", NodeKind::Dir, uri, Meta::new()),
            None => Node::new_dir("/", Meta::new()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Copy of the current normalised path.
    pub fn path_get(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    /// Suffix of the path after the last separator; empty for the root.
    pub fn basename(&self) -> String {
        let path = self.path.lock().unwrap();
        match path.rfind('/') {
            Some(idx) => path[idx + 1..].to_owned(),
            None => path.clone(),
        }
    }

    /// Move the node to a new path. Only legal while the node is not
    /// registered, because the registry keys by path.
    pub(crate) fn path_set(&self, path: &str) {
        *self.path.lock().unwrap() = path.to_owned();
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn entry_lock(&self) -> &EntryLock {
        &self.lock
    }

    /// Whether local state has diverged from the committed URI.
    pub fn is_dirty(&self) -> bool {
        self.state().dirty
    }

    /// Whether local scratch state is populated.
    pub fn is_cached(&self) -> bool {
        self.state().is_cached()
    }

    /// Committed URI, if any.
    pub fn uri(&self) -> Option<Uri> {
        self.state().uri.clone()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("path", &self.path_get())
            .finish_non_exhaustive()
    }
}
