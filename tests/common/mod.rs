#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use casfs::ops;
use casfs::store::{MemStore, PublishOptions, Uri};
use casfs::tree::{special, Mount, MountOptions};

/// A mount over a shared in-memory backend, with synthetic `.uri`
/// entries enabled.
pub struct Fixture {
    pub ctx: Arc<Mount>,
    pub store: Arc<MemStore>,
    _scratch: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_backend(Arc::new(MemStore::new()), None)
    }

    pub fn with_backend(store: Arc<MemStore>, root_uri: Option<Uri>) -> Self {
        let scratch = TempDir::new().expect("create scratch dir");
        let ctx = Mount::new(
            store.clone(),
            root_uri,
            MountOptions {
                publish: PublishOptions::default(),
                uri_files: true,
                scratch_dir: scratch.path().to_path_buf(),
            },
        );
        Fixture { ctx, store, _scratch: scratch }
    }

    /// Force a root republish and return the committed root URI, the way
    /// unmount does before writing the sidecar.
    pub fn root_uri(&self) -> Uri {
        let contents = special::read(&self.ctx, "/.uri")
            .expect("republish root")
            .expect("/.uri is synthetic");
        contents.trim().parse().expect("parse root uri")
    }

    /// Mount the persisted namespace again over the same backend.
    pub fn remount(&self) -> Self {
        let uri = self.root_uri();
        Self::with_backend(self.store.clone(), Some(uri))
    }

    pub fn mkdir(&self, path: &str) {
        ops::mkdir(&self.ctx, path).expect("mkdir succeeds");
    }

    pub fn mknod(&self, path: &str) {
        ops::mknod(&self.ctx, path, libc::S_IFREG | 0o644).expect("mknod succeeds");
    }

    pub fn write(&self, path: &str, data: &[u8]) {
        let written = ops::write(&self.ctx, path, 0, data).expect("write succeeds");
        assert_eq!(written as usize, data.len());
    }

    pub fn release(&self, path: &str) {
        ops::release(&self.ctx, path).expect("release succeeds");
    }

    pub fn read(&self, path: &str, offset: u64, size: u32) -> Vec<u8> {
        ops::read(&self.ctx, path, offset, size).expect("read succeeds")
    }

    pub fn readdir_names(&self, path: &str) -> Vec<String> {
        ops::readdir(&self.ctx, path)
            .expect("readdir succeeds")
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }
}
