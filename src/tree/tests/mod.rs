mod dir_engine;
mod registry_walk;
mod special_files;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use crate::error::Result;
use crate::ops;
use crate::store::{CancelFlag, MemStore, PublishOptions, Store, Uri};

use super::{special, Mount, MountOptions};

/// A mount over a `MemStore` with synthetic entries enabled.
pub(crate) struct Fixture {
    pub ctx: Arc<Mount>,
    pub store: Arc<MemStore>,
    _scratch: TempDir,
}

impl Fixture {
    pub fn new() -> Fixture {
        Fixture::with_backend(Arc::new(MemStore::new()), None)
    }

    pub fn with_backend(store: Arc<MemStore>, root_uri: Option<Uri>) -> Fixture {
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

    /// Republish the root and mount the persisted namespace again over
    /// the same backend, with a fresh registry.
    pub fn remount(&self) -> Fixture {
        let uri = self.root_uri();
        Fixture::with_backend(self.store.clone(), Some(uri))
    }

    /// Force a root republish and return the committed root URI.
    pub fn root_uri(&self) -> Uri {
        let contents = special::read(&self.ctx, "/.uri")
            .expect("republish root")
            .expect("/.uri is synthetic");
        contents.trim().parse().expect("parse root uri")
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
}

/// Store wrapper whose uploads can be made to fail, for exercising the
/// dirty-preservation paths.
pub(crate) struct FlakyStore {
    inner: MemStore,
    fail_puts: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> FlakyStore {
        FlakyStore { inner: MemStore::new(), fail_puts: AtomicBool::new(false) }
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            Err(crate::error::Error::backend("injected upload failure"))
        } else {
            Ok(())
        }
    }
}

impl Store for FlakyStore {
    fn put(&self, data: &[u8], opts: &PublishOptions) -> Result<Uri> {
        self.check()?;
        self.inner.put(data, opts)
    }

    fn put_file(&self, path: &Path, opts: &PublishOptions) -> Result<Uri> {
        self.check()?;
        self.inner.put_file(path, opts)
    }

    fn get_range(&self, uri: &Uri, offset: u64, len: usize, cancel: &CancelFlag) -> Result<Vec<u8>> {
        self.inner.get_range(uri, offset, len, cancel)
    }

    fn get_to_file(&self, uri: &Uri, dest: &std::fs::File, cancel: &CancelFlag) -> Result<()> {
        self.inner.get_to_file(uri, dest, cancel)
    }
}

/// Fixture over a `FlakyStore`.
pub(crate) fn flaky_fixture() -> (Arc<Mount>, Arc<FlakyStore>, TempDir) {
    let store = Arc::new(FlakyStore::new());
    let scratch = TempDir::new().expect("create scratch dir");
    let ctx = Mount::new(
        store.clone(),
        None,
        MountOptions {
            publish: PublishOptions::default(),
            uri_files: true,
            scratch_dir: scratch.path().to_path_buf(),
        },
    );
    (ctx, store, scratch)
}
