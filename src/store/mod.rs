//! Backend facade: opaque operations on content-addressed blobs.
//!
//! The core never talks to a concrete backend directly; everything goes
//! through the [`Store`] trait. Two implementations ship with the crate:
//! [`DiskStore`], a local object directory standing in for a networked
//! block store, and [`MemStore`], the test backend.

mod disk;
mod mem;
mod uri;


use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use disk::DiskStore;
pub use mem::MemStore;
pub use uri::{ParseUriError, Uri, DIGEST_LEN};

use crate::error::Result;

/// Routing and retention hints forwarded to the backend on publish.
/// Network backends interpret them; local backends ignore them.
#[derive(Debug, Clone, Copy)]
pub struct PublishOptions {
    /// Desired level of sender anonymity.
    pub anonymity: u32,
    /// Priority of the published content against replacement.
    pub priority: u32,
}

impl Default for PublishOptions {
    fn default() -> Self {
        PublishOptions { anonymity: 1, priority: 1000 }
    }
}

/// Process-wide cancellation predicate handed to long-running downloads.
///
/// Raised once at unmount. Downloads observe it and fail with
/// [`crate::error::Error::Shutdown`]; uploads do not, because the final
/// republish that persists the root URI runs after the flag is up.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Operations the core needs from a content-addressed backend.
///
/// Blobs are immutable; `put` of identical bytes always yields the same
/// URI. Duplication and destruction of URIs are plain `Clone`/`Drop`.
pub trait Store: Send + Sync {
    /// Upload a blob and return its URI.
    fn put(&self, data: &[u8], opts: &PublishOptions) -> Result<Uri>;

    /// Upload the contents of a local file (a scratch file) and return
    /// the resulting URI.
    fn put_file(&self, path: &Path, opts: &PublishOptions) -> Result<Uri>;

    /// Download a byte range of a blob. Returns a short buffer when the
    /// requested range crosses the end of the object.
    fn get_range(
        &self,
        uri: &Uri,
        offset: u64,
        len: usize,
        cancel: &CancelFlag,
    ) -> Result<Vec<u8>>;

    /// Download a whole blob into an open local file, starting at byte 0.
    fn get_to_file(&self, uri: &Uri, dest: &File, cancel: &CancelFlag) -> Result<()>;
}
