//! In-memory backend used by the test suite.

use std::collections::HashMap;
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{Error, Result};

use super::{CancelFlag, PublishOptions, Store, Uri};

/// A `Store` holding every published blob in a map, plus a publish
/// counter that tests use to assert how many republishes an operation
/// caused.
#[derive(Default)]
pub struct MemStore {
    blobs: Mutex<HashMap<Uri, Vec<u8>>>,
    puts: Mutex<u64>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }

    /// Number of uploads performed so far.
    pub fn put_count(&self) -> u64 {
        *self.puts.lock().unwrap()
    }

    /// Whether a blob with this URI has been published.
    pub fn contains(&self, uri: &Uri) -> bool {
        self.blobs.lock().unwrap().contains_key(uri)
    }

    fn fetch(&self, uri: &Uri) -> Result<Vec<u8>> {
        if uri.size() == 0 {
            // The empty-object sentinel is fetchable without a publish.
            return Ok(Vec::new());
        }
        self.blobs
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or_else(|| Error::backend("blob not present in memory store"))
    }
}

impl Store for MemStore {
    fn put(&self, data: &[u8], _opts: &PublishOptions) -> Result<Uri> {
        let uri = Uri::of(data);
        self.blobs.lock().unwrap().insert(uri.clone(), data.to_vec());
        *self.puts.lock().unwrap() += 1;
        Ok(uri)
    }

    fn put_file(&self, path: &Path, opts: &PublishOptions) -> Result<Uri> {
        let data = std::fs::read(path)?;
        self.put(&data, opts)
    }

    fn get_range(
        &self,
        uri: &Uri,
        offset: u64,
        len: usize,
        cancel: &CancelFlag,
    ) -> Result<Vec<u8>> {
        if cancel.is_set() {
            return Err(Error::Shutdown);
        }
        let data = self.fetch(uri)?;
        if offset >= data.len() as u64 {
            return Ok(Vec::new());
        }
        let start = offset as usize;
        let end = (start + len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    fn get_to_file(&self, uri: &Uri, dest: &File, cancel: &CancelFlag) -> Result<()> {
        if cancel.is_set() {
            return Err(Error::Shutdown);
        }
        let data = self.fetch(uri)?;
        dest.write_all_at(&data, 0)?;
        Ok(())
    }
}
