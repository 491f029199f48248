//! Local object-directory backend.
//!
//! Blobs live under `<root>/objects/<hh>/<hex digest>.<size>` where `hh`
//! is the first digest byte, keeping directory fan-out bounded. Publishes
//! write to a temporary file and rename it into place, so a blob is
//! either fully present or absent. The directory can sit on shared
//! storage; the content addressing makes concurrent publishers of the
//! same bytes converge on the same object path.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

use super::{CancelFlag, PublishOptions, Store, Uri};

pub struct DiskStore {
    objects: PathBuf,
}

impl DiskStore {
    /// Open (creating if needed) an object directory rooted at `root`.
    pub fn open(root: &Path) -> Result<DiskStore> {
        let objects = root.join("objects");
        fs::create_dir_all(&objects)?;
        Ok(DiskStore { objects })
    }

    fn object_path(&self, uri: &Uri) -> PathBuf {
        let hex = uri.digest_hex();
        self.objects.join(&hex[..2]).join(format!("{}.{}", &hex[2..], uri.size()))
    }

    fn publish(&self, data: &[u8]) -> Result<Uri> {
        let uri = Uri::of(data);
        let dest = self.object_path(&uri);
        if dest.exists() {
            return Ok(uri);
        }
        let parent = dest.parent().expect("object path has a shard directory");
        fs::create_dir_all(parent)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(data)?;
        tmp.persist(&dest).map_err(|e| Error::Io(e.error))?;
        debug!(uri = %uri, "published blob");
        Ok(uri)
    }

    fn open_object(&self, uri: &Uri) -> Result<File> {
        File::open(self.object_path(uri))
            .map_err(|_| Error::backend("blob not present in object directory"))
    }
}

impl Store for DiskStore {
    fn put(&self, data: &[u8], _opts: &PublishOptions) -> Result<Uri> {
        self.publish(data)
    }

    fn put_file(&self, path: &Path, _opts: &PublishOptions) -> Result<Uri> {
        let data = fs::read(path)?;
        self.publish(&data)
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
        if offset >= uri.size() {
            return Ok(Vec::new());
        }
        // Never-written files carry the empty-object sentinel, which no
        // one has actually published.
        if uri.size() == 0 {
            return Ok(Vec::new());
        }
        let want = len.min((uri.size() - offset) as usize);
        let mut file = self.open_object(uri)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; want];
        let mut read = 0;
        while read < want {
            let n = file.read(&mut buf[read..])?;
            if n == 0 {
                break;
            }
            read += n;
        }
        buf.truncate(read);
        Ok(buf)
    }

    fn get_to_file(&self, uri: &Uri, dest: &File, cancel: &CancelFlag) -> Result<()> {
        if cancel.is_set() {
            return Err(Error::Shutdown);
        }
        if uri.size() == 0 {
            return Ok(());
        }
        let mut src = self.open_object(uri)?;
        let mut buf = Vec::new();
        src.read_to_end(&mut buf)?;
        dest.write_all_at(&buf, 0)?;
        Ok(())
    }
}
