//! Adapter between the multi-threaded FUSE dispatcher and the handler
//! layer. Everything here is translation: path normalisation, attribute
//! struct conversion and errno plumbing.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use fuse_mt::{
    CallbackResult, DirectoryEntry, FileAttr, FileType, FilesystemMT, RequestInfo, ResultEmpty,
    ResultEntry, ResultOpen, ResultReaddir, ResultSlice, ResultStatfs, ResultWrite, Statfs,
};
use tracing::info;

use crate::ops;
use crate::tree::{Mount, NodeKind};

const TTL: Duration = Duration::from_secs(1);

/// The mounted filesystem.
pub struct CasFs {
    ctx: Arc<Mount>,
}

impl CasFs {
    pub fn new(ctx: Arc<Mount>) -> CasFs {
        CasFs { ctx }
    }
}

fn file_type(kind: NodeKind) -> FileType {
    match kind {
        NodeKind::File => FileType::RegularFile,
        NodeKind::Dir => FileType::Directory,
    }
}

fn fuse_attr(attr: ops::Attr) -> FileAttr {
    FileAttr {
        size: attr.size,
        blocks: attr.size.div_ceil(512),
        atime: attr.atime,
        mtime: attr.mtime,
        ctime: attr.ctime,
        crtime: SystemTime::UNIX_EPOCH,
        kind: file_type(attr.kind),
        perm: attr.perm,
        nlink: 1,
        uid: 0,
        gid: 0,
        rdev: 0,
        flags: 0,
    }
}

impl FilesystemMT for CasFs {
    fn init(&self, _req: RequestInfo) -> ResultEmpty {
        info!("filesystem initialised");
        Ok(())
    }

    fn destroy(&self) {
        info!("filesystem shutting down");
    }

    fn getattr(&self, _req: RequestInfo, path: &Path, _fh: Option<u64>) -> ResultEntry {
        let path = ops::path::normalise(path)?;
        let attr = ops::getattr(&self.ctx, &path)?;
        Ok((TTL, fuse_attr(attr)))
    }

    fn mknod(
        &self,
        _req: RequestInfo,
        parent: &Path,
        name: &OsStr,
        mode: u32,
        _rdev: u32,
    ) -> ResultEntry {
        let path = ops::path::join(parent, name)?;
        ops::mknod(&self.ctx, &path, mode)?;
        Ok((TTL, fuse_attr(ops::getattr(&self.ctx, &path)?)))
    }

    fn mkdir(&self, _req: RequestInfo, parent: &Path, name: &OsStr, _mode: u32) -> ResultEntry {
        let path = ops::path::join(parent, name)?;
        ops::mkdir(&self.ctx, &path)?;
        Ok((TTL, fuse_attr(ops::getattr(&self.ctx, &path)?)))
    }

    fn unlink(&self, _req: RequestInfo, parent: &Path, name: &OsStr) -> ResultEmpty {
        let path = ops::path::join(parent, name)?;
        ops::unlink(&self.ctx, &path)
    }

    fn rmdir(&self, _req: RequestInfo, parent: &Path, name: &OsStr) -> ResultEmpty {
        let path = ops::path::join(parent, name)?;
        ops::rmdir(&self.ctx, &path)
    }

    fn rename(
        &self,
        _req: RequestInfo,
        parent: &Path,
        name: &OsStr,
        newparent: &Path,
        newname: &OsStr,
    ) -> ResultEmpty {
        let from = ops::path::join(parent, name)?;
        let to = ops::path::join(newparent, newname)?;
        ops::rename(&self.ctx, &from, &to)
    }

    fn truncate(&self, _req: RequestInfo, path: &Path, _fh: Option<u64>, size: u64) -> ResultEmpty {
        let path = ops::path::normalise(path)?;
        ops::truncate(&self.ctx, &path, size)
    }

    fn utimens(
        &self,
        _req: RequestInfo,
        path: &Path,
        _fh: Option<u64>,
        atime: Option<SystemTime>,
        mtime: Option<SystemTime>,
    ) -> ResultEmpty {
        let path = ops::path::normalise(path)?;
        ops::utimens(&self.ctx, &path, atime, mtime)
    }

    fn open(&self, _req: RequestInfo, path: &Path, flags: u32) -> ResultOpen {
        let path = ops::path::normalise(path)?;
        ops::open(&self.ctx, &path, flags)?;
        Ok((0, flags))
    }

    fn read(
        &self,
        _req: RequestInfo,
        path: &Path,
        _fh: u64,
        offset: u64,
        size: u32,
        callback: impl FnOnce(ResultSlice<'_>) -> CallbackResult,
    ) -> CallbackResult {
        let path = match ops::path::normalise(path) {
            Ok(path) => path,
            Err(errno) => return callback(Err(errno)),
        };
        match ops::read(&self.ctx, &path, offset, size) {
            Ok(data) => callback(Ok(&data)),
            Err(errno) => callback(Err(errno)),
        }
    }

    fn write(
        &self,
        _req: RequestInfo,
        path: &Path,
        _fh: u64,
        offset: u64,
        data: Vec<u8>,
        _flags: u32,
    ) -> ResultWrite {
        let path = ops::path::normalise(path)?;
        ops::write(&self.ctx, &path, offset, &data)
    }

    fn flush(&self, _req: RequestInfo, _path: &Path, _fh: u64, _lock_owner: u64) -> ResultEmpty {
        Ok(())
    }

    fn release(
        &self,
        _req: RequestInfo,
        path: &Path,
        _fh: u64,
        _flags: u32,
        _lock_owner: u64,
        _flush: bool,
    ) -> ResultEmpty {
        let path = ops::path::normalise(path)?;
        ops::release(&self.ctx, &path)
    }

    fn fsync(&self, _req: RequestInfo, _path: &Path, _fh: u64, _datasync: bool) -> ResultEmpty {
        Ok(())
    }

    fn opendir(&self, _req: RequestInfo, _path: &Path, _flags: u32) -> ResultOpen {
        Ok((0, 0))
    }

    fn readdir(&self, _req: RequestInfo, path: &Path, _fh: u64) -> ResultReaddir {
        let path = ops::path::normalise(path)?;
        let entries = ops::readdir(&self.ctx, &path)?;
        Ok(entries
            .into_iter()
            .map(|(name, kind)| DirectoryEntry { name: name.into(), kind: file_type(kind) })
            .collect())
    }

    fn releasedir(&self, _req: RequestInfo, _path: &Path, _fh: u64, _flags: u32) -> ResultEmpty {
        Ok(())
    }

    fn statfs(&self, _req: RequestInfo, _path: &Path) -> ResultStatfs {
        Ok(Statfs {
            blocks: 0,
            bfree: 0,
            bavail: 0,
            files: 0,
            ffree: 0,
            bsize: 4096,
            namelen: 255,
            frsize: 4096,
        })
    }

    fn access(&self, _req: RequestInfo, _path: &Path, _mask: u32) -> ResultEmpty {
        Ok(())
    }
}
