//! Serialised form of a directory listing.
//!
//! A directory blob is a sequence of big-endian, length-prefixed records,
//! one per child:
//!
//! ```text
//! blob   := magic(u32) version(u32) count(u32) record*
//! record := kind(u8: 0 file, 1 directory) uri(str) meta(u32 (str str)*)
//! str    := len(u32) utf-8 bytes
//! ```
//!
//! The child's name travels inside its metadata under the `filename` key;
//! directory records carry a trailing `/` on the name, which the parser
//! strips. Records without a `filename` key are skipped with a warning.


use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::warn;

use crate::error::{Error, Result};
use crate::store::Uri;
use crate::tree::{Meta, NodeKind, META_FILENAME};

/// `"CDIR"` as a big-endian word.
const MAGIC: u32 = 0x4344_4952;
const VERSION: u32 = 1;

/// Longest string the parser will allocate for (names, URIs, metadata).
const MAX_STR_LEN: usize = 64 * 1024;

/// One child of a directory, as carried by the wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Basename of the child, trailing separator already stripped.
    pub name: String,
    pub kind: NodeKind,
    pub uri: Uri,
    pub meta: Meta,
}

/// Serialise a listing into a directory blob.
pub fn build_listing(records: &[Record]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.write_u32::<BigEndian>(MAGIC)?;
    buf.write_u32::<BigEndian>(VERSION)?;
    buf.write_u32::<BigEndian>(records.len() as u32)?;
    for rec in records {
        buf.write_u8(match rec.kind {
            NodeKind::File => 0,
            NodeKind::Dir => 1,
        })?;
        string(&mut buf, &rec.uri.to_string())?;
        let mut meta = rec.meta.clone();
        let wire_name = match rec.kind {
            NodeKind::Dir => format!("{}/", rec.name),
            NodeKind::File => rec.name.clone(),
        };
        meta.insert(META_FILENAME, &wire_name);
        buf.write_u32::<BigEndian>(meta.len() as u32)?;
        for (key, value) in meta.iter() {
            string(&mut buf, key)?;
            string(&mut buf, value)?;
        }
    }
    Ok(buf)
}

/// Parse a directory blob back into its records.
pub fn parse_listing(data: &[u8]) -> Result<Vec<Record>> {
    let mut src = Cursor::new(data);
    if src.read_u32::<BigEndian>()? != MAGIC {
        return Err(Error::backend("directory blob has a bad magic number"));
    }
    if src.read_u32::<BigEndian>()? != VERSION {
        return Err(Error::backend("directory blob has an unknown version"));
    }
    let count = src.read_u32::<BigEndian>()?;
    let mut records = Vec::with_capacity(count.min(4096) as usize);
    for _ in 0..count {
        let kind = match src.read_u8()? {
            0 => NodeKind::File,
            1 => NodeKind::Dir,
            _ => return Err(Error::backend("directory record has an unknown kind")),
        };
        let uri: Uri = parse_string(&mut src)?
            .parse()
            .map_err(|_| Error::backend("directory record has a malformed uri"))?;
        let pairs = src.read_u32::<BigEndian>()?;
        let mut meta = Meta::new();
        for _ in 0..pairs {
            let key = parse_string(&mut src)?;
            let value = parse_string(&mut src)?;
            meta.insert(&key, &value);
        }
        let Some(raw_name) = meta.get(META_FILENAME).map(str::to_owned) else {
            warn!("directory record has no filename, skipping");
            continue;
        };
        let name = match kind {
            NodeKind::Dir => raw_name.trim_end_matches('/').to_owned(),
            NodeKind::File => raw_name,
        };
        if name.is_empty() || name.contains('/') {
            warn!(name = %name, "directory record has an unusable filename, skipping");
            continue;
        }
        records.push(Record { name, kind, uri, meta });
    }
    Ok(records)
}

fn string(dest: &mut Vec<u8>, s: &str) -> Result<()> {
    dest.write_u32::<BigEndian>(s.len() as u32)?;
    dest.write_all(s.as_bytes())?;
    Ok(())
}

fn parse_string(src: &mut Cursor<&[u8]>) -> Result<String> {
    let len = src.read_u32::<BigEndian>()? as usize;
    if len > MAX_STR_LEN {
        return Err(Error::backend("directory blob string exceeds limit"));
    }
    let mut buf = vec![0u8; len];
    src.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|_| Error::backend("directory blob string is not utf-8"))
}
