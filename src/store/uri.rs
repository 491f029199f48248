//! Content-hash identifiers for immutable blobs.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use data_encoding::HEXLOWER;
use ring::digest;

/// Number of bytes in a blob digest (SHA-256).
pub const DIGEST_LEN: usize = 32;

const SCHEME: &str = "cas://chk/";

/// Opaque content-hash identifier for an immutable blob in the backend,
/// rendered as `cas://chk/<hex digest>.<size>`.
///
/// The size of the addressed object is carried inside the URI itself, so
/// callers can report file sizes without touching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    digest: [u8; DIGEST_LEN],
    size: u64,
}

impl Uri {
    /// Build a URI from a known digest and object size.
    pub fn new(digest: [u8; DIGEST_LEN], size: u64) -> Uri {
        Uri { digest, size }
    }

    /// Hash `data` and return the URI it would be stored under.
    pub fn of(data: &[u8]) -> Uri {
        let hash = digest::digest(&digest::SHA256, data);
        let mut raw = [0u8; DIGEST_LEN];
        raw.copy_from_slice(hash.as_ref());
        Uri::new(raw, data.len() as u64)
    }

    /// The well-known URI of the zero-length object. Used as the sentinel
    /// for freshly created files that have never been written.
    pub fn empty_file() -> &'static Uri {
        static EMPTY: OnceLock<Uri> = OnceLock::new();
        EMPTY.get_or_init(|| Uri::of(&[]))
    }

    /// Byte length of the addressed object.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Raw digest of the addressed object.
    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Lowercase hex rendering of the digest.
    pub fn digest_hex(&self) -> String {
        HEXLOWER.encode(&self.digest)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{}", SCHEME, self.digest_hex(), self.size)
    }
}

/// Failure to parse a URI string.
#[derive(Debug, thiserror::Error)]
#[error("malformed uri: {0}")]
pub struct ParseUriError(String);

impl FromStr for Uri {
    type Err = ParseUriError;

    fn from_str(s: &str) -> Result<Uri, ParseUriError> {
        let bad = || ParseUriError(s.to_owned());
        let rest = s.strip_prefix(SCHEME).ok_or_else(bad)?;
        let (hex, size) = rest.split_once('.').ok_or_else(bad)?;
        let raw = HEXLOWER.decode(hex.as_bytes()).map_err(|_| bad())?;
        let digest: [u8; DIGEST_LEN] = raw.try_into().map_err(|_| bad())?;
        let size = size.parse::<u64>().map_err(|_| bad())?;
        Ok(Uri::new(digest, size))
    }
}
