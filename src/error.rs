//! Error kinds surfaced by the core and their errno mapping.

use crate::tree::NodeKind;

/// Result of core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Compact error kinds returned by core functions. Handlers translate
/// these to POSIX error codes, overriding the default mapping where an
/// operation calls for a more specific errno.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No entry matches a path component.
    #[error("no such entry")]
    NotFound,
    /// Insert over an existing basename.
    #[error("entry already exists")]
    Exists,
    /// The operation targets a directory where a file is required, or
    /// the other way around. `expected` is the kind the operation needed.
    #[error("expected a {expected}")]
    WrongKind { expected: NodeKind },
    /// Removal or rename-target replacement of a populated directory.
    #[error("directory not empty")]
    NotEmpty,
    /// Backend upload/download failed or local scratch I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Non-regular mknod, synthetic-path mutation and similar.
    #[error("operation not supported")]
    Unsupported,
    /// A long operation observed the closing flag.
    #[error("shutting down")]
    Shutdown,
}

impl Error {
    /// Map an error kind to its default POSIX errno.
    pub fn errno(&self) -> libc::c_int {
        match self {
            Error::NotFound => libc::ENOENT,
            Error::Exists => libc::EEXIST,
            Error::WrongKind { expected: NodeKind::File } => libc::EISDIR,
            Error::WrongKind { expected: NodeKind::Dir } => libc::ENOTDIR,
            Error::NotEmpty => libc::ENOTEMPTY,
            Error::Io(_) => libc::EIO,
            Error::Unsupported => libc::ENOTSUP,
            Error::Shutdown => libc::EIO,
        }
    }

    /// Shorthand for a backend failure that carries no useful io::Error.
    pub fn backend(msg: &str) -> Error {
        Error::Io(std::io::Error::other(msg.to_owned()))
    }
}
