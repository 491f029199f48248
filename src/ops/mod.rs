//! POSIX operation handlers.
//!
//! One module per operation, each a thin translation from a normalised
//! path plus arguments to core calls, returning the errno the FUSE
//! dispatcher expects on failure.

pub mod path;

mod getattr;
mod mkdir;
mod mknod;
mod open;
mod read;
mod readdir;
mod release;
mod rename;
mod rmdir;
mod truncate;
mod unlink;
mod utimens;
mod write;

pub use getattr::{getattr, Attr};
pub use mkdir::mkdir;
pub use mknod::mknod;
pub use open::open;
pub use read::read;
pub use readdir::readdir;
pub use release::release;
pub use rename::rename;
pub use rmdir::rmdir;
pub use truncate::truncate;
pub use unlink::unlink;
pub use utimens::utimens;
pub use write::write;
