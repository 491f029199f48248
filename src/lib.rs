//! casfs - mount a content-addressed block store as a writable POSIX tree.
//!
//! The backend stores immutable blobs addressed by content-hash URIs; a
//! directory is a serialised listing of `{name, uri, metadata}` entries.
//! Every local modification therefore produces a new URI for the object
//! and, transitively, for every ancestor directory up to the root. The
//! crate keeps an in-memory tree cache between the multi-threaded FUSE
//! dispatcher and the high-latency backend: entries are deduplicated per
//! path, mutated under per-entry locks ordered root-to-leaf, staged
//! lazily, and republished when released.

pub mod config;
pub mod error;
pub mod fuse;
pub mod ops;
pub mod sidecar;
pub mod store;
pub mod tree;
pub mod wire;
