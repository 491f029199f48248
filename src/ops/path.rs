//! Path normalisation at the handler boundary.

use std::ffi::OsStr;
use std::path::Path;

use libc::c_int;

/// Normalise a dispatcher-supplied path: must be UTF-8 and rooted at
/// `/`; duplicate and trailing separators collapse away.
pub fn normalise(path: &Path) -> Result<String, c_int> {
    let raw = path.to_str().ok_or(libc::EINVAL)?;
    if !raw.starts_with('/') {
        return Err(libc::EINVAL);
    }
    let mut out = String::with_capacity(raw.len());
    for component in raw.split('/').filter(|c| !c.is_empty()) {
        out.push('/');
        out.push_str(component);
    }
    if out.is_empty() {
        out.push('/');
    }
    Ok(out)
}

/// Validate a dispatcher-supplied basename.
pub fn name(name: &OsStr) -> Result<&str, c_int> {
    let name = name.to_str().ok_or(libc::EINVAL)?;
    if name.is_empty() || name.contains('/') {
        return Err(libc::EINVAL);
    }
    Ok(name)
}

/// Normalise a parent path and join a basename onto it.
pub fn join(parent: &Path, child: &OsStr) -> Result<String, c_int> {
    let parent = normalise(parent)?;
    Ok(crate::tree::join(&parent, name(child)?))
}
