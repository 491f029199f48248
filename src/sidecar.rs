//! The sidecar file persisting the root URI across mounts.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::store::Uri;

/// Read the root URI from a sidecar file. `Ok(None)` when the file does
/// not exist yet (a fresh namespace).
pub fn load(path: &Path) -> Result<Option<Uri>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(Error::Io(err)),
    };
    let uri = raw
        .trim()
        .parse::<Uri>()
        .map_err(|_| Error::backend("sidecar does not contain a parsable uri"))?;
    info!(sidecar = %path.display(), uri = %uri, "loaded root uri");
    Ok(Some(uri))
}

/// Persist the root URI, truncating any previous contents.
pub fn save(path: &Path, uri: &Uri) -> Result<()> {
    fs::write(path, format!("{uri}\n"))?;
    info!(sidecar = %path.display(), uri = %uri, "saved root uri");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sidecars_mean_a_fresh_namespace() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = dir.path().join("root.uri");
        assert!(load(&path).expect("load runs").is_none());
    }

    #[test]
    fn saved_uris_load_back() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = dir.path().join("root.uri");
        let uri = Uri::of(b"a root listing");

        save(&path, &uri).expect("save succeeds");
        assert_eq!(load(&path).expect("load succeeds"), Some(uri.clone()));
        // The on-disk form is the URI plus a newline, nothing else.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{uri}\n"));

        // Saving again truncates.
        let other = Uri::of(b"another listing");
        save(&path, &other).expect("second save succeeds");
        assert_eq!(load(&path).expect("reload succeeds"), Some(other));
    }

    #[test]
    fn garbage_sidecars_are_reported() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = dir.path().join("root.uri");
        std::fs::write(&path, "not a uri\n").unwrap();
        assert!(load(&path).is_err());
    }
}
