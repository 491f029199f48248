//! Optional TOML configuration file. CLI flags take precedence over
//! anything set here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreSection,
    pub mount: MountSection,
    pub scratch: ScratchSection,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    /// Root of the object directory backing the mount.
    pub objects: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MountSection {
    pub anonymity: Option<u32>,
    pub priority: Option<u32>,
    /// Make the synthetic `.uri` entries visible in listings.
    pub uri_files: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScratchSection {
    /// Directory where file contents are staged while modified.
    pub dir: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|err| {
            Error::Io(std::io::Error::other(format!("bad config file: {err}")))
        })
    }
}
