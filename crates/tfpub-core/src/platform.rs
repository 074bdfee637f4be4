//! Platform descriptor for a single provider archive.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::artifact::ArchiveArtifact;

/// An OS/architecture build of the provider, ready to be registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub os: String,
    pub arch: String,
    /// Checksum as found in the manifest, possibly `sha256:` prefixed.
    pub shasum: String,
    pub filename: String,
    /// Local archive to upload.
    pub path: PathBuf,
}

impl Platform {
    pub fn from_archive(archive: &ArchiveArtifact) -> Self {
        Self {
            os: archive.goos.clone(),
            arch: archive.goarch.clone(),
            shasum: archive.extra.checksum.clone(),
            filename: archive.name.clone(),
            path: archive.path.clone(),
        }
    }
}
