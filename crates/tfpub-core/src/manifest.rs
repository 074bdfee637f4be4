//! Loading the artifact manifest.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Artifact, Error, Result};

/// File name of the manifest inside a dist directory.
pub const MANIFEST_FILE_NAME: &str = "artifacts.json";

/// Where the artifact manifest comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// JSON passed directly as an input.
    Inline(String),
    /// JSON file on disk.
    File(PathBuf),
}

impl ManifestSource {
    /// The manifest written into a dist directory by the release build.
    pub fn dist(dir: impl AsRef<Path>) -> Self {
        Self::File(dir.as_ref().join(MANIFEST_FILE_NAME))
    }
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestSource::Inline(_) => f.write_str("supplied artifact-json input"),
            ManifestSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the artifacts listed by a manifest, in manifest order.
pub fn load_artifacts(source: &ManifestSource) -> Result<Vec<Artifact>> {
    debug!(%source, "Loading artifacts");
    match source {
        ManifestSource::Inline(json) => parse_artifacts(json),
        ManifestSource::File(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            parse_artifacts(&content)
        }
    }
}

/// Parse a JSON array of artifacts.
pub fn parse_artifacts(json: &str) -> Result<Vec<Artifact>> {
    Ok(serde_json::from_str(json)?)
}
