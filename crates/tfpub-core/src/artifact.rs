//! Build artifacts listed in a release manifest.
//!
//! Each entry in the manifest is tagged by its `type` field. The tag selects
//! which payload shape is read from `extra`; fields belonging to other kinds
//! are never looked at.

use std::path::{Path, PathBuf};

use derive_more::Display;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// The kind of a build artifact the publisher knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ArtifactKind {
    Archive,
    Binary,
    Checksum,
    Signature,
}

/// A single build output described by the manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// A platform archive that gets published to the registry.
    Archive(ArchiveArtifact),
    /// A raw provider binary.
    Binary(BinaryArtifact),
    /// The checksum file covering all archives.
    Checksum(ChecksumArtifact),
    /// Detached signature of the checksum file.
    Signature(SignatureArtifact),
    /// Any other build output, e.g. `Uploadable File`. Loaded, never published.
    Other(OtherArtifact),
}

impl Artifact {
    /// Known kind of the artifact, `None` for [`Artifact::Other`].
    pub fn kind(&self) -> Option<ArtifactKind> {
        match self {
            Artifact::Archive(_) => Some(ArtifactKind::Archive),
            Artifact::Binary(_) => Some(ArtifactKind::Binary),
            Artifact::Checksum(_) => Some(ArtifactKind::Checksum),
            Artifact::Signature(_) => Some(ArtifactKind::Signature),
            Artifact::Other(_) => None,
        }
    }

    /// The `type` tag as written in the manifest.
    pub fn type_name(&self) -> &str {
        match self {
            Artifact::Archive(_) => "Archive",
            Artifact::Binary(_) => "Binary",
            Artifact::Checksum(_) => "Checksum",
            Artifact::Signature(_) => "Signature",
            Artifact::Other(a) => &a.kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Artifact::Archive(a) => &a.name,
            Artifact::Binary(a) => &a.name,
            Artifact::Checksum(a) => &a.name,
            Artifact::Signature(a) => &a.name,
            Artifact::Other(a) => &a.name,
        }
    }

    /// Local filesystem location of the artifact.
    pub fn path(&self) -> &Path {
        match self {
            Artifact::Archive(a) => &a.path,
            Artifact::Binary(a) => &a.path,
            Artifact::Checksum(a) => &a.path,
            Artifact::Signature(a) => &a.path,
            Artifact::Other(a) => &a.path,
        }
    }

    pub fn as_archive(&self) -> Option<&ArchiveArtifact> {
        match self {
            Artifact::Archive(a) => Some(a),
            _ => None,
        }
    }
}

// Dispatch on `type` by hand so unknown kinds load as `Other` instead of
// failing the whole manifest.
impl<'de> Deserialize<'de> for Artifact {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| <D::Error as de::Error>::missing_field("type"))?;

        let artifact = match kind.as_str() {
            "Archive" => serde_json::from_value(value).map(Artifact::Archive),
            "Binary" => serde_json::from_value(value).map(Artifact::Binary),
            "Checksum" => serde_json::from_value(value).map(Artifact::Checksum),
            "Signature" => serde_json::from_value(value).map(Artifact::Signature),
            _ => serde_json::from_value(value).map(Artifact::Other),
        };
        artifact.map_err(de::Error::custom)
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveArtifact {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: PathBuf,
    #[serde(deserialize_with = "null_as_default")]
    pub goos: String,
    #[serde(deserialize_with = "null_as_default")]
    pub goarch: String,
    #[serde(deserialize_with = "null_as_default")]
    pub extra: ArchiveExtra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ArchiveExtra {
    #[serde(rename = "ID", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub binaries: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub builds: Vec<Build>,
    /// sha256 of the archive, usually prefixed with `sha256:`.
    #[serde(deserialize_with = "null_as_default")]
    pub checksum: String,
    #[serde(deserialize_with = "null_as_default")]
    pub format: String,
    pub replaces: serde_json::Value,
    #[serde(deserialize_with = "null_as_default")]
    pub wrapped_in: String,
}

/// A binary bundled into an archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Build {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: PathBuf,
    #[serde(deserialize_with = "null_as_default")]
    pub goos: String,
    #[serde(deserialize_with = "null_as_default")]
    pub goarch: String,
    #[serde(deserialize_with = "null_as_default")]
    pub extra: BinaryExtra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryArtifact {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: PathBuf,
    #[serde(deserialize_with = "null_as_default")]
    pub goos: String,
    #[serde(deserialize_with = "null_as_default")]
    pub goarch: String,
    #[serde(deserialize_with = "null_as_default")]
    pub extra: BinaryExtra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct BinaryExtra {
    #[serde(rename = "ID", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub binary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ext: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksumArtifact {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: PathBuf,
    /// Unused by the publisher; kept as-is.
    #[serde(deserialize_with = "null_as_default")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureArtifact {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: PathBuf,
    #[serde(deserialize_with = "null_as_default")]
    pub extra: SignatureExtra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureExtra {
    #[serde(rename = "ID", deserialize_with = "null_as_default")]
    pub id: String,
}

/// An artifact of a kind the publisher does not use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherArtifact {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: PathBuf,
}

/// Path of the first artifact of the given kind.
///
/// Later artifacts of the same kind are ignored.
pub fn artifact_path(artifacts: &[Artifact], kind: ArtifactKind) -> Result<&Path> {
    artifacts
        .iter()
        .find(|artifact| artifact.kind() == Some(kind))
        .map(Artifact::path)
        .ok_or(Error::NotFound(kind))
}

/// Number of artifacts of the given kind.
pub fn count_of_kind(artifacts: &[Artifact], kind: ArtifactKind) -> usize {
    artifacts.iter().filter(|a| a.kind() == Some(kind)).count()
}
