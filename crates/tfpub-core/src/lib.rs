//! Core domain types for tfpub.
//!
//! This crate contains:
//! - The artifact model produced by a release build (archives, binaries,
//!   checksums, signatures)
//! - Manifest loading from inline JSON or a file
//! - Classification helpers used to pick artifacts by kind
//! - The platform value handed to the registry client

pub mod artifact;
pub mod error;
pub mod manifest;
pub mod platform;

pub use artifact::{Artifact, ArtifactKind, OtherArtifact, artifact_path, count_of_kind};
pub use error::{Error, Result};
pub use manifest::{MANIFEST_FILE_NAME, ManifestSource, load_artifacts};
pub use platform::Platform;
