//! Error types for artifact handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::ArtifactKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read artifact manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid artifact manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No artifact of {0} type found")]
    NotFound(ArtifactKind),
}

pub type Result<T> = std::result::Result<T, Error>;
