//! Publish errors.

use tfpub_core::ManifestSource;
use tfpub_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Artifact(#[from] tfpub_core::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("No archives found to upload in {0}")]
    NoArchives(ManifestSource),
}
