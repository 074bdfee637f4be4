//! Publishing a provider release to the registry.
//!
//! Loads the artifact manifest, creates the version with its checksum and
//! signature, then registers every archive as a platform, one at a time.

pub mod error;
pub mod orchestrator;

pub use error::PublishError;
pub use orchestrator::{PublishOrchestrator, PublishSummary};
