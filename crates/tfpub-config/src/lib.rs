//! Configuration for a tfpub run.
//!
//! This crate handles:
//! - Access to the CI execution context (repository, event, ref)
//! - Resolution of run inputs, including defaults derived from the context

pub mod context;
pub mod error;
pub mod inputs;

pub use context::{CiContext, GitHubContext};
pub use error::{ConfigError, ConfigResult};
pub use inputs::{DEFAULT_DIST_PATH, DEFAULT_REGISTRY_URL, Inputs, RawInputs};
