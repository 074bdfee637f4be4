//! Client for the Terraform Cloud private provider registry.
//!
//! Publishing a provider version takes three kinds of calls:
//! - look up a signing key for the namespace (only when none is given)
//! - create the version, then upload the checksum file and its signature
//! - create each platform, then upload its archive
//!
//! Every create call answers with pre-signed upload URLs that the client
//! follows with a plain `PUT` of the file contents.

mod client;
mod error;
mod payload;

pub use client::{PROTOCOL_VERSION, Registry, RegistryClient, RegistryConfig, normalize_shasum};
pub use error::{RegistryError, Result};
