//! JSON:API documents exchanged with the registry.

use serde::{Deserialize, Serialize};

pub(crate) const VERSION_RESOURCE: &str = "registry-provider-versions";
pub(crate) const PLATFORM_RESOURCE: &str = "registry-provider-version-platforms";

/// Request document wrapping a single resource.
#[derive(Debug, Serialize)]
pub(crate) struct Document<A> {
    pub data: Resource<A>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Resource<A> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: A,
}

impl<A> Document<A> {
    pub fn new(kind: &'static str, attributes: A) -> Self {
        Self {
            data: Resource { kind, attributes },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct VersionAttributes<'a> {
    pub version: &'a str,
    #[serde(rename = "key-id")]
    pub key_id: &'a str,
    pub protocols: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlatformAttributes<'a> {
    pub os: &'a str,
    pub arch: &'a str,
    pub shasum: &'a str,
    pub filename: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GpgKeyList {
    #[serde(default)]
    pub data: Vec<GpgKey>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GpgKey {
    pub attributes: GpgKeyAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GpgKeyAttributes {
    #[serde(rename = "key-id")]
    pub key_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinksResponse<L> {
    pub data: LinksData<L>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinksData<L> {
    pub links: L,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionLinks {
    #[serde(rename = "shasums-upload")]
    pub shasums_upload: String,
    #[serde(rename = "shasums-sig-upload")]
    pub shasums_sig_upload: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlatformLinks {
    #[serde(rename = "provider-binary-upload")]
    pub provider_binary_upload: String,
}
