//! Run inputs and their defaults.
//!
//! Inputs are resolved once at startup. Anything not supplied explicitly is
//! derived from the [`CiContext`]:
//! - `namespace` defaults to the repository owner
//! - `provider-name` defaults to the repository name minus `terraform-provider-`
//! - `version` defaults to the tag name, but only when a tag push triggered the run
//!
//! A single leading `v` is always stripped from the version.

use std::fmt;
use std::path::PathBuf;

use tfpub_core::ManifestSource;
use tracing::debug;
use url::Url;

use crate::{CiContext, ConfigError, ConfigResult};

/// Registry API used when no other is configured.
pub const DEFAULT_REGISTRY_URL: &str = "https://app.terraform.io";

/// Directory holding `artifacts.json` when no manifest input is given.
pub const DEFAULT_DIST_PATH: &str = "dist";

const PROVIDER_REPO_PREFIX: &str = "terraform-provider-";

pub const ARTIFACT_JSON: &str = "artifact-json";
pub const ARTIFACT_JSON_PATH: &str = "artifact-json-path";
pub const ACCESS_TOKEN: &str = "access-token";
pub const NAMESPACE: &str = "namespace";
pub const PROVIDER_NAME: &str = "provider-name";
pub const VERSION: &str = "version";
pub const REGISTRY_URL: &str = "registry-url";

/// Inputs as supplied by the CI step, before defaults are applied.
///
/// Empty strings are treated the same as missing values.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub artifact_json: Option<String>,
    pub artifact_json_path: Option<PathBuf>,
    pub dist_path: Option<PathBuf>,
    pub gpg_key_id: Option<String>,
    pub namespace: Option<String>,
    pub provider_name: Option<String>,
    pub access_token: Option<String>,
    pub version: Option<String>,
    pub registry_url: Option<String>,
}

/// Fully resolved inputs for a run.
#[derive(Clone)]
pub struct Inputs {
    pub access_token: String,
    pub namespace: String,
    pub provider: String,
    pub version: String,
    /// Signing key registered with the version; looked up when absent.
    pub gpg_key_id: Option<String>,
    pub manifest: ManifestSource,
    pub registry_url: Url,
}

impl Inputs {
    pub fn resolve(raw: RawInputs, ctx: &dyn CiContext) -> ConfigResult<Self> {
        let access_token = non_empty(raw.access_token)
            .ok_or_else(|| ConfigError::MissingInput(ACCESS_TOKEN.to_string()))?;

        let manifest = resolve_manifest(
            non_empty(raw.artifact_json),
            non_empty_path(raw.artifact_json_path),
            non_empty_path(raw.dist_path),
        )?;

        let namespace = match non_empty(raw.namespace) {
            Some(namespace) => namespace,
            None => {
                let namespace = ctx.repo_owner().to_string();
                debug!(%namespace, "namespace not supplied, using repository owner");
                namespace
            }
        };
        if namespace.is_empty() {
            return Err(ConfigError::MissingInput(NAMESPACE.to_string()));
        }

        let provider = match non_empty(raw.provider_name) {
            Some(provider) => provider,
            None => {
                let provider = provider_from_repo(ctx.repo_name()).to_string();
                debug!(%provider, "provider-name not supplied, using repository name");
                provider
            }
        };
        if provider.is_empty() {
            return Err(ConfigError::MissingInput(PROVIDER_NAME.to_string()));
        }

        let version = match non_empty(raw.version) {
            Some(version) => version,
            None => {
                if !ctx.is_tag_push() {
                    return Err(ConfigError::MissingInput(VERSION.to_string()));
                }
                let version = ctx.ref_name().to_string();
                debug!(%version, "version not supplied, using tag name");
                version
            }
        };
        let version = strip_version_prefix(&version).to_string();
        if version.is_empty() {
            return Err(ConfigError::MissingInput(VERSION.to_string()));
        }

        let registry_url = non_empty(raw.registry_url)
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());
        let registry_url = Url::parse(&registry_url).map_err(|e| ConfigError::InvalidValue {
            field: REGISTRY_URL.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            access_token,
            namespace,
            provider,
            version,
            gpg_key_id: non_empty(raw.gpg_key_id),
            manifest,
            registry_url,
        })
    }
}

impl fmt::Debug for Inputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inputs")
            .field("access_token", &"[REDACTED]")
            .field("namespace", &self.namespace)
            .field("provider", &self.provider)
            .field("version", &self.version)
            .field("gpg_key_id", &self.gpg_key_id)
            .field("manifest", &self.manifest)
            .field("registry_url", &self.registry_url.as_str())
            .finish()
    }
}

fn resolve_manifest(
    json: Option<String>,
    json_path: Option<PathBuf>,
    dist_path: Option<PathBuf>,
) -> ConfigResult<ManifestSource> {
    match (json, json_path) {
        (Some(_), Some(_)) => Err(ConfigError::Conflict(
            ARTIFACT_JSON.to_string(),
            ARTIFACT_JSON_PATH.to_string(),
        )),
        (Some(json), None) => Ok(ManifestSource::Inline(json)),
        (None, Some(path)) => Ok(ManifestSource::File(path)),
        (None, None) => Ok(ManifestSource::dist(
            dist_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_PATH)),
        )),
    }
}

/// Trimmed value, `None` when blank.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value
        .map(|p| match p.to_str() {
            Some(s) => PathBuf::from(s.trim()),
            None => p,
        })
        .filter(|p| !p.as_os_str().is_empty())
}

fn provider_from_repo(repo: &str) -> &str {
    repo.strip_prefix(PROVIDER_REPO_PREFIX).unwrap_or(repo)
}

fn strip_version_prefix(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}
