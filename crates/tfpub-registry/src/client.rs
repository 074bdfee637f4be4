//! Registry API client.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tfpub_core::Platform;
use tracing::{debug, info};
use url::Url;

use crate::payload::{
    Document, GpgKeyList, LinksResponse, PLATFORM_RESOURCE, PlatformAttributes, PlatformLinks,
    VERSION_RESOURCE, VersionAttributes, VersionLinks,
};
use crate::{RegistryError, Result};

/// Plugin protocol version reported for every published version.
pub const PROTOCOL_VERSION: &str = "6.0";

const API_CONTENT_TYPE: &str = "application/vnd.api+json";
const UPLOAD_CONTENT_TYPE: &str = "text/plain";

/// Operations the publisher needs from a provider registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Create the provider version and upload its checksum file and signature.
    ///
    /// When `key_id` is absent or empty the first signing key of the
    /// namespace is used.
    async fn create_version(
        &self,
        checksum_path: &Path,
        signature_path: &Path,
        key_id: Option<&str>,
    ) -> Result<()>;

    /// Register a platform for the version and upload its archive.
    async fn create_platform(&self, platform: &Platform) -> Result<()>;
}

/// Coordinates of the provider version being published.
#[derive(Clone)]
pub struct RegistryConfig {
    pub base_url: Url,
    pub token: String,
    pub namespace: String,
    pub provider: String,
    pub version: String,
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .field("namespace", &self.namespace)
            .field("provider", &self.provider)
            .field("version", &self.version)
            .finish()
    }
}

/// Terraform Cloud registry client.
pub struct RegistryClient {
    client: reqwest::Client,
    config: RegistryConfig,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Key id of the first GPG key registered for the namespace.
    pub async fn first_key_id(&self) -> Result<String> {
        let namespace = &self.config.namespace;
        debug!(%namespace, "Fetching first GPG key");

        let request = self
            .api_request(Method::GET, "api/registry/private/v2/gpg-keys")
            .query(&[("filter[namespace]", namespace.as_str())]);
        let keys: GpgKeyList = send_json(request, "list GPG keys").await?;

        keys.data
            .into_iter()
            .next()
            .map(|key| key.attributes.key_id)
            .ok_or_else(|| RegistryError::NoKeys(namespace.clone()))
    }

    fn versions_path(&self) -> String {
        format!(
            "api/v2/organizations/{ns}/registry-providers/private/{ns}/{provider}/versions",
            ns = self.config.namespace,
            provider = self.config.provider,
        )
    }

    fn api_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!(
            "{}/{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path
        );
        self.client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header(CONTENT_TYPE, API_CONTENT_TYPE)
    }

    async fn post<A: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        document: &Document<A>,
        action: &str,
    ) -> Result<T> {
        // `json` keeps the JSON:API content type already set on the request.
        let request = self.api_request(Method::POST, path).json(document);
        send_json(request, action).await
    }

    /// Stream a local file to a pre-signed upload URL.
    async fn upload(&self, url: &str, path: &Path) -> Result<()> {
        debug!(path = %path.display(), url, "Uploading file");

        let io_error = |source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = tokio::fs::File::open(path).await.map_err(io_error)?;
        // Pre-signed object store URLs reject chunked bodies.
        let len = file.metadata().await.map_err(io_error)?.len();

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
            .header(CONTENT_LENGTH, len)
            .body(file)
            .send()
            .await
            .map_err(|e| RegistryError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api(format!(
                "Failed to upload {} ({}): {}",
                path.display(),
                status,
                text
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Registry for RegistryClient {
    async fn create_version(
        &self,
        checksum_path: &Path,
        signature_path: &Path,
        key_id: Option<&str>,
    ) -> Result<()> {
        let version = &self.config.version;
        info!(%version, "Creating version");

        let key_id = match key_id.filter(|k| !k.is_empty()) {
            Some(key_id) => key_id.to_string(),
            None => self.first_key_id().await?,
        };

        let path = self.versions_path();
        let document = Document::new(
            VERSION_RESOURCE,
            VersionAttributes {
                version,
                key_id: &key_id,
                protocols: vec![PROTOCOL_VERSION],
            },
        );
        let created: LinksResponse<VersionLinks> =
            self.post(&path, &document, "create version").await?;
        debug!(%path, "Version created");

        let links = created.data.links;
        self.upload(&links.shasums_upload, checksum_path).await?;
        self.upload(&links.shasums_sig_upload, signature_path).await?;

        info!(%version, "Version published");
        Ok(())
    }

    async fn create_platform(&self, platform: &Platform) -> Result<()> {
        let shasum = normalize_shasum(&platform.shasum);
        info!(
            os = %platform.os,
            arch = %platform.arch,
            filename = %platform.filename,
            shasum,
            "Creating platform"
        );

        let path = format!(
            "{}/{}/platforms",
            self.versions_path(),
            self.config.version
        );
        let document = Document::new(
            PLATFORM_RESOURCE,
            PlatformAttributes {
                os: &platform.os,
                arch: &platform.arch,
                shasum,
                filename: &platform.filename,
            },
        );
        let created: LinksResponse<PlatformLinks> =
            self.post(&path, &document, "create platform").await?;
        debug!(%path, "Platform created");

        self.upload(&created.data.links.provider_binary_upload, &platform.path)
            .await?;

        info!(
            os = %platform.os,
            arch = %platform.arch,
            filename = %platform.filename,
            "Platform published"
        );
        Ok(())
    }
}

/// Strip the `sha256:` prefix, and any quotes around the value, from a
/// manifest checksum.
pub fn normalize_shasum(shasum: &str) -> &str {
    let shasum = shasum.strip_prefix('"').unwrap_or(shasum);
    let shasum = shasum.strip_prefix("sha256:").unwrap_or(shasum);
    shasum.strip_suffix('"').unwrap_or(shasum)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder, action: &str) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| RegistryError::Request(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(RegistryError::Api(format!(
            "Failed to {} ({}): {}",
            action, status, text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| RegistryError::Parse(e.to_string()))
}
