//! Publish orchestrator - drives the registry calls for one release.

use std::sync::Arc;

use tfpub_core::{
    Artifact, ArtifactKind, ManifestSource, Platform, artifact_path, count_of_kind, load_artifacts,
};
use tfpub_registry::Registry;
use tracing::{debug, info};

use crate::PublishError;

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSummary {
    pub version: String,
    /// Number of platform archives uploaded.
    pub archives: usize,
}

/// Publishes the artifacts of a release to a registry.
pub struct PublishOrchestrator {
    registry: Arc<dyn Registry>,
}

impl PublishOrchestrator {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    /// Publish `version` from the artifacts listed in `manifest`.
    ///
    /// Nothing is sent to the registry when the manifest lists no archives.
    /// Platforms are created in manifest order, each awaited before the next.
    pub async fn publish(
        &self,
        manifest: &ManifestSource,
        gpg_key_id: Option<&str>,
        version: &str,
    ) -> Result<PublishSummary, PublishError> {
        let artifacts = load_artifacts(manifest)?;

        let archives = count_of_kind(&artifacts, ArtifactKind::Archive);
        if archives == 0 {
            return Err(PublishError::NoArchives(manifest.clone()));
        }
        info!(
            artifacts = artifacts.len(),
            archives, version, "Publishing provider"
        );

        let checksum = artifact_path(&artifacts, ArtifactKind::Checksum)?;
        let signature = artifact_path(&artifacts, ArtifactKind::Signature)?;
        self.registry
            .create_version(checksum, signature, gpg_key_id)
            .await?;

        for artifact in &artifacts {
            let Artifact::Archive(archive) = artifact else {
                debug!(
                    kind = artifact.type_name(),
                    name = artifact.name(),
                    "Skipping artifact"
                );
                continue;
            };
            self.registry
                .create_platform(&Platform::from_archive(archive))
                .await?;
        }

        Ok(PublishSummary {
            version: version.to_string(),
            archives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tfpub_registry::{RegistryError, normalize_shasum};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        CreateVersion {
            checksum: PathBuf,
            signature: PathBuf,
            key_id: Option<String>,
        },
        CreatePlatform(Platform),
    }

    #[derive(Default)]
    struct MockRegistry {
        calls: Mutex<Vec<Call>>,
        fail_version: bool,
        fail_platform: Option<String>,
    }

    impl MockRegistry {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Registry for MockRegistry {
        async fn create_version(
            &self,
            checksum_path: &Path,
            signature_path: &Path,
            key_id: Option<&str>,
        ) -> tfpub_registry::Result<()> {
            self.calls.lock().unwrap().push(Call::CreateVersion {
                checksum: checksum_path.to_path_buf(),
                signature: signature_path.to_path_buf(),
                key_id: key_id.map(String::from),
            });
            if self.fail_version {
                return Err(RegistryError::Api("Failed to create version (422)".to_string()));
            }
            Ok(())
        }

        async fn create_platform(&self, platform: &Platform) -> tfpub_registry::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::CreatePlatform(platform.clone()));
            if self.fail_platform.as_deref() == Some(platform.filename.as_str()) {
                return Err(RegistryError::Request("connection reset".to_string()));
            }
            Ok(())
        }
    }

    async fn publish(
        orchestrator: &PublishOrchestrator,
        manifest: ManifestSource,
        gpg_key_id: Option<&str>,
    ) -> Result<PublishSummary, PublishError> {
        orchestrator.publish(&manifest, gpg_key_id, "1.0.0").await
    }

    fn inline(json: &str) -> ManifestSource {
        ManifestSource::Inline(json.to_string())
    }

    const SCENARIO: &str = r#"[
        {"type": "Checksum", "name": "c", "path": "c", "extra": {}},
        {"type": "Signature", "name": "s", "path": "s", "extra": {"ID": "k"}},
        {"type": "Archive", "goos": "linux", "goarch": "amd64", "name": "n", "path": "p",
         "extra": {"Checksum": "\"sha256:abc\""}}
    ]"#;

    #[tokio::test]
    async fn test_publish_scenario() {
        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());

        let summary = publish(&orchestrator, inline(SCENARIO), None)
            .await
            .unwrap();

        assert_eq!(
            summary,
            PublishSummary {
                version: "1.0.0".to_string(),
                archives: 1,
            }
        );

        let calls = registry.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::CreateVersion {
                checksum: PathBuf::from("c"),
                signature: PathBuf::from("s"),
                key_id: None,
            }
        );
        let Call::CreatePlatform(platform) = &calls[1] else {
            panic!("expected a platform call, got {:?}", calls[1]);
        };
        assert_eq!(platform.os, "linux");
        assert_eq!(platform.arch, "amd64");
        assert_eq!(platform.filename, "n");
        assert_eq!(platform.path, PathBuf::from("p"));
        assert_eq!(normalize_shasum(&platform.shasum), "abc");
    }

    #[tokio::test]
    async fn test_publish_passes_key_id() {
        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());

        publish(&orchestrator, inline(SCENARIO), Some("key-id1"))
            .await
            .unwrap();

        assert!(matches!(
            &registry.calls()[0],
            Call::CreateVersion { key_id: Some(k), .. } if k == "key-id1"
        ));
    }

    #[tokio::test]
    async fn test_publish_takes_only_what_it_uses() {
        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());

        let summary = orchestrator
            .publish(&inline(SCENARIO), Some("key-id2"), "2.3.4")
            .await
            .unwrap();

        assert_eq!(summary.version, "2.3.4");
        assert_eq!(registry.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_no_archives_inline() {
        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());
        let manifest = r#"[
            {"type": "Checksum", "name": "c", "path": "c"},
            {"type": "Binary", "name": "b", "path": "b", "goos": "linux", "goarch": "amd64"}
        ]"#;

        let err = publish(&orchestrator, inline(manifest), None)
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::NoArchives(_)));
        assert_eq!(
            err.to_string(),
            "No archives found to upload in supplied artifact-json input"
        );
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_archives_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("some-path.json");
        std::fs::write(&path, "[]").unwrap();

        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());

        let err = publish(&orchestrator, ManifestSource::File(path.clone()), None)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("No archives found to upload in {}", path.display())
        );
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_signature() {
        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());
        let manifest = r#"[
            {"type": "Checksum", "name": "c", "path": "c"},
            {"type": "Archive", "name": "n", "path": "p", "goos": "linux", "goarch": "amd64"}
        ]"#;

        let err = publish(&orchestrator, inline(manifest), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No artifact of Signature type found");
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_manifest() {
        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());
        let source = ManifestSource::File(PathBuf::from("does/not/exist/artifacts.json"));

        let err = publish(&orchestrator, source, None).await.unwrap_err();

        assert!(matches!(err, PublishError::Artifact(_)));
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_platforms_in_manifest_order() {
        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());
        let manifest = r#"[
            {"type": "Archive", "name": "linux.zip", "path": "dist/linux.zip", "goos": "linux", "goarch": "amd64", "extra": {"Checksum": "sha256:111"}},
            {"type": "Binary", "name": "bin", "path": "dist/bin", "goos": "linux", "goarch": "amd64"},
            {"type": "Checksum", "name": "sums", "path": "dist/sums"},
            {"type": "Signature", "name": "sig", "path": "dist/sig"},
            {"type": "Archive", "name": "darwin.zip", "path": "dist/darwin.zip", "goos": "darwin", "goarch": "arm64", "extra": {"Checksum": "sha256:222"}},
            {"type": "Archive", "name": "windows.zip", "path": "dist/windows.zip", "goos": "windows", "goarch": "386", "extra": {"Checksum": "sha256:333"}}
        ]"#;

        let summary = publish(&orchestrator, inline(manifest), Some("key"))
            .await
            .unwrap();
        assert_eq!(summary.archives, 3);

        let calls = registry.calls();
        assert!(matches!(calls[0], Call::CreateVersion { .. }));
        let filenames: Vec<_> = calls[1..]
            .iter()
            .map(|call| match call {
                Call::CreatePlatform(p) => p.filename.as_str(),
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        assert_eq!(filenames, vec!["linux.zip", "darwin.zip", "windows.zip"]);
    }

    #[tokio::test]
    async fn test_other_artifact_kinds_are_skipped() {
        let registry = Arc::new(MockRegistry::default());
        let orchestrator = PublishOrchestrator::new(registry.clone());
        let manifest = r#"[
            {"type": "Metadata", "name": "metadata.json", "path": "dist/metadata.json", "extra": null},
            {"type": "Uploadable File", "name": "xyz_1.0.0_manifest.json", "path": "terraform-registry-manifest.json"},
            {"type": "Checksum", "name": "sums", "path": "dist/sums", "extra": null},
            {"type": "Signature", "name": "sig", "path": "dist/sig"},
            {"type": "Archive", "name": "linux.zip", "path": "dist/linux.zip", "goos": "linux", "goarch": "amd64",
             "extra": {"Checksum": "sha256:111", "Builds": null, "Replaces": null}}
        ]"#;

        let summary = publish(&orchestrator, inline(manifest), None)
            .await
            .unwrap();
        assert_eq!(summary.archives, 1);

        let calls = registry.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::CreateVersion {
                checksum: PathBuf::from("dist/sums"),
                signature: PathBuf::from("dist/sig"),
                key_id: None,
            }
        );
        assert!(matches!(&calls[1], Call::CreatePlatform(p) if p.filename == "linux.zip"));
    }

    #[tokio::test]
    async fn test_version_failure_stops_publish() {
        let registry = Arc::new(MockRegistry {
            fail_version: true,
            ..Default::default()
        });
        let orchestrator = PublishOrchestrator::new(registry.clone());

        let err = publish(&orchestrator, inline(SCENARIO), None)
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Registry(_)));
        assert_eq!(err.to_string(), "API error: Failed to create version (422)");
        assert_eq!(registry.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_platform_failure_stops_remaining_platforms() {
        let registry = Arc::new(MockRegistry {
            fail_platform: Some("a.zip".to_string()),
            ..Default::default()
        });
        let orchestrator = PublishOrchestrator::new(registry.clone());
        let manifest = r#"[
            {"type": "Checksum", "name": "sums", "path": "sums"},
            {"type": "Signature", "name": "sig", "path": "sig"},
            {"type": "Archive", "name": "a.zip", "path": "a.zip", "goos": "linux", "goarch": "amd64"},
            {"type": "Archive", "name": "b.zip", "path": "b.zip", "goos": "linux", "goarch": "arm64"}
        ]"#;

        let err = publish(&orchestrator, inline(manifest), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Request failed: connection reset");
        assert_eq!(registry.calls().len(), 2);
    }
}
