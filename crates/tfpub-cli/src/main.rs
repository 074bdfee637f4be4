//! tfpub: publish a Terraform provider release to a private registry.
//!
//! Meant to run as a CI step after the release build. Every input can be
//! given as a flag or through the `INPUT_*` variables GitHub Actions sets
//! for action inputs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tfpub_config::{GitHubContext, Inputs, RawInputs};
use tfpub_orchestrator::{PublishOrchestrator, PublishSummary};
use tfpub_registry::{RegistryClient, RegistryConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod report;

#[derive(Parser, Debug)]
#[command(name = "tfpub")]
#[command(
    about = "Publish Terraform provider artifacts to a private registry",
    long_about = None
)]
struct Cli {
    /// Artifact manifest as inline JSON
    #[arg(long, env = "INPUT_ARTIFACT-JSON")]
    artifact_json: Option<String>,

    /// Path to the artifact manifest
    #[arg(long, env = "INPUT_ARTIFACT-JSON-PATH")]
    artifact_json_path: Option<PathBuf>,

    /// Directory containing artifacts.json, used when no manifest is given [default: dist]
    #[arg(long, env = "INPUT_DIST-PATH")]
    dist_path: Option<PathBuf>,

    /// GPG key id to sign the version with; defaults to the namespace's first key
    #[arg(long, env = "INPUT_GPG-KEY-ID")]
    gpg_key_id: Option<String>,

    /// Registry namespace; defaults to the repository owner
    #[arg(long, env = "INPUT_NAMESPACE")]
    namespace: Option<String>,

    /// Provider name; defaults to the repository name without `terraform-provider-`
    #[arg(long, env = "INPUT_PROVIDER-NAME")]
    provider_name: Option<String>,

    /// Registry API token
    #[arg(long, env = "INPUT_ACCESS-TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Version to publish; defaults to the pushed tag
    #[arg(long, env = "INPUT_VERSION")]
    version: Option<String>,

    /// Registry API base URL [default: https://app.terraform.io]
    #[arg(long, env = "INPUT_REGISTRY-URL")]
    registry_url: Option<String>,
}

impl From<Cli> for RawInputs {
    fn from(cli: Cli) -> Self {
        Self {
            artifact_json: cli.artifact_json,
            artifact_json_path: cli.artifact_json_path,
            dist_path: cli.dist_path,
            gpg_key_id: cli.gpg_key_id,
            namespace: cli.namespace,
            provider_name: cli.provider_name,
            access_token: cli.access_token,
            version: cli.version,
            registry_url: cli.registry_url,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) => {
            info!(
                "Published {} with {} artifacts",
                summary.version, summary.archives
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            report::fail(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<PublishSummary> {
    let context = GitHubContext::from_env();
    debug!(repository = %context.full_repo_name(), "Read CI context");

    let inputs = Inputs::resolve(cli.into(), &context)?;
    debug!(?inputs, "Resolved inputs");

    let client = RegistryClient::new(RegistryConfig {
        base_url: inputs.registry_url.clone(),
        token: inputs.access_token.clone(),
        namespace: inputs.namespace.clone(),
        provider: inputs.provider.clone(),
        version: inputs.version.clone(),
    });
    let orchestrator = PublishOrchestrator::new(Arc::new(client));

    let summary = orchestrator
        .publish(
            &inputs.manifest,
            inputs.gpg_key_id.as_deref(),
            &inputs.version,
        )
        .await?;
    debug!("completed tfpub");
    Ok(summary)
}

fn init_tracing() {
    // Runner debug logging turns on our debug output too.
    let default_level = if std::env::var("RUNNER_DEBUG").as_deref() == Ok("1") {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}
