//! CI execution context.
//!
//! The publisher only needs a handful of facts about the run that triggered
//! it. They are read through [`CiContext`] so input resolution can be tested
//! without a real CI environment.

/// Read-only view of the CI run.
pub trait CiContext {
    /// Owner of the repository being built.
    fn repo_owner(&self) -> &str;

    /// Repository name without the owner.
    fn repo_name(&self) -> &str;

    /// Name of the event that triggered the run, e.g. `push`.
    fn event_name(&self) -> &str;

    /// Kind of ref that triggered the run, `branch` or `tag`.
    fn ref_type(&self) -> &str;

    /// Short name of the triggering ref, e.g. `v1.2.3`.
    fn ref_name(&self) -> &str;

    /// Whether the run was triggered by pushing a tag.
    fn is_tag_push(&self) -> bool {
        self.event_name() == "push" && self.ref_type() == "tag"
    }
}

/// GitHub Actions context, populated from the runner's environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHubContext {
    pub owner: String,
    pub repo: String,
    pub event_name: String,
    pub ref_type: String,
    pub ref_name: String,
}

impl GitHubContext {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the context from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let full_name = var("GITHUB_REPOSITORY").unwrap_or_default();
        let (owner, repo) = match full_name.split_once('/') {
            Some((owner, repo)) => (owner.to_string(), repo.to_string()),
            None => (String::new(), full_name),
        };

        Self {
            owner: var("GITHUB_REPOSITORY_OWNER").unwrap_or(owner),
            repo,
            event_name: var("GITHUB_EVENT_NAME").unwrap_or_default(),
            ref_type: var("GITHUB_REF_TYPE").unwrap_or_default(),
            ref_name: var("GITHUB_REF_NAME").unwrap_or_default(),
        }
    }

    /// `owner/repo` form of the repository.
    pub fn full_repo_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl CiContext for GitHubContext {
    fn repo_owner(&self) -> &str {
        &self.owner
    }

    fn repo_name(&self) -> &str {
        &self.repo
    }

    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn ref_type(&self) -> &str {
        &self.ref_type
    }

    fn ref_name(&self) -> &str {
        &self.ref_name
    }
}
