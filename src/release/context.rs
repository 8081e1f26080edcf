// ABOUTME: Immutable per-run deployment context passed to every step.
// ABOUTME: Built once by the setup phase; steps never mutate shared state.

use crate::config::{EnvironmentConfig, StorageMap};
use crate::paths::DeployPaths;

/// One-line git log format used for release descriptions.
pub const LOG_FORMAT: &str = "%h %s (%cr, %cn)";

/// Everything a deploy step needs, resolved before the first step runs.
#[derive(Debug, Clone)]
pub struct DeploymentContext {
    /// Clone URL of the repository being deployed.
    pub remote: String,
    /// Canonical branch name (validated against the safety pattern).
    pub branch: String,
    /// Filesystem-safe slug of the branch name.
    pub branch_slug: String,
    /// Tag identity when this is a tagged deploy.
    pub tag: Option<String>,
    pub environment: EnvironmentConfig,
    /// The fixed commit hash all steps operate on.
    pub commit: String,
    /// Timestamp-derived deploy name (UTC, second precision).
    pub deploy_name: String,
    pub paths: DeployPaths,
    pub storage_map: StorageMap,
    /// How many release directories retention pruning keeps.
    pub keep_releases: usize,
    pub log_format: String,
}

impl DeploymentContext {
    /// Name of the branch the release is checked out on.
    pub fn deploy_branch(&self) -> String {
        format!("deployment/{}-{}", self.branch_slug, self.deploy_name)
    }

    pub fn is_tag(&self) -> bool {
        self.tag.is_some()
    }
}
