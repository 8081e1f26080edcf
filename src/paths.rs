// ABOUTME: Filesystem path derivation for a deploy: release, live link, storage, backups.
// ABOUTME: Pure functions of (base, domain, deploy name); no I/O happens here.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Format a UTC timestamp as a deploy name.
///
/// Second precision, lexicographically sortable; retention pruning relies
/// on the sort order matching chronological order.
pub fn deploy_name(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d--%H-%M-%S").to_string()
}

/// Reduce a branch name to a filesystem-safe slug: lowercase, runs of
/// non-alphanumeric characters collapsed to a single hyphen, no leading
/// or trailing hyphen.
pub fn branch_slug(branch: &str) -> String {
    let lower = branch.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut pending_hyphen = false;
    for c in lower.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Every path a release run touches, derived once from the deploy inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPaths {
    pub domain_root: PathBuf,
    pub app_root: PathBuf,
    pub releases_root: PathBuf,
    pub release: PathBuf,
    pub live: PathBuf,
    pub public_html: PathBuf,
    pub env_config: PathBuf,
    pub storage_root: PathBuf,
    pub backup: PathBuf,
}

impl DeployPaths {
    /// Identical inputs always yield identical paths; distinct deploy
    /// names always yield distinct release paths.
    pub fn resolve(base: &Path, domain: &str, deploy_name: &str) -> Self {
        let domain_root = base.join(domain);
        let app_root = domain_root.join("app");
        let releases_root = app_root.join("deployments");

        Self {
            release: releases_root.join(deploy_name),
            live: app_root.join("live"),
            public_html: domain_root.join("public_html"),
            env_config: app_root.join("environment").join("config.env"),
            storage_root: app_root.join("storage"),
            backup: releases_root.join(format!("backup-{deploy_name}")),
            domain_root,
            app_root,
            releases_root,
        }
    }

    /// Ancestor directories that must exist before a deploy can start.
    pub fn required_dirs(&self) -> Vec<&Path> {
        let mut dirs = vec![self.app_root.as_path(), self.releases_root.as_path()];
        if let Some(parent) = self.env_config.parent() {
            dirs.push(parent);
        }
        dirs
    }
}
