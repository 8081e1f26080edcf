// ABOUTME: Retention pruning of old release directories.
// ABOUTME: Keeps the lexicographically-newest N deploy-named directories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::output::Output;

use super::error::ReleaseError;

/// How many release directories survive a cleanup.
pub const KEEP_RELEASES: usize = 4;

/// Delete release directories beyond the retention count.
///
/// Only deploy-named directories (starting with `20`) are considered, so
/// legacy backups and anything else under the releases root are never
/// touched. Returns the removed paths.
pub fn prune_releases(
    releases_root: &Path,
    keep: usize,
    output: &Output,
) -> Result<Vec<PathBuf>, ReleaseError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(releases_root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("20") && entry.file_type()?.is_dir() {
            names.push(name);
        }
    }
    names.sort();

    let excess = names.len().saturating_sub(keep);
    let mut removed = Vec::with_capacity(excess);
    for name in names.into_iter().take(excess) {
        let path = releases_root.join(name);
        fs::remove_dir_all(&path)?;
        removed.push(path);
    }

    output.progress(&format!("Cleaned up {} old deployment(s)", removed.len()));
    Ok(removed)
}
