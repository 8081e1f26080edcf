// ABOUTME: One-level rollback to the release recorded in the _previous backlink.
// ABOUTME: Guard failures exit without mutating any filesystem state.

use std::fs;

use crate::exec::{CommandExecutor, run_checked};
use crate::output::Output;
use crate::paths::DeployPaths;

use super::error::ReleaseError;
use super::steps::{artisan, basename, point_live_at};

/// Context for a rollback or standalone health-check run.
#[derive(Debug, Clone)]
pub struct RollbackContext {
    pub paths: DeployPaths,
    /// Environment name handed to the worker startup script.
    pub env: String,
}

/// Repoint the live symlink at the previous release.
///
/// Refused without touching anything when no backlink exists, when the
/// previous release was pruned, or when it is already the live target.
pub async fn run_rollback(
    ctx: &RollbackContext,
    executor: &dyn CommandExecutor,
    output: &Output,
) -> Result<(), ReleaseError> {
    let live = &ctx.paths.live;
    let backlink = live.join("_previous");

    let is_link = fs::symlink_metadata(&backlink)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return Err(ReleaseError::RollbackUnsupported);
    }

    if !backlink.join("artisan").exists() {
        return Err(ReleaseError::PreviousPruned);
    }

    let previous = fs::canonicalize(&backlink)?;
    let current = fs::canonicalize(live)?;
    if previous == current {
        return Err(ReleaseError::AlreadyLatest);
    }

    output.progress("Going dark");
    run_checked(executor, &artisan(live, &["down", "--retry=5"])).await?;

    output.progress(&format!("Rolling back to {}", basename(&previous)));
    point_live_at(live, &previous)?;

    output.progress("Re-running caching");
    run_checked(executor, &artisan(live, &["optimize:clear"])).await?;
    run_checked(executor, &artisan(live, &["optimize"])).await?;
    run_checked(executor, &artisan(live, &["event:cache"])).await?;

    output.progress("Going back online");
    run_checked(executor, &artisan(live, &["up"])).await?;

    output.progress(&format!("Rolled back to {}", basename(&previous)));
    Ok(())
}
