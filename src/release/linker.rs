// ABOUTME: Shared-resource linking: environment config and persistent storage.
// ABOUTME: Replaces release-local directories with symlinks into the storage root.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::fs::symlink;
use std::path::Path;

use crate::output::Output;

use super::context::DeploymentContext;
use super::error::ReleaseError;
use super::steps::remove_existing;

/// Bootstrap the shared environment config from the release's template if
/// absent, then symlink it into the release as `.env`.
///
/// The config holds secrets, so a freshly created file gets mode 0600.
pub fn link_environment(ctx: &DeploymentContext, output: &Output) -> Result<(), ReleaseError> {
    let env_path = &ctx.paths.env_config;

    if !env_path.exists() {
        output.progress("Creating new environment config");
        if let Some(parent) = env_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(ctx.paths.release.join(".env.example"), env_path)?;
        fs::set_permissions(env_path, fs::Permissions::from_mode(0o600))?;
    }

    output.progress("Linking environment config");
    let dot_env = ctx.paths.release.join(".env");
    remove_existing(&dot_env)?;
    symlink(env_path, dot_env)?;

    Ok(())
}

/// Relocate every configured storage path out of the release tree and into
/// the persistent storage root, leaving a symlink behind.
///
/// Idempotent across releases and re-runs: a storage-root copy is seeded
/// only when absent; an existing copy is left untouched even when the
/// release's version differs.
pub fn link_storage(ctx: &DeploymentContext, output: &Output) -> Result<(), ReleaseError> {
    let storage_root = &ctx.paths.storage_root;
    if !storage_root.is_dir() {
        output.progress("Creating new storage directory");
        fs::create_dir_all(storage_root)?;
    }

    for (in_release, in_storage) in &ctx.storage_map {
        output.progress(&format!(
            "Setting up {in_release} to link with {in_storage}"
        ));

        let release_side = ctx.paths.release.join(in_release.trim_start_matches('/'));
        let storage_side = storage_root.join(in_storage);

        // Pseudo-directories may only exist once the app has run.
        if fs::symlink_metadata(&release_side).is_err() {
            output.progress("+ Creating directory in deployment");
            fs::create_dir_all(&release_side)?;
        }

        if !storage_side.exists() {
            output.progress("+ Copying source");
            copy_dir_all(&release_side, &storage_side)?;
        }

        output.progress("+ Removing dir from deployment");
        remove_existing(&release_side)?;

        output.progress("+ Re-linking to storage");
        symlink(&storage_side, &release_side)?;
    }

    Ok(())
}

fn copy_dir_all(src: &Path, dest: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
