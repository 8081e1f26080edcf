// ABOUTME: Individual deploy steps: init, clone, describe, install, build,
// ABOUTME: down, migrate, cache, up, worker restart, and the health probe.

use async_trait::async_trait;
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::symlink;
use std::path::Path;

use crate::config::read_env_var;
use crate::diagnostics::{Diagnostics, Warning};
use crate::exec::{CommandExecutor, CommandLine, run_checked};
use crate::git;
use crate::output::Output;

use super::context::DeploymentContext;
use super::error::ReleaseError;

/// Ensure ancestor directories, create the release directory, and make
/// sure the live pointer resolves to something.
///
/// A legacy plain live directory is moved to a timestamped backup and
/// replaced by a symlink. When nothing is live yet, the live pointer is
/// linked at the brand-new release before any build step runs; a reader
/// arriving during a first-ever deploy can briefly see a partial release.
pub fn init(ctx: &DeploymentContext, output: &Output) -> Result<(), ReleaseError> {
    output.progress("Ensuring working directories exist");
    for dir in ctx.paths.required_dirs() {
        fs::create_dir_all(dir)?;
    }

    output.progress("Creating clone path");
    fs::create_dir_all(&ctx.paths.release)?;

    let live = &ctx.paths.live;
    match fs::symlink_metadata(live) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let target = fs::read_link(live)?;
            output.progress(&format!(
                "Live path is currently linked to {}",
                basename(&target)
            ));
        }
        Ok(meta) if meta.is_dir() => {
            output.progress(&format!(
                "Moving live path to {}",
                basename(&ctx.paths.backup)
            ));
            fs::rename(live, &ctx.paths.backup)?;
            symlink(&ctx.paths.backup, live)?;
        }
        Ok(_) => return Err(ReleaseError::LivePathObstructed(live.clone())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            output.progress("Making new current and linking it to this deploy");
            symlink(&ctx.paths.release, live)?;

            output.progress("Also linking public path");
            remove_existing(&ctx.paths.public_html)?;
            symlink(live.join("public"), &ctx.paths.public_html)?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Fetch the source and check out the resolved commit on a fresh
/// deployment branch.
pub async fn clone_source(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    output: &Output,
) -> Result<(), ReleaseError> {
    output.progress(&format!(
        "Cloning {} and checking out {}",
        ctx.remote, ctx.branch
    ));
    run_checked(
        executor,
        &git::clone_no_checkout(&ctx.remote, &ctx.paths.release),
    )
    .await?;

    output.progress(&format!(
        "Checking out {} as '{}'",
        ctx.commit,
        ctx.deploy_branch()
    ));
    run_checked(
        executor,
        &git::checkout_new_branch(&ctx.paths.release, &ctx.deploy_branch(), &ctx.commit),
    )
    .await?;

    output.progress("Fetching submodules");
    run_checked(executor, &git::submodule_update(&ctx.paths.release)).await?;

    Ok(())
}

/// Read-only diagnostic comparing the new release against the live one.
pub async fn describe(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    output: &Output,
) -> Result<(), ReleaseError> {
    let new_hash = run_checked(executor, &git::head_hash(&ctx.paths.release))
        .await?
        .stdout
        .trim()
        .to_string();
    let old_hash = run_checked(executor, &git::head_hash(&ctx.paths.live))
        .await?
        .stdout
        .trim()
        .to_string();

    let new_version = run_checked(
        executor,
        &git::head_summary(&ctx.paths.release, &ctx.log_format),
    )
    .await?;
    let old_version = run_checked(
        executor,
        &git::head_summary(&ctx.paths.live, &ctx.log_format),
    )
    .await?;

    output.progress(&format!("Currently live: {}", old_version.stdout.trim()));
    output.progress(&format!(
        "Currently deploying: {}",
        new_version.stdout.trim()
    ));

    output.progress("Changes since last version:");
    let range = executor
        .run(&git::log_range(
            &ctx.paths.release,
            &old_hash,
            &new_hash,
            &ctx.log_format,
        ))
        .await?;
    if range.success() && !range.stdout.trim().is_empty() {
        output.progress(range.stdout.trim_end());
    }

    Ok(())
}

/// Install frontend and backend dependencies with locked, offline-preferring
/// flags, link public storage, and generate an application key if missing.
pub async fn install(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    output: &Output,
) -> Result<(), ReleaseError> {
    let release = &ctx.paths.release;
    let cache = ctx.paths.app_root.join("cache");

    output.progress("Installing Yarn dependencies");
    run_checked(
        executor,
        &CommandLine::new("yarn")
            .cwd(release)
            .arg(format!("--cache-folder={}", cache.join("node").display()))
            .arg("--frozen-lockfile")
            .arg("--link-duplicates")
            .arg("--link-folder")
            .arg(cache.join("node-duplicates").display().to_string())
            .arg("--prefer-offline")
            .arg("install"),
    )
    .await?;

    output.progress("Installing Composer dependencies");
    run_checked(
        executor,
        &CommandLine::new("composer").cwd(release).args([
            "--classmap-authoritative",
            "--no-dev",
            "--no-interaction",
            "--no-progress",
            "--no-suggest",
            "install",
        ]),
    )
    .await?;

    output.progress("Linking public directory to storage");
    run_checked(executor, &artisan(release, &["storage:link"])).await?;

    let app_key = read_env_var(&ctx.paths.env_config, "APP_KEY")?;
    if app_key.as_deref().unwrap_or("").is_empty() {
        output.progress("Generating application key");
        run_checked(executor, &artisan(release, &["key:generate"])).await?;
    }

    Ok(())
}

/// Build front-end assets and drop the dependency directory.
pub async fn build(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    output: &Output,
) -> Result<(), ReleaseError> {
    output.progress("Building front-end");
    run_checked(
        executor,
        &CommandLine::new("yarn")
            .cwd(&ctx.paths.release)
            .args(["build", "--no-progress"]),
    )
    .await?;

    output.progress("Removing node_modules");
    remove_existing(&ctx.paths.release.join("node_modules"))?;

    Ok(())
}

/// Drain workers and place both releases into maintenance mode.
///
/// Worker drain and the maintenance toggles are best-effort; clearing the
/// live release's cached optimizations is not.
pub async fn down(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<(), ReleaseError> {
    output.progress("Stopping queue workers");
    tolerate(
        executor,
        &artisan(&ctx.paths.release, &["horizon:terminate", "--wait"]),
        diag,
        Warning::worker_control,
    )
    .await;

    output.progress("Pulling down platform");
    tolerate(
        executor,
        &artisan(&ctx.paths.release, &["down", "--retry=5"]),
        diag,
        Warning::maintenance,
    )
    .await;
    tolerate(
        executor,
        &artisan(&ctx.paths.live, &["down", "--retry=5"]),
        diag,
        Warning::maintenance,
    )
    .await;

    output.progress("Clearing optimizations");
    run_checked(executor, &artisan(&ctx.paths.live, &["optimize:clear"])).await?;

    Ok(())
}

/// Apply pending schema migrations; fatal on error and not blindly
/// re-runnable.
pub async fn migrate(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    output: &Output,
) -> Result<(), ReleaseError> {
    output.progress("Migrating database");
    run_checked(
        executor,
        &artisan(&ctx.paths.release, &["migrate", "--force"]),
    )
    .await?;
    Ok(())
}

/// Rebuild derived optimization caches on the new release.
pub async fn cache(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    output: &Output,
) -> Result<(), ReleaseError> {
    output.progress("Optimizing application");
    run_checked(executor, &artisan(&ctx.paths.release, &["optimize"])).await?;
    run_checked(executor, &artisan(&ctx.paths.release, &["event:cache"])).await?;
    Ok(())
}

/// Promote the new release: record the `_previous` backlink, swap the live
/// pointer, and lift maintenance mode.
pub async fn up(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    output: &Output,
) -> Result<(), ReleaseError> {
    let old_target = fs::canonicalize(&ctx.paths.live)?;

    let backlink = ctx.paths.release.join("_previous");
    remove_existing(&backlink)?;
    symlink(&old_target, &backlink)?;

    output.progress(&format!(
        "Switching from {} to {}",
        basename(&old_target),
        basename(&ctx.paths.release)
    ));
    point_live_at(&ctx.paths.live, &ctx.paths.release)?;

    output.progress("Going live");
    run_checked(executor, &artisan(&ctx.paths.release, &["up"])).await?;

    if let Some(url) = read_env_var(&ctx.paths.env_config, "APP_URL")? {
        output.progress(&format!("Application is live at {url}."));
    }

    Ok(())
}

/// Resume and purge the worker supervisor, then run the environment's
/// startup script. All best-effort.
pub async fn restart_workers(
    live: &Path,
    env: &str,
    executor: &dyn CommandExecutor,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<(), ReleaseError> {
    output.progress("Restarting queue workers");
    tolerate(
        executor,
        &artisan(live, &["horizon:continue"]),
        diag,
        Warning::worker_control,
    )
    .await;
    tolerate(
        executor,
        &artisan(live, &["horizon:purge"]),
        diag,
        Warning::worker_control,
    )
    .await;

    let script = live.join("resources/bin/start-horizon.sh");
    tolerate(
        executor,
        &CommandLine::new(script.display().to_string())
            .cwd(live)
            .arg(env),
        diag,
        Warning::worker_control,
    )
    .await;

    Ok(())
}

/// Probe the live release's configured URL over HTTP.
pub async fn health_check(
    live: &Path,
    probe: &dyn HealthProbe,
    output: &Output,
) -> Result<(), ReleaseError> {
    output.progress("Running health check...");

    let url = read_env_var(&live.join(".env"), "APP_URL")?
        .filter(|u| !u.is_empty())
        .ok_or(ReleaseError::MissingAppUrl)?;

    probe.probe(&url).await
}

/// HTTP probe capability; the production implementation follows redirects
/// and fails on any non-success status.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<(), ReleaseError>;
}

pub struct HttpProbe;

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, url: &str) -> Result<(), ReleaseError> {
        let response = reqwest::get(url)
            .await
            .map_err(|e| ReleaseError::HealthCheck(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| ReleaseError::HealthCheck(e.to_string()))?;
        Ok(())
    }
}

/// Repoint the live symlink via a staged link and an atomic rename, so an
/// external reader sees either the old or the new target, never neither.
pub fn point_live_at(live: &Path, target: &Path) -> std::io::Result<()> {
    let staged = live.with_extension("next");
    match fs::remove_file(&staged) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    symlink(target, &staged)?;
    fs::rename(&staged, live)
}

/// Build a framework CLI invocation rooted at a release directory.
pub(crate) fn artisan(dir: &Path, args: &[&str]) -> CommandLine {
    CommandLine::new("php")
        .cwd(dir)
        .arg("artisan")
        .args(args.iter().copied())
}

pub(crate) fn basename(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}

/// Remove a path whatever it is: file, symlink, or directory tree.
/// Missing paths are fine.
pub(crate) fn remove_existing(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Run a best-effort command, downgrading any failure to a warning.
async fn tolerate(
    executor: &dyn CommandExecutor,
    command: &CommandLine,
    diag: &mut Diagnostics,
    warning: fn(String) -> Warning,
) {
    if let Err(e) = run_checked(executor, command).await {
        diag.warn(warning(e.to_string()));
    }
}
