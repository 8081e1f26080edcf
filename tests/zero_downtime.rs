// ABOUTME: Integration tests for the live-pointer switch and rollback guards.
// ABOUTME: Covers promotion, backlink creation, and refusal cases.

mod support;

use golive::release::{ReleaseError, RollbackContext, run_rollback, up};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use support::{ScriptedExecutor, quiet_output, test_context};

/// Build a promoted release directory with an artisan entry point.
fn make_release(releases_root: &Path, name: &str) -> PathBuf {
    let release = releases_root.join(name);
    fs::create_dir_all(&release).unwrap();
    fs::write(release.join("artisan"), "#!/usr/bin/env php\n").unwrap();
    release
}

struct Sandbox {
    _temp: tempfile::TempDir,
    base: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path().to_path_buf();
        Self { _temp: temp, base }
    }
}

#[tokio::test]
async fn up_switches_live_and_records_backlink() {
    let sandbox = Sandbox::new();
    let ctx = test_context(&sandbox.base, "2026-08-05--11-00-00");
    fs::create_dir_all(&ctx.paths.app_root).unwrap();

    let old = make_release(&ctx.paths.releases_root, "2026-08-05--10-00-00");
    make_release(&ctx.paths.releases_root, "2026-08-05--11-00-00");
    symlink(&old, &ctx.paths.live).unwrap();

    if let Some(parent) = ctx.paths.env_config.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&ctx.paths.env_config, "APP_URL=https://testing.example.com\n").unwrap();

    let executor = ScriptedExecutor::new();
    up(&ctx, &executor, &quiet_output()).await.unwrap();

    assert_eq!(fs::read_link(&ctx.paths.live).unwrap(), ctx.paths.release);
    assert_eq!(
        fs::canonicalize(ctx.paths.release.join("_previous")).unwrap(),
        fs::canonicalize(&old).unwrap()
    );
    assert!(executor.ran("php artisan up"));
}

#[tokio::test]
async fn rollback_restores_previous_and_refuses_twice() {
    let sandbox = Sandbox::new();
    let ctx = test_context(&sandbox.base, "2026-08-05--11-00-00");
    fs::create_dir_all(&ctx.paths.app_root).unwrap();

    // First deploy promoted itself, so its backlink is a self-link.
    let first = make_release(&ctx.paths.releases_root, "2026-08-05--10-00-00");
    symlink(&first, first.join("_previous")).unwrap();

    // Second deploy is live with a backlink to the first.
    let second = make_release(&ctx.paths.releases_root, "2026-08-05--11-00-00");
    symlink(&first, second.join("_previous")).unwrap();
    symlink(&second, &ctx.paths.live).unwrap();

    let rb = RollbackContext {
        paths: ctx.paths.clone(),
        env: "local".to_string(),
    };
    let executor = ScriptedExecutor::new();

    run_rollback(&rb, &executor, &quiet_output()).await.unwrap();
    assert_eq!(
        fs::canonicalize(&rb.paths.live).unwrap(),
        fs::canonicalize(&first).unwrap()
    );
    assert!(executor.ran("php artisan down --retry=5"));
    assert!(executor.ran("php artisan optimize:clear"));
    assert!(executor.ran("php artisan up"));

    // The first release's backlink points at itself, so a second rollback
    // is refused without touching the pointer.
    let err = run_rollback(&rb, &executor, &quiet_output())
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::AlreadyLatest));
    assert_eq!(err.to_string(), "Already at latest version");
    assert_eq!(
        fs::canonicalize(&rb.paths.live).unwrap(),
        fs::canonicalize(&first).unwrap()
    );
}

#[tokio::test]
async fn rollback_without_backlink_is_refused() {
    let sandbox = Sandbox::new();
    let ctx = test_context(&sandbox.base, "2026-08-05--11-00-00");
    fs::create_dir_all(&ctx.paths.app_root).unwrap();

    let only = make_release(&ctx.paths.releases_root, "2026-08-05--10-00-00");
    symlink(&only, &ctx.paths.live).unwrap();

    let rb = RollbackContext {
        paths: ctx.paths.clone(),
        env: "local".to_string(),
    };
    let executor = ScriptedExecutor::new();

    let err = run_rollback(&rb, &executor, &quiet_output())
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::RollbackUnsupported));
    assert_eq!(err.to_string(), "Rollback not supported for this release");
    // Nothing ran, nothing moved.
    assert!(executor.calls().is_empty());
    assert_eq!(
        fs::canonicalize(&rb.paths.live).unwrap(),
        fs::canonicalize(&only).unwrap()
    );
}

#[tokio::test]
async fn rollback_to_pruned_release_is_refused() {
    let sandbox = Sandbox::new();
    let ctx = test_context(&sandbox.base, "2026-08-05--11-00-00");
    fs::create_dir_all(&ctx.paths.app_root).unwrap();

    let live_release = make_release(&ctx.paths.releases_root, "2026-08-05--11-00-00");
    // Backlink points at a release directory that no longer exists.
    symlink(
        ctx.paths.releases_root.join("2026-08-01--10-00-00"),
        live_release.join("_previous"),
    )
    .unwrap();
    symlink(&live_release, &ctx.paths.live).unwrap();

    let rb = RollbackContext {
        paths: ctx.paths.clone(),
        env: "local".to_string(),
    };
    let executor = ScriptedExecutor::new();

    let err = run_rollback(&rb, &executor, &quiet_output())
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::PreviousPruned));
    assert_eq!(err.to_string(), "Previous release has been pruned");
    assert!(executor.calls().is_empty());
}
