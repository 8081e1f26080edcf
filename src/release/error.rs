// ABOUTME: Error types for release operations.
// ABOUTME: Covers external command failures, filesystem state, and rollback guards.

use std::path::PathBuf;
use thiserror::Error;

use crate::exec::ExecError;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Command(#[from] ExecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The live path exists but is neither a directory nor a symlink.
    #[error("live path {0} exists and cannot be migrated to a symlink")]
    LivePathObstructed(PathBuf),

    #[error("Rollback not supported for this release")]
    RollbackUnsupported,

    #[error("Previous release has been pruned")]
    PreviousPruned,

    #[error("Already at latest version")]
    AlreadyLatest,

    #[error("APP_URL is not set in the environment config")]
    MissingAppUrl,

    #[error("health check failed: {0}")]
    HealthCheck(String),
}
