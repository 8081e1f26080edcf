// ABOUTME: Command module aggregator for the golive CLI.
// ABOUTME: Re-exports deploy, rollback, and health-check command handlers.

mod deploy;
mod health_check;
mod rollback;

pub use deploy::{DeployArgs, deploy};
pub use health_check::health_check;
pub use rollback::rollback;

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Resolve the base directory holding domain roots.
fn deployment_base(base: Option<PathBuf>) -> Result<PathBuf> {
    match base {
        Some(base) => Ok(base),
        None => dirs::home_dir()
            .map(|home| home.join("domains"))
            .ok_or(Error::NoHomeDir),
    }
}
