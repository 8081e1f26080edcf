// ABOUTME: Standalone health-check command implementation.
// ABOUTME: Probes the live release's configured URL for the resolved domain.

use chrono::Utc;
use std::env;
use std::path::PathBuf;

use crate::config;
use crate::error::Result;
use crate::output::Output;
use crate::paths::{self, DeployPaths};
use crate::refs;
use crate::release::{self, HttpProbe};

use super::deployment_base;

/// Probe the live release over HTTP without touching anything.
pub async fn health_check(
    branch: &str,
    tag: Option<&str>,
    base: Option<PathBuf>,
    output: &mut Output,
) -> Result<()> {
    let project_dir = env::current_dir()?;
    let (environments, _) = config::load_project_config(&project_dir)?;

    let route = refs::resolve_route(branch, tag, &environments)?;
    let base = deployment_base(base)?;
    let deploy_name = paths::deploy_name(Utc::now());
    let deploy_paths = DeployPaths::resolve(&base, &route.environment.domain, &deploy_name);

    output.start_timer();
    release::health_check(&deploy_paths.live, &HttpProbe, output).await?;

    output.success("Health check passed");
    Ok(())
}
