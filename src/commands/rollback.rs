// ABOUTME: Rollback command implementation.
// ABOUTME: Resolves the environment route, then runs the guarded rollback plan.

use chrono::Utc;
use std::env;
use std::path::PathBuf;

use crate::config;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::exec::ProcessExecutor;
use crate::output::Output;
use crate::paths::{self, DeployPaths};
use crate::refs;
use crate::release::{self, HttpProbe, RollbackContext};

use super::deployment_base;

/// Roll the live release back to the one recorded in its backlink.
pub async fn rollback(
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

    let ctx = RollbackContext {
        paths: deploy_paths,
        env: route.environment.env,
    };

    output.start_timer();
    let executor = ProcessExecutor;
    let mut diag = Diagnostics::default();
    release::run_rollback_sequence(&ctx, &executor, &HttpProbe, output, &mut diag).await?;

    output.success("Rollback complete");
    Ok(())
}
