// ABOUTME: Deploy command implementation.
// ABOUTME: Resolves route, commit, and paths, then runs the deploy plan.

use chrono::Utc;
use std::env;
use std::path::PathBuf;

use crate::config;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::exec::ProcessExecutor;
use crate::git::RemoteLookup;
use crate::output::Output;
use crate::paths::{self, DeployPaths};
use crate::refs;
use crate::release::{self, DeploymentContext, HttpProbe, KEEP_RELEASES, LOG_FORMAT};

use super::deployment_base;

pub struct DeployArgs {
    pub remote: String,
    pub branch: String,
    pub tag: Option<String>,
    pub hash: Option<String>,
    pub base: Option<PathBuf>,
}

/// Deploy the resolved ref as a new release and promote it.
pub async fn deploy(args: DeployArgs, output: &mut Output) -> Result<()> {
    let project_dir = env::current_dir()?;
    let (environments, storage_map) = config::load_project_config(&project_dir)?;

    let route = refs::resolve_route(&args.branch, args.tag.as_deref(), &environments)?;

    let executor = ProcessExecutor;
    let lookup = RemoteLookup::new(&executor, args.remote.clone());
    let commit = refs::resolve_commit(&route, args.hash.as_deref(), &lookup).await?;

    if let Some(tag) = &route.tag {
        let short = commit.get(..8).unwrap_or(&commit);
        output.progress(&format!("Using commit {short} for tag {tag}"));
    }

    let deploy_name = paths::deploy_name(Utc::now());
    let base = deployment_base(args.base)?;
    let deploy_paths = DeployPaths::resolve(&base, &route.environment.domain, &deploy_name);

    output.progress(&format!(
        "Deploying {} to {} ({})",
        route.branch, route.environment.name, route.environment.domain
    ));

    let ctx = DeploymentContext {
        remote: args.remote,
        branch_slug: paths::branch_slug(&route.branch),
        branch: route.branch,
        tag: route.tag,
        environment: route.environment,
        commit,
        deploy_name,
        paths: deploy_paths,
        storage_map,
        keep_releases: KEEP_RELEASES,
        log_format: LOG_FORMAT.to_string(),
    };

    output.start_timer();
    let mut diag = Diagnostics::default();
    release::run_deploy(&ctx, &executor, &HttpProbe, output, &mut diag).await?;

    if diag.has_warnings() {
        output.progress(&format!(
            "Deployment finished with {} warning(s)",
            diag.warnings().len()
        ));
    }
    output.success("Deployment complete");
    Ok(())
}
