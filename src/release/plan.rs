// ABOUTME: The ordered step plans for deploy and rollback, with per-step policies.
// ABOUTME: Tolerance is data here, not scattered error handling inside steps.

use crate::diagnostics::{Diagnostics, Warning};
use crate::exec::CommandExecutor;
use crate::output::Output;

use super::context::DeploymentContext;
use super::error::ReleaseError;
use super::rollback::{RollbackContext, run_rollback};
use super::steps::{self, HealthProbe};
use super::{linker, prune};

/// What happens to the remaining sequence when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Abort the whole run, leaving prior steps' effects in place.
    Halt,
    /// Record a warning and carry on.
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    Init,
    Clone,
    Describe,
    Link,
    Install,
    Build,
    Down,
    Migrate,
    Cache,
    Up,
    RestartWorkers,
    Cleanup,
    HealthCheck,
}

impl DeployStep {
    pub fn name(&self) -> &'static str {
        match self {
            DeployStep::Init => "init",
            DeployStep::Clone => "clone",
            DeployStep::Describe => "describe",
            DeployStep::Link => "link",
            DeployStep::Install => "install",
            DeployStep::Build => "build",
            DeployStep::Down => "down",
            DeployStep::Migrate => "migrate",
            DeployStep::Cache => "cache",
            DeployStep::Up => "up",
            DeployStep::RestartWorkers => "restart-workers",
            DeployStep::Cleanup => "cleanup",
            DeployStep::HealthCheck => "health-check",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StepSpec {
    pub step: DeployStep,
    pub policy: StepPolicy,
}

/// The deploy sequence. Order matters: a release must be fully built and
/// migrated before the live pointer moves, and only pruned afterwards.
pub const DEPLOY_PLAN: &[StepSpec] = &[
    StepSpec {
        step: DeployStep::Init,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::Clone,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::Describe,
        policy: StepPolicy::Continue,
    },
    StepSpec {
        step: DeployStep::Link,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::Install,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::Build,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::Down,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::Migrate,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::Cache,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::Up,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::RestartWorkers,
        policy: StepPolicy::Continue,
    },
    StepSpec {
        step: DeployStep::Cleanup,
        policy: StepPolicy::Halt,
    },
    StepSpec {
        step: DeployStep::HealthCheck,
        policy: StepPolicy::Halt,
    },
];

/// Run the full deploy sequence against the resolved context.
///
/// There is no compensating rollback: a halting failure leaves the release
/// directory partial and the live pointer unchanged.
pub async fn run_deploy(
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    probe: &dyn HealthProbe,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<(), ReleaseError> {
    for spec in DEPLOY_PLAN {
        if let Err(e) = run_deploy_step(spec.step, ctx, executor, probe, output, diag).await {
            match spec.policy {
                StepPolicy::Halt => return Err(e),
                StepPolicy::Continue => {
                    diag.warn(Warning::step_failed(spec.step.name(), e.to_string()));
                }
            }
        }
    }
    Ok(())
}

async fn run_deploy_step(
    step: DeployStep,
    ctx: &DeploymentContext,
    executor: &dyn CommandExecutor,
    probe: &dyn HealthProbe,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<(), ReleaseError> {
    match step {
        DeployStep::Init => steps::init(ctx, output),
        DeployStep::Clone => steps::clone_source(ctx, executor, output).await,
        DeployStep::Describe => steps::describe(ctx, executor, output).await,
        DeployStep::Link => {
            linker::link_environment(ctx, output)?;
            linker::link_storage(ctx, output)
        }
        DeployStep::Install => steps::install(ctx, executor, output).await,
        DeployStep::Build => steps::build(ctx, executor, output).await,
        DeployStep::Down => steps::down(ctx, executor, output, diag).await,
        DeployStep::Migrate => steps::migrate(ctx, executor, output).await,
        DeployStep::Cache => steps::cache(ctx, executor, output).await,
        DeployStep::Up => steps::up(ctx, executor, output).await,
        DeployStep::RestartWorkers => {
            steps::restart_workers(
                &ctx.paths.live,
                &ctx.environment.env,
                executor,
                output,
                diag,
            )
            .await
        }
        DeployStep::Cleanup => {
            prune::prune_releases(&ctx.paths.releases_root, ctx.keep_releases, output)
                .map(|_| ())
        }
        DeployStep::HealthCheck => steps::health_check(&ctx.paths.live, probe, output).await,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackStep {
    Rollback,
    RestartWorkers,
    HealthCheck,
}

#[derive(Debug, Clone, Copy)]
pub struct RollbackSpec {
    pub step: RollbackStep,
    pub policy: StepPolicy,
}

pub const ROLLBACK_PLAN: &[RollbackSpec] = &[
    RollbackSpec {
        step: RollbackStep::Rollback,
        policy: StepPolicy::Halt,
    },
    RollbackSpec {
        step: RollbackStep::RestartWorkers,
        policy: StepPolicy::Continue,
    },
    RollbackSpec {
        step: RollbackStep::HealthCheck,
        policy: StepPolicy::Halt,
    },
];

/// Run the rollback sequence: guarded pointer switch, then worker restart
/// and health check as in a deploy.
pub async fn run_rollback_sequence(
    ctx: &RollbackContext,
    executor: &dyn CommandExecutor,
    probe: &dyn HealthProbe,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<(), ReleaseError> {
    for spec in ROLLBACK_PLAN {
        let result = match spec.step {
            RollbackStep::Rollback => run_rollback(ctx, executor, output).await,
            RollbackStep::RestartWorkers => {
                steps::restart_workers(&ctx.paths.live, &ctx.env, executor, output, diag).await
            }
            RollbackStep::HealthCheck => {
                steps::health_check(&ctx.paths.live, probe, output).await
            }
        };
        if let Err(e) = result {
            match spec.policy {
                StepPolicy::Halt => return Err(e),
                StepPolicy::Continue => {
                    diag.warn(Warning::step_failed(rollback_step_name(spec.step), e.to_string()));
                }
            }
        }
    }
    Ok(())
}

fn rollback_step_name(step: RollbackStep) -> &'static str {
    match step {
        RollbackStep::Rollback => "rollback",
        RollbackStep::RestartWorkers => "restart-workers",
        RollbackStep::HealthCheck => "health-check",
    }
}
