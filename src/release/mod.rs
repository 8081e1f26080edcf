// ABOUTME: Release orchestration: the ordered deploy and rollback sequences.
// ABOUTME: Exports the step plans, deployment context, and per-step policies.

mod context;
mod error;
mod linker;
mod plan;
mod prune;
mod rollback;
mod steps;

pub use context::{DeploymentContext, LOG_FORMAT};
pub use error::ReleaseError;
pub use linker::{link_environment, link_storage};
pub use plan::{
    DEPLOY_PLAN, DeployStep, ROLLBACK_PLAN, RollbackSpec, RollbackStep, StepPolicy, StepSpec,
    run_deploy, run_rollback_sequence,
};
pub use prune::{KEEP_RELEASES, prune_releases};
pub use rollback::{RollbackContext, run_rollback};
pub use steps::{HealthProbe, HttpProbe, health_check, point_live_at, restart_workers, up};
