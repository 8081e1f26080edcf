// ABOUTME: Branch/tag classification, environment routing, and commit resolution.
// ABOUTME: Branch names are untrusted input and must pass a safety pattern before use.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use thiserror::Error;

use crate::config::{EnvironmentConfig, EnvironmentMap, TAGGED_KEY};
use crate::exec::ExecError;
use crate::git::CommitLookup;

/// Trailing path segment of a ref, e.g. `origin/master` -> `master`.
static TRAILING_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z][-_a-z0-9.]+)$").expect("static pattern"));

/// Reduces a tag argument to its last path segment.
static TAG_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z0-9-]+/)*([a-z][-_a-z0-9.]+)$").expect("static pattern"));

/// A full semantic-version tag supplied via the tag argument.
static SEMVER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:refs/tags/)?(v\d+\.\d+\.\d+)$").expect("static pattern"));

/// A tag ref arriving through the branch argument; only MAJOR.MINOR is
/// kept as the tag identity.
static TAGGED_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^refs?/tags/(v\d+\.\d+)(\.\d+)?(-.+)?$").expect("static pattern")
});

/// Allow-list for branch names that end up in shell commands.
static SAFE_BRANCH: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^([a-z][a-z0-9_-]+/)?[a-z][a-z0-9_.-]+$")
        .case_insensitive(true)
        .build()
        .expect("static pattern")
});

#[derive(Debug, Error)]
pub enum RefError {
    #[error("branch {0:?} seems insecure")]
    UnsafeRef(String),

    #[error("system is not configured to deploy [{0}]")]
    UnconfiguredEnvironment(String),

    #[error("system is not configured for tagged deployments")]
    TaggedDeploysUnconfigured,

    #[error("no commit found for {0}")]
    RefNotFound(String),

    #[error(transparent)]
    Lookup(#[from] ExecError),
}

/// The resolved deploy route: canonical ref identity plus the environment
/// it maps to. Immutable once resolved.
#[derive(Debug, Clone)]
pub struct Route {
    /// Raw ref string as supplied on the command line.
    pub ref_name: String,
    /// Canonical short branch name.
    pub branch: String,
    pub is_tag: bool,
    pub tag: Option<String>,
    pub environment: EnvironmentConfig,
}

/// Canonical branch name: the trailing path segment if one matches, the
/// raw string otherwise.
pub fn canonical_branch(raw: &str) -> String {
    TRAILING_NAME
        .captures(raw)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Whether a canonical branch name is safe to interpolate into commands.
pub fn is_safe_branch(branch: &str) -> bool {
    SAFE_BRANCH.is_match(branch)
}

/// Classify the deploy as tagged and extract the tag identity.
///
/// The tag argument wins when it carries a full `vMAJOR.MINOR.PATCH`;
/// otherwise a `refs/tags/...` branch argument classifies with only the
/// MAJOR.MINOR portion kept as the identity.
fn classify_tag(raw_ref: &str, tag_arg: Option<&str>) -> Option<String> {
    if let Some(tag_arg) = tag_arg {
        let segment = TAG_SEGMENT
            .captures(tag_arg)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| tag_arg.to_string());
        if let Some(captures) = SEMVER_TAG.captures(&segment) {
            return Some(captures[1].to_string());
        }
    }

    TAGGED_REF
        .captures(raw_ref)
        .map(|captures| captures[1].to_string())
}

/// Determine the canonical branch, tag classification, and environment for
/// a deploy. Fails before any mutation when the branch is unsafe or no
/// environment is configured.
pub fn resolve_route(
    raw_ref: &str,
    tag_arg: Option<&str>,
    environments: &EnvironmentMap,
) -> Result<Route, RefError> {
    let branch = canonical_branch(raw_ref);
    let tag = classify_tag(raw_ref, tag_arg);

    if let Some(tag) = tag {
        let environment = environments
            .get(TAGGED_KEY)
            .cloned()
            .ok_or(RefError::TaggedDeploysUnconfigured)?;
        return Ok(Route {
            ref_name: raw_ref.to_string(),
            branch,
            is_tag: true,
            tag: Some(tag),
            environment,
        });
    }

    if !is_safe_branch(&branch) {
        return Err(RefError::UnsafeRef(branch));
    }

    let environment = environments
        .get(&branch)
        .cloned()
        .ok_or_else(|| RefError::UnconfiguredEnvironment(branch.clone()))?;

    Ok(Route {
        ref_name: raw_ref.to_string(),
        branch,
        is_tag: false,
        tag: None,
        environment,
    })
}

/// Resolve the commit hash the whole run will operate on.
///
/// Tag deploys always resolve against `refs/tags/<tag>`; branch deploys
/// use an explicit hash when supplied and the branch tip otherwise.
pub async fn resolve_commit(
    route: &Route,
    explicit: Option<&str>,
    lookup: &dyn CommitLookup,
) -> Result<String, RefError> {
    let refspec = match &route.tag {
        Some(tag) => format!("refs/tags/{tag}"),
        None => {
            if let Some(hash) = explicit {
                return Ok(hash.to_string());
            }
            format!("refs/heads/{}", route.branch)
        }
    };

    match lookup.commit_for_ref(&refspec).await? {
        Some(hash) => Ok(hash),
        None => Err(RefError::RefNotFound(refspec)),
    }
}
