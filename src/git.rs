// ABOUTME: Git command-line assembly and remote commit lookup.
// ABOUTME: All invocations go through the executor seam so tests can fake them.

use async_trait::async_trait;
use std::path::Path;

use crate::exec::{CommandExecutor, CommandLine, ExecError, run_checked};

/// Clone without checking out working files; checkout happens on a
/// dedicated deployment branch afterwards.
pub fn clone_no_checkout(remote: &str, dest: &Path) -> CommandLine {
    CommandLine::new("git")
        .arg("clone")
        .arg("--no-checkout")
        .arg(remote)
        .arg(dest.display().to_string())
}

pub fn checkout_new_branch(repo: &Path, branch: &str, commit: &str) -> CommandLine {
    CommandLine::new("git")
        .cwd(repo)
        .args(["checkout", "-b"])
        .arg(branch)
        .arg(commit)
}

pub fn submodule_update(repo: &Path) -> CommandLine {
    CommandLine::new("git")
        .cwd(repo)
        .args(["submodule", "update", "--init", "--force"])
}

pub fn head_hash(repo: &Path) -> CommandLine {
    CommandLine::new("git")
        .cwd(repo)
        .args(["log", "-1", "--format=%H"])
}

pub fn head_summary(repo: &Path, format: &str) -> CommandLine {
    CommandLine::new("git")
        .cwd(repo)
        .args(["log", "-1"])
        .arg(format!("--format={format}"))
}

pub fn log_range(repo: &Path, old: &str, new: &str, format: &str) -> CommandLine {
    CommandLine::new("git")
        .cwd(repo)
        .args(["log", "--decorate", "--graph"])
        .arg(format!("--format={format}"))
        .arg(format!("{old}..{new}"))
}

pub fn ls_remote(remote: &str, refspec: &str) -> CommandLine {
    CommandLine::new("git")
        .args(["ls-remote", remote, refspec])
}

/// Capability to resolve a ref to a commit hash.
#[async_trait]
pub trait CommitLookup: Send + Sync {
    /// Returns `None` when the remote has no such ref.
    async fn commit_for_ref(&self, refspec: &str) -> Result<Option<String>, ExecError>;
}

/// Resolves refs against the clone remote via `git ls-remote`.
///
/// Ref resolution happens before the clone exists, so it has to go over
/// the wire rather than against a local checkout.
pub struct RemoteLookup<'a> {
    executor: &'a dyn CommandExecutor,
    remote: String,
}

impl<'a> RemoteLookup<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, remote: impl Into<String>) -> Self {
        Self {
            executor,
            remote: remote.into(),
        }
    }
}

#[async_trait]
impl CommitLookup for RemoteLookup<'_> {
    async fn commit_for_ref(&self, refspec: &str) -> Result<Option<String>, ExecError> {
        let output = run_checked(self.executor, &ls_remote(&self.remote, refspec)).await?;
        Ok(output
            .stdout
            .split_whitespace()
            .next()
            .map(str::to_string))
    }
}
