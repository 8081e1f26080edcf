// ABOUTME: Shared test support: scripted command executor, stub health probe,
// ABOUTME: and sandbox builders for deployment contexts.
#![allow(dead_code)]

use async_trait::async_trait;
use golive::config::EnvironmentConfig;
use golive::exec::{CommandExecutor, CommandLine, CommandOutput, ExecError};
use golive::paths::DeployPaths;
use golive::release::{DeploymentContext, HealthProbe, LOG_FORMAT, ReleaseError};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

/// Executor that records every command and answers from canned rules.
/// Commands without a matching rule succeed with empty output.
#[derive(Default)]
pub struct ScriptedExecutor {
    calls: Mutex<Vec<String>>,
    rules: Vec<(String, CommandOutput)>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands whose rendered line contains `needle` return `output`.
    pub fn respond(mut self, needle: &str, output: CommandOutput) -> Self {
        self.rules.push((needle.to_string(), output));
        self
    }

    pub fn respond_stdout(self, needle: &str, stdout: &str) -> Self {
        self.respond(
            needle,
            CommandOutput {
                exit_code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
    }

    pub fn fail(self, needle: &str) -> Self {
        self.respond(
            needle,
            CommandOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: format!("scripted failure for {needle}"),
            },
        )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.calls().iter().any(|line| line.contains(needle))
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecError> {
        let line = command.to_string();
        self.calls.lock().unwrap().push(line.clone());
        for (needle, output) in &self.rules {
            if line.contains(needle) {
                return Ok(output.clone());
            }
        }
        Ok(CommandOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Health probe that records the URL and always succeeds.
#[derive(Default)]
pub struct StubProbe {
    urls: Mutex<Vec<String>>,
}

impl StubProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probed_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HealthProbe for StubProbe {
    async fn probe(&self, url: &str) -> Result<(), ReleaseError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub const TEST_DOMAIN: &str = "testing.example.com";

pub fn testing_environment() -> EnvironmentConfig {
    EnvironmentConfig {
        name: "testing".to_string(),
        domain: TEST_DOMAIN.to_string(),
        env: "local".to_string(),
    }
}

/// A deployment context rooted in a sandbox, with an empty storage map.
pub fn test_context(base: &Path, deploy_name: &str) -> DeploymentContext {
    DeploymentContext {
        remote: "git@example.com:acme/site.git".to_string(),
        branch: "master".to_string(),
        branch_slug: "master".to_string(),
        tag: None,
        environment: testing_environment(),
        commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
        deploy_name: deploy_name.to_string(),
        paths: DeployPaths::resolve(base, TEST_DOMAIN, deploy_name),
        storage_map: BTreeMap::new(),
        keep_releases: 4,
        log_format: LOG_FORMAT.to_string(),
    }
}

/// Quiet output so test logs stay readable.
pub fn quiet_output() -> golive::output::Output {
    golive::output::Output::new(golive::output::OutputMode::Quiet)
}
