// ABOUTME: Command execution seam for external tools (git, yarn, composer, artisan).
// ABOUTME: Wraps tokio::process so tests can substitute a scripted executor.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// An external command to run: program, arguments, and working directory.
#[derive(Debug, Clone)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external commands and captures their output.
///
/// A non-zero exit status is reported through `CommandOutput`, not as an
/// error; callers that require success go through [`run_checked`].
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecError>;
}

/// Run a command and require a zero exit status.
pub async fn run_checked(
    executor: &dyn CommandExecutor,
    command: &CommandLine,
) -> Result<CommandOutput, ExecError> {
    let output = executor.run(command).await?;
    if output.success() {
        Ok(output)
    } else {
        Err(ExecError::CommandFailed {
            program: command.to_string(),
            code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// Production executor backed by tokio::process.
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, ExecError> {
        tracing::debug!("running: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| ExecError::Spawn {
            program: command.program.clone(),
            source: e,
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
