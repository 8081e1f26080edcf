// ABOUTME: Diagnostics accumulator for non-fatal warnings during a release run.
// ABOUTME: Collects warnings that shouldn't fail a deploy but should be shown to users.

/// Collects non-fatal warnings during release operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a release run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a worker control warning (terminate/continue/purge/startup script).
    pub fn worker_control(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::WorkerControl,
            message: message.into(),
        }
    }

    /// Create a maintenance-mode toggle warning.
    pub fn maintenance(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Maintenance,
            message: message.into(),
        }
    }

    /// Create a warning for a tolerated step failure.
    pub fn step_failed(step: &str, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StepFailed,
            message: format!("step {} failed: {}", step, message.into()),
        }
    }
}

/// Categories of warnings that can occur during a release run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Failed to drain, resume, or purge background workers.
    WorkerControl,
    /// Failed to toggle maintenance mode on a release.
    Maintenance,
    /// A step with a continue-on-failure policy failed.
    StepFailed,
}
