//! Per-scenario outcomes and the run summary.

use std::fmt;
use std::process::ExitCode;
use std::time::Duration;

// ============================================================================
// Outcome
// ============================================================================

/// How a scenario ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every check held.
    Passed,
    /// A check did not hold.
    Failed(String),
    /// The scenario could not run to completion: an element or driver
    /// error, a panic, or a session that never started.
    Errored(String),
    /// Not run; the reason says why.
    Skipped(String),
}

impl Outcome {
    /// Returns `true` for outcomes that fail the run.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Errored(_))
    }

    /// Short uppercase label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed(_) => "FAILED",
            Self::Errored(_) => "ERROR",
            Self::Skipped(_) => "SKIPPED",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str(self.label()),
            Self::Failed(msg) | Self::Errored(msg) | Self::Skipped(msg) => {
                write!(f, "{}: {msg}", self.label())
            }
        }
    }
}

// ============================================================================
// ScenarioResult
// ============================================================================

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResult {
    pub group: String,
    pub name: String,
    pub outcome: Outcome,
    pub duration: Duration,
}

impl fmt::Display for ScenarioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} ... {} ({:.2}s)",
            self.group,
            self.name,
            self.outcome,
            self.duration.as_secs_f64()
        )
    }
}

// ============================================================================
// Report
// ============================================================================

/// Results of a whole run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    results: Vec<ScenarioResult>,
    teardown_errors: Vec<String>,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scenario result.
    pub fn record(
        &mut self,
        group: &str,
        name: &str,
        outcome: Outcome,
        duration: Duration,
    ) -> &ScenarioResult {
        self.results.push(ScenarioResult {
            group: group.to_string(),
            name: name.to_string(),
            outcome,
            duration,
        });
        &self.results[self.results.len() - 1]
    }

    /// Notes that closing a group's session failed.
    pub fn record_teardown_error(&mut self, group: &str, message: impl fmt::Display) {
        self.teardown_errors.push(format!("{group}: {message}"));
    }

    #[inline]
    #[must_use]
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    #[inline]
    #[must_use]
    pub fn teardown_errors(&self) -> &[String] {
        &self.teardown_errors
    }

    /// Looks up a result by scenario name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|result| result.name == name)
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    #[must_use]
    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Errored(_)))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    /// Total time spent in scenarios.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.results.iter().map(|result| result.duration).sum()
    }

    /// Returns `true` when nothing failed, errored, or failed to tear down.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.teardown_errors.is_empty() && !self.results.iter().any(|r| r.outcome.is_failure())
    }

    /// Process exit status for the run.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{result}")?;
        }
        for error in &self.teardown_errors {
            writeln!(f, "teardown error: {error}")?;
        }
        write!(
            f,
            "{} passed, {} failed, {} errors, {} skipped in {:.2}s",
            self.passed(),
            self.failed(),
            self.errored(),
            self.skipped(),
            self.duration().as_secs_f64()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
