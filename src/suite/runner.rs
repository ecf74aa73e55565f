//! Session lifecycle and scenario isolation.
//!
//! Per group the runner:
//!
//! 1. opens one session through the [`SessionFactory`],
//! 2. loads the site root and maximizes the window,
//! 3. runs each selected scenario inside its own panic boundary,
//! 4. closes the session, whatever happened above.
//!
//! A group whose session cannot be prepared reports every selected scenario
//! as errored and never runs them.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::actions::Actions;
use crate::browser::{Browser, SessionFactory};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{self, Logger};

use super::{Context, Outcome, Report, Scenario, ScenarioGroup};

/// Reason given for account-bound scenarios when no account is configured.
pub const NO_ACCOUNT: &str = "no valid account configured";

// ============================================================================
// Runner
// ============================================================================

/// Runs scenario groups against sessions from a [`SessionFactory`].
pub struct Runner {
    config: Arc<Config>,
    factory: Arc<dyn SessionFactory>,
    filter: Option<String>,
    logger: Logger,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("filter", &self.filter)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

impl Runner {
    #[must_use]
    pub fn new(config: Config, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
            filter: None,
            logger: logging::default_logger(),
        }
    }

    /// Runs only scenarios whose name contains `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every group in order.
    pub async fn run(&self, groups: &[ScenarioGroup]) -> Report {
        let mut report = Report::new();
        for group in groups {
            self.run_group(group, &mut report).await;
        }
        info!(
            parent: self.logger.span(),
            passed = report.passed(),
            failed = report.failed(),
            errors = report.errored(),
            skipped = report.skipped(),
            "Run finished"
        );
        report
    }

    async fn run_group(&self, group: &ScenarioGroup, report: &mut Report) {
        let selected = group.select(self.filter.as_deref());
        if selected.is_empty() {
            return;
        }
        info!(parent: self.logger.span(), group = group.name(), scenarios = selected.len(), "Starting group");

        let session = match self.factory.open().await {
            Ok(session) => session,
            Err(e) => {
                error!(parent: self.logger.span(), group = group.name(), error = %e, "Session setup failed");
                fail_all(report, group, &selected, &e);
                return;
            }
        };

        let actions = Actions::new(
            Arc::clone(&session),
            self.config.timeouts.clone(),
            logging::logger(group.name()),
        );

        match self.prepare(&actions).await {
            Ok(()) => {
                let ctx = Context::new(Arc::clone(&self.config), actions);
                for scenario in &selected {
                    self.run_scenario(group, scenario, &ctx, report).await;
                }
            }
            Err(e) => {
                error!(parent: self.logger.span(), group = group.name(), error = %e, "Session setup failed");
                let setup = Error::session_setup(e.to_string());
                fail_all(report, group, &selected, &setup);
            }
        }

        self.teardown(group, session.as_ref(), report).await;
    }

    async fn prepare(&self, actions: &Actions) -> Result<()> {
        actions.navigate(&self.config.base_url).await?;
        if let Err(e) = actions.browser().maximize_window().await {
            warn!(parent: self.logger.span(), error = %e, "Could not maximize window");
        }
        Ok(())
    }

    async fn run_scenario(
        &self,
        group: &ScenarioGroup,
        scenario: &Scenario,
        ctx: &Context,
        report: &mut Report,
    ) {
        let name = scenario.name();

        if scenario.needs_account() && self.config.credentials.valid.is_none() {
            warn!(parent: self.logger.span(), scenario = name, "Skipping: {NO_ACCOUNT}");
            report.record(group.name(), name, Outcome::Skipped(NO_ACCOUNT.to_string()), Default::default());
            return;
        }

        info!(parent: self.logger.span(), "===== Starting test: {name} =====");
        let start = Instant::now();

        let outcome = match AssertUnwindSafe(scenario.run(ctx)).catch_unwind().await {
            Ok(Ok(())) => Outcome::Passed,
            Ok(Err(e)) if e.is_assertion() => Outcome::Failed(e.to_string()),
            Ok(Err(e)) => Outcome::Errored(e.to_string()),
            Err(panic) => Outcome::Errored(format!("panicked: {}", panic_message(panic.as_ref()))),
        };

        let result = report.record(group.name(), name, outcome, start.elapsed());
        if result.outcome.is_failure() {
            error!(parent: self.logger.span(), "{result}");
        } else {
            info!(parent: self.logger.span(), "{result}");
        }
        info!(parent: self.logger.span(), "===== Completed test: {name} =====");
    }

    async fn teardown(&self, group: &ScenarioGroup, session: &dyn Browser, report: &mut Report) {
        match session.close().await {
            Ok(()) => info!(parent: self.logger.span(), group = group.name(), "Browser closed"),
            Err(e) => {
                error!(parent: self.logger.span(), group = group.name(), error = %e, "Teardown failed");
                report.record_teardown_error(group.name(), &e);
            }
        }
    }
}

fn fail_all(report: &mut Report, group: &ScenarioGroup, scenarios: &[Scenario], cause: &Error) {
    for scenario in scenarios {
        report.record(
            group.name(),
            scenario.name(),
            Outcome::Errored(cause.to_string()),
            Default::default(),
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

// ============================================================================
// Tests
// ============================================================================
