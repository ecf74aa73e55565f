//! Test-run surface.
//!
//! A [`ScenarioGroup`] is a named list of [`Scenario`]s that share one
//! browser session. The [`Runner`] opens that session, runs the scenarios
//! one at a time, and collects a [`Report`].
//!
//! # Example
//!
//! ```
//! use guvi_e2e::suite::{Context, Scenario, ScenarioGroup};
//! use guvi_e2e::{Result, ensure};
//! use futures_util::future::{BoxFuture, FutureExt};
//!
//! fn title_is_set(ctx: &Context) -> BoxFuture<'_, Result<()>> {
//!     async move {
//!         let title = ctx.actions().page_title().await?;
//!         ensure!(!title.is_empty(), "page has no title");
//!         Ok(())
//!     }
//!     .boxed()
//! }
//!
//! let group = ScenarioGroup::new("smoke", vec![Scenario::new("title_is_set", title_is_set)]);
//! assert_eq!(group.scenarios().len(), 1);
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Per-scenario outcomes and the run summary.
pub mod report;

/// Session lifecycle and scenario isolation.
pub mod runner;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::actions::Actions;
use crate::browser::Browser;
use crate::config::Config;
use crate::error::Result;
use crate::logging::Logger;

pub use report::{Outcome, Report, ScenarioResult};
pub use runner::Runner;

// ============================================================================
// Scenario
// ============================================================================

/// Body of a scenario.
pub type ScenarioFn = for<'a> fn(&'a Context) -> BoxFuture<'a, Result<()>>;

/// One independent check against the live site.
#[derive(Clone, Copy)]
pub struct Scenario {
    name: &'static str,
    run: ScenarioFn,
    needs_account: bool,
}

impl Scenario {
    /// Creates a scenario.
    #[must_use]
    pub const fn new(name: &'static str, run: ScenarioFn) -> Self {
        Self {
            name,
            run,
            needs_account: false,
        }
    }

    /// Marks the scenario as requiring a valid account. It is skipped when
    /// none is configured.
    #[must_use]
    pub const fn needing_account(mut self) -> Self {
        self.needs_account = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn needs_account(&self) -> bool {
        self.needs_account
    }

    /// Starts the scenario body.
    pub fn run<'a>(&self, ctx: &'a Context) -> BoxFuture<'a, Result<()>> {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("needs_account", &self.needs_account)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ScenarioGroup
// ============================================================================

/// Scenarios sharing one browser session.
#[derive(Debug, Clone)]
pub struct ScenarioGroup {
    name: &'static str,
    scenarios: Vec<Scenario>,
}

impl ScenarioGroup {
    #[must_use]
    pub fn new(name: &'static str, scenarios: Vec<Scenario>) -> Self {
        Self { name, scenarios }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Returns the scenarios whose name contains `filter`, or all of them.
    #[must_use]
    pub fn select(&self, filter: Option<&str>) -> Vec<Scenario> {
        self.scenarios
            .iter()
            .filter(|scenario| filter.is_none_or(|f| scenario.name.contains(f)))
            .copied()
            .collect()
    }
}

// ============================================================================
// Context
// ============================================================================

/// What a running scenario can reach.
#[derive(Debug, Clone)]
pub struct Context {
    config: Arc<Config>,
    actions: Actions,
}

impl Context {
    #[must_use]
    pub fn new(config: Arc<Config>, actions: Actions) -> Self {
        Self { config, actions }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Action layer over the group's session, logging as the group.
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    #[inline]
    #[must_use]
    pub fn logger(&self) -> &Logger {
        self.actions.logger()
    }

    #[inline]
    #[must_use]
    pub fn browser(&self) -> &Arc<dyn Browser> {
        self.actions.browser()
    }
}

// ============================================================================
// Assertion Macros
// ============================================================================

/// Returns [`Error::AssertionFailed`](crate::Error::AssertionFailed) from
/// the enclosing function unless `cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return ::core::result::Result::Err($crate::Error::assertion(format!($($arg)+)));
        }
    };
}

/// Returns [`Error::AssertionFailed`](crate::Error::AssertionFailed) from
/// the enclosing function unless `left == right`.
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    return ::core::result::Result::Err($crate::Error::assertion(format!(
                        "{}: expected {:?}, got {:?}",
                        format_args!($($arg)+),
                        right,
                        left,
                    )));
                }
            }
        }
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use futures_util::future::FutureExt;

    use super::*;
    use crate::Error;

    fn noop(_: &Context) -> BoxFuture<'_, Result<()>> {
        async { Ok(()) }.boxed()
    }

    fn check(value: u32) -> Result<()> {
        ensure!(value > 1, "value {value} too small");
        ensure_eq!(value, 3, "value mismatch");
        Ok(())
    }

    #[test]
    fn test_ensure_macros() {
        assert!(check(3).is_ok());

        let small = check(1).unwrap_err();
        assert!(small.is_assertion());
        assert!(small.to_string().contains("value 1 too small"));

        let mismatch = check(2).unwrap_err();
        assert!(matches!(mismatch, Error::AssertionFailed { .. }));
        assert!(mismatch.to_string().contains("value mismatch: expected 3, got 2"));
    }

    #[test]
    fn test_select_filters_by_substring() {
        let group = ScenarioGroup::new(
            "guvi",
            vec![
                Scenario::new("login_button", noop),
                Scenario::new("invalid_login", noop),
                Scenario::new("page_title", noop),
            ],
        );

        let names = |filter| {
            group
                .select(filter)
                .iter()
                .map(Scenario::name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(None).len(), 3);
        assert_eq!(names(Some("login")), ["login_button", "invalid_login"]);
        assert!(names(Some("nothing")).is_empty());
    }

    #[test]
    fn test_needing_account() {
        let scenario = Scenario::new("valid_login", noop).needing_account();
        assert!(scenario.needs_account());
        assert!(!Scenario::new("page_title", noop).needs_account());
    }
}
