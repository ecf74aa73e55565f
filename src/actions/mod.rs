//! Action-Wait layer.
//!
//! [`Actions`] wraps a live [`Browser`] with timeout-bounded element
//! operations. It is the only thing page objects talk to.
//!
//! # Failure Policy
//!
//! | Operation | On timeout |
//! |-----------|------------|
//! | [`Actions::locate`], [`Actions::read_text`], [`Actions::type_text`] | [`Error::NotFound`] |
//! | [`Actions::click`] | [`Error::NotFound`] if absent, [`Error::NotClickable`] otherwise |
//! | [`Actions::wait_until`] | [`Error::Timeout`] |
//! | [`Actions::is_visible`], [`Actions::is_clickable`] | `false` |
//! | [`Actions::wait_until_visible`] | `None` |
//!
//! Queries never raise: a driver error during a visibility check is logged
//! and reported as `false`.
//!
//! [`Error::NotFound`]: crate::Error::NotFound
//! [`Error::NotClickable`]: crate::Error::NotClickable
//! [`Error::Timeout`]: crate::Error::Timeout

// ============================================================================
// Submodules
// ============================================================================

/// Locate, click, read, and type.
mod elements;

/// Navigation, sign-out, generic waits, and screenshots.
mod navigation;

/// Poll-and-sleep primitive.
pub mod poll;

/// Visibility and clickability queries.
mod queries;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::browser::Browser;
use crate::config::Timeouts;
use crate::logging::Logger;

pub use navigation::{SIGN_OUT_LINK, USER_DROPDOWN};
pub use poll::{Poller, pause};

// ============================================================================
// Constants
// ============================================================================

/// Script-level click used when a native click is rejected.
pub const SCRIPT_CLICK: &str = "arguments[0].click();";

/// Scrolls the first argument into the viewport.
pub const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView();";

// ============================================================================
// Actions
// ============================================================================

/// Timeout-bounded operations over one browser session.
///
/// Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct Actions {
    browser: Arc<dyn Browser>,
    timeouts: Timeouts,
    logger: Logger,
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actions")
            .field("timeouts", &self.timeouts)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

impl Actions {
    /// Creates an action layer over `browser`.
    #[must_use]
    pub fn new(browser: Arc<dyn Browser>, timeouts: Timeouts, logger: Logger) -> Self {
        Self {
            browser,
            timeouts,
            logger,
        }
    }

    /// Returns a copy that logs under `logger`.
    #[must_use]
    pub fn with_logger(&self, logger: Logger) -> Self {
        Self {
            browser: Arc::clone(&self.browser),
            timeouts: self.timeouts.clone(),
            logger,
        }
    }

    /// Returns the underlying session.
    #[inline]
    #[must_use]
    pub fn browser(&self) -> &Arc<dyn Browser> {
        &self.browser
    }

    /// Returns the wait budgets.
    #[inline]
    #[must_use]
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Returns the logger events are attached to.
    #[inline]
    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    fn poller(&self, timeout: Duration) -> Poller {
        Poller::new(timeout, self.timeouts.poll_interval())
    }
}

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::Actions;
    use crate::browser::FakeBrowser;
    use crate::config::Timeouts;
    use crate::logging;

    pub(crate) const HOME: &str = "https://example.com/";

    /// Wraps `browser` with the default budgets.
    pub(crate) fn actions(browser: FakeBrowser) -> (Arc<FakeBrowser>, Actions) {
        let browser = Arc::new(browser);
        let actions = Actions::new(
            Arc::clone(&browser) as _,
            Timeouts::default(),
            logging::logger("actions-test"),
        );
        (browser, actions)
    }
}
