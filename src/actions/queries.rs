//! Visibility and clickability queries.
//!
//! These never raise. A timeout, or any driver error while polling, is
//! reported as `false` / `None`.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::browser::{ElementHandle, Locator};
use crate::error::Result;

use super::{Actions, pause};

// ============================================================================
// Visibility
// ============================================================================

impl Actions {
    /// Checks whether `locator` becomes visible, using the configured settle
    /// delay and visibility timeout.
    pub async fn is_visible(&self, locator: &Locator) -> bool {
        self.is_visible_within(
            locator,
            self.timeouts.visibility_delay(),
            self.timeouts.visibility(),
        )
        .await
    }

    /// Sleeps for `delay`, then polls up to `timeout` for `locator` to be
    /// displayed.
    pub async fn is_visible_within(
        &self,
        locator: &Locator,
        delay: Duration,
        timeout: Duration,
    ) -> bool {
        let visible = self.wait_until_visible(locator, delay, timeout).await.is_some();
        debug!(parent: self.logger.span(), locator = %locator, visible, "Visibility checked");
        visible
    }

    /// Like [`Actions::is_visible_within`], returning the element instead of
    /// a boolean.
    pub async fn wait_until_visible(
        &self,
        locator: &Locator,
        delay: Duration,
        timeout: Duration,
    ) -> Option<ElementHandle> {
        pause(delay).await;

        match self.poll_visible(locator, timeout).await {
            Ok(Some(element)) => {
                info!(parent: self.logger.span(), locator = %locator, "Element is visible");
                Some(element)
            }
            Ok(None) => {
                warn!(
                    parent: self.logger.span(),
                    locator = %locator,
                    timeout_secs = timeout.as_secs_f64(),
                    "Element not visible within timeout"
                );
                None
            }
            Err(e) => {
                warn!(
                    parent: self.logger.span(),
                    locator = %locator,
                    error = %e,
                    "Visibility check failed"
                );
                None
            }
        }
    }

    async fn poll_visible(&self, locator: &Locator, timeout: Duration) -> Result<Option<ElementHandle>> {
        let browser = &self.browser;
        self.poller(timeout)
            .until(move || async move {
                let Some(element) = browser.find(locator).await? else {
                    return Ok(None);
                };
                Ok(browser.is_displayed(&element).await?.then_some(element))
            })
            .await
    }
}

// ============================================================================
// Clickability
// ============================================================================

impl Actions {
    /// Checks whether `locator` becomes interactable within the clickable
    /// timeout.
    pub async fn is_clickable(&self, locator: &Locator) -> bool {
        self.is_clickable_within(locator, self.timeouts.clickable()).await
    }

    /// Checks whether `locator` becomes displayed and enabled within
    /// `timeout`.
    pub async fn is_clickable_within(&self, locator: &Locator, timeout: Duration) -> bool {
        let seen = AtomicBool::new(false);
        match self.wait_interactable(locator, timeout, &seen).await {
            Ok(Some(_)) => {
                info!(parent: self.logger.span(), locator = %locator, "Element is clickable");
                true
            }
            Ok(None) => {
                warn!(parent: self.logger.span(), locator = %locator, "Element not clickable");
                false
            }
            Err(e) => {
                warn!(
                    parent: self.logger.span(),
                    locator = %locator,
                    error = %e,
                    "Clickability check failed"
                );
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
