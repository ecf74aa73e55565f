//! Navigation, sign-out, generic waits, and screenshots.

use std::future::Future;
use std::path::Path;
use std::slice;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::browser::Locator;
use crate::error::{Error, Result};

use super::elements::{millis, wait_failure};
use super::{Actions, SCROLL_INTO_VIEW};

// ============================================================================
// Constants
// ============================================================================

/// User menu toggle shown while signed in.
pub const USER_DROPDOWN: Locator = Locator::css(".user-dropdown");

/// Sign-out entry inside the user menu.
pub const SIGN_OUT_LINK: Locator = Locator::xpath("//a[text()='Sign Out']");

// ============================================================================
// Navigation
// ============================================================================

impl Actions {
    /// Loads `url`.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.browser.goto(url).await?;
        info!(parent: self.logger.span(), url = %url, "Navigated to URL");
        Ok(())
    }

    /// Returns the current page URL.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub async fn current_url(&self) -> Result<String> {
        let url = self.browser.current_url().await?;
        info!(parent: self.logger.span(), url = %url, "Current URL");
        Ok(url)
    }

    /// Returns the current page title.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub async fn page_title(&self) -> Result<String> {
        let title = self.browser.title().await?;
        info!(parent: self.logger.span(), title = %title, "Page title");
        Ok(title)
    }
}

// ============================================================================
// Sign-out
// ============================================================================

impl Actions {
    /// Opens the user menu and clicks "Sign Out".
    ///
    /// The entry is scrolled into view first. Some browsers reject native
    /// clicks on it while the menu animates, so a rejected click falls back
    /// to a script click.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] or [`Error::NotClickable`] for the
    /// dropdown or the entry.
    pub async fn sign_out(&self) -> Result<()> {
        info!(parent: self.logger.span(), "Attempting sign-out...");

        let result = async {
            let timeout = self.timeouts.element();
            let seen = AtomicBool::new(false);
            let dropdown = self
                .wait_interactable(&USER_DROPDOWN, timeout, &seen)
                .await?
                .ok_or_else(|| wait_failure(&USER_DROPDOWN, timeout, &seen))?;
            self.browser.click(&dropdown).await?;
            debug!(parent: self.logger.span(), "User dropdown clicked.");

            let entry = self.locate_within(&SIGN_OUT_LINK, timeout).await?;
            self.browser
                .execute_script(SCROLL_INTO_VIEW, slice::from_ref(&entry))
                .await?;
            self.click_handle(&entry).await
        }
        .await;

        match &result {
            Ok(()) => info!(parent: self.logger.span(), "Successfully signed out."),
            Err(e) => error!(parent: self.logger.span(), error = %e, "Sign-out failed"),
        }
        result
    }
}

// ============================================================================
// Generic Wait
// ============================================================================

impl Actions {
    /// Polls `condition` until it holds.
    ///
    /// Recoverable driver errors inside the condition count as "not yet".
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] naming `description` if the condition does
    /// not hold within `timeout`.
    pub async fn wait_until<F, Fut>(
        &self,
        description: &str,
        timeout: Duration,
        mut condition: F,
    ) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        debug!(parent: self.logger.span(), condition = description, "Waiting for condition");
        let held = self
            .poller(timeout)
            .until(|| {
                let check = condition();
                async move { Ok(check.await?.then_some(())) }
            })
            .await?;

        held.ok_or_else(|| {
            error!(parent: self.logger.span(), condition = description, "Condition not met");
            Error::timeout(description, millis(timeout))
        })
    }

    /// [`Actions::wait_until`] with the explicit-wait timeout.
    ///
    /// # Errors
    ///
    /// See [`Actions::wait_until`].
    pub async fn wait_for<F, Fut>(&self, description: &str, condition: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        self.wait_until(description, self.timeouts.explicit(), condition)
            .await
    }
}

// ============================================================================
// Screenshots
// ============================================================================

impl Actions {
    /// Saves a PNG of the viewport to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or a driver error.
    pub async fn capture_screenshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.browser.screenshot(path).await?;
        info!(parent: self.logger.span(), path = %path.display(), "Screenshot saved");
        Ok(())
    }

    /// Runs `step`; if it fails, saves a screenshot to `path` before
    /// returning the original error.
    ///
    /// A failed capture is logged and does not replace the step's error.
    ///
    /// # Errors
    ///
    /// Returns `step`'s error unchanged.
    pub async fn capture_on_error<T, Fut>(&self, path: &Path, step: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let err = match step.await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        error!(parent: self.logger.span(), error = %err, "Step failed, capturing screenshot");
        if let Err(capture) = self.capture_screenshot(path).await {
            warn!(
                parent: self.logger.span(),
                path = %path.display(),
                error = %capture,
                "Screenshot capture failed"
            );
        }
        Err(err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actions::test_support::{HOME, actions};
    use crate::browser::{FakeBrowser, FakeElement};

    const LOGIN: Locator = Locator::xpath("(//a[contains(text(),'Login')])[2]");

    fn signed_in() -> FakeBrowser {
        FakeBrowser::new("https://example.com/dashboard")
            .with_element(FakeElement::new(USER_DROPDOWN).on_page("https://example.com/dashboard"))
            .with_element(
                FakeElement::new(SIGN_OUT_LINK)
                    .on_page("https://example.com/dashboard")
                    .obscured()
                    .on_click(|dom| dom.navigate(HOME)),
            )
            .with_element(FakeElement::new(LOGIN).on_page(HOME))
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_and_read_back() {
        let (browser, actions) =
            actions(FakeBrowser::new("about:blank").with_title(HOME, "Example"));

        actions.navigate(HOME).await.unwrap();
        assert_eq!(actions.current_url().await.unwrap(), HOME);
        assert_eq!(actions.page_title().await.unwrap(), "Example");
        assert_eq!(browser.navigations(), vec![HOME]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_scrolls_and_falls_back_once() {
        let (browser, actions) = actions(signed_in());

        actions.sign_out().await.unwrap();

        assert_eq!(browser.native_clicks(&USER_DROPDOWN), 1);
        assert!(browser.was_scrolled(&SIGN_OUT_LINK));
        assert_eq!(browser.clicks(&SIGN_OUT_LINK), 1);
        assert_eq!(browser.script_clicks(&SIGN_OUT_LINK), 1);
        assert_eq!(browser.url(), HOME);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_without_menu_is_not_found() {
        let (_, actions) = actions(FakeBrowser::new(HOME));
        let err = actions.sign_out().await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }), "{err:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_with_hidden_menu_is_not_clickable() {
        let (browser, actions) = actions(
            FakeBrowser::new(HOME).with_element(FakeElement::new(USER_DROPDOWN).hidden()),
        );
        let err = actions.sign_out().await.unwrap_err();
        assert!(matches!(err, Error::NotClickable { .. }), "{err:?}");
        assert_eq!(browser.clicks(&USER_DROPDOWN), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_holds() {
        let (browser, actions) = actions(FakeBrowser::new(HOME));

        let later = Arc::clone(&browser);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            later.configure(|dom| dom.navigate("https://example.com/done"));
        });

        let session = Arc::clone(actions.browser());
        actions
            .wait_until("URL contains /done", Duration::from_secs(10), move || {
                let session = Arc::clone(&session);
                async move { Ok(session.current_url().await?.contains("/done")) }
            })
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_times_out() {
        let (_, actions) = actions(FakeBrowser::new(HOME));

        let err = actions
            .wait_until("never", Duration::from_secs(2), || async { Ok(false) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_ms: 2_000, .. }));
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_on_error_saves_and_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts").join("logout_failure.png");
        let (browser, actions) = actions(FakeBrowser::new(HOME));

        let result: Result<()> = actions
            .capture_on_error(&path, async { Err(Error::assertion("logged out state not reached")) })
            .await;

        assert!(matches!(result, Err(Error::AssertionFailed { .. })));
        assert_eq!(browser.screenshots(), vec![path.clone()]);
        assert!(path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_on_error_passes_success_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unused.png");
        let (browser, actions) = actions(FakeBrowser::new(HOME));

        let value = actions.capture_on_error(&path, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(browser.screenshots().is_empty());
    }
}
