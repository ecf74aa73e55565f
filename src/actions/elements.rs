//! Locate, click, read, and type.

use std::slice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::browser::{ElementHandle, Locator};
use crate::error::{Error, Result};

use super::{Actions, SCRIPT_CLICK};

// ============================================================================
// Presence
// ============================================================================

impl Actions {
    /// Waits for the first element matching `locator` using the element
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing matches in time.
    pub async fn locate(&self, locator: &Locator) -> Result<ElementHandle> {
        self.locate_within(locator, self.timeouts.element()).await
    }

    /// Waits up to `timeout` for the first element matching `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing matches in time.
    pub async fn locate_within(&self, locator: &Locator, timeout: Duration) -> Result<ElementHandle> {
        info!(parent: self.logger.span(), locator = %locator, "Attempting to find element");

        let browser = &self.browser;
        let found = self
            .poller(timeout)
            .until(move || browser.find(locator))
            .await?;

        found.ok_or_else(|| {
            error!(parent: self.logger.span(), locator = %locator, "Element not found within timeout");
            Error::not_found(locator, millis(timeout))
        })
    }
}

// ============================================================================
// Click
// ============================================================================

impl Actions {
    /// Waits for `locator` to be interactable and clicks it.
    ///
    /// A rejected native click is retried once as a script-level click, so
    /// the element receives exactly one logical click either way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the element never appears, and
    /// [`Error::NotClickable`] if it never becomes interactable or both
    /// click paths fail.
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        self.click_within(locator, self.timeouts.element()).await
    }

    /// [`Actions::click`] with an explicit timeout.
    ///
    /// # Errors
    ///
    /// See [`Actions::click`].
    pub async fn click_within(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        let seen = AtomicBool::new(false);
        let element = self.wait_interactable(locator, timeout, &seen).await?;

        let Some(element) = element else {
            error!(parent: self.logger.span(), locator = %locator, "Element not clickable");
            return Err(wait_failure(locator, timeout, &seen));
        };

        self.click_handle(&element).await?;
        info!(parent: self.logger.span(), locator = %locator, "Successfully clicked element");
        Ok(())
    }

    /// Clicks an already located element, falling back to a script click.
    pub(super) async fn click_handle(&self, element: &ElementHandle) -> Result<()> {
        let native = match self.browser.click(element).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_session_lost() => return Err(e),
            Err(e) => e,
        };

        warn!(
            parent: self.logger.span(),
            locator = %element.locator(),
            error = %native,
            "Normal click failed. Using script click fallback."
        );

        self.browser
            .execute_script(SCRIPT_CLICK, slice::from_ref(element))
            .await
            .map(drop)
            .map_err(|script| {
                Error::not_clickable(
                    element.locator(),
                    format!("native click: {native}; script click: {script}"),
                )
            })
    }

    /// Polls until `locator` is displayed and enabled.
    ///
    /// `seen` is set once the element was present at least once.
    pub(super) async fn wait_interactable(
        &self,
        locator: &Locator,
        timeout: Duration,
        seen: &AtomicBool,
    ) -> Result<Option<ElementHandle>> {
        let browser = &self.browser;
        self.poller(timeout)
            .until(move || async move {
                let Some(element) = browser.find(locator).await? else {
                    return Ok(None);
                };
                seen.store(true, Ordering::Relaxed);
                let ready =
                    browser.is_displayed(&element).await? && browser.is_enabled(&element).await?;
                Ok(ready.then_some(element))
            })
            .await
    }
}

// ============================================================================
// Read & Type
// ============================================================================

impl Actions {
    /// Returns the rendered text of `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the element never appears.
    pub async fn read_text(&self, locator: &Locator) -> Result<String> {
        let element = self.locate(locator).await.inspect_err(|_| {
            error!(parent: self.logger.span(), locator = %locator, "Failed to get text from element");
        })?;
        let text = self.browser.text(&element).await?;
        info!(parent: self.logger.span(), locator = %locator, text = %text, "Retrieved text");
        Ok(text)
    }

    /// Types `text` into `locator`.
    ///
    /// The text itself is never logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the element never appears.
    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.locate(locator).await?;
        self.browser.send_keys(&element, text).await?;
        debug!(parent: self.logger.span(), locator = %locator, chars = text.chars().count(), "Typed text");
        Ok(())
    }
}

/// Error for an interactability wait that ran out: `NotFound` if the element
/// never attached, `NotClickable` if it did but never became usable.
pub(super) fn wait_failure(locator: &Locator, timeout: Duration, seen: &AtomicBool) -> Error {
    if seen.load(Ordering::Relaxed) {
        Error::not_clickable(locator, format!("not interactable within {}ms", millis(timeout)))
    } else {
        Error::not_found(locator, millis(timeout))
    }
}

pub(super) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::actions::test_support::{HOME, actions};
    use crate::browser::{Browser, FakeBrowser, FakeElement};

    const BUTTON: Locator = Locator::xpath("//a[@id='login-btn']");
    const MISSING: Locator = Locator::id("missing");

    #[tokio::test(start_paused = true)]
    async fn test_locate_waits_for_late_element() {
        let (_, actions) = actions(
            FakeBrowser::new(HOME)
                .with_element(FakeElement::new(BUTTON).appears_after(Duration::from_secs(4))),
        );

        let start = Instant::now();
        let handle = actions.locate(&BUTTON).await.unwrap();
        assert_eq!(handle.locator(), &BUTTON);
        assert!(start.elapsed() >= Duration::from_secs(4));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_locate_raises_not_found() {
        let (_, actions) = actions(FakeBrowser::new(HOME));

        let err = actions
            .locate_within(&MISSING, Duration::from_secs(3))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { timeout_ms: 3000, .. }));
        assert!(err.to_string().contains("id=missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_session_fails_fast() {
        let (browser, actions) = actions(FakeBrowser::new(HOME).with_element(FakeElement::new(BUTTON)));
        browser.close().await.unwrap();
        let start = Instant::now();

        let err = actions.locate(&BUTTON).await.unwrap_err();
        assert!(err.is_session_lost(), "{err:?}");
        assert!(!matches!(err, Error::NotFound { .. }));

        let err = actions.click(&BUTTON).await.unwrap_err();
        assert!(err.is_session_lost(), "{err:?}");

        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_is_single_native_click() {
        let (browser, actions) = actions(FakeBrowser::new(HOME).with_element(
            FakeElement::new(BUTTON).on_click(|dom| dom.navigate("https://example.com/sign-in/")),
        ));

        actions.click(&BUTTON).await.unwrap();
        assert_eq!(browser.native_clicks(&BUTTON), 1);
        assert_eq!(browser.script_clicks(&BUTTON), 0);
        assert_eq!(browser.navigations(), vec!["https://example.com/sign-in/"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_fallback_is_one_logical_click() {
        let (browser, actions) = actions(FakeBrowser::new(HOME).with_element(
            FakeElement::new(BUTTON)
                .obscured()
                .on_click(|dom| dom.navigate("https://example.com/sign-in/")),
        ));

        actions.click(&BUTTON).await.unwrap();
        assert_eq!(browser.clicks(&BUTTON), 1);
        assert_eq!(browser.script_clicks(&BUTTON), 1);
        assert_eq!(browser.navigations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_disabled_is_not_clickable() {
        let (browser, actions) =
            actions(FakeBrowser::new(HOME).with_element(FakeElement::new(BUTTON).disabled()));

        let err = actions
            .click_within(&BUTTON, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotClickable { .. }));
        assert_eq!(browser.clicks(&BUTTON), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_absent_is_not_found() {
        let (_, actions) = actions(FakeBrowser::new(HOME));
        let err = actions.click(&MISSING).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { timeout_ms: 10_000, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_waits_until_displayed() {
        let (browser, actions) =
            actions(FakeBrowser::new(HOME).with_element(FakeElement::new(BUTTON).hidden()));

        let reveal = Arc::clone(&browser);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            reveal.configure(|dom| dom.set_displayed(&BUTTON, true));
        });

        actions.click(&BUTTON).await.unwrap();
        assert_eq!(browser.native_clicks(&BUTTON), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_text() {
        let (_, actions) = actions(
            FakeBrowser::new(HOME).with_element(FakeElement::new(BUTTON).text("Login")),
        );
        assert_eq!(actions.read_text(&BUTTON).await.unwrap(), "Login");
    }

    #[tokio::test(start_paused = true)]
    async fn test_type_text() {
        let email = Locator::id("email");
        let (browser, actions) =
            actions(FakeBrowser::new(HOME).with_element(FakeElement::new(email.clone())));

        actions.type_text(&email, "qa@guvi.in").await.unwrap();
        assert_eq!(browser.typed(&email), "qa@guvi.in");
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_secs(2)), 2_000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
