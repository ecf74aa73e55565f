//! Site root with the top navigation.

use std::time::Duration;

use tracing::{debug, info};

use crate::actions::Actions;
use crate::browser::Locator;
use crate::error::Result;
use crate::logging;

// ============================================================================
// Locators
// ============================================================================

/// "Login" link in the header. The first match is hidden in the mobile menu.
pub const LOGIN_BUTTON: Locator = Locator::xpath("(//a[contains(text(),'Login')])[2]");

/// "Sign up" link in the header.
pub const SIGNUP_BUTTON: Locator = Locator::xpath("//a[contains(text(),'Sign up')]");

/// "Courses" menu entry.
pub const COURSES_MENU: Locator = Locator::xpath("(//a[contains(text(),'Courses')])[2]");

/// "LIVE Classes" menu entry.
pub const LIVE_CLASSES_MENU: Locator = Locator::xpath("//p[@id='liveclasseslink']");

/// "Practice" menu entry.
pub const PRACTICE_MENU: Locator = Locator::xpath("//p[@id='practiceslink']");

/// Dobby assistant icon.
pub const DOBBY_ASSISTANT: Locator = Locator::xpath("(//img[@alt='Dobby bot icon'])[1]");

/// Login button rendered by some layouts instead of the header link.
pub const LOGIN_BUTTON_ALT: Locator = Locator::xpath("//a[@id='login-btn']");

// ============================================================================
// HomePage
// ============================================================================

/// The site root.
#[derive(Debug, Clone)]
pub struct HomePage {
    actions: Actions,
}

impl HomePage {
    /// Wraps `actions` without navigating.
    #[must_use]
    pub fn new(actions: &Actions) -> Self {
        Self {
            actions: actions.with_logger(logging::logger("HomePage")),
        }
    }

    /// Loads `base_url` and returns the page.
    ///
    /// # Errors
    ///
    /// Propagates navigation errors.
    pub async fn open(actions: &Actions, base_url: &str) -> Result<Self> {
        let page = Self::new(actions);
        info!(parent: page.actions.logger().span(), url = %base_url, "Initializing HomePage");
        page.actions.navigate(base_url).await?;
        Ok(page)
    }

    /// Returns the action layer.
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Returns the current URL.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub async fn current_url(&self) -> Result<String> {
        self.actions.current_url().await
    }

    /// Returns the page title.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub async fn page_title(&self) -> Result<String> {
        self.actions.page_title().await
    }

    /// Clicks the header "Login" link.
    ///
    /// # Errors
    ///
    /// See [`Actions::click`].
    pub async fn click_login(&self) -> Result<()> {
        info!(parent: self.actions.logger().span(), "Attempting to click Login button");
        self.actions.click(&LOGIN_BUTTON).await
    }

    /// Clicks the header "Sign up" link.
    ///
    /// # Errors
    ///
    /// See [`Actions::click`].
    pub async fn click_signup(&self) -> Result<()> {
        info!(parent: self.actions.logger().span(), "Attempting to click Sign Up button");
        self.actions.click(&SIGNUP_BUTTON).await
    }

    pub async fn is_login_visible(&self) -> bool {
        self.visible("Login button", &LOGIN_BUTTON).await
    }

    pub async fn is_signup_visible(&self) -> bool {
        self.visible("Sign Up button", &SIGNUP_BUTTON).await
    }

    pub async fn is_courses_visible(&self) -> bool {
        self.visible("Courses menu", &COURSES_MENU).await
    }

    pub async fn is_live_classes_visible(&self) -> bool {
        self.visible("Live Classes menu", &LIVE_CLASSES_MENU).await
    }

    pub async fn is_practice_visible(&self) -> bool {
        self.visible("Practice menu", &PRACTICE_MENU).await
    }

    pub async fn is_dobby_assistant_visible(&self) -> bool {
        self.visible("Dobby Assistant", &DOBBY_ASSISTANT).await
    }

    /// Checks whether `locator` becomes clickable within `timeout`.
    pub async fn is_element_clickable(&self, locator: &Locator, timeout: Duration) -> bool {
        info!(parent: self.actions.logger().span(), locator = %locator, "Checking clickability of element");
        self.actions.is_clickable_within(locator, timeout).await
    }

    async fn visible(&self, what: &str, locator: &Locator) -> bool {
        let visible = self.actions.is_visible(locator).await;
        debug!(parent: self.actions.logger().span(), element = what, visible, "Visibility");
        visible
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{HOME, actions};
    use crate::browser::{FakeBrowser, FakeElement};

    const SIGN_IN: &str = "https://example.com/sign-in/";

    #[tokio::test(start_paused = true)]
    async fn test_open_navigates_to_base() {
        let (browser, actions) = actions(FakeBrowser::new("about:blank"));

        let home = HomePage::open(&actions, HOME).await.unwrap();
        assert_eq!(home.current_url().await.unwrap(), HOME);
        assert_eq!(browser.navigations(), vec![HOME]);
        assert_eq!(home.actions().logger().name(), "HomePage");
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_login_follows_link() {
        let (_, actions) = actions(FakeBrowser::new(HOME).with_element(
            FakeElement::new(LOGIN_BUTTON)
                .on_page(HOME)
                .on_click(|dom| dom.navigate(SIGN_IN)),
        ));

        let home = HomePage::new(&actions);
        assert!(home.is_login_visible().await);
        home.click_login().await.unwrap();
        assert_eq!(home.current_url().await.unwrap(), SIGN_IN);
    }

    #[tokio::test(start_paused = true)]
    async fn test_menu_queries() {
        let (_, actions) = actions(
            FakeBrowser::new(HOME)
                .with_element(FakeElement::new(COURSES_MENU))
                .with_element(FakeElement::new(LIVE_CLASSES_MENU))
                .with_element(FakeElement::new(PRACTICE_MENU).hidden()),
        );

        let home = HomePage::new(&actions);
        assert!(home.is_courses_visible().await);
        assert!(home.is_live_classes_visible().await);
        assert!(!home.is_practice_visible().await);
        assert!(!home.is_dobby_assistant_visible().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_alt_login_clickable() {
        let (_, actions) =
            actions(FakeBrowser::new(HOME).with_element(FakeElement::new(LOGIN_BUTTON_ALT)));

        let home = HomePage::new(&actions);
        assert!(home.is_element_clickable(&LOGIN_BUTTON_ALT, Duration::from_secs(20)).await);
        assert!(!home.is_element_clickable(&SIGNUP_BUTTON, Duration::from_secs(1)).await);
    }
}
