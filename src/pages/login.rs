//! Sign-in form and the signed-in profile menu.

use tracing::{debug, error, info};

use crate::actions::Actions;
use crate::browser::Locator;
use crate::error::Result;
use crate::logging;

// ============================================================================
// Locators
// ============================================================================

pub const EMAIL_INPUT: Locator = Locator::id("email");

pub const PASSWORD_INPUT: Locator = Locator::id("password");

/// Form submit.
pub const LOGIN_BUTTON: Locator = Locator::xpath("//a[@id='login-btn']");

/// Authentication error. The first `invalid-feedback` block belongs to the
/// email field.
pub const ERROR_MESSAGE: Locator =
    Locator::xpath("(//div[contains(@class,'invalid-feedback')])[2]");

/// "Sign Out" entry of the profile menu.
pub const LOGOUT_BUTTON: Locator =
    Locator::xpath("//li[@id='dropdown_contents']//div[contains(text(),'Sign Out')]");

/// Avatar opening the profile menu.
pub const PROFILE_ICON: Locator =
    Locator::xpath("//div[@id='dropdown_title']//img[@id='dropdown_contents']");

// ============================================================================
// LoginPage
// ============================================================================

/// The sign-in screen.
#[derive(Debug, Clone)]
pub struct LoginPage {
    actions: Actions,
}

impl LoginPage {
    #[must_use]
    pub fn new(actions: &Actions) -> Self {
        let actions = actions.with_logger(logging::logger("LoginPage"));
        info!(parent: actions.logger().span(), "LoginPage initialized");
        Self { actions }
    }

    /// Returns the action layer.
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Types `email` into the email field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the field is
    /// absent.
    pub async fn enter_email(&self, email: &str) -> Result<()> {
        info!(parent: self.actions.logger().span(), email = %email, "Entering email");
        self.actions.type_text(&EMAIL_INPUT, email).await
    }

    /// Types `password` into the password field. The value is never logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the field is
    /// absent.
    pub async fn enter_password(&self, password: &str) -> Result<()> {
        info!(parent: self.actions.logger().span(), "Entering password (masked)");
        self.actions.type_text(&PASSWORD_INPUT, password).await
    }

    /// Submits the form.
    ///
    /// # Errors
    ///
    /// See [`Actions::click`].
    pub async fn click_login_button(&self) -> Result<()> {
        info!(parent: self.actions.logger().span(), "Attempting to click login button");
        self.actions.click(&LOGIN_BUTTON).await
    }

    /// Enters `email`, then `password`, then submits.
    ///
    /// Steps already taken are not undone when a later one fails.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        info!(parent: self.actions.logger().span(), email = %email, "Attempting login");
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.click_login_button().await?;
        info!(parent: self.actions.logger().span(), "Login sequence completed");
        Ok(())
    }

    pub async fn is_error_message_displayed(&self) -> bool {
        let visible = self.actions.is_visible(&ERROR_MESSAGE).await;
        debug!(parent: self.actions.logger().span(), visible, "Error message visibility");
        visible
    }

    /// Returns the authentication error text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if no error is
    /// shown.
    pub async fn get_error_message(&self) -> Result<String> {
        self.actions.read_text(&ERROR_MESSAGE).await.inspect_err(|e| {
            error!(parent: self.actions.logger().span(), error = %e, "Failed to get error message");
        })
    }

    /// Opens the profile menu.
    ///
    /// # Errors
    ///
    /// See [`Actions::click`].
    pub async fn click_profile_icon(&self) -> Result<()> {
        info!(parent: self.actions.logger().span(), "Clicking profile icon");
        self.actions.click(&PROFILE_ICON).await
    }

    /// Clicks "Sign Out" in the profile menu.
    ///
    /// # Errors
    ///
    /// See [`Actions::click`].
    pub async fn click_logout(&self) -> Result<()> {
        info!(parent: self.actions.logger().span(), "Attempting logout");
        self.actions.click(&LOGOUT_BUTTON).await
    }
}

// ============================================================================
// Tests
// ============================================================================
