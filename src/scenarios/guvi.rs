//! End-to-end checks against the GUVI site.
//!
//! Every scenario starts from the site root, so the order they run in does
//! not matter. They still share one session, including its cookies.

use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use regex::RegexBuilder;
use tracing::info;

use crate::browser::Locator;
use crate::error::{Error, Result};
use crate::pages::login::LOGOUT_BUTTON;
use crate::pages::{HomePage, LoginPage, RegisterPage};
use crate::suite::{Context, Scenario, ScenarioGroup};
use crate::{ensure, ensure_eq};

/// Chat widget rendered once the Dobby assistant has loaded.
pub const DOBBY_CHAT_ICON: Locator = Locator::xpath("//img[@id='chateleon-container-gif-0']");

/// Screenshot written when a sign-out check fails.
pub const LOGOUT_FAILURE_SCREENSHOT: &str = "logout_failure.png";

/// Error text must match this, ignoring case.
const AUTH_ERROR_PATTERN: &str = "invalid|incorrect";

/// The full GUVI group, in the order the checks are reported.
#[must_use]
pub fn group() -> ScenarioGroup {
    ScenarioGroup::new(
        "guvi",
        vec![
            Scenario::new("url_loading", url_loading),
            Scenario::new("page_title", page_title),
            Scenario::new("login_button", login_button),
            Scenario::new("signup_button", signup_button),
            Scenario::new("signup_navigation", signup_navigation),
            Scenario::new("invalid_login", invalid_login),
            Scenario::new("valid_login", valid_login).needing_account(),
            Scenario::new("menu_items_visibility", menu_items_visibility),
            Scenario::new("dobby_assistant", dobby_assistant),
            Scenario::new("logout_functionality", logout_functionality).needing_account(),
        ],
    )
}

async fn open_home(ctx: &Context) -> Result<HomePage> {
    HomePage::open(ctx.actions(), &ctx.config().base_url).await
}

// ============================================================================
// Landing Page
// ============================================================================

fn url_loading(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    async move {
        let home = open_home(ctx).await?;
        ensure_eq!(home.current_url().await?, ctx.config().home_url(), "URL mismatch");
        Ok(())
    }
    .boxed()
}

fn page_title(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    async move {
        let home = open_home(ctx).await?;
        ensure_eq!(home.page_title().await?, ctx.config().expected_title, "Title mismatch");
        Ok(())
    }
    .boxed()
}

fn menu_items_visibility(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    async move {
        let home = open_home(ctx).await?;
        ensure!(home.is_courses_visible().await, "Courses menu not visible");
        ensure!(home.is_live_classes_visible().await, "LIVE Classes menu not visible");
        ensure!(home.is_practice_visible().await, "Practice menu not visible");
        Ok(())
    }
    .boxed()
}

fn dobby_assistant(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    async move {
        open_home(ctx).await?;
        // The widget is lazy-loaded after the page settles.
        let visible = ctx
            .actions()
            .is_visible_within(
                &DOBBY_CHAT_ICON,
                Duration::from_secs(2),
                Duration::from_secs(15),
            )
            .await;
        ensure!(visible, "Dobby Assistant icon not visible");
        Ok(())
    }
    .boxed()
}

// ============================================================================
// Navigation
// ============================================================================

fn login_button(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    async move {
        let home = open_home(ctx).await?;
        ensure!(home.is_login_visible().await, "Login button not visible");
        home.click_login().await?;
        ensure_eq!(
            home.current_url().await?,
            ctx.config().login_url,
            "Did not navigate to login page"
        );
        Ok(())
    }
    .boxed()
}

fn signup_button(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    async move {
        let home = open_home(ctx).await?;
        ensure!(home.is_signup_visible().await, "Sign-Up button not visible");
        home.click_signup().await?;
        Ok(())
    }
    .boxed()
}

fn signup_navigation(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    async move {
        let home = open_home(ctx).await?;
        home.click_signup().await?;

        let register = RegisterPage::new(ctx.actions());
        ensure_eq!(
            home.current_url().await?,
            ctx.config().register_url,
            "Wrong registration URL"
        );
        ensure!(register.is_register_page_loaded().await, "Registration page not loaded");
        Ok(())
    }
    .boxed()
}

// ============================================================================
// Authentication
// ============================================================================

fn invalid_login(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    async move {
        let account = &ctx.config().credentials.invalid;
        let home = open_home(ctx).await?;
        home.click_login().await?;

        let login = LoginPage::new(ctx.actions());
        login.login(&account.email, account.password()).await?;

        ensure!(
            login.is_error_message_displayed().await,
            "No error shown for invalid login"
        );
        let message = login.get_error_message().await?;
        let pattern = RegexBuilder::new(AUTH_ERROR_PATTERN)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::invalid_argument(e.to_string()))?;
        ensure!(
            pattern.is_match(&message),
            "unexpected error message: {message:?}"
        );
        Ok(())
    }
    .boxed()
}

fn valid_login(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    login_and_sign_out(ctx, "Valid login successful").boxed()
}

fn logout_functionality(ctx: &Context) -> BoxFuture<'_, Result<()>> {
    login_and_sign_out(ctx, "Logout functionality works correctly").boxed()
}

/// Signs in with the valid account, then signs out through the profile menu
/// and checks the session is back on the signed-out home page.
///
/// A screenshot is saved if anything after opening the profile menu fails.
async fn login_and_sign_out(ctx: &Context, done: &'static str) -> Result<()> {
    let account = ctx.config().valid_account()?;
    let home = open_home(ctx).await?;
    home.click_login().await?;

    let login = LoginPage::new(ctx.actions());
    login.login(&account.email, account.password()).await?;
    login.click_profile_icon().await?;

    let actions = ctx.actions();
    let artifact = ctx.config().artifacts_dir.join(LOGOUT_FAILURE_SCREENSHOT);
    let base_url = ctx.config().base_url.as_str();

    actions
        .capture_on_error(&artifact, async {
            let explicit = actions.timeouts().explicit();
            actions.click_within(&LOGOUT_BUTTON, explicit).await?;

            let home = &home;
            actions
                .wait_until("logged-out state", explicit, move || async move {
                    Ok(home.current_url().await?.contains(base_url) || home.is_login_visible().await)
                })
                .await?;

            ensure!(
                home.is_login_visible().await,
                "Login button should be visible after logout"
            );
            ensure!(
                home.current_url().await?.contains(base_url),
                "Should be on homepage after logout"
            );
            Ok(())
        })
        .await?;

    info!(parent: ctx.logger().span(), "{done}");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_has_every_check() {
        let group = group();
        let names: Vec<_> = group.scenarios().iter().map(Scenario::name).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "url_loading");
        assert_eq!(names[9], "logout_functionality");
    }

    #[test]
    fn test_only_account_checks_need_an_account() {
        let needing: Vec<_> = group()
            .scenarios()
            .iter()
            .filter(|s| s.needs_account())
            .map(Scenario::name)
            .collect();
        assert_eq!(needing, ["valid_login", "logout_functionality"]);
    }

    #[test]
    fn test_auth_error_pattern() {
        let pattern = RegexBuilder::new(AUTH_ERROR_PATTERN)
            .case_insensitive(true)
            .build()
            .unwrap();
        assert!(pattern.is_match("Incorrect email or password"));
        assert!(pattern.is_match("INVALID credentials"));
        assert!(!pattern.is_match("Something went wrong"));
    }
}
