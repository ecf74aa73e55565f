//! In-memory model of the GUVI site shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use guvi_e2e::config::Account;
use guvi_e2e::pages::{home, login, register};
use guvi_e2e::scenarios::guvi::DOBBY_CHAT_ICON;
use guvi_e2e::{Config, FakeBrowser, FakeDom, FakeElement};

pub const HOME: &str = "https://www.guvi.in/";
pub const LOGIN: &str = "https://www.guvi.in/sign-in/";
pub const REGISTER: &str = "https://www.guvi.in/register/";
pub const DASHBOARD: &str = "https://www.guvi.in/courses/";

pub const TITLE: &str = "GUVI | Learn to code in your native language";
pub const VALID_EMAIL: &str = "learner@example.com";
pub const VALID_PASSWORD: &str = "correct-horse";

/// Suite configuration pointing at the model.
pub fn config(artifacts: &Path) -> Config {
    Config {
        base_url: HOME.to_string(),
        login_url: LOGIN.to_string(),
        register_url: REGISTER.to_string(),
        expected_title: TITLE.to_string(),
        artifacts_dir: artifacts.to_path_buf(),
        ..Config::default()
    }
}

/// [`config`] with the model's registered account.
pub fn config_with_account(artifacts: &Path) -> Config {
    let mut config = config(artifacts);
    config.credentials.valid = Some(Account::new(VALID_EMAIL, VALID_PASSWORD));
    config
}

/// Signs in when the form holds the registered account, otherwise shows the
/// authentication error. The form is cleared either way.
fn submit(dom: &mut FakeDom) {
    let accepted = dom.value_of(&login::EMAIL_INPUT) == Some(VALID_EMAIL)
        && dom.value_of(&login::PASSWORD_INPUT) == Some(VALID_PASSWORD);

    dom.clear_value(&login::EMAIL_INPUT);
    dom.clear_value(&login::PASSWORD_INPUT);

    if accepted {
        dom.set_displayed(&login::ERROR_MESSAGE, false);
        dom.navigate(DASHBOARD);
    } else {
        dom.set_displayed(&login::ERROR_MESSAGE, true);
    }
}

/// The site with every element the scenarios look for.
pub fn site() -> FakeBrowser {
    build(true)
}

/// [`site`] where opening the profile menu never reveals the logout link.
pub fn site_with_broken_logout() -> FakeBrowser {
    build(false)
}

fn build(logout_works: bool) -> FakeBrowser {
    let profile_icon = FakeElement::new(login::PROFILE_ICON).on_page(DASHBOARD);
    let profile_icon = if logout_works {
        profile_icon.on_click(|dom| dom.set_displayed(&login::LOGOUT_BUTTON, true))
    } else {
        profile_icon
    };

    FakeBrowser::new("about:blank")
        .with_title(HOME, TITLE)
        .with_title(LOGIN, "Sign In | GUVI")
        .with_title(REGISTER, "Sign Up | GUVI")
        // Landing page
        .with_element(
            FakeElement::new(home::LOGIN_BUTTON)
                .on_page(HOME)
                .text("Login")
                .on_click(|dom| dom.navigate(LOGIN)),
        )
        .with_element(
            FakeElement::new(home::SIGNUP_BUTTON)
                .on_page(HOME)
                .text("Sign up")
                .on_click(|dom| dom.navigate(REGISTER)),
        )
        .with_element(FakeElement::new(home::COURSES_MENU).on_page(HOME))
        .with_element(FakeElement::new(home::LIVE_CLASSES_MENU).on_page(HOME))
        .with_element(FakeElement::new(home::PRACTICE_MENU).on_page(HOME))
        .with_element(
            FakeElement::new(DOBBY_CHAT_ICON)
                .on_page(HOME)
                .appears_after(Duration::from_secs(3)),
        )
        // Sign-in form
        .with_element(FakeElement::new(login::EMAIL_INPUT).on_page(LOGIN))
        .with_element(FakeElement::new(login::PASSWORD_INPUT).on_page(LOGIN))
        .with_element(
            FakeElement::new(login::LOGIN_BUTTON)
                .on_page(LOGIN)
                .on_click(submit),
        )
        .with_element(
            FakeElement::new(login::ERROR_MESSAGE)
                .on_page(LOGIN)
                .text("Incorrect Email or Password")
                .hidden(),
        )
        // Signed-in header
        .with_element(profile_icon)
        .with_element(
            FakeElement::new(login::LOGOUT_BUTTON)
                .on_page(DASHBOARD)
                .hidden()
                .on_click(|dom| {
                    dom.set_displayed(&login::LOGOUT_BUTTON, false);
                    dom.navigate(HOME);
                }),
        )
        // Registration
        .with_element(
            FakeElement::new(register::REGISTER_HEADER)
                .on_page(REGISTER)
                .appears_after(Duration::from_millis(800)),
        )
}
