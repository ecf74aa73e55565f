//! Sign-up form.

use tracing::{info, warn};

use crate::actions::Actions;
use crate::browser::Locator;
use crate::logging;

/// Heading shown once the sign-up form has rendered.
pub const REGISTER_HEADER: Locator = Locator::xpath("//h2[contains(text(),'Sign Up')]");

/// The registration screen.
#[derive(Debug, Clone)]
pub struct RegisterPage {
    actions: Actions,
}

impl RegisterPage {
    #[must_use]
    pub fn new(actions: &Actions) -> Self {
        let actions = actions.with_logger(logging::logger("RegisterPage"));
        info!(parent: actions.logger().span(), "RegisterPage initialized");
        Self { actions }
    }

    /// Checks whether the sign-up heading is visible.
    pub async fn is_register_page_loaded(&self) -> bool {
        let loaded = self.actions.is_visible(&REGISTER_HEADER).await;
        if loaded {
            info!(parent: self.actions.logger().span(), "Registration page loaded");
        } else {
            warn!(parent: self.actions.logger().span(), "Registration page header not found");
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{HOME, actions};
    use crate::browser::{FakeBrowser, FakeElement};

    #[tokio::test(start_paused = true)]
    async fn test_loaded_when_header_visible() {
        let (_, actions) = actions(FakeBrowser::new(HOME).with_element(
            FakeElement::new(REGISTER_HEADER).appears_after(std::time::Duration::from_secs(3)),
        ));
        assert!(RegisterPage::new(&actions).is_register_page_loaded().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_loaded_without_header() {
        let (_, actions) = actions(FakeBrowser::new(HOME));
        assert!(!RegisterPage::new(&actions).is_register_page_loaded().await);
    }
}
