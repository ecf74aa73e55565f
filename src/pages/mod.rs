//! Page objects.
//!
//! Each page wraps the locators of one screen and exposes named actions
//! built from [`Actions`]. Pages hold no state of their own: which screen is
//! current is whatever the live browser URL says.
//!
//! | Page | Screen |
//! |------|--------|
//! | [`HomePage`] | Site root with the top navigation |
//! | [`LoginPage`] | Sign-in form and the signed-in profile menu |
//! | [`RegisterPage`] | Sign-up form |
//!
//! [`Actions`]: crate::Actions

// ============================================================================
// Submodules
// ============================================================================

/// Site root.
pub mod home;

/// Sign-in form.
pub mod login;

/// Sign-up form.
pub mod register;

// ============================================================================
// Re-exports
// ============================================================================

pub use home::HomePage;
pub use login::LoginPage;
pub use register::RegisterPage;
