//! Test account credentials.
//!
//! Passwords are held as [`SecretString`] and never appear in `Debug`
//! output or log lines.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

// ============================================================================
// Constants
// ============================================================================

/// Fixture address guaranteed not to belong to an account.
pub const INVALID_EMAIL: &str = "invalid@example.com";

/// Fixture password paired with [`INVALID_EMAIL`].
pub const INVALID_PASSWORD: &str = "wrongpassword";

// ============================================================================
// Account
// ============================================================================

/// An email/password pair.
#[derive(Clone, Deserialize)]
pub struct Account {
    /// Login email.
    pub email: String,

    /// Login password.
    #[serde(deserialize_with = "secret_from_str")]
    pub password: SecretString,
}

impl Account {
    /// Creates an account.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns the plaintext password, for typing into the login form only.
    #[inline]
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn secret_from_str<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

// ============================================================================
// Credentials
// ============================================================================

/// Accounts used by the login scenarios.
///
/// No valid account ships with the crate. It must come from the config file
/// or the `GUVI_VALID_EMAIL` / `GUVI_VALID_PASSWORD` environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// A registered account, if provided.
    pub valid: Option<Account>,

    /// An account that must be rejected.
    pub invalid: Account,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            valid: None,
            invalid: Account::new(INVALID_EMAIL, INVALID_PASSWORD),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
