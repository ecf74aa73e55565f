//! Suite configuration.
//!
//! One immutable [`Config`] is built at startup and shared read-only by the
//! runner, page objects, and scenarios.
//!
//! Sources are layered, later ones winning:
//!
//! 1. Built-in defaults (the GUVI production site)
//! 2. An optional TOML file
//! 3. Environment variables (see [`ENV_VALID_EMAIL`] and friends)
//! 4. Command-line flags, applied by the binary
//!
//! # Example
//!
//! ```
//! use guvi_e2e::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.base_url, "https://www.guvi.in");
//! assert_eq!(config.sensitive_data("email").unwrap(), "***@***.***");
//! assert!(config.sensitive_data("phone").is_err());
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Chrome launch options.
pub mod chrome;

/// Test account credentials.
pub mod credentials;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

// ============================================================================
// Re-exports
// ============================================================================

pub use chrome::ChromeOptions;
pub use credentials::{Account, Credentials};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable holding the valid account's email.
pub const ENV_VALID_EMAIL: &str = "GUVI_VALID_EMAIL";

/// Environment variable holding the valid account's password.
pub const ENV_VALID_PASSWORD: &str = "GUVI_VALID_PASSWORD";

/// Environment variable overriding the site root.
pub const ENV_BASE_URL: &str = "GUVI_BASE_URL";

/// Environment variable pointing at a running browser's DevTools endpoint.
pub const ENV_CHROME_URL: &str = "GUVI_CHROME_URL";

/// Mask returned for the email field.
pub const MASKED_EMAIL: &str = "***@***.***";

/// Mask returned for the password field.
pub const MASKED_PASSWORD: &str = "********";

// ============================================================================
// Timeouts
// ============================================================================

/// Wait budgets for the action layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Presence wait used by `locate`.
    pub element_secs: u64,
    /// Interactability wait used by `is_clickable`.
    pub clickable_secs: u64,
    /// Visibility wait used by `is_visible`.
    pub visibility_secs: u64,
    /// Settle delay before visibility polling starts.
    pub visibility_delay_ms: u64,
    /// Generic condition wait used by `wait_until`.
    pub explicit_secs: u64,
    /// Gap between polls.
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_secs: 10,
            clickable_secs: 20,
            visibility_secs: 15,
            visibility_delay_ms: 1_000,
            explicit_secs: 20,
            poll_interval_ms: 500,
        }
    }
}

impl Timeouts {
    /// Presence wait.
    #[inline]
    #[must_use]
    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    /// Interactability wait.
    #[inline]
    #[must_use]
    pub fn clickable(&self) -> Duration {
        Duration::from_secs(self.clickable_secs)
    }

    /// Visibility wait.
    #[inline]
    #[must_use]
    pub fn visibility(&self) -> Duration {
        Duration::from_secs(self.visibility_secs)
    }

    /// Settle delay before visibility polling.
    #[inline]
    #[must_use]
    pub fn visibility_delay(&self) -> Duration {
        Duration::from_millis(self.visibility_delay_ms)
    }

    /// Generic condition wait.
    #[inline]
    #[must_use]
    pub fn explicit(&self) -> Duration {
        Duration::from_secs(self.explicit_secs)
    }

    /// Gap between polls.
    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("element_secs", self.element_secs),
            ("clickable_secs", self.clickable_secs),
            ("visibility_secs", self.visibility_secs),
            ("explicit_secs", self.explicit_secs),
            ("poll_interval_ms", self.poll_interval_ms),
        ];
        for (name, value) in required {
            if value == 0 {
                return Err(Error::config(format!("timeouts.{name} must be non-zero")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// LogConfig
// ============================================================================

/// Log sink settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory for log files, created on demand.
    pub directory: PathBuf,
    /// File name prefix; a `_<YYYYmmdd_HHMMSS>.log` suffix is appended.
    pub file_prefix: String,
    /// Size at which the active file is rotated.
    pub max_bytes: u64,
    /// Rotated files kept beside the active one.
    pub backups: usize,
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Mirror log lines to stdout.
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "guvi_test".to_string(),
            max_bytes: 5 * 1024 * 1024,
            backups: 3,
            level: "info".to_string(),
            console: true,
        }
    }
}

// ============================================================================
// SensitiveField
// ============================================================================

/// Credential field readable through [`Config::sensitive_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensitiveField {
    /// The valid account's email.
    Email,
    /// The valid account's password.
    Password,
}

impl SensitiveField {
    /// Returns the fixed mask for this field.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> &'static str {
        match self {
            Self::Email => MASKED_EMAIL,
            Self::Password => MASKED_PASSWORD,
        }
    }
}

impl FromStr for SensitiveField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "email" => Ok(Self::Email),
            "password" => Ok(Self::Password),
            _ => Err(Error::invalid_argument("Invalid data type requested")),
        }
    }
}

impl fmt::Display for SensitiveField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Password => f.write_str("password"),
        }
    }
}

// ============================================================================
// Config
// ============================================================================

/// Complete suite configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root.
    pub base_url: String,
    /// Sign-in page.
    pub login_url: String,
    /// Registration page.
    pub register_url: String,
    /// Home page `<title>`.
    pub expected_title: String,
    /// Accounts for the login scenarios.
    pub credentials: Credentials,
    /// Wait budgets.
    pub timeouts: Timeouts,
    /// Mask credentials returned by [`Config::sensitive_data`].
    pub credential_masking: bool,
    /// Browser launch options.
    pub browser: ChromeOptions,
    /// Log sink settings.
    pub logging: LogConfig,
    /// Where failure screenshots are written.
    pub artifacts_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.guvi.in".to_string(),
            login_url: "https://www.guvi.in/sign-in/".to_string(),
            register_url: "https://www.guvi.in/register/".to_string(),
            expected_title: "GUVI | Learn to code in your native language".to_string(),
            credentials: Credentials::default(),
            timeouts: Timeouts::default(),
            credential_masking: true,
            browser: ChromeOptions::default(),
            logging: LogConfig::default(),
            artifacts_dir: PathBuf::from("artifacts"),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Builds the configuration from defaults, an optional TOML file, and the
    /// process environment, then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Toml`] if the file cannot be read
    /// or parsed, and [`Error::Config`] if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Toml`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// A valid account is only created when both email and password are
    /// present; a lone variable overrides the matching field of an account
    /// already loaded from file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            debug!(base_url = %url, "Base URL overridden from environment");
            self.base_url = url;
        }
        if let Some(url) = lookup(ENV_CHROME_URL) {
            self.browser.connect_url = Some(url);
        }

        let email = lookup(ENV_VALID_EMAIL);
        let password = lookup(ENV_VALID_PASSWORD);
        match (email, password) {
            (Some(email), Some(password)) => {
                self.credentials.valid = Some(Account::new(email, password));
            }
            (email, password) => {
                if let Some(account) = self.credentials.valid.as_mut() {
                    if let Some(email) = email {
                        account.email = email;
                    }
                    if let Some(password) = password {
                        account.password = password.into();
                    }
                }
            }
        }
    }

    /// Checks URLs, timeouts, and sink settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("base_url", &self.base_url),
            ("login_url", &self.login_url),
            ("register_url", &self.register_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::config(format!("{name} is not a valid URL ({value}): {e}")))?;
        }
        self.timeouts.validate()?;
        self.browser.validate()?;
        if self.logging.max_bytes == 0 {
            return Err(Error::config("logging.max_bytes must be non-zero"));
        }
        if self.logging.file_prefix.is_empty() {
            return Err(Error::config("logging.file_prefix must not be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Config {
    /// Returns the URL the browser reports after loading the site root.
    #[must_use]
    pub fn home_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// Returns a valid-account credential, masked when masking is enabled.
    ///
    /// `data_type` must be `"email"` or `"password"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for any other `data_type`, and
    /// [`Error::Config`] when unmasked access is requested but no valid
    /// account is configured.
    pub fn sensitive_data(&self, data_type: &str) -> Result<String> {
        let field: SensitiveField = data_type.parse()?;
        if self.credential_masking {
            return Ok(field.mask().to_string());
        }

        let account = self.valid_account()?;
        Ok(match field {
            SensitiveField::Email => account.email.clone(),
            SensitiveField::Password => account.password().to_string(),
        })
    }

    /// Returns the valid account's email as it may appear in logs, masked
    /// when masking is enabled. `None` when no valid account is configured.
    #[must_use]
    pub fn account_for_log(&self) -> Option<String> {
        self.valid_account().ok()?;
        self.sensitive_data("email").ok()
    }

    /// Returns the configured valid account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the environment variables to set.
    pub fn valid_account(&self) -> Result<&Account> {
        self.credentials.valid.as_ref().ok_or_else(|| {
            Error::config(format!(
                "no valid account configured; set {ENV_VALID_EMAIL} and {ENV_VALID_PASSWORD}"
            ))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use proptest::prelude::*;
    use rustc_hash::FxHashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.login_url, "https://www.guvi.in/sign-in/");
        assert_eq!(config.register_url, "https://www.guvi.in/register/");
        assert_eq!(
            config.expected_title,
            "GUVI | Learn to code in your native language"
        );
        assert_eq!(config.timeouts.element(), Duration::from_secs(10));
        assert_eq!(config.timeouts.explicit(), Duration::from_secs(20));
        assert_eq!(config.timeouts.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.logging.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.logging.backups, 3);
        assert!(config.credential_masking);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_home_url_appends_slash() {
        let mut config = Config::default();
        assert_eq!(config.home_url(), "https://www.guvi.in/");
        config.base_url = "http://localhost:8080/".to_string();
        assert_eq!(config.home_url(), "http://localhost:8080/");
    }

    #[test]
    fn test_masked_values() {
        let config = Config::default();
        assert_eq!(config.sensitive_data("email").unwrap(), MASKED_EMAIL);
        assert_eq!(config.sensitive_data("password").unwrap(), MASKED_PASSWORD);
    }

    #[test]
    fn test_unmasked_returns_stored_value() {
        let mut config = Config::default();
        config.credential_masking = false;
        config.credentials.valid = Some(Account::new("qa@guvi.in", "s3cret"));
        assert_eq!(config.sensitive_data("email").unwrap(), "qa@guvi.in");
        assert_eq!(config.sensitive_data("password").unwrap(), "s3cret");
    }

    #[test]
    fn test_unmasked_without_account_is_config_error() {
        let mut config = Config::default();
        config.credential_masking = false;
        assert!(matches!(
            config.sensitive_data("email"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_account_for_log() {
        let mut config = Config::default();
        assert_eq!(config.account_for_log(), None);

        config.credentials.valid = Some(Account::new("qa@guvi.in", "s3cret"));
        assert_eq!(config.account_for_log().as_deref(), Some(MASKED_EMAIL));

        config.credential_masking = false;
        assert_eq!(config.account_for_log().as_deref(), Some("qa@guvi.in"));
    }

    #[test]
    fn test_invalid_field_checked_before_masking() {
        let config = Config::default();
        assert!(matches!(
            config.sensitive_data("EMAIL"),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_env_creates_valid_account() {
        let mut config = Config::default();
        config.apply_env(env(&[
            (ENV_VALID_EMAIL, "qa@guvi.in"),
            (ENV_VALID_PASSWORD, "s3cret"),
            (ENV_BASE_URL, "http://localhost:3000"),
        ]));
        let account = config.valid_account().unwrap();
        assert_eq!(account.email, "qa@guvi.in");
        assert_eq!(account.password(), "s3cret");
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_env_lone_email_needs_existing_account() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_VALID_EMAIL, "qa@guvi.in")]));
        assert!(config.credentials.valid.is_none());

        config.credentials.valid = Some(Account::new("old@guvi.in", "pw"));
        config.apply_env(env(&[(ENV_VALID_EMAIL, "qa@guvi.in")]));
        let account = config.valid_account().unwrap();
        assert_eq!(account.email, "qa@guvi.in");
        assert_eq!(account.password(), "pw");
    }

    #[test]
    fn test_env_chrome_url() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_CHROME_URL, "http://127.0.0.1:9222")]));
        assert!(config.browser.is_attach());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config {
            base_url: "guvi".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.timeouts.clickable_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("clickable_secs"));
    }

    #[test]
    fn test_zero_visibility_delay_is_allowed() {
        let mut config = Config::default();
        config.timeouts.visibility_delay_ms = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_layers_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url = "http://localhost:8080"
credential_masking = false

[timeouts]
element_secs = 3

[credentials.valid]
email = "qa@guvi.in"
password = "s3cret"

[logging]
directory = "target/logs"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeouts.element_secs, 3);
        assert_eq!(config.timeouts.clickable_secs, 20);
        assert_eq!(config.logging.directory, PathBuf::from("target/logs"));
        assert_eq!(config.logging.file_prefix, "guvi_test");
        assert_eq!(config.sensitive_data("password").unwrap(), "s3cret");
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let result = Config::from_file(Path::new("/nonexistent/guvi.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_from_file_malformed_is_toml_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = ").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Toml(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_unknown_field_always_rejected(
            data_type in "[a-zA-Z_]{0,12}",
            masking in any::<bool>(),
        ) {
            prop_assume!(data_type != "email" && data_type != "password");
            let mut config = Config::default();
            config.credential_masking = masking;
            config.credentials.valid = Some(Account::new("qa@guvi.in", "s3cret"));
            let is_invalid_argument = matches!(
                config.sensitive_data(&data_type),
                Err(Error::InvalidArgument { .. })
            );
            prop_assert!(is_invalid_argument);
        }

        #[test]
        fn prop_masking_hides_stored_value(email in "[a-z]{1,8}@[a-z]{1,8}\\.in") {
            let mut config = Config::default();
            config.credentials.valid = Some(Account::new(email.clone(), "s3cret"));
            prop_assert_eq!(config.sensitive_data("email").unwrap(), MASKED_EMAIL);
            config.credential_masking = false;
            prop_assert_eq!(config.sensitive_data("email").unwrap(), email);
        }
    }
}
