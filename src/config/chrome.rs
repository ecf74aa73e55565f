//! Chrome launch options.
//!
//! Controls how the suite obtains its browser: either launching a local
//! Chrome/Chromium process or attaching to one already listening for
//! DevTools connections.
//!
//! # Example
//!
//! ```
//! use guvi_e2e::config::ChromeOptions;
//!
//! let options = ChromeOptions::new()
//!     .with_headed()
//!     .with_window_size(1920, 1080)
//!     .with_arg("--lang=en-US");
//!
//! let args = options.launch_args();
//! assert!(args.contains(&"--incognito".to_string()));
//! assert!(args.contains(&"--window-size=1920,1080".to_string()));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Arguments every launched browser receives.
const DEFAULT_ARGS: [&str; 3] = ["--incognito", "--disable-infobars", "--disable-extensions"];

/// Default time to wait for the browser process to expose DevTools.
const DEFAULT_LAUNCH_TIMEOUT_SECS: u64 = 20;

// ============================================================================
// ChromeOptions
// ============================================================================

/// Browser process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChromeOptions {
    /// Explicit path to the Chrome binary. Detected when unset.
    pub executable: Option<PathBuf>,

    /// DevTools endpoint of a running browser. Nothing is launched when set.
    pub connect_url: Option<String>,

    /// Run without a visible window.
    pub headless: bool,

    /// Window dimensions in pixels (width, height).
    pub window_size: Option<(u32, u32)>,

    /// Command-line arguments passed to the browser.
    pub args: Vec<String>,

    /// Seconds to wait for the process to come up.
    pub launch_timeout_secs: u64,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ChromeOptions {
    /// Creates options with the suite defaults: headless, incognito, no
    /// infobars or extensions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            executable: None,
            connect_url: None,
            headless: true,
            window_size: None,
            args: DEFAULT_ARGS.iter().map(ToString::to_string).collect(),
            launch_timeout_secs: DEFAULT_LAUNCH_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ChromeOptions {
    /// Shows the browser window.
    #[inline]
    #[must_use]
    pub fn with_headed(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Sets window size in pixels.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Uses a specific browser binary.
    #[inline]
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Attaches to a running browser instead of launching one.
    #[inline]
    #[must_use]
    pub fn with_connect_url(mut self, url: impl Into<String>) -> Self {
        self.connect_url = Some(url.into());
        self
    }

    /// Adds a custom command-line argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple custom command-line arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl ChromeOptions {
    /// Returns the full argument list for a launched browser.
    #[must_use]
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        for arg in &self.args {
            if !args.contains(arg) {
                args.push(arg.clone());
            }
        }
        if let Some((width, height)) = self.window_size {
            args.push(format!("--window-size={width},{height}"));
        }
        args
    }

    /// Returns the launch timeout.
    #[inline]
    #[must_use]
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    /// Returns `true` if an existing browser is reused.
    #[inline]
    #[must_use]
    pub fn is_attach(&self) -> bool {
        self.connect_url.is_some()
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on a zero window dimension, a zero launch
    /// timeout, or an unparsable connect URL.
    pub fn validate(&self) -> Result<()> {
        if let Some((width, height)) = self.window_size
            && (width == 0 || height == 0)
        {
            return Err(Error::config("window dimensions must be greater than zero"));
        }
        if self.launch_timeout_secs == 0 {
            return Err(Error::config("browser launch timeout must be non-zero"));
        }
        if let Some(url) = &self.connect_url {
            url::Url::parse(url)
                .map_err(|e| Error::config(format!("invalid browser connect URL {url}: {e}")))?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_default() {
        let options = ChromeOptions::new();
        assert!(options.headless);
        assert!(options.window_size.is_none());
        assert!(options.executable.is_none());
        assert!(!options.is_attach());
        assert_eq!(options.args, DEFAULT_ARGS);
        assert_eq!(options.launch_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_builder_chain() {
        let options = ChromeOptions::new()
            .with_headed()
            .with_window_size(1366, 768)
            .with_executable("/usr/bin/chromium")
            .with_connect_url("http://127.0.0.1:9222");

        assert!(!options.headless);
        assert_eq!(options.window_size, Some((1366, 768)));
        assert_eq!(options.executable, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(options.is_attach());
    }

    #[test]
    fn test_launch_args_deduplicates() {
        let options = ChromeOptions::new().with_args(["--incognito", "--mute-audio"]);
        let args = options.launch_args();
        assert_eq!(args.iter().filter(|a| *a == "--incognito").count(), 1);
        assert!(args.contains(&"--mute-audio".to_string()));
    }

    #[test]
    fn test_launch_args_window_size() {
        let args = ChromeOptions::new().with_window_size(800, 600).launch_args();
        assert_eq!(args.last().map(String::as_str), Some("--window-size=800,600"));
    }

    #[test]
    fn test_validate_valid() {
        assert!(ChromeOptions::new().with_window_size(800, 600).validate().is_ok());
    }

    #[test]
    fn test_validate_zero_width() {
        let options = ChromeOptions::new().with_window_size(0, 600);
        assert!(matches!(options.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_bad_connect_url() {
        let options = ChromeOptions::new().with_connect_url("not a url");
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ChromeOptions = toml::from_str("headless = false\nwindow_size = [1280, 720]")
            .expect("valid toml");
        assert!(!options.headless);
        assert_eq!(options.window_size, Some((1280, 720)));
        assert_eq!(options.args.len(), DEFAULT_ARGS.len());
    }
}
