//! Error types for the GUVI end-to-end suite.
//!
//! Every fallible operation returns [`Result<T>`] which uses [`Error`].
//!
//! # Failure Policy
//!
//! Presence and click operations raise ([`Error::NotFound`],
//! [`Error::NotClickable`]); visibility and clickability *queries* never do,
//! they degrade to `false`. Scenario checks raise [`Error::AssertionFailed`].
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Element | [`Error::NotFound`], [`Error::NotClickable`], [`Error::StaleElement`] |
//! | Scenario | [`Error::AssertionFailed`], [`Error::Timeout`] |
//! | Session | [`Error::SessionSetupFailed`], [`Error::SessionLost`], [`Error::Driver`], [`Error::Cdp`] |
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`], [`Error::Logging`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Toml`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use chromiumoxide::error::CdpError;
use thiserror::Error;

use crate::identifiers::ElementId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Element Errors
    // ========================================================================
    /// Element never appeared in the document within the timeout.
    #[error("Element not found within {timeout_ms}ms: {locator}")]
    NotFound {
        /// Locator that was waited on.
        locator: String,
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    /// Element never became interactable, or both click paths failed.
    #[error("Element not clickable: {locator} ({reason})")]
    NotClickable {
        /// Locator of the target element.
        locator: String,
        /// What went wrong.
        reason: String,
    },

    /// Element handle no longer resolves to an attached element.
    #[error("Stale element: {element_id}")]
    StaleElement {
        /// The stale element's ID.
        element_id: ElementId,
    },

    // ========================================================================
    // Scenario Errors
    // ========================================================================
    /// Expected-vs-actual check did not hold.
    ///
    /// Always fatal to the scenario, never retried.
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Description of the failed check.
        message: String,
    },

    /// A custom wait condition did not hold before the timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the condition waited on.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// Browser session could not be created.
    ///
    /// Fatal to the whole scenario group.
    #[error("Browser session setup failed: {message}")]
    SessionSetupFailed {
        /// Description of the setup failure.
        message: String,
    },

    /// Browser session is closed or its connection is gone.
    ///
    /// Never retried: every later call on the session fails the same way.
    #[error("Browser session lost: {message}")]
    SessionLost {
        /// Description of the lost session.
        message: String,
    },

    /// Driver-level failure not covered by a more specific variant.
    #[error("Driver error: {message}")]
    Driver {
        /// Description of the driver failure.
        message: String,
    },

    /// Error reported over the DevTools connection.
    #[error("CDP error: {0}")]
    Cdp(#[from] CdpError),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument passed to an accessor.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Logging setup failed.
    #[error("Logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an element not found error.
    #[inline]
    pub fn not_found(locator: impl ToString, timeout_ms: u64) -> Self {
        Self::NotFound {
            locator: locator.to_string(),
            timeout_ms,
        }
    }

    /// Creates an element not clickable error.
    #[inline]
    pub fn not_clickable(locator: impl ToString, reason: impl Into<String>) -> Self {
        Self::NotClickable {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a stale element error.
    #[inline]
    pub fn stale_element(element_id: ElementId) -> Self {
        Self::StaleElement { element_id }
    }

    /// Creates an assertion failure.
    #[inline]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a session setup error.
    #[inline]
    pub fn session_setup(message: impl Into<String>) -> Self {
        Self::SessionSetupFailed {
            message: message.into(),
        }
    }

    /// Creates a lost session error.
    #[inline]
    pub fn session_lost(message: impl Into<String>) -> Self {
        Self::SessionLost {
            message: message.into(),
        }
    }

    /// Creates a driver error.
    #[inline]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a logging error.
    #[inline]
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout-shaped error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Timeout { .. })
    }

    /// Returns `true` if this is an element error.
    #[inline]
    #[must_use]
    pub fn is_element_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::NotClickable { .. } | Self::StaleElement { .. }
        )
    }

    /// Returns `true` if this is a failed scenario check.
    #[inline]
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }

    /// Returns `true` if the browser session can no longer be used.
    #[must_use]
    pub fn is_session_lost(&self) -> bool {
        match self {
            Self::SessionLost { .. } => true,
            Self::Cdp(e) => matches!(
                e,
                CdpError::Ws(_)
                    | CdpError::ChannelSendError(_)
                    | CdpError::NoResponse
                    | CdpError::UnexpectedWsMessage(_)
                    | CdpError::Io(_)
            ),
            _ => false,
        }
    }

    /// Returns `true` if a poll may retry after this error.
    ///
    /// Elements detaching mid-poll and driver calls rejected by the page
    /// are retried until the deadline. A lost session is not.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::StaleElement { .. } | Self::Driver { .. } => true,
            Self::Cdp(e) => matches!(
                e,
                CdpError::Chrome(_)
                    | CdpError::ChromeMessage(_)
                    | CdpError::NotFound
                    | CdpError::FrameNotFound(_)
                    | CdpError::JavascriptException(_)
                    | CdpError::ScrollingFailed(_)
                    | CdpError::Timeout
            ),
            _ => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
