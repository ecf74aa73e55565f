//! Automation driver boundary.
//!
//! The suite never talks to a browser directly. Everything above this module
//! sees the [`Browser`] trait: locate, interact, navigate, script, capture,
//! and the session lifecycle.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Browser`] | One live session (object safe, shared as `Arc<dyn Browser>`) |
//! | [`SessionFactory`] | Opens sessions for a scenario group |
//! | [`Locator`] | Opaque (strategy, selector) pair |
//! | [`ElementHandle`] | Reference to a located element |
//! | [`CdpLauncher`] | Chrome DevTools Protocol implementation |
//! | [`FakeBrowser`] | In-memory scripted document for tests |

// ============================================================================
// Submodules
// ============================================================================

/// Chrome DevTools Protocol implementation.
pub mod cdp;

/// In-memory browser used by unit and integration tests.
pub mod fake;

/// Element locator strategies.
pub mod locator;

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::ElementId;

// ============================================================================
// Re-exports
// ============================================================================

pub use cdp::{CdpLauncher, CdpSession};
pub use fake::{ClickHook, FakeBrowser, FakeDom, FakeElement, FakeLauncher};
pub use locator::Locator;

// ============================================================================
// ElementHandle
// ============================================================================

/// Handle to a located element.
///
/// Valid only while the element stays attached to the document; using it
/// afterwards yields [`Error::StaleElement`](crate::Error::StaleElement).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: ElementId,
    locator: Locator,
}

impl ElementHandle {
    /// Creates a handle for an element found by `locator`.
    #[must_use]
    pub fn new(id: ElementId, locator: Locator) -> Self {
        Self { id, locator }
    }

    /// Returns the handle's ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Returns the locator the element was found with.
    #[inline]
    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}

// ============================================================================
// Browser
// ============================================================================

/// A live browser session.
///
/// Every call is a single attempt with the driver's own network timeout;
/// waiting and retrying belong to [`Actions`](crate::Actions).
#[async_trait]
pub trait Browser: Send + Sync {
    /// Loads `url` in the current tab.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Returns the first element matching `locator`, if any is attached now.
    async fn find(&self, locator: &Locator) -> Result<Option<ElementHandle>>;

    /// Checks whether the element is rendered.
    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool>;

    /// Checks whether the element accepts input.
    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool>;

    /// Issues a native click.
    async fn click(&self, element: &ElementHandle) -> Result<()>;

    /// Types `text` into the element.
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()>;

    /// Returns the element's rendered text.
    async fn text(&self, element: &ElementHandle) -> Result<String>;

    /// Runs `script` with `args` bound to `arguments[0..]`.
    async fn execute_script(&self, script: &str, args: &[ElementHandle]) -> Result<Value>;

    /// Returns the current page URL.
    async fn current_url(&self) -> Result<String>;

    /// Returns the current page title.
    async fn title(&self) -> Result<String>;

    /// Saves a PNG screenshot of the viewport to `path`.
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Maximizes the browser window.
    async fn maximize_window(&self) -> Result<()>;

    /// Ends the session. Further calls fail.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// SessionFactory
// ============================================================================

/// Opens browser sessions.
///
/// The runner opens exactly one session per scenario group and closes it
/// once the group finishes.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Creates a new session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionSetupFailed`](crate::Error::SessionSetupFailed)
    /// if no browser could be started.
    async fn open(&self) -> Result<Arc<dyn Browser>>;
}
