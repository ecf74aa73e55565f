//! Chrome DevTools Protocol implementation of [`Browser`].
//!
//! Drives Chrome/Chromium through `chromiumoxide`, either by launching a
//! local process or by attaching to a running one. Located elements are
//! stored by [`ElementId`] in a session-local cache, so handles stay opaque
//! to the layers above. Repeated lookups of the same DOM node share one
//! entry.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{
    Bounds, GetWindowForTargetParams, SetWindowBoundsParams, WindowState,
};
use chromiumoxide::cdp::browser_protocol::dom::BackendNodeId;
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser as ChromeBrowser, BrowserConfig, Element, Handler, Page};
use futures_util::StreamExt;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ChromeOptions;
use crate::error::{Error, Result};
use crate::identifiers::ElementId;

use super::{Browser, ElementHandle, Locator, SessionFactory};

// ============================================================================
// Scripts
// ============================================================================

/// Rendered check: attached, not hidden by style, non-empty box.
const IS_DISPLAYED: &str = "function() {
    if (!this.isConnected) { return false; }
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden') { return false; }
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}";

// ============================================================================
// CdpSession
// ============================================================================

/// A browser session driven over the DevTools protocol.
pub struct CdpSession {
    browser: tokio::sync::Mutex<ChromeBrowser>,
    page: Page,
    handler: JoinHandle<()>,
    attached: bool,
    elements: Mutex<ElementCache>,
}

/// Located elements, keyed by handle and by DOM node.
struct ElementCache<T = Element> {
    by_id: FxHashMap<ElementId, Arc<T>>,
    by_node: FxHashMap<BackendNodeId, ElementId>,
}

impl<T> Default for ElementCache<T> {
    fn default() -> Self {
        Self {
            by_id: FxHashMap::default(),
            by_node: FxHashMap::default(),
        }
    }
}

impl<T> ElementCache<T> {
    fn insert(&mut self, node: BackendNodeId, element: T) -> ElementId {
        if let Some(&id) = self.by_node.get(&node) {
            return id;
        }
        let id = ElementId::generate();
        self.by_id.insert(id, Arc::new(element));
        self.by_node.insert(node, id);
        id
    }

    fn get(&self, id: ElementId) -> Option<Arc<T>> {
        self.by_id.get(&id).cloned()
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }

    fn clear(&mut self) {
        self.by_id.clear();
        self.by_node.clear();
    }
}

impl fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpSession")
            .field("attached", &self.attached)
            .field("elements", &self.elements.lock().len())
            .finish_non_exhaustive()
    }
}

impl CdpSession {
    /// Launches or attaches to a browser and opens a blank tab.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionSetupFailed`] if the process cannot start,
    /// the endpoint is unreachable, or the first tab cannot be opened.
    pub async fn connect(options: &ChromeOptions) -> Result<Self> {
        let (browser, handler) = match &options.connect_url {
            Some(url) => {
                info!(url = %url, "Attaching to running browser");
                ChromeBrowser::connect(url.as_str()).await.map_err(setup_error)?
            }
            None => {
                info!(
                    headless = options.headless,
                    executable = ?options.executable,
                    "Launching browser"
                );
                ChromeBrowser::launch(launch_config(options)?)
                    .await
                    .map_err(setup_error)?
            }
        };

        let handler = spawn_handler(handler);
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(setup_error(e));
            }
        };

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            page,
            handler,
            attached: options.is_attach(),
            elements: Mutex::new(ElementCache::default()),
        })
    }

    fn register(&self, locator: &Locator, element: Element) -> ElementHandle {
        let node = element.backend_node_id;
        let id = self.elements.lock().insert(node, element);
        ElementHandle::new(id, locator.clone())
    }

    fn element(&self, handle: &ElementHandle) -> Result<Arc<Element>> {
        self.elements
            .lock()
            .get(handle.id())
            .ok_or_else(|| Error::stale_element(handle.id()))
    }

    async fn call_on(&self, handle: &ElementHandle, function: String) -> Result<Value> {
        let element = self.element(handle)?;
        let returns = element.call_js_fn(function, true).await?;
        if let Some(exception) = returns.exception_details {
            return Err(Error::driver(format!("script error: {}", exception.text)));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }
}

fn launch_config(options: &ChromeOptions) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder()
        .args(options.launch_args())
        .launch_timeout(options.launch_timeout())
        .viewport(Option::<Viewport>::None);

    if !options.headless {
        builder = builder.with_head();
    }
    if let Some(path) = &options.executable {
        builder = builder.chrome_executable(path);
    }

    builder.build().map_err(Error::session_setup)
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!(error = %e, "DevTools handler stopped");
                break;
            }
        }
    })
}

fn setup_error(err: CdpError) -> Error {
    Error::session_setup(err.to_string())
}

/// Translates a locator into a CSS selector or an XPath expression.
enum Query {
    Css(String),
    XPath(String),
}

fn to_query(locator: &Locator) -> Query {
    let value = locator.value();
    match locator {
        Locator::Css(_) => Query::Css(value.to_string()),
        Locator::XPath(_) => Query::XPath(value.to_string()),
        Locator::Id(_) => Query::Css(format!("[id=\"{}\"]", css_escape(value))),
        Locator::Name(_) => Query::Css(format!("[name=\"{}\"]", css_escape(value))),
        Locator::Class(_) => Query::Css(format!("[class~=\"{}\"]", css_escape(value))),
        Locator::Tag(_) => Query::Css(value.to_string()),
        Locator::LinkText(_) => {
            Query::XPath(format!("//a[normalize-space(.)={}]", xpath_literal(value)))
        }
        Locator::PartialLinkText(_) => {
            Query::XPath(format!("//a[contains(., {})]", xpath_literal(value)))
        }
    }
}

fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

// ============================================================================
// Browser Implementation
// ============================================================================

#[async_trait]
impl Browser for CdpSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url = %url, "Navigating");
        // Handles from the previous document can no longer resolve.
        self.elements.lock().clear();
        self.page.goto(url).await?;
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> Result<Option<ElementHandle>> {
        let found = match to_query(locator) {
            Query::Css(selector) => self.page.find_elements(selector).await?,
            // DOM search reports an empty result set as a protocol error.
            Query::XPath(expr) => match self.page.find_xpaths(expr).await {
                Ok(found) => found,
                Err(CdpError::Chrome(_) | CdpError::NotFound) => Vec::new(),
                Err(e) => return Err(e.into()),
            },
        };
        Ok(found
            .into_iter()
            .next()
            .map(|element| self.register(locator, element)))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool> {
        let shown = self.call_on(element, IS_DISPLAYED.to_string()).await?;
        Ok(shown.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        let disabled = self.element(element)?.property("disabled").await?;
        Ok(!disabled.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.element(element)?.click().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        let element = self.element(element)?;
        element.focus().await?.type_str(text).await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        Ok(self.element(element)?.inner_text().await?.unwrap_or_default())
    }

    async fn execute_script(&self, script: &str, args: &[ElementHandle]) -> Result<Value> {
        debug!(script_len = script.len(), args = args.len(), "Executing script");
        match args {
            [] => {
                let result = self
                    .page
                    .evaluate_function(format!("function() {{ {script} }}"))
                    .await?;
                Ok(result.value().cloned().unwrap_or(Value::Null))
            }
            [target] => {
                let function = format!(
                    "function() {{ return (function() {{ {script} }}).apply(this, [this]); }}"
                );
                self.call_on(target, function).await
            }
            _ => Err(Error::invalid_argument(
                "scripts accept at most one element argument",
            )),
        }
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.page
            .save_screenshot(ScreenshotParams::builder().build(), path)
            .await?;
        Ok(())
    }

    async fn maximize_window(&self) -> Result<()> {
        let window = self
            .page
            .execute(GetWindowForTargetParams::default())
            .await?;
        let bounds = Bounds::builder()
            .window_state(WindowState::Maximized)
            .build();
        self.page
            .execute(SetWindowBoundsParams::new(window.result.window_id, bounds))
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.elements.lock().clear();

        if self.attached {
            // Leave a browser we did not start running.
            self.page.clone().close().await?;
        } else {
            let mut browser = self.browser.lock().await;
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                warn!(error = %e, "Browser process did not exit cleanly");
            }
        }

        self.handler.abort();
        info!("Browser session closed");
        Ok(())
    }
}

// ============================================================================
// CdpLauncher
// ============================================================================

/// Opens [`CdpSession`]s from [`ChromeOptions`].
#[derive(Debug, Clone)]
pub struct CdpLauncher {
    options: ChromeOptions,
}

impl CdpLauncher {
    /// Creates a launcher for the given options.
    #[must_use]
    pub fn new(options: ChromeOptions) -> Self {
        Self { options }
    }

    /// Returns the launch options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ChromeOptions {
        &self.options
    }
}

#[async_trait]
impl SessionFactory for CdpLauncher {
    async fn open(&self) -> Result<Arc<dyn Browser>> {
        let session = CdpSession::connect(&self.options).await?;
        Ok(Arc::new(session))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn css(locator: &Locator) -> String {
        match to_query(locator) {
            Query::Css(selector) => selector,
            Query::XPath(expr) => panic!("expected CSS, got XPath {expr}"),
        }
    }

    fn xpath(locator: &Locator) -> String {
        match to_query(locator) {
            Query::XPath(expr) => expr,
            Query::Css(selector) => panic!("expected XPath, got CSS {selector}"),
        }
    }

    #[tokio::test]
    async fn test_missing_executable_is_setup_failure() {
        let options = ChromeOptions::new()
            .with_executable("/nonexistent/chrome-binary")
            .with_window_size(800, 600);

        let result = CdpLauncher::new(options).open().await;
        assert!(matches!(result, Err(Error::SessionSetupFailed { .. })));
    }

    #[test]
    fn test_attribute_locators_become_css() {
        assert_eq!(css(&Locator::id("email")), "[id=\"email\"]");
        assert_eq!(css(&Locator::name("q")), "[name=\"q\"]");
        assert_eq!(css(&Locator::class("invalid-feedback")), "[class~=\"invalid-feedback\"]");
        assert_eq!(css(&Locator::tag("h2")), "h2");
        assert_eq!(css(&Locator::css(".user-dropdown")), ".user-dropdown");
    }

    #[test]
    fn test_css_values_are_escaped() {
        assert_eq!(css(&Locator::id("a\"b")), "[id=\"a\\\"b\"]");
    }

    #[test]
    fn test_link_text_becomes_xpath() {
        assert_eq!(
            xpath(&Locator::link_text("Sign Out")),
            "//a[normalize-space(.)='Sign Out']"
        );
        assert_eq!(
            xpath(&Locator::partial_link_text("Sign")),
            "//a[contains(., 'Sign')]"
        );
        assert_eq!(xpath(&Locator::xpath("//h2")), "//h2");
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal("say \"it's\""),
            "concat('say \"it', \"'\", 's\"')"
        );
    }

    #[test]
    fn test_cache_reuses_entry_for_same_node() {
        let mut cache = ElementCache::<&str>::default();
        let first = cache.insert(BackendNodeId::new(7), "login");
        let again = cache.insert(BackendNodeId::new(7), "login");
        let other = cache.insert(BackendNodeId::new(8), "email");

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(first).as_deref(), Some(&"login"));

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.get(first).is_none());
    }

    #[test]
    fn test_launch_config_uses_explicit_executable() {
        let options = ChromeOptions::new().with_executable("/opt/chrome/chrome");
        assert!(launch_config(&options).is_ok());
    }

    #[test]
    fn test_types_are_debug() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<CdpLauncher>();
        assert_debug::<CdpSession>();
    }
}
