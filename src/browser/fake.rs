//! In-memory [`Browser`] for tests.
//!
//! A [`FakeBrowser`] holds a scripted document: elements bound to page URLs,
//! appearance delays measured on the tokio clock, obscured elements that
//! reject native clicks, and click hooks that mutate the document (navigate,
//! reveal an error message, and so on). It counts every interaction so tests
//! can assert on effects, not just return values.
//!
//! Appearance delays use [`tokio::time::Instant`], so waits run instantly
//! under `#[tokio::test(start_paused = true)]`.
//!
//! # Example
//!
//! ```
//! use guvi_e2e::{FakeBrowser, FakeElement, Locator};
//!
//! const LOGIN: Locator = Locator::id("login-btn");
//!
//! let browser = FakeBrowser::new("https://example.com/")
//!     .with_title("https://example.com/", "Home")
//!     .with_element(
//!         FakeElement::new(LOGIN)
//!             .on_page("https://example.com/")
//!             .on_click(|dom| dom.navigate("https://example.com/sign-in/")),
//!     );
//! assert_eq!(browser.url(), "https://example.com/");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::identifiers::ElementId;

use super::{Browser, ElementHandle, Locator, SessionFactory};

// ============================================================================
// Constants
// ============================================================================

/// Bytes written for every captured screenshot.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

// ============================================================================
// Types
// ============================================================================

/// Callback run when an element is clicked (natively or by script).
pub type ClickHook = Arc<dyn Fn(&mut FakeDom) + Send + Sync>;

/// Declarative description of one element in the fake document.
#[derive(Clone)]
pub struct FakeElement {
    locator: Locator,
    page: Option<String>,
    text: String,
    displayed: bool,
    enabled: bool,
    obscured: bool,
    appears_after: Duration,
    on_click: Option<ClickHook>,
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeElement")
            .field("locator", &self.locator)
            .field("page", &self.page)
            .field("displayed", &self.displayed)
            .field("enabled", &self.enabled)
            .field("obscured", &self.obscured)
            .finish_non_exhaustive()
    }
}

impl FakeElement {
    /// Creates a visible, enabled element present on every page.
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            page: None,
            text: String::new(),
            displayed: true,
            enabled: true,
            obscured: false,
            appears_after: Duration::ZERO,
            on_click: None,
        }
    }

    /// Binds the element to the page at `url`.
    #[must_use]
    pub fn on_page(mut self, url: impl Into<String>) -> Self {
        self.page = Some(url.into());
        self
    }

    /// Sets the rendered text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Marks the element as present but not rendered.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Marks the element as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Makes native clicks fail as if another element covered this one.
    #[must_use]
    pub fn obscured(mut self) -> Self {
        self.obscured = true;
        self
    }

    /// Delays attachment until `delay` after the page loaded.
    #[must_use]
    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }

    /// Runs `hook` on every successful click.
    #[must_use]
    pub fn on_click<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut FakeDom) + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(hook));
        self
    }
}

/// Runtime state of one element.
#[derive(Debug)]
struct ElementState {
    element: FakeElement,
    value: String,
    native_clicks: usize,
    script_clicks: usize,
    scrolled: bool,
}

// ============================================================================
// FakeDom
// ============================================================================

/// Mutable document state, handed to click hooks.
#[derive(Debug)]
pub struct FakeDom {
    url: String,
    loaded_at: Instant,
    titles: FxHashMap<String, String>,
    elements: Vec<ElementState>,
    handles: FxHashMap<ElementId, usize>,
    scripts: Vec<String>,
    screenshots: Vec<PathBuf>,
    navigations: Vec<String>,
    maximized: bool,
    closed: bool,
}

impl FakeDom {
    fn new(url: String) -> Self {
        Self {
            url,
            loaded_at: Instant::now(),
            titles: FxHashMap::default(),
            elements: Vec::new(),
            handles: FxHashMap::default(),
            scripts: Vec::new(),
            screenshots: Vec::new(),
            navigations: Vec::new(),
            maximized: false,
            closed: false,
        }
    }

    /// Loads `url`, restarting appearance delays.
    pub fn navigate(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.navigations.push(url.clone());
        self.url = url;
        self.loaded_at = Instant::now();
    }

    /// Returns the current URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Adds an element to the document.
    pub fn add(&mut self, element: FakeElement) {
        self.elements.push(ElementState {
            element,
            value: String::new(),
            native_clicks: 0,
            script_clicks: 0,
            scrolled: false,
        });
    }

    /// Sets the title shown while `url` is loaded.
    pub fn set_title(&mut self, url: impl Into<String>, title: impl Into<String>) {
        self.titles.insert(url.into(), title.into());
    }

    /// Returns the text typed into the first element matching `locator`.
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> Option<&str> {
        self.elements
            .iter()
            .find(|state| &state.element.locator == locator)
            .map(|state| state.value.as_str())
    }

    /// Shows or hides every element matching `locator`.
    pub fn set_displayed(&mut self, locator: &Locator, displayed: bool) {
        for state in self.matching_mut(locator) {
            state.element.displayed = displayed;
        }
    }

    /// Replaces the text of every element matching `locator`.
    pub fn set_text(&mut self, locator: &Locator, text: &str) {
        for state in self.matching_mut(locator) {
            state.element.text = text.to_string();
        }
    }

    /// Clears the typed value of every element matching `locator`.
    pub fn clear_value(&mut self, locator: &Locator) {
        for state in self.matching_mut(locator) {
            state.value.clear();
        }
    }

    fn matching_mut<'a>(
        &'a mut self,
        locator: &'a Locator,
    ) -> impl Iterator<Item = &'a mut ElementState> + 'a {
        self.elements
            .iter_mut()
            .filter(move |state| &state.element.locator == locator)
    }

    fn is_attached(&self, index: usize) -> bool {
        let element = &self.elements[index].element;
        let on_page = element.page.as_deref().is_none_or(|page| page == self.url);
        on_page && Instant::now() >= self.loaded_at + element.appears_after
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::session_lost("session closed"));
        }
        Ok(())
    }

    fn resolve(&self, handle: &ElementHandle) -> Result<usize> {
        self.ensure_open()?;
        self.handles
            .get(&handle.id())
            .copied()
            .filter(|&index| self.is_attached(index))
            .ok_or_else(|| Error::stale_element(handle.id()))
    }

    fn fire_click(&mut self, index: usize) {
        if let Some(hook) = self.elements[index].element.on_click.clone() {
            hook(self);
        }
    }
}

// ============================================================================
// FakeBrowser
// ============================================================================

/// Scripted in-memory browser session.
#[derive(Debug)]
pub struct FakeBrowser {
    dom: Mutex<FakeDom>,
}

impl FakeBrowser {
    /// Creates a browser with `url` loaded and an empty document.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            dom: Mutex::new(FakeDom::new(url.into())),
        }
    }

    /// Adds a page title.
    #[must_use]
    pub fn with_title(mut self, url: impl Into<String>, title: impl Into<String>) -> Self {
        self.dom.get_mut().set_title(url, title);
        self
    }

    /// Adds an element.
    #[must_use]
    pub fn with_element(mut self, element: FakeElement) -> Self {
        self.dom.get_mut().add(element);
        self
    }

    /// Mutates the document directly.
    pub fn configure(&self, f: impl FnOnce(&mut FakeDom)) {
        f(&mut self.dom.lock());
    }

    /// Returns the current URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.dom.lock().url.clone()
    }

    /// Returns the logical click count (native plus script) for `locator`.
    #[must_use]
    pub fn clicks(&self, locator: &Locator) -> usize {
        self.native_clicks(locator) + self.script_clicks(locator)
    }

    /// Returns how many native clicks reached `locator`.
    #[must_use]
    pub fn native_clicks(&self, locator: &Locator) -> usize {
        self.sum(locator, |state| state.native_clicks)
    }

    /// Returns how many script-level clicks reached `locator`.
    #[must_use]
    pub fn script_clicks(&self, locator: &Locator) -> usize {
        self.sum(locator, |state| state.script_clicks)
    }

    /// Returns `true` if `locator` was scrolled into view.
    #[must_use]
    pub fn was_scrolled(&self, locator: &Locator) -> bool {
        self.dom
            .lock()
            .elements
            .iter()
            .any(|state| &state.element.locator == locator && state.scrolled)
    }

    /// Returns the text typed into `locator`.
    #[must_use]
    pub fn typed(&self, locator: &Locator) -> String {
        self.dom
            .lock()
            .value_of(locator)
            .unwrap_or_default()
            .to_string()
    }

    /// Returns every URL loaded, in order.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.dom.lock().navigations.clone()
    }

    /// Returns every screenshot path captured, in order.
    #[must_use]
    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.dom.lock().screenshots.clone()
    }

    /// Returns every script executed, in order.
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.dom.lock().scripts.clone()
    }

    /// Returns `true` once the window was maximized.
    #[must_use]
    pub fn is_maximized(&self) -> bool {
        self.dom.lock().maximized
    }

    /// Returns `true` once the session was closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.dom.lock().closed
    }

    fn sum(&self, locator: &Locator, count: impl Fn(&ElementState) -> usize) -> usize {
        self.dom
            .lock()
            .elements
            .iter()
            .filter(|state| &state.element.locator == locator)
            .map(count)
            .sum()
    }
}

// ============================================================================
// Browser Implementation
// ============================================================================

#[async_trait]
impl Browser for FakeBrowser {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut dom = self.dom.lock();
        dom.ensure_open()?;
        dom.navigate(url);
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> Result<Option<ElementHandle>> {
        let mut dom = self.dom.lock();
        dom.ensure_open()?;

        let index = (0..dom.elements.len())
            .find(|&index| &dom.elements[index].element.locator == locator && dom.is_attached(index));

        Ok(index.map(|index| {
            let id = ElementId::generate();
            dom.handles.insert(id, index);
            ElementHandle::new(id, locator.clone())
        }))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool> {
        let dom = self.dom.lock();
        let index = dom.resolve(element)?;
        Ok(dom.elements[index].element.displayed)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        let dom = self.dom.lock();
        let index = dom.resolve(element)?;
        Ok(dom.elements[index].element.enabled)
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let mut dom = self.dom.lock();
        let index = dom.resolve(element)?;

        let target = &dom.elements[index].element;
        if target.obscured {
            return Err(Error::driver(format!(
                "element click intercepted: {}",
                target.locator
            )));
        }
        if !target.displayed {
            return Err(Error::driver(format!(
                "element not interactable: {}",
                target.locator
            )));
        }

        dom.elements[index].native_clicks += 1;
        dom.fire_click(index);
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        let mut dom = self.dom.lock();
        let index = dom.resolve(element)?;
        dom.elements[index].value.push_str(text);
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let dom = self.dom.lock();
        let index = dom.resolve(element)?;
        Ok(dom.elements[index].element.text.clone())
    }

    async fn execute_script(&self, script: &str, args: &[ElementHandle]) -> Result<Value> {
        let mut dom = self.dom.lock();
        dom.ensure_open()?;
        dom.scripts.push(script.to_string());

        let Some(target) = args.first() else {
            return Ok(Value::Null);
        };
        let index = dom.resolve(target)?;

        if script.contains("scrollIntoView") {
            dom.elements[index].scrolled = true;
        }
        if script.contains(".click()") {
            dom.elements[index].script_clicks += 1;
            dom.fire_click(index);
        }
        Ok(Value::Null)
    }

    async fn current_url(&self) -> Result<String> {
        let dom = self.dom.lock();
        dom.ensure_open()?;
        Ok(dom.url.clone())
    }

    async fn title(&self) -> Result<String> {
        let dom = self.dom.lock();
        dom.ensure_open()?;
        Ok(dom.titles.get(&dom.url).cloned().unwrap_or_default())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        {
            let mut dom = self.dom.lock();
            dom.ensure_open()?;
            dom.screenshots.push(path.to_path_buf());
        }
        tokio::fs::write(path, PNG_SIGNATURE).await?;
        Ok(())
    }

    async fn maximize_window(&self) -> Result<()> {
        let mut dom = self.dom.lock();
        dom.ensure_open()?;
        dom.maximized = true;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut dom = self.dom.lock();
        dom.ensure_open()?;
        dom.closed = true;
        dom.handles.clear();
        Ok(())
    }
}

// ============================================================================
// FakeLauncher
// ============================================================================

/// [`SessionFactory`] handing out a shared [`FakeBrowser`].
#[derive(Debug)]
pub struct FakeLauncher {
    browser: Option<Arc<FakeBrowser>>,
    opened: AtomicUsize,
}

impl FakeLauncher {
    /// Creates a launcher that always returns `browser`.
    #[must_use]
    pub fn new(browser: Arc<FakeBrowser>) -> Self {
        Self {
            browser: Some(browser),
            opened: AtomicUsize::new(0),
        }
    }

    /// Creates a launcher whose sessions never start.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            browser: None,
            opened: AtomicUsize::new(0),
        }
    }

    /// Returns how many sessions were opened.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for FakeLauncher {
    async fn open(&self) -> Result<Arc<dyn Browser>> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| Error::session_setup("browser binary not available"))?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(browser) as Arc<dyn Browser>)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "https://example.com/";
    const BUTTON: Locator = Locator::id("go");

    fn browser() -> FakeBrowser {
        FakeBrowser::new(HOME).with_element(
            FakeElement::new(BUTTON)
                .on_page(HOME)
                .text("Go")
                .on_click(|dom| dom.navigate("https://example.com/next")),
        )
    }

    #[tokio::test]
    async fn test_find_and_click_runs_hook() {
        let browser = browser();
        let handle = browser.find(&BUTTON).await.unwrap().unwrap();
        browser.click(&handle).await.unwrap();

        assert_eq!(browser.url(), "https://example.com/next");
        assert_eq!(browser.native_clicks(&BUTTON), 1);
    }

    #[tokio::test]
    async fn test_handle_goes_stale_after_navigation() {
        let browser = browser();
        let handle = browser.find(&BUTTON).await.unwrap().unwrap();
        browser.goto("https://example.com/other").await.unwrap();

        let err = browser.text(&handle).await.unwrap_err();
        assert!(matches!(err, Error::StaleElement { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_element_appears_on_virtual_clock() {
        let browser = FakeBrowser::new(HOME)
            .with_element(FakeElement::new(BUTTON).appears_after(Duration::from_secs(3)));

        assert!(browser.find(&BUTTON).await.unwrap().is_none());
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(browser.find(&BUTTON).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_obscured_rejects_native_but_not_script_click() {
        let browser = FakeBrowser::new(HOME).with_element(FakeElement::new(BUTTON).obscured());
        let handle = browser.find(&BUTTON).await.unwrap().unwrap();

        assert!(browser.click(&handle).await.is_err());
        browser
            .execute_script("arguments[0].click();", std::slice::from_ref(&handle))
            .await
            .unwrap();

        assert_eq!(browser.native_clicks(&BUTTON), 0);
        assert_eq!(browser.script_clicks(&BUTTON), 1);
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let browser = browser();
        browser.close().await.unwrap();

        assert!(browser.is_closed());
        assert!(matches!(browser.current_url().await, Err(Error::SessionLost { .. })));
    }

    #[tokio::test]
    async fn test_failing_launcher() {
        let launcher = FakeLauncher::failing();
        let result = launcher.open().await;

        assert!(matches!(result, Err(Error::SessionSetupFailed { .. })));
        assert_eq!(launcher.opened(), 0);
    }
}
