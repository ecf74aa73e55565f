//! GUVI end-to-end UI suite.
//!
//! This library drives the GUVI web application through a real Chrome
//! browser and checks its landing page, navigation, and sign-in flows using
//! the Page Object Model.
//!
//! # Architecture
//!
//! The suite is layered bottom-up:
//!
//! - **Driver boundary**: the [`Browser`] trait, implemented over the Chrome
//!   DevTools Protocol and by an in-memory [`FakeBrowser`] for tests
//! - **Action-Wait layer**: [`Actions`] turns single driver calls into
//!   timeout-bounded operations
//! - **Page objects**: one type per screen, holding locators and named steps
//! - **Scenarios**: independent checks run by the [`Runner`]
//!
//! Key design principles:
//!
//! - Locators are opaque to everything above the driver
//! - Presence and click operations raise on timeout; visibility queries
//!   answer `false`
//! - One browser session per scenario group, always closed
//! - Every wait sleeps on `tokio::time`, so tests run on a paused clock
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use guvi_e2e::browser::CdpLauncher;
//! use guvi_e2e::suite::Runner;
//! use guvi_e2e::{Config, Result, logging, scenarios};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load(None)?;
//!     let _guard = logging::init(&config.logging)?;
//!
//!     let launcher = Arc::new(CdpLauncher::new(config.browser.clone()));
//!     let report = Runner::new(config, launcher)
//!         .with_filter("login")
//!         .run(&scenarios::groups())
//!         .await;
//!
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`actions`] | Timeout-bounded element operations |
//! | [`browser`] | Driver boundary, CDP session, fake browser |
//! | [`config`] | Suite configuration and credentials |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`logging`] | Named loggers and the rotating file sink |
//! | [`pages`] | Page objects |
//! | [`scenarios`] | The GUVI scenario group |
//! | [`suite`] | Scenario runner and report |

// ============================================================================
// Modules
// ============================================================================

/// Timeout-bounded element operations.
///
/// Page objects reach the browser only through [`Actions`].
pub mod actions;

/// Driver boundary.
///
/// - [`Browser`] - one live session
/// - [`SessionFactory`] - opens sessions
/// - [`Locator`] - element lookup strategy
pub mod browser;

/// Suite configuration.
///
/// Built from defaults, an optional TOML file, and the environment.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for browser entities.
pub mod identifiers;

/// Process-wide logging.
pub mod logging;

/// Page objects for the GUVI screens.
pub mod pages;

/// Scenario groups shipped with the suite.
pub mod scenarios;

/// Test-run surface.
pub mod suite;

// ============================================================================
// Re-exports
// ============================================================================

// Action types
pub use actions::{Actions, Poller};

// Browser types
pub use browser::{
    Browser, ElementHandle, FakeBrowser, FakeDom, FakeElement, FakeLauncher, Locator,
    SessionFactory,
};

// Config types
pub use config::{Config, Timeouts};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::ElementId;

// Suite types
pub use suite::{Context, Outcome, Report, Runner, Scenario, ScenarioGroup};
