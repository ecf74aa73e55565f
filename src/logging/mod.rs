//! Process-wide logging.
//!
//! [`init`] installs one `tracing` subscriber with a console layer and a
//! size-rotated file layer. It is idempotent: only the first call installs
//! anything.
//!
//! [`logger`] hands out named [`Logger`]s from a process-wide registry. The
//! same name always yields the same logger, so repeated lookups never
//! duplicate output.
//!
//! Lines look like:
//!
//! ```text
//! 2026-01-31 14:02:11  INFO guvi{logger=LoginPage}: Clicking login button
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Size-capped rotating log file.
pub mod rotate;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::instrument::Instrumented;
use tracing::{Instrument, Span};
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogConfig;
use crate::error::{Error, Result};

pub use rotate::SizeRotatingFile;

// ============================================================================
// Constants
// ============================================================================

/// Logger used when no more specific name applies.
pub const DEFAULT_LOGGER: &str = "guvi_automation";

/// Timestamp layout of every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lines queued for the file writer before logging callers block.
const BUFFERED_LINES: usize = 128_000;

// ============================================================================
// Global State
// ============================================================================

static INITIALIZED: AtomicBool = AtomicBool::new(false);

static REGISTRY: LazyLock<Mutex<FxHashMap<String, Logger>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));

// ============================================================================
// LogGuard
// ============================================================================

/// Keeps the background file writer alive.
///
/// Dropping it flushes and stops the writer thread; hold it for the whole
/// run.
#[must_use = "Dropping this guard stops the background log writer."]
pub struct LogGuard {
    worker: Option<WorkerGuard>,
    path: Option<PathBuf>,
}

impl LogGuard {
    fn inert() -> Self {
        Self {
            worker: None,
            path: None,
        }
    }

    /// Returns `true` if this call installed the subscriber.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    /// Returns the active log file, if this guard owns one.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogGuard")
            .field("active", &self.is_active())
            .field("path", &self.path)
            .finish()
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over [`LogConfig::level`]. Calls after the
/// first successful one return an inert guard.
///
/// # Errors
///
/// Returns [`Error::Logging`] if the filter is invalid, the log file cannot
/// be created, or another global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<LogGuard> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(LogGuard::inert());
    }

    install(config).inspect_err(|_| INITIALIZED.store(false, Ordering::SeqCst))
}

fn install(config: &LogConfig) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::logging(format!("invalid log filter '{}': {e}", config.level)))?;

    let sink = SizeRotatingFile::create(
        &config.directory,
        &config.file_prefix,
        config.max_bytes,
        config.backups,
    )
    .map_err(|e| {
        Error::logging(format!(
            "cannot create log file in {}: {e}",
            config.directory.display()
        ))
    })?;
    let path = sink.path().to_path_buf();
    let (writer, worker) = file_writer(sink, BUFFERED_LINES);

    let mut layers = Vec::new();
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
    );
    if config.console {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                .with_target(false)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| Error::logging(e.to_string()))?;

    tracing::info!(path = %path.display(), "Logging initialized");

    Ok(LogGuard {
        worker: Some(worker),
        path: Some(path),
    })
}

// ============================================================================
// Logger
// ============================================================================

/// A named log scope.
///
/// Events emitted with `parent: logger.span()`, or from futures wrapped by
/// [`Logger::instrument`], carry the logger's name.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    span: Span,
}

impl Logger {
    fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            span: tracing::info_span!(parent: None, "guvi", logger = %name),
        }
    }

    /// Returns the logger's name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the span events attach to.
    #[inline]
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Runs `f` with the logger's span entered.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }

    /// Attaches the logger's span to `future`.
    pub fn instrument<F: Future>(&self, future: F) -> Instrumented<F> {
        future.instrument(self.span.clone())
    }

    fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}

impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

/// Returns the logger registered under `name`, creating it on first use.
///
/// A logger created before [`init`] has a disabled span; it is rebuilt on
/// the next lookup once a subscriber is installed.
#[must_use]
pub fn logger(name: &str) -> Logger {
    let mut registry = REGISTRY.lock();
    match registry.get_mut(name) {
        Some(existing) => {
            if existing.span.is_disabled() {
                existing.span = Logger::new(name).span;
            }
            existing.clone()
        }
        None => {
            let created = Logger::new(name);
            registry.insert(name.to_string(), created.clone());
            created
        }
    }
}

/// Returns the [`DEFAULT_LOGGER`].
#[must_use]
pub fn default_logger() -> Logger {
    logger(DEFAULT_LOGGER)
}

/// Background writer for the log file. Callers wait when the queue is full
/// instead of dropping lines.
fn file_writer(sink: SizeRotatingFile, buffered_lines: usize) -> (NonBlocking, WorkerGuard) {
    NonBlockingBuilder::default()
        .lossy(false)
        .buffered_lines_limit(buffered_lines)
        .finish(sink)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_same_name_same_logger() {
        let first = logger("HomePage");
        let second = logger("HomePage");
        assert_eq!(first, second);
        assert_eq!(first.name(), "HomePage");
    }

    #[test]
    fn test_different_names_differ() {
        assert_ne!(logger("LoginPage"), logger("RegisterPage"));
    }

    #[test]
    fn test_default_logger_name() {
        assert_eq!(default_logger().name(), DEFAULT_LOGGER);
    }

    #[test]
    fn test_in_scope_returns_value() {
        assert_eq!(logger("scope").in_scope(|| 7), 7);
    }

    #[test]
    fn test_file_writer_keeps_every_line_when_queue_fills() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SizeRotatingFile::create(dir.path(), "burst", u64::MAX, 1).unwrap();
        let path = sink.path().to_path_buf();

        let (mut writer, worker) = file_writer(sink, 4);
        for i in 0..500 {
            writeln!(writer, "line {i}").unwrap();
        }
        drop(writer);
        drop(worker);

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written.lines().count(), 500);
        assert_eq!(written.lines().last(), Some("line 499"));
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            directory: dir.path().join("logs"),
            console: false,
            ..LogConfig::default()
        };

        let first = init(&config).unwrap();
        let second = init(&config).unwrap();

        assert!(first.is_active());
        assert!(!second.is_active());
        let path = first.path().unwrap();
        assert!(path.starts_with(dir.path().join("logs")));
        assert!(path.exists());

        let files = std::fs::read_dir(dir.path().join("logs")).unwrap().count();
        assert_eq!(files, 1);
    }
}
