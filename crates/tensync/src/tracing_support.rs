//! Structured logging setup for applications using tensync
//!
//! The library crates only emit `tracing` events: enumerator and policy
//! construction at `debug`, seeks and bulk transfers at `trace`, and one
//! `debug` event per aggregation with `statistic`, `len`, `split_threshold` and
//! `leaves` fields. This module installs a subscriber that prints them.
//!
//! # Example
//!
//! ```no_run
//! use tensync::tracing_support::{init_tracing, TracingConfig, TracingFormat};
//!
//! init_tracing(TracingConfig {
//!     format: TracingFormat::Compact,
//!     ..TracingConfig::contention()
//! })
//! .unwrap();
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directive (default: `tensync_core=info,tensync_sync=info,tensync_stats=info,warn`)
//! - `TENSYNC_LOG_FORMAT`: `pretty`, `json` or `compact` (default: `pretty`)

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "tensync_core=info,tensync_sync=info,tensync_stats=info,warn";

/// Lock acquisition and bulk transfers on every thread, aggregation summaries
const CONTENTION_FILTER: &str = "tensync_sync=trace,tensync_stats=debug,warn";

/// Tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line human-readable output
    Pretty,
    /// One JSON object per event, event fields at the top level
    Json,
    /// One line per event
    Compact,
}

impl TracingFormat {
    /// Parse a format name; unknown names fall back to `Pretty`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => TracingFormat::Json,
            "compact" => TracingFormat::Compact,
            _ => TracingFormat::Pretty,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub format: TracingFormat,
    /// `EnvFilter` directive, e.g. `"tensync_sync=trace,warn"`
    pub filter: String,
    /// Ignored by the JSON format
    pub with_ansi: bool,
    /// Thread ids and names on every event
    pub with_threads: bool,
}

impl TracingConfig {
    /// Preset for following lock contention between worker threads.
    ///
    /// Keeps the format from the environment but ignores `RUST_LOG`.
    pub fn contention() -> Self {
        Self {
            filter: CONTENTION_FILTER.to_string(),
            with_threads: true,
            ..Self::default()
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        let format = std::env::var("TENSYNC_LOG_FORMAT")
            .map(|s| TracingFormat::parse(&s))
            .unwrap_or(TracingFormat::Pretty);
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

        Self {
            format,
            filter,
            with_ansi: true,
            with_threads: false,
        }
    }
}

/// Install a global subscriber built from `config`.
///
/// # Errors
///
/// An invalid filter directive, or a global subscriber that is already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(config: TracingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.filter)?;

    let base = fmt::layer()
        .with_thread_ids(config.with_threads)
        .with_thread_names(config.with_threads);
    let layer = match config.format {
        TracingFormat::Pretty => base.pretty().with_ansi(config.with_ansi).boxed(),
        TracingFormat::Json => base.json().flatten_event(true).boxed(),
        TracingFormat::Compact => base.compact().with_ansi(config.with_ansi).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()?;

    tracing::debug!(format = ?config.format, filter = %config.filter, "tracing initialized");
    Ok(())
}

/// No-op when the `tracing` feature is disabled
#[cfg(not(feature = "tracing"))]
pub fn init_tracing(_config: TracingConfig) -> anyhow::Result<()> {
    Ok(())
}
