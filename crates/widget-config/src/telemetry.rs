//! Process-wide `tracing` subscriber for hosts of the manifest cache.
//!
//! The store logs under `widget-store::*` and the cache under
//! `widget-cache::*`, so a filter such as `widget-cache=debug` narrows
//! output to cache hits, reloads and saves.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::{self, TestWriter, writer::BoxMakeWriter};

use crate::{Config, LogFormat};

static ACTIVE: OnceCell<TelemetryHandle> = OnceCell::new();

/// Destination of formatted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// Standard error, coloured when it is a terminal.
    Stderr,
    /// The libtest capture buffer, shown only for failing tests.
    TestCapture,
}

/// Settings of the subscriber that owns the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryHandle {
    filter: String,
    format: LogFormat,
    sink: LogSink,
}

impl TelemetryHandle {
    /// Filter expression the subscriber was installed with.
    #[must_use]
    pub fn filter(&self) -> &str {
        self.filter.as_str()
    }

    /// Output format of the subscriber.
    #[must_use]
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Where the subscriber writes.
    #[must_use]
    pub fn sink(&self) -> LogSink {
        self.sink
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression is not a valid `EnvFilter`.
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        /// Rejected expression.
        filter: String,
        /// Parser diagnostic.
        #[source]
        source: ParseError,
    },
    /// Another subscriber already owns the process.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[source] SetGlobalDefaultError),
}

/// Installs the subscriber described by `config`, writing to stderr.
///
/// See [`initialise_with`].
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or the subscriber
/// cannot be installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    initialise_with(config, LogSink::Stderr)
}

/// Installs the subscriber described by `config`, writing to `sink`.
///
/// Only the first successful call installs anything. Later calls return the
/// handle of the subscriber already in place, whatever they ask for, so
/// callers can compare it with the settings they wanted.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or the subscriber
/// cannot be installed.
pub fn initialise_with(
    config: &Config,
    sink: LogSink,
) -> Result<TelemetryHandle, TelemetryError> {
    ACTIVE.get_or_try_init(|| install(config, sink)).cloned()
}

fn parse_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::builder()
        .parse(config.log_filter())
        .map_err(|source| TelemetryError::Filter {
            filter: config.log_filter().to_owned(),
            source,
        })
}

fn install(config: &Config, sink: LogSink) -> Result<TelemetryHandle, TelemetryError> {
    let filter = parse_filter(config)?;
    let (writer, ansi) = match sink {
        LogSink::Stderr => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
        LogSink::TestCapture => (BoxMakeWriter::new(TestWriter::new()), false),
    };
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;

    Ok(TelemetryHandle {
        filter: config.log_filter().to_owned(),
        format: config.log_format(),
        sink,
    })
}
