//! Shared configuration for the widget manifest tooling.
#![deny(missing_docs)]
//!
//! Settings are layered with `ortho_config`: built-in defaults, then an
//! optional TOML file, then `WIDGET_*` environment variables, then
//! command-line flags. The crate also installs the `tracing` subscriber so
//! every consumer logs the same way.

mod config;
mod defaults;
mod errors;
mod logging;
pub mod telemetry;

pub use config::Config;
pub use defaults::{
    DEFAULT_INDENT_WIDTH, DEFAULT_LOG_FILTER, DEFAULT_MANIFEST_PATH, default_indent_width,
    default_log_filter, default_log_format, default_manifest_path,
};
pub use errors::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};
