//! The layered [`Config`] value.
//!
//! Values resolve from built-in defaults, then the configuration file named
//! by `--config-path` or `WIDGET_CONFIG_PATH`, then `WIDGET_*` environment
//! variables, then command-line flags such as `--manifest-path`.

use std::ffi::OsString;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

use crate::defaults::{
    default_indent_width, default_log_filter_string, default_log_format, default_manifest_path,
};
use crate::errors::ConfigError;
use crate::logging::LogFormat;

/// Settings shared by the manifest store, the cache and telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WIDGET")]
pub struct Config {
    /// Manifest location relative to a project root.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: Utf8PathBuf,
    /// Spaces per nesting level when the manifest is written back.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log events.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            indent_width: default_indent_width(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Resolves the configuration for the running process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a layer cannot be read or merged and
    /// [`ConfigError::InvalidManifestPath`] when the resolved manifest path is
    /// unusable.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::resolve_from(std::env::args_os())
    }

    /// Resolves the configuration using `args` in place of the process
    /// arguments. The first item is the program name.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve`].
    pub fn resolve_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::load_from_iter(args)
            .map_err(|source: Arc<OrthoError>| ConfigError::Load { source })?
            .validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.manifest_path.as_str().is_empty() || self.manifest_path.is_absolute() {
            return Err(ConfigError::InvalidManifestPath {
                path: self.manifest_path,
            });
        }
        Ok(self)
    }

    /// Manifest location relative to a project root.
    #[must_use]
    pub fn manifest_path(&self) -> &Utf8Path {
        self.manifest_path.as_path()
    }

    /// Indentation width used when writing manifests.
    #[must_use]
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
