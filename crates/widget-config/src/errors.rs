//! Errors raised while loading configuration.

use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use thiserror::Error;

/// Errors returned by [`crate::Config`] loaders.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration layer could not be read, parsed or merged.
    #[error("failed to load configuration: {source}")]
    Load {
        /// Loader diagnostic, aggregated across layers where several failed.
        #[source]
        source: Arc<OrthoError>,
    },

    /// The manifest path must be a non-empty path relative to the project.
    #[error("manifest path '{path}' must be a non-empty relative path")]
    InvalidManifestPath {
        /// Rejected path.
        path: Utf8PathBuf,
    },
}
