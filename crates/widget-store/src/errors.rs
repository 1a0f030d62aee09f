//! Error types surfaced by document stores.

use camino::Utf8PathBuf;
use thiserror::Error;
use widget_dom::DomError;

use crate::project::ProjectKey;

/// Errors returned by [`crate::DocumentStore`] and [`crate::LiveDocument`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the manifest failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Manifest location.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not well-formed XML.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        /// Manifest location.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        #[source]
        source: DomError,
    },

    /// The document could not be serialised for writing.
    #[error("failed to serialise '{path}': {source}")]
    Serialise {
        /// Manifest location.
        path: Utf8PathBuf,
        /// Writer diagnostic.
        #[source]
        source: DomError,
    },

    /// No editing session is open for the project.
    #[error("no editing session is open for project '{project}'")]
    NotOpen {
        /// Project whose session was requested.
        project: ProjectKey,
    },

    /// The handle was already released.
    #[error("editing handle for project '{project}' was already released")]
    Released {
        /// Project the handle belonged to.
        project: ProjectKey,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure comes from malformed markup rather than I/O.
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
