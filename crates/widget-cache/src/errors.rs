//! Error types surfaced by the model cache.

use std::fmt;

use thiserror::Error;
use widget_store::{ProjectKey, StoreError};

/// Coarse classification of a [`CacheError`] for user-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The manifest is malformed.
    ParseFailure,
    /// The manifest could not be read or written.
    IoFailure,
    /// The manifest lacks required structure.
    InvalidState,
    /// The caller passed a view that is not bound for editing.
    InvalidArgument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ParseFailure => "parse failure",
            Self::IoFailure => "I/O failure",
            Self::InvalidState => "invalid state",
            Self::InvalidArgument => "invalid argument",
        };
        formatter.write_str(label)
    }
}

/// Errors returned by [`crate::ConfigModelCache`] and [`crate::WidgetModel`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// The manifest could not be parsed.
    #[error("manifest of project '{project}' could not be parsed: {source}")]
    Parse {
        /// Project whose manifest failed.
        project: ProjectKey,
        /// Store diagnostic.
        #[source]
        source: Box<StoreError>,
    },

    /// Reading, writing or releasing the manifest failed.
    #[error("manifest of project '{project}' is not accessible: {source}")]
    Io {
        /// Project whose manifest failed.
        project: ProjectKey,
        /// Store diagnostic.
        #[source]
        source: Box<StoreError>,
    },

    /// The manifest is missing required structure.
    #[error("manifest of project '{project}' is unusable: {reason}")]
    InvalidState {
        /// Project whose manifest failed.
        project: ProjectKey,
        /// What is missing.
        reason: &'static str,
    },

    /// The widget is not the editable view of any project.
    #[error("widget is not bound as an editable view")]
    NotEditable,
}

impl CacheError {
    /// Wraps a store failure, keeping parse failures distinct from I/O.
    pub(crate) fn store(project: &ProjectKey, source: StoreError) -> Self {
        let project = project.clone();
        let parse = source.is_parse_failure();
        let source = Box::new(source);
        if parse {
            Self::Parse { project, source }
        } else {
            Self::Io { project, source }
        }
    }

    /// Builds an `InvalidState` error.
    pub(crate) fn invalid_state(project: &ProjectKey, reason: &'static str) -> Self {
        Self::InvalidState {
            project: project.clone(),
            reason,
        }
    }

    /// Classification used when reporting the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::ParseFailure,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::NotEditable => ErrorKind::InvalidArgument,
        }
    }
}
