//! Errors reported by the typed object model.

use thiserror::Error;
use widget_dom::DomError;

/// Errors returned when attaching, detaching or editing typed objects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The object was created for a different document than the widget.
    #[error("<{tag}> belongs to a different document than the widget")]
    ForeignDocument {
        /// Element tag of the rejected object.
        tag: &'static str,
    },

    /// The object is already part of a tree.
    #[error("<{tag}> is already attached to the document tree")]
    AlreadyAttached {
        /// Element tag of the rejected object.
        tag: &'static str,
    },

    /// The object is not a child of the widget.
    #[error("<{tag}> is not a child of the widget")]
    NotAChild {
        /// Element tag of the object that was not found.
        tag: &'static str,
    },

    /// The underlying document refused the change.
    #[error(transparent)]
    Dom(#[from] DomError),
}
