//! Storage seams consumed by the model cache.

use std::fmt;
use std::sync::{Arc, Weak};

use widget_dom::{Document, NodeRef, SharedDocument};

use crate::errors::StoreError;
use crate::events::{LifecycleListener, SubscriptionId};
use crate::project::ProjectKey;
use crate::stamp::ModificationStamp;

/// Handle on a live, shared editing session for one project manifest.
///
/// Every consumer that opens the same project sees the same document. Each
/// handle must be released exactly once.
pub trait LiveDocument: Send + Sync {
    /// Project the session belongs to.
    fn project(&self) -> &ProjectKey;

    /// Document currently held by the session.
    ///
    /// The session may swap in a new document after a revert, so callers
    /// should not cache the returned handle across lifecycle events.
    fn document(&self) -> SharedDocument;

    /// Root element of the current document.
    fn current_root(&self) -> Option<NodeRef> {
        self.document().root()
    }

    /// Whether the session has unsaved changes.
    fn is_dirty(&self) -> bool;

    /// Subscribes `listener` to lifecycle events of the session.
    ///
    /// The session holds the listener weakly. Events are delivered
    /// synchronously by whichever call changed the session.
    fn subscribe(&self, listener: Weak<dyn LifecycleListener>) -> SubscriptionId;

    /// Cancels a subscription created by [`LiveDocument::subscribe`].
    fn unsubscribe(&self, id: SubscriptionId);

    /// Gives this handle back to the store.
    ///
    /// # Errors
    ///
    /// Returns an error when the handle was already released or the store
    /// failed to tear the session down.
    fn release(&self) -> Result<(), StoreError>;
}

impl fmt::Debug for dyn LiveDocument {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LiveDocument")
            .field("project", self.project())
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

/// Access to persisted manifests and their editing sessions.
pub trait DocumentStore: Send + Sync {
    /// Whether the project has a manifest on disk.
    fn exists(&self, project: &ProjectKey) -> bool;

    /// Stamp describing the persisted manifest.
    ///
    /// # Errors
    ///
    /// Returns an error when the manifest cannot be inspected.
    fn modification_stamp(&self, project: &ProjectKey) -> Result<ModificationStamp, StoreError>;

    /// Parses a detached snapshot of the persisted manifest.
    ///
    /// # Errors
    ///
    /// Returns an error when the manifest cannot be read or is malformed.
    fn parse_snapshot(&self, project: &ProjectKey) -> Result<Document, StoreError>;

    /// Opens, or joins, the shared editing session for the project.
    ///
    /// # Errors
    ///
    /// Returns an error when the manifest cannot be read or is malformed.
    fn open_for_edit(&self, project: &ProjectKey) -> Result<Arc<dyn LiveDocument>, StoreError>;

    /// Normalises whitespace and redundant namespace declarations.
    ///
    /// # Errors
    ///
    /// Returns an error when the session is no longer available.
    fn cleanup(&self, live: &dyn LiveDocument) -> Result<(), StoreError>;

    /// Writes the session's document to disk and clears its dirty state.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation or the write fails.
    fn persist(&self, live: &dyn LiveDocument) -> Result<(), StoreError>;
}

impl fmt::Debug for dyn DocumentStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DocumentStore")
            .finish_non_exhaustive()
    }
}
