//! Document store abstractions for widget manifests.
#![deny(missing_docs)]
//!
//! The cache talks to storage through [`DocumentStore`] and to live editing
//! sessions through [`LiveDocument`]. Both are traits so tests and hosts can
//! supply their own implementations. [`FsDocumentStore`] keeps manifests on
//! the local filesystem and shares one editing session per project between
//! every consumer that opens it.

mod errors;
mod events;
mod fs;
mod project;
mod stamp;
mod store;

pub use errors::StoreError;
pub use events::{
    EventKind, EventPhase, LifecycleEvent, LifecycleListener, Subscribers, SubscriptionId,
};
pub use fs::FsDocumentStore;
pub use project::ProjectKey;
pub use stamp::ModificationStamp;
pub use store::{DocumentStore, LiveDocument};

#[cfg(test)]
mod tests;
