//! Arena-backed XML document model used by the widget manifest tooling.
#![deny(missing_docs)]
//!
//! The crate wraps `quick-xml` with a small mutable tree. Nodes live in an
//! arena owned by a [`Document`] and are addressed by [`NodeId`]. Elements can
//! be created without a parent so callers can populate them before attaching
//! them to the tree. [`SharedDocument`] and [`NodeRef`] make a document safe to
//! share between threads and give typed wrappers a cheap handle to hold.

mod document;
mod errors;
mod node;
mod parse;
mod shared;
mod write;

pub use document::Document;
pub use errors::DomError;
pub use node::{Attribute, NodeId, NodeKind, QualifiedName};
pub use shared::{NodeRef, SharedDocument};

#[cfg(test)]
mod tests;
