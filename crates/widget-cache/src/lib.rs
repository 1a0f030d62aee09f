//! Per-project cache of typed widget manifest views.
#![deny(missing_docs)]
//!
//! [`ConfigModelCache`] owns one [`WidgetModel`] per project. A model hands
//! out two views of the manifest: a read-only snapshot that is rebuilt only
//! when the persisted document changes, and an editable view bound to the
//! store's live editing session. Views are shared as `Arc<Widget>` and keep
//! their identity when the live document is re-synchronised underneath them.

mod cache;
mod errors;
mod model;

pub use cache::ConfigModelCache;
pub use errors::{CacheError, ErrorKind};
pub use model::{ModelPhase, WidgetModel};
