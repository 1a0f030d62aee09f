//! Typed object model over a widget manifest (`config.xml`).
#![deny(missing_docs)]
//!
//! [`Widget`] is a facade over the `<widget>` root element. It hands out typed
//! wrappers such as [`Preference`] or [`License`] that read and write the
//! underlying elements directly, so every change lands in the shared document.
//! A widget keeps its identity when its backing root is swapped with
//! [`Widget::reload`], which lets a cache refresh content behind references
//! that callers already hold.

mod errors;
mod icons;
mod kind;
mod object;
mod objects;
mod widget;

pub use errors::ModelError;
pub use icons::{ICON_EXTENSIONS, is_icon_file};
pub use kind::{NS_PHONEGAP_1_0, NS_W3C_WIDGET, ObjectKind};
pub use object::ConfigObject;
pub use objects::{
    Access, Author, ConfigElement, Content, Feature, FeatureParam, Icon, License, Preference,
    Splash,
};
pub use widget::Widget;
