//! Closed set of typed objects returned by the factory.

use widget_dom::NodeRef;

use crate::kind::ObjectKind;
use crate::objects::{
    Access, Author, ConfigElement, Content, Feature, Icon, License, Preference, Splash,
};

/// A typed manifest object of any [`ObjectKind`].
#[derive(Debug, Clone)]
pub enum ConfigObject {
    /// See [`Author`].
    Author(Author),
    /// See [`Content`].
    Content(Content),
    /// See [`Preference`].
    Preference(Preference),
    /// See [`Feature`].
    Feature(Feature),
    /// See [`Access`].
    Access(Access),
    /// See [`Icon`].
    Icon(Icon),
    /// See [`Splash`].
    Splash(Splash),
    /// See [`License`].
    License(License),
}

impl ConfigObject {
    /// Kind of the wrapped object.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Author(_) => ObjectKind::Author,
            Self::Content(_) => ObjectKind::Content,
            Self::Preference(_) => ObjectKind::Preference,
            Self::Feature(_) => ObjectKind::Feature,
            Self::Access(_) => ObjectKind::Access,
            Self::Icon(_) => ObjectKind::Icon,
            Self::Splash(_) => ObjectKind::Splash,
            Self::License(_) => ObjectKind::License,
        }
    }

    /// Backing element.
    #[must_use]
    pub fn node(&self) -> &NodeRef {
        match self {
            Self::Author(object) => object.node(),
            Self::Content(object) => object.node(),
            Self::Preference(object) => object.node(),
            Self::Feature(object) => object.node(),
            Self::Access(object) => object.node(),
            Self::Icon(object) => object.node(),
            Self::Splash(object) => object.node(),
            Self::License(object) => object.node(),
        }
    }

    /// Converts into the concrete wrapper when the kinds match.
    #[must_use]
    pub fn into_element<T: ConfigElement>(self) -> Option<T> {
        (self.kind() == T::KIND).then(|| T::from_node(self.node().clone()))
    }
}
