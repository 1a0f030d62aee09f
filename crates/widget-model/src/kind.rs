//! Kinds of manifest objects the factory can build.

use std::fmt;

use widget_dom::SharedDocument;

use crate::object::ConfigObject;
use crate::objects::{
    Access, Author, ConfigElement, Content, Feature, Icon, License, Preference, Splash,
};

/// Default namespace of the W3C widget manifest.
pub const NS_W3C_WIDGET: &str = "http://www.w3.org/ns/widgets";

/// PhoneGap extension namespace, used by `<gap:splash>`.
pub const NS_PHONEGAP_1_0: &str = "http://phonegap.com/ns/1.0";

/// Object kinds that can be created as detached elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `<author>`.
    Author,
    /// `<content>`.
    Content,
    /// `<preference>`.
    Preference,
    /// `<feature>`.
    Feature,
    /// `<access>`.
    Access,
    /// `<icon>`.
    Icon,
    /// `<gap:splash>`.
    Splash,
    /// `<license>`.
    License,
}

impl ObjectKind {
    /// Every kind, in manifest order.
    pub const ALL: [Self; 8] = [
        Self::Author,
        Self::Content,
        Self::Preference,
        Self::Feature,
        Self::Access,
        Self::Icon,
        Self::Splash,
        Self::License,
    ];

    /// Namespace the element is created in.
    #[must_use]
    pub fn namespace(self) -> &'static str {
        match self {
            Self::Splash => NS_PHONEGAP_1_0,
            _ => NS_W3C_WIDGET,
        }
    }

    /// Local element name.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Content => "content",
            Self::Preference => "preference",
            Self::Feature => "feature",
            Self::Access => "access",
            Self::Icon => "icon",
            Self::Splash => "splash",
            Self::License => "license",
        }
    }

    /// Creates a detached element of this kind in `document`.
    ///
    /// The element has no parent until it is added through a [`crate::Widget`]
    /// mutator.
    #[must_use]
    pub fn create_detached(self, document: &SharedDocument) -> ConfigObject {
        match self {
            Self::Author => Author::create_detached(document).into(),
            Self::Content => Content::create_detached(document).into(),
            Self::Preference => Preference::create_detached(document).into(),
            Self::Feature => Feature::create_detached(document).into(),
            Self::Access => Access::create_detached(document).into(),
            Self::Icon => Icon::create_detached(document).into(),
            Self::Splash => Splash::create_detached(document).into(),
            Self::License => License::create_detached(document).into(),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.tag())
    }
}
