//! Identity-stable facade over the `<widget>` root element.

use std::sync::{PoisonError, RwLock};

use widget_dom::{NodeRef, SharedDocument};

use crate::errors::ModelError;
use crate::kind::NS_W3C_WIDGET;
use crate::objects::{
    Access, Author, ConfigElement, Content, Feature, Icon, License, Preference, Splash,
};

const NAME_TAG: &str = "name";
const DESCRIPTION_TAG: &str = "description";
const SHORT_NAME: &str = "short";

/// Typed view of a widget manifest.
///
/// The backing root sits behind a lock so [`Widget::reload`] can point an
/// existing instance at a replacement document. Callers that hold the widget
/// see the new content without fetching it again.
#[derive(Debug)]
pub struct Widget {
    root: RwLock<NodeRef>,
}

macro_rules! repeatable {
    ($($(#[$meta:meta])* $list:ident, $add:ident, $remove:ident => $object:ty;)*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $list(&self) -> Vec<$object> {
                self.children::<$object>()
            }

            #[doc = concat!("Appends a detached `", stringify!($object), "` to the widget.")]
            pub fn $add(&self, object: &$object) -> Result<(), ModelError> {
                self.attach(object)
            }

            #[doc = concat!("Detaches a `", stringify!($object), "` from the widget.")]
            pub fn $remove(&self, object: &$object) -> Result<(), ModelError> {
                self.detach(object)
            }
        )*
    };
}

macro_rules! single {
    ($($(#[$meta:meta])* $getter:ident, $setter:ident => $object:ty;)*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $getter(&self) -> Option<$object> {
                self.children::<$object>().into_iter().next()
            }

            #[doc = concat!("Replaces the `", stringify!($object), "`, or removes it for `None`.")]
            pub fn $setter(&self, object: Option<&$object>) -> Result<(), ModelError> {
                self.replace_single(object)
            }
        )*
    };
}

impl Widget {
    /// Wraps the root element of a manifest.
    #[must_use]
    pub fn new(root: NodeRef) -> Self {
        Self {
            root: RwLock::new(root),
        }
    }

    /// Points this widget at a new root element, keeping its identity.
    pub fn reload(&self, root: NodeRef) {
        let mut slot = self.root.write().unwrap_or_else(PoisonError::into_inner);
        *slot = root;
    }

    /// Current root element.
    #[must_use]
    pub fn root(&self) -> NodeRef {
        self.root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Document that owns the current root element.
    #[must_use]
    pub fn document(&self) -> SharedDocument {
        self.root().document().clone()
    }

    /// Application identifier (`id` attribute).
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.root().attribute("id")
    }

    /// Sets the application identifier.
    pub fn set_id(&self, id: Option<&str>) -> Result<(), ModelError> {
        Ok(self.root().set_attribute("id", id)?)
    }

    /// Application version (`version` attribute).
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.root().attribute("version")
    }

    /// Sets the application version.
    pub fn set_version(&self, version: Option<&str>) -> Result<(), ModelError> {
        Ok(self.root().set_attribute("version", version)?)
    }

    /// Preferred view modes (`viewmodes` attribute).
    #[must_use]
    pub fn viewmodes(&self) -> Option<String> {
        self.root().attribute("viewmodes")
    }

    /// Sets the preferred view modes.
    pub fn set_viewmodes(&self, viewmodes: Option<&str>) -> Result<(), ModelError> {
        Ok(self.root().set_attribute("viewmodes", viewmodes)?)
    }

    /// Text of `<name>`.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.text_child(NAME_TAG).map(|node| node.text())
    }

    /// Sets the text of `<name>`, creating it if needed, or removes it.
    pub fn set_name(&self, name: Option<&str>) -> Result<(), ModelError> {
        self.set_text_child(NAME_TAG, name)
    }

    /// The `short` attribute of `<name>`.
    #[must_use]
    pub fn short_name(&self) -> Option<String> {
        self.text_child(NAME_TAG)
            .and_then(|node| node.attribute(SHORT_NAME))
    }

    /// Sets the `short` attribute of `<name>`, creating the element if needed.
    pub fn set_short_name(&self, short_name: Option<&str>) -> Result<(), ModelError> {
        let node = match (self.text_child(NAME_TAG), short_name) {
            (Some(node), _) => node,
            (None, None) => return Ok(()),
            (None, Some(_)) => self.append_text_child(NAME_TAG)?,
        };
        Ok(node.set_attribute(SHORT_NAME, short_name)?)
    }

    /// Text of `<description>`.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.text_child(DESCRIPTION_TAG).map(|node| node.text())
    }

    /// Sets the text of `<description>`, creating it if needed, or removes it.
    pub fn set_description(&self, description: Option<&str>) -> Result<(), ModelError> {
        self.set_text_child(DESCRIPTION_TAG, description)
    }

    single! {
        /// The `<author>` element.
        author, set_author => Author;
        /// The `<content>` element.
        content, set_content => Content;
        /// The `<license>` element.
        license, set_license => License;
    }

    repeatable! {
        /// `<preference>` elements in document order.
        preferences, add_preference, remove_preference => Preference;
        /// `<feature>` elements in document order.
        features, add_feature, remove_feature => Feature;
        /// `<access>` elements in document order.
        accesses, add_access, remove_access => Access;
        /// `<icon>` elements in document order.
        icons, add_icon, remove_icon => Icon;
        /// `<gap:splash>` elements in document order.
        splashes, add_splash, remove_splash => Splash;
    }

    /// Value of the first preference called `name`.
    #[must_use]
    pub fn preference_value(&self, name: &str) -> Option<String> {
        self.preferences()
            .into_iter()
            .find(|preference| preference.name().as_deref() == Some(name))
            .and_then(|preference| preference.value())
    }

    /// Typed children of the given kind.
    #[must_use]
    pub fn children<T: ConfigElement>(&self) -> Vec<T> {
        self.root()
            .children_named(Some(T::KIND.namespace()), T::KIND.tag())
            .into_iter()
            .map(T::from_node)
            .collect()
    }

    fn attach<T: ConfigElement>(&self, object: &T) -> Result<(), ModelError> {
        let root = self.root();
        let node = object.node();
        if !root.document().ptr_eq(node.document()) {
            return Err(ModelError::ForeignDocument { tag: T::KIND.tag() });
        }
        if node.parent().is_some() || node.same_node(&root) {
            return Err(ModelError::AlreadyAttached { tag: T::KIND.tag() });
        }
        Ok(root.append(node)?)
    }

    fn detach<T: ConfigElement>(&self, object: &T) -> Result<(), ModelError> {
        let root = self.root();
        let node = object.node();
        let is_child = node
            .parent()
            .is_some_and(|parent| parent.same_node(&root));
        if !is_child {
            return Err(ModelError::NotAChild { tag: T::KIND.tag() });
        }
        Ok(root.remove(node)?)
    }

    fn replace_single<T: ConfigElement>(&self, object: Option<&T>) -> Result<(), ModelError> {
        let current = self.children::<T>();
        if let Some(replacement) = object {
            if current
                .iter()
                .any(|existing| existing.node().same_node(replacement.node()))
            {
                return Ok(());
            }
            let root = self.root();
            if !root.document().ptr_eq(replacement.node().document()) {
                return Err(ModelError::ForeignDocument { tag: T::KIND.tag() });
            }
            if replacement.node().parent().is_some() {
                return Err(ModelError::AlreadyAttached { tag: T::KIND.tag() });
            }
        }
        for existing in &current {
            self.detach(existing)?;
        }
        match object {
            Some(replacement) => self.attach(replacement),
            None => Ok(()),
        }
    }

    fn text_child(&self, tag: &str) -> Option<NodeRef> {
        self.root().first_child_named(Some(NS_W3C_WIDGET), tag)
    }

    fn append_text_child(&self, tag: &str) -> Result<NodeRef, ModelError> {
        let root = self.root();
        let node = root.create_element(Some(NS_W3C_WIDGET), tag);
        root.append(&node)?;
        Ok(node)
    }

    fn set_text_child(&self, tag: &str, text: Option<&str>) -> Result<(), ModelError> {
        match (self.text_child(tag), text) {
            (Some(node), Some(text)) => Ok(node.set_text(text)?),
            (Some(node), None) => Ok(self.root().remove(&node)?),
            (None, Some(text)) => Ok(self.append_text_child(tag)?.set_text(text)?),
            (None, None) => Ok(()),
        }
    }
}
