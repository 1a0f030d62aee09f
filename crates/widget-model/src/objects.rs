//! Typed wrappers for the repeatable and single manifest children.

use widget_dom::{NodeRef, SharedDocument};

use crate::errors::ModelError;
use crate::kind::ObjectKind;
use crate::object::ConfigObject;

/// Behaviour shared by every typed manifest object.
pub trait ConfigElement: Clone {
    /// Kind, and therefore namespace and tag, of the wrapped element.
    const KIND: ObjectKind;

    /// Wraps an existing element.
    fn from_node(node: NodeRef) -> Self;

    /// Backing element.
    fn node(&self) -> &NodeRef;

    /// Creates the element in `document` without attaching it.
    #[must_use]
    fn create_detached(document: &SharedDocument) -> Self {
        let kind = Self::KIND;
        Self::from_node(document.create_detached(Some(kind.namespace()), kind.tag()))
    }

    /// Whether the element is reachable from the document root.
    #[must_use]
    fn is_attached(&self) -> bool {
        self.node().is_attached()
    }
}

macro_rules! config_element {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            node: NodeRef,
        }

        impl ConfigElement for $name {
            const KIND: ObjectKind = ObjectKind::$kind;

            fn from_node(node: NodeRef) -> Self {
                Self { node }
            }

            fn node(&self) -> &NodeRef {
                &self.node
            }
        }

        impl From<$name> for ConfigObject {
            fn from(object: $name) -> Self {
                Self::$kind(object)
            }
        }
    };
}

macro_rules! text_attributes {
    ($($getter:ident, $setter:ident => $attribute:literal;)*) => {
        $(
            #[doc = concat!("Value of the `", $attribute, "` attribute.")]
            #[must_use]
            pub fn $getter(&self) -> Option<String> {
                self.node.attribute($attribute)
            }

            #[doc = concat!("Sets the `", $attribute, "` attribute, removing it for `None`.")]
            pub fn $setter(&self, value: Option<&str>) -> Result<(), ModelError> {
                Ok(self.node.set_attribute($attribute, value)?)
            }
        )*
    };
}

macro_rules! flag_attributes {
    ($($getter:ident, $setter:ident => $attribute:literal;)*) => {
        $(
            #[doc = concat!("Boolean value of the `", $attribute, "` attribute.")]
            #[must_use]
            pub fn $getter(&self) -> Option<bool> {
                parse_flag(self.node.attribute($attribute))
            }

            #[doc = concat!("Sets the `", $attribute, "` attribute, removing it for `None`.")]
            pub fn $setter(&self, value: Option<bool>) -> Result<(), ModelError> {
                let text = value.map(|flag| if flag { "true" } else { "false" });
                Ok(self.node.set_attribute($attribute, text)?)
            }
        )*
    };
}

fn parse_flag(raw: Option<String>) -> Option<bool> {
    raw.and_then(|text| match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    })
}

config_element!(
    /// `<author>`: who wrote the application.
    Author => Author
);

impl Author {
    text_attributes! {
        href, set_href => "href";
        email, set_email => "email";
    }

    /// Author name, held as the element text.
    #[must_use]
    pub fn name(&self) -> String {
        self.node.text()
    }

    /// Replaces the author name.
    pub fn set_name(&self, name: &str) -> Result<(), ModelError> {
        Ok(self.node.set_text(name)?)
    }
}

config_element!(
    /// `<content>`: the start page of the application.
    Content => Content
);

impl Content {
    text_attributes! {
        src, set_src => "src";
        content_type, set_content_type => "type";
        encoding, set_encoding => "encoding";
    }
}

config_element!(
    /// `<preference>`: a named platform setting.
    Preference => Preference
);

impl Preference {
    text_attributes! {
        name, set_name => "name";
        value, set_value => "value";
    }

    flag_attributes! {
        readonly, set_readonly => "readonly";
    }
}

/// `<param>` entry of a [`Feature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureParam {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

config_element!(
    /// `<feature>`: a plugin or API the application uses.
    Feature => Feature
);

const PARAM_TAG: &str = "param";

impl Feature {
    text_attributes! {
        name, set_name => "name";
    }

    flag_attributes! {
        required, set_required => "required";
    }

    /// `<param>` children in document order.
    #[must_use]
    pub fn params(&self) -> Vec<FeatureParam> {
        self.param_nodes()
            .into_iter()
            .map(|param| FeatureParam {
                name: param.attribute("name").unwrap_or_default(),
                value: param.attribute("value").unwrap_or_default(),
            })
            .collect()
    }

    /// Adds a `<param>` child, or updates the value of an existing one.
    pub fn add_param(&self, name: &str, value: &str) -> Result<(), ModelError> {
        if let Some(existing) = self.find_param(name) {
            return Ok(existing.set_attribute("value", Some(value))?);
        }
        let param = self
            .node
            .create_element(Some(Self::KIND.namespace()), PARAM_TAG);
        param.set_attribute("name", Some(name))?;
        param.set_attribute("value", Some(value))?;
        Ok(self.node.append(&param)?)
    }

    /// Removes the `<param>` with `name`, returning whether one was found.
    pub fn remove_param(&self, name: &str) -> Result<bool, ModelError> {
        match self.find_param(name) {
            Some(param) => {
                self.node.remove(&param)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn param_nodes(&self) -> Vec<NodeRef> {
        self.node
            .children_named(Some(Self::KIND.namespace()), PARAM_TAG)
    }

    fn find_param(&self, name: &str) -> Option<NodeRef> {
        self.param_nodes()
            .into_iter()
            .find(|param| param.attribute("name").as_deref() == Some(name))
    }
}

config_element!(
    /// `<access>`: a network origin the application may reach.
    Access => Access
);

impl Access {
    text_attributes! {
        origin, set_origin => "origin";
    }

    flag_attributes! {
        subdomains, set_subdomains => "subdomains";
        browser_only, set_browser_only => "browserOnly";
    }
}

config_element!(
    /// `<icon>`: an application icon.
    Icon => Icon
);

impl Icon {
    text_attributes! {
        src, set_src => "src";
        width, set_width => "width";
        height, set_height => "height";
        density, set_density => "density";
    }
}

config_element!(
    /// `<gap:splash>`: a splash screen image.
    Splash => Splash
);

const PLATFORM: &str = "platform";
const PREFIXED_PLATFORM: &str = "gap:platform";

impl Splash {
    text_attributes! {
        src, set_src => "src";
        width, set_width => "width";
        height, set_height => "height";
        density, set_density => "density";
    }

    /// Target platform, read from `platform` or `gap:platform`.
    #[must_use]
    pub fn platform(&self) -> Option<String> {
        self.node
            .attribute(PLATFORM)
            .or_else(|| self.node.attribute(PREFIXED_PLATFORM))
    }

    /// Sets the target platform, keeping whichever spelling is present.
    pub fn set_platform(&self, platform: Option<&str>) -> Result<(), ModelError> {
        let attribute = if self.node.attribute(PREFIXED_PLATFORM).is_some() {
            PREFIXED_PLATFORM
        } else {
            PLATFORM
        };
        Ok(self.node.set_attribute(attribute, platform)?)
    }
}

config_element!(
    /// `<license>`: licence text and link.
    License => License
);

impl License {
    text_attributes! {
        href, set_href => "href";
    }

    /// Licence text.
    #[must_use]
    pub fn text(&self) -> String {
        self.node.text()
    }

    /// Replaces the licence text.
    pub fn set_text(&self, text: &str) -> Result<(), ModelError> {
        Ok(self.node.set_text(text)?)
    }
}
