//! Node storage for the arena document.

use std::fmt;

/// Identifier of a node inside a single [`crate::Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Element name split into its optional prefix and local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    prefix: Option<String>,
    local: String,
}

impl QualifiedName {
    /// Splits `prefix:local` text into a qualified name.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_owned()),
                local: local.to_owned(),
            },
            None => Self {
                prefix: None,
                local: raw.to_owned(),
            },
        }
    }

    /// Builds a name from its parts.
    #[must_use]
    pub fn new(prefix: Option<&str>, local: &str) -> Self {
        Self {
            prefix: prefix.map(str::to_owned),
            local: local.to_owned(),
        }
    }

    /// Namespace prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Local part of the name.
    #[must_use]
    pub fn local(&self) -> &str {
        self.local.as_str()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(formatter, "{prefix}:{}", self.local),
            None => formatter.write_str(&self.local),
        }
    }
}

/// Attribute stored on an element, keyed by its raw qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name as written in the markup.
    pub name: String,
    /// Unescaped attribute value.
    pub value: String,
}

/// Content carried by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with its name, resolved namespace and attributes.
    Element {
        /// Qualified element name.
        name: QualifiedName,
        /// Namespace URI the name resolved to when it was parsed or created.
        namespace: Option<String>,
        /// Attributes in document order.
        attributes: Vec<Attribute>,
    },
    /// Character data with entities already expanded.
    Text(String),
    /// A CDATA section.
    CData(String),
    /// A comment.
    Comment(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}
