//! Mutable XML tree stored in an arena.
//!
//! Nodes are never freed while the document lives. Removing a node only
//! detaches it, so identifiers held elsewhere stay valid and the node can be
//! attached again later.

use crate::errors::DomError;
use crate::node::{Attribute, Node, NodeId, NodeKind, QualifiedName};

const XMLNS: &str = "xmlns";
const XML_PREFIX: &str = "xml";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// An XML document whose nodes live in a single arena.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    top_level: Vec<NodeId>,
    root: Option<NodeId>,
    declaration: bool,
}

impl Document {
    /// Builds an empty document without a root element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document holding a single root element.
    ///
    /// The root declares `namespace` as its default namespace.
    #[must_use]
    pub fn with_root(namespace: Option<&str>, local: &str) -> Self {
        let mut document = Self {
            declaration: true,
            ..Self::default()
        };
        let mut attributes = Vec::new();
        if let Some(uri) = namespace {
            attributes.push(Attribute {
                name: XMLNS.to_owned(),
                value: uri.to_owned(),
            });
        }
        let root = document.push_node(NodeKind::Element {
            name: QualifiedName::new(None, local),
            namespace: namespace.map(str::to_owned),
            attributes,
        });
        document.push_top_level(root);
        document.root = Some(root);
        document
    }

    /// Root element of the document.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Whether an XML declaration is emitted when the document is written.
    #[must_use]
    pub fn has_declaration(&self) -> bool {
        self.declaration
    }

    pub(crate) fn set_declaration(&mut self, declaration: bool) {
        self.declaration = declaration;
    }

    pub(crate) fn top_level(&self) -> &[NodeId] {
        self.top_level.as_slice()
    }

    pub(crate) fn push_top_level(&mut self, id: NodeId) {
        self.top_level.push(id);
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub(crate) fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    /// Whether `id` names a node owned by this document.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Content of the node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_element)
    }

    /// Qualified name of an element.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&QualifiedName> {
        match self.kind(id) {
            Some(NodeKind::Element { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Local name of an element.
    #[must_use]
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id).map(QualifiedName::local)
    }

    /// Namespace URI of an element.
    #[must_use]
    pub fn namespace(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Element { namespace, .. }) => namespace.as_deref(),
            _ => None,
        }
    }

    /// Attributes of an element in document order.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.kind(id) {
            Some(NodeKind::Element { attributes, .. }) => attributes.as_slice(),
            _ => &[],
        }
    }

    /// Value of the attribute with the given qualified name.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    /// Sets or replaces an attribute on an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let node = self.node_mut(id)?;
        let NodeKind::Element { attributes, .. } = &mut node.kind else {
            return Err(DomError::UnknownNode(id));
        };
        match attributes.iter_mut().find(|attribute| attribute.name == name) {
            Some(existing) => value.clone_into(&mut existing.value),
            None => attributes.push(Attribute {
                name: name.to_owned(),
                value: value.to_owned(),
            }),
        }
        Ok(())
    }

    /// Removes an attribute, returning whether it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let Some(Node {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(id.0)
        else {
            return false;
        };
        let before = attributes.len();
        attributes.retain(|attribute| attribute.name != name);
        attributes.len() != before
    }

    /// Parent of the node, if it is attached to one.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Children of the node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Element children of the node.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    /// Element children matching a namespace and local name.
    pub fn child_elements_named<'a>(
        &'a self,
        id: NodeId,
        namespace: Option<&'a str>,
        local: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.child_elements(id).filter(move |child| {
            self.local_name(*child) == Some(local) && self.namespace(*child) == namespace
        })
    }

    /// Whether the node is reachable from the root element.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        self.root == Some(current)
    }

    /// Resolves `prefix` to a namespace URI in the scope of `id`.
    ///
    /// `None` looks up the default namespace.
    #[must_use]
    pub fn lookup_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some(XML_PREFIX) {
            return Some(XML_NAMESPACE);
        }
        let wanted = declaration_name(prefix);
        let mut current = Some(id);
        while let Some(node_id) = current {
            if let Some(value) = self.attribute(node_id, &wanted) {
                return if value.is_empty() { None } else { Some(value) };
            }
            current = self.parent(node_id);
        }
        None
    }

    /// Finds a prefix bound to `namespace` in the scope of `id`.
    ///
    /// Returns `Some(None)` when the namespace is the default namespace and
    /// `None` when no binding is in scope.
    #[must_use]
    pub fn lookup_prefix(&self, id: NodeId, namespace: &str) -> Option<Option<String>> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            for attribute in self.attributes(node_id) {
                if attribute.value != namespace {
                    continue;
                }
                let candidate = declared_prefix(&attribute.name);
                let Some(prefix) = candidate else {
                    continue;
                };
                // A closer declaration may shadow this one.
                if self.lookup_namespace(id, prefix) == Some(namespace) {
                    return Some(prefix.map(str::to_owned));
                }
            }
            current = self.parent(node_id);
        }
        None
    }

    /// Creates a detached element in `namespace`.
    ///
    /// The prefix is borrowed from the root element when it already binds the
    /// namespace. Otherwise the element carries its own declaration so it
    /// stays in the right namespace wherever it is attached.
    pub fn create_element_ns(&mut self, namespace: Option<&str>, local: &str) -> NodeId {
        let mut attributes = Vec::new();
        let binding = match (namespace, self.root) {
            (Some(uri), Some(root)) => self.lookup_prefix(root, uri),
            _ => None,
        };
        let name = match (namespace, binding) {
            (Some(_), Some(prefix)) => QualifiedName::new(prefix.as_deref(), local),
            (Some(uri), None) => {
                attributes.push(Attribute {
                    name: XMLNS.to_owned(),
                    value: uri.to_owned(),
                });
                QualifiedName::new(None, local)
            }
            (None, _) => {
                let inherits_default = self
                    .root
                    .is_some_and(|root| self.lookup_namespace(root, None).is_some());
                if inherits_default {
                    attributes.push(Attribute {
                        name: XMLNS.to_owned(),
                        value: String::new(),
                    });
                }
                QualifiedName::new(None, local)
            }
        };
        self.push_node(NodeKind::Element {
            name,
            namespace: namespace.map(str::to_owned),
            attributes,
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_owned()))
    }

    /// Creates a detached comment.
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Comment(text.to_owned()))
    }

    /// Appends a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts a detached node before `reference`, or last when it is `None`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.check_insertion(parent, child)?;
        let index = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|candidate| *candidate == reference)
                .ok_or(DomError::NotAChild {
                    parent,
                    child: reference,
                })?,
            None => self.children(parent).len(),
        };
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.contains(parent) {
            return Err(DomError::UnknownNode(parent));
        }
        if !self.contains(child) {
            return Err(DomError::UnknownNode(child));
        }
        if !self.is_element(parent) {
            return Err(DomError::hierarchy(parent, child, "parent is not an element"));
        }
        if self.parent(child).is_some() || self.root == Some(child) {
            return Err(DomError::hierarchy(parent, child, "node is already attached"));
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(DomError::hierarchy(parent, child, "node is an ancestor"));
            }
            ancestor = self.parent(current);
        }
        Ok(())
    }

    /// Detaches `child` from `parent`. The node stays usable.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let children = &mut self.node_mut(parent)?.children;
        let index = children
            .iter()
            .position(|candidate| *candidate == child)
            .ok_or(DomError::NotAChild { parent, child })?;
        children.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Concatenated text and CDATA of the node and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut buffer = String::new();
        self.collect_text(id, &mut buffer);
        buffer
    }

    fn collect_text(&self, id: NodeId, buffer: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text) | NodeKind::CData(text)) => buffer.push_str(text),
            Some(NodeKind::Element { .. }) => {
                for child in self.children(id) {
                    self.collect_text(*child, buffer);
                }
            }
            _ => {}
        }
    }

    /// Replaces every child of an element with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        if !self.is_element(id) {
            return Err(DomError::UnknownNode(id));
        }
        let previous = std::mem::take(&mut self.node_mut(id)?.children);
        for child in previous {
            self.node_mut(child)?.parent = None;
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Normalises the attached tree before it is written.
    ///
    /// Whitespace-only text between element siblings is dropped so the writer
    /// can indent from scratch, and namespace declarations that repeat a
    /// binding already in scope are removed.
    pub fn cleanup(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            self.strip_layout_whitespace(id);
            if Some(id) != self.root {
                self.strip_redundant_declarations(id);
            }
            pending.extend(self.child_elements(id));
        }
    }

    fn strip_layout_whitespace(&mut self, id: NodeId) {
        if self.child_elements(id).next().is_none() {
            return;
        }
        let layout: Vec<NodeId> = self
            .children(id)
            .iter()
            .copied()
            .filter(|child| {
                matches!(self.kind(*child), Some(NodeKind::Text(text)) if text.trim().is_empty())
            })
            .collect();
        for child in layout {
            // Collected from `children(id)` above, so detaching cannot fail.
            let _detached = self.remove_child(id, child);
        }
    }

    fn strip_redundant_declarations(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let redundant: Vec<String> = self
            .attributes(id)
            .iter()
            .filter_map(|attribute| {
                let prefix = declared_prefix(&attribute.name)?;
                let inherited = self.lookup_namespace(parent, prefix).unwrap_or_default();
                (inherited == attribute.value).then(|| attribute.name.clone())
            })
            .collect();
        for name in redundant {
            self.remove_attribute(id, &name);
        }
    }
}

fn declaration_name(prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("{XMLNS}:{prefix}"),
        None => XMLNS.to_owned(),
    }
}

/// Returns the prefix declared by an `xmlns` attribute name.
///
/// `Some(None)` is the default namespace declaration.
fn declared_prefix(attribute: &str) -> Option<Option<&str>> {
    if attribute == XMLNS {
        return Some(None);
    }
    attribute
        .strip_prefix("xmlns:")
        .map(Some)
}

impl Document {
    pub(crate) fn resolve_namespace(&mut self, id: NodeId) {
        let prefix = self.name(id).and_then(QualifiedName::prefix).map(str::to_owned);
        let resolved = self
            .lookup_namespace(id, prefix.as_deref())
            .map(str::to_owned);
        if let Some(Node {
            kind: NodeKind::Element { namespace, .. },
            ..
        }) = self.nodes.get_mut(id.0)
        {
            *namespace = resolved;
        }
    }
}
