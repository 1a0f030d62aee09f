//! Thread-safe handles over a [`Document`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::document::Document;
use crate::errors::DomError;
use crate::node::NodeId;

struct Shared {
    document: RwLock<Document>,
    revision: AtomicU64,
}

/// Reference-counted document that several owners can read and edit.
///
/// Every call to [`SharedDocument::edit`] bumps a revision counter. Edit
/// sessions compare revisions to tell whether the document is dirty.
/// Creating a detached element does not count as an edit: the tree that
/// would be written is unchanged until the element is attached.
#[derive(Clone)]
pub struct SharedDocument {
    shared: Arc<Shared>,
}

impl SharedDocument {
    /// Wraps a document for sharing.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            shared: Arc::new(Shared {
                document: RwLock::new(document),
                revision: AtomicU64::new(0),
            }),
        }
    }

    /// Runs `read` with shared access to the document.
    pub fn view<R>(&self, read: impl FnOnce(&Document) -> R) -> R {
        let guard = self
            .shared
            .document
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        read(&*guard)
    }

    /// Runs `change` with exclusive access and records a new revision.
    pub fn edit<R>(&self, change: impl FnOnce(&mut Document) -> R) -> R {
        let mut guard = self
            .shared
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let outcome = change(&mut *guard);
        self.shared.revision.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    /// Creates an element that has an owner but no parent.
    ///
    /// The revision is left alone, so a clean document stays clean.
    #[must_use]
    pub fn create_detached(&self, namespace: Option<&str>, local: &str) -> NodeRef {
        let id = self
            .shared
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .create_element_ns(namespace, local);
        NodeRef::new(self.clone(), id)
    }

    /// Revision counter, incremented by every edit.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.shared.revision.load(Ordering::Acquire)
    }

    /// Whether both handles point at the same document.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Handle on the root element, if the document has one.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef> {
        self.view(Document::root)
            .map(|id| NodeRef::new(self.clone(), id))
    }

    /// Serialises the document.
    pub fn to_xml_string(&self, indent: usize) -> Result<String, DomError> {
        self.view(|document| document.to_xml_string(indent))
    }
}

impl fmt::Debug for SharedDocument {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SharedDocument")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

/// A node paired with the document that owns it.
#[derive(Clone, Debug)]
pub struct NodeRef {
    document: SharedDocument,
    id: NodeId,
}

impl NodeRef {
    /// Pairs a node identifier with its owning document.
    #[must_use]
    pub fn new(document: SharedDocument, id: NodeId) -> Self {
        Self { document, id }
    }

    /// Owning document.
    #[must_use]
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Node identifier inside the owning document.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whether both handles name the same node of the same document.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        self.id == other.id && self.document.ptr_eq(&other.document)
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self) -> bool {
        self.document.view(|document| document.is_element(self.id))
    }

    /// Local name of the element.
    #[must_use]
    pub fn local_name(&self) -> Option<String> {
        self.document
            .view(|document| document.local_name(self.id).map(str::to_owned))
    }

    /// Namespace URI of the element.
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        self.document
            .view(|document| document.namespace(self.id).map(str::to_owned))
    }

    /// Attribute value by qualified name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.document
            .view(|document| document.attribute(self.id, name).map(str::to_owned))
    }

    /// Sets the attribute, or removes it when `value` is `None`.
    pub fn set_attribute(&self, name: &str, value: Option<&str>) -> Result<(), DomError> {
        self.document.edit(|document| match value {
            Some(value) => document.set_attribute(self.id, name, value),
            None => {
                document.remove_attribute(self.id, name);
                Ok(())
            }
        })
    }

    /// Text content of the node and its descendants.
    #[must_use]
    pub fn text(&self) -> String {
        self.document.view(|document| document.text_content(self.id))
    }

    /// Replaces the children with a text node.
    pub fn set_text(&self, text: &str) -> Result<(), DomError> {
        self.document
            .edit(|document| document.set_text_content(self.id, text))
    }

    /// Whether the node is reachable from the document root.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.document.view(|document| document.is_attached(self.id))
    }

    /// Parent element, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.document
            .view(|document| document.parent(self.id))
            .map(|id| Self::new(self.document.clone(), id))
    }

    /// Element children matching a namespace and local name.
    #[must_use]
    pub fn children_named(&self, namespace: Option<&str>, local: &str) -> Vec<Self> {
        let ids: Vec<NodeId> = self.document.view(|document| {
            document
                .child_elements_named(self.id, namespace, local)
                .collect()
        });
        ids.into_iter()
            .map(|id| Self::new(self.document.clone(), id))
            .collect()
    }

    /// First element child matching a namespace and local name.
    #[must_use]
    pub fn first_child_named(&self, namespace: Option<&str>, local: &str) -> Option<Self> {
        self.document
            .view(|document| document.child_elements_named(self.id, namespace, local).next())
            .map(|id| Self::new(self.document.clone(), id))
    }

    /// Creates a detached element in the same document.
    #[must_use]
    pub fn create_element(&self, namespace: Option<&str>, local: &str) -> Self {
        self.document.create_detached(namespace, local)
    }

    /// Appends `child` as the last child of this node.
    pub fn append(&self, child: &Self) -> Result<(), DomError> {
        self.ensure_same_document(child)?;
        self.document
            .edit(|document| document.append_child(self.id, child.id))
    }

    /// Inserts `child` before `reference`, or last when it is `None`.
    pub fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<(), DomError> {
        self.ensure_same_document(child)?;
        if let Some(reference) = reference {
            self.ensure_same_document(reference)?;
        }
        self.document.edit(|document| {
            document.insert_before(self.id, child.id, reference.map(|node| node.id))
        })
    }

    /// Detaches `child` from this node.
    pub fn remove(&self, child: &Self) -> Result<(), DomError> {
        self.ensure_same_document(child)?;
        self.document
            .edit(|document| document.remove_child(self.id, child.id))
    }

    fn ensure_same_document(&self, other: &Self) -> Result<(), DomError> {
        if self.document.ptr_eq(&other.document) {
            Ok(())
        } else {
            Err(DomError::hierarchy(
                self.id,
                other.id,
                "node belongs to another document",
            ))
        }
    }
}
