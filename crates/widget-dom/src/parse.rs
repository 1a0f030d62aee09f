//! Builds a [`Document`] from markup using the `quick-xml` pull reader.

use std::borrow::Cow;
use std::str;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::document::Document;
use crate::errors::DomError;
use crate::node::{Attribute, NodeId, NodeKind, QualifiedName};

impl Document {
    /// Parses markup into a document.
    ///
    /// Text, CDATA, comments and namespace declarations are preserved.
    /// Processing instructions and doctype declarations are skipped.
    pub fn parse(markup: &str) -> Result<Self, DomError> {
        let mut reader = Reader::from_str(markup);
        let mut document = Self::new();
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|error| DomError::syntax(position, error.to_string()))?;
            match event {
                Event::Decl(_) => document.set_declaration(true),
                Event::Start(start) => {
                    let id = open_element(&mut document, &open, &start, position)?;
                    open.push(id);
                }
                Event::Empty(start) => {
                    open_element(&mut document, &open, &start, position)?;
                }
                Event::End(_) => {
                    if open.pop().is_none() {
                        return Err(DomError::syntax(position, "unexpected closing tag"));
                    }
                }
                Event::Text(text) => {
                    let content = text
                        .unescape()
                        .map_err(|error| DomError::syntax(position, error.to_string()))?;
                    let kind = NodeKind::Text(content.into_owned());
                    push_character_data(&mut document, &open, kind, position)?;
                }
                Event::CData(data) => {
                    let content = utf8(data.into_inner(), position)?;
                    push_character_data(&mut document, &open, NodeKind::CData(content), position)?;
                }
                Event::Comment(comment) => {
                    let content = utf8(comment.into_inner(), position)?;
                    let id = document.push_node(NodeKind::Comment(content));
                    attach(&mut document, &open, id)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            let position = reader.buffer_position();
            return Err(DomError::syntax(position, "unclosed element at end of input"));
        }
        if document.root().is_none() {
            return Err(DomError::MissingRoot);
        }
        Ok(document)
    }
}

fn open_element(
    document: &mut Document,
    open: &[NodeId],
    start: &BytesStart<'_>,
    position: u64,
) -> Result<NodeId, DomError> {
    let raw_name = utf8(Cow::Borrowed(start.name().as_ref()), position)?;
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|error| DomError::syntax(position, error.to_string()))?;
        let name = utf8(Cow::Borrowed(attribute.key.as_ref()), position)?;
        let value = attribute
            .unescape_value()
            .map_err(|error| DomError::syntax(position, error.to_string()))?;
        attributes.push(Attribute {
            name,
            value: value.into_owned(),
        });
    }

    let id = document.push_node(NodeKind::Element {
        name: QualifiedName::parse(&raw_name),
        namespace: None,
        attributes,
    });
    match open.last() {
        Some(parent) => document.append_child(*parent, id)?,
        None => {
            if document.root().is_some() {
                return Err(DomError::syntax(position, "multiple root elements"));
            }
            document.push_top_level(id);
            document.set_root(id);
        }
    }
    document.resolve_namespace(id);
    Ok(id)
}

fn push_character_data(
    document: &mut Document,
    open: &[NodeId],
    kind: NodeKind,
    position: u64,
) -> Result<(), DomError> {
    let Some(parent) = open.last() else {
        let blank = matches!(&kind, NodeKind::Text(text) if text.trim().is_empty());
        if blank {
            return Ok(());
        }
        return Err(DomError::syntax(position, "character data outside the root element"));
    };
    let id = document.push_node(kind);
    document.append_child(*parent, id)
}

fn attach(document: &mut Document, open: &[NodeId], id: NodeId) -> Result<(), DomError> {
    match open.last() {
        Some(parent) => document.append_child(*parent, id),
        None => {
            document.push_top_level(id);
            Ok(())
        }
    }
}

fn utf8(bytes: Cow<'_, [u8]>, position: u64) -> Result<String, DomError> {
    str::from_utf8(&bytes)
        .map(str::to_owned)
        .map_err(|error| DomError::syntax(position, error.to_string()))
}
