//! Serialises a [`Document`] with the `quick-xml` writer.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::document::Document;
use crate::errors::DomError;
use crate::node::{NodeId, NodeKind};

impl Document {
    /// Writes the document as UTF-8 markup.
    ///
    /// `indent` is the number of spaces per nesting level; zero writes the
    /// tree without adding any layout.
    pub fn to_xml_string(&self, indent: usize) -> Result<String, DomError> {
        let mut writer = if indent == 0 {
            Writer::new(Vec::new())
        } else {
            Writer::new_with_indent(Vec::new(), b' ', indent)
        };

        if self.has_declaration() {
            emit(
                &mut writer,
                Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
            )?;
        }
        for id in self.top_level() {
            self.write_node(&mut writer, *id)?;
        }

        let mut markup = String::from_utf8(writer.into_inner()).map_err(|error| DomError::Write {
            message: error.to_string(),
        })?;
        if !markup.ends_with('\n') {
            markup.push('\n');
        }
        Ok(markup)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), DomError> {
        match self.kind(id) {
            Some(NodeKind::Element {
                name, attributes, ..
            }) => {
                let qualified = name.to_string();
                let mut start = BytesStart::new(qualified.as_str());
                for attribute in attributes {
                    start.push_attribute((attribute.name.as_str(), attribute.value.as_str()));
                }
                let children = self.children(id);
                if children.is_empty() {
                    return emit(writer, Event::Empty(start));
                }
                emit(writer, Event::Start(start))?;
                for child in children {
                    self.write_node(writer, *child)?;
                }
                emit(writer, Event::End(BytesEnd::new(qualified.as_str())))
            }
            Some(NodeKind::Text(text)) => emit(writer, Event::Text(BytesText::new(text))),
            Some(NodeKind::CData(text)) => emit(writer, Event::CData(BytesCData::new(text.as_str()))),
            Some(NodeKind::Comment(text)) => {
                emit(writer, Event::Comment(BytesText::from_escaped(text.as_str())))
            }
            None => Err(DomError::UnknownNode(id)),
        }
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), DomError> {
    writer.write_event(event).map_err(|error| DomError::Write {
        message: error.to_string(),
    })
}
