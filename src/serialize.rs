use std::io;

use crate::document::{Document, Node};
use crate::error::Error;
use crate::name::Name;
use crate::value::Value;

/// A writer-shaped sink the tree serializes itself into.
///
/// [`Document::write_node`] walks a subtree depth-first and reports it to
/// the sink call by call, in the same shape the
/// [`TreeWriter`](crate::writer::TreeWriter) accepts content. [`XmlWriter`]
/// is the sink that renders escaped XML text; other sinks can re-target the
/// same walk.
pub trait XmlSink {
    fn xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), Error>;
    fn document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        internal_subset: Option<&str>,
    ) -> Result<(), Error>;
    fn start_element(&mut self, name: &Name) -> Result<(), Error>;
    /// Called for every start; `empty_tag` is only honored for elements
    /// without children.
    fn end_element(&mut self, name: &Name, empty_tag: bool) -> Result<(), Error>;
    fn start_attribute(&mut self, name: &Name) -> Result<(), Error>;
    fn end_attribute(&mut self) -> Result<(), Error>;
    fn text(&mut self, text: &str) -> Result<(), Error>;
    fn cdata(&mut self, text: &str) -> Result<(), Error>;
    /// Insignificant whitespace; by default handled as text.
    fn whitespace(&mut self, text: &str) -> Result<(), Error> {
        self.text(text)
    }
    /// Significant whitespace; by default handled as text.
    fn significant_whitespace(&mut self, text: &str) -> Result<(), Error> {
        self.text(text)
    }
    fn comment(&mut self, text: &str) -> Result<(), Error>;
    fn processing_instruction(&mut self, target: &str, data: Option<&str>) -> Result<(), Error>;
    fn entity_reference(&mut self, name: &str) -> Result<(), Error>;
}

/// ## Serialization
impl Document {
    /// Serialize a subtree into a sink, depth-first.
    ///
    /// Entity reference nodes are reported as references; their expansion
    /// children are not descended into.
    pub fn write_node(&self, node: Node, sink: &mut impl XmlSink) -> Result<(), Error> {
        self.check_owner(node)?;
        if self.is_attribute(node) {
            return self.write_attribute_node(node, sink);
        }
        self.write_subtree(node, sink)
    }

    /// Serialize a subtree to an XML string.
    ///
    /// ```rust
    /// let doc = xdom::Document::parse("<a><b x=\"1\"/>text</a>").unwrap();
    /// let a = doc.document_element().unwrap();
    /// assert_eq!(doc.to_string(a).unwrap(), "<a><b x=\"1\"/>text</a>");
    /// ```
    pub fn to_string(&self, node: Node) -> Result<String, Error> {
        let mut buf = Vec::new();
        let mut writer = XmlWriter::new(&mut buf);
        self.write_node(node, &mut writer)?;
        writer.finish()?;
        String::from_utf8(buf)
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn write_subtree(&self, node: Node, sink: &mut impl XmlSink) -> Result<(), Error> {
        match self.value(node) {
            Value::Document | Value::Fragment => {
                for child in self.children(node) {
                    self.write_subtree(child, sink)?;
                }
            }
            Value::Element(element) => {
                let name = self.name_ref(element.name());
                sink.start_element(name)?;
                for attribute in self.attributes(node) {
                    self.write_attribute_node(*attribute, sink)?;
                }
                for child in self.children(node) {
                    self.write_subtree(child, sink)?;
                }
                sink.end_element(name, element.is_empty_tag())?;
            }
            Value::Text(t) => sink.text(t.get())?,
            Value::CData(t) => sink.cdata(t.get())?,
            Value::Whitespace(t) => sink.whitespace(t.get())?,
            Value::SignificantWhitespace(t) => sink.significant_whitespace(t.get())?,
            Value::Comment(c) => sink.comment(c.get())?,
            Value::ProcessingInstruction(pi) => {
                sink.processing_instruction(pi.target(), pi.data())?
            }
            Value::EntityReference(e) => sink.entity_reference(e.name())?,
            Value::DocumentType(dt) => sink.document_type(
                dt.name(),
                dt.public_id(),
                dt.system_id(),
                dt.internal_subset(),
            )?,
            Value::XmlDeclaration(decl) => {
                sink.xml_declaration(decl.version(), decl.encoding(), decl.standalone())?
            }
            Value::Attribute(_) => {
                self.write_attribute_node(node, sink)?;
            }
        }
        Ok(())
    }

    fn write_attribute_node(&self, attribute: Node, sink: &mut impl XmlSink) -> Result<(), Error> {
        let name_id = match self.value(attribute) {
            Value::Attribute(a) => a.name(),
            _ => {
                return Err(Error::InvalidOperation(
                    "not an attribute node".into(),
                ))
            }
        };
        sink.start_attribute(self.name_ref(name_id))?;
        for child in self.children(attribute) {
            match self.value(child) {
                Value::Text(t) => sink.text(t.get())?,
                Value::EntityReference(e) => sink.entity_reference(e.name())?,
                _ => {}
            }
        }
        sink.end_attribute()
    }
}

/// An [`XmlSink`] that renders escaped XML text into an [`io::Write`].
pub struct XmlWriter<W: io::Write> {
    write: W,
    /// A start tag is open and unterminated; attributes may still follow.
    tag_open: bool,
    in_attribute: bool,
}

impl<W: io::Write> XmlWriter<W> {
    pub fn new(write: W) -> Self {
        XmlWriter {
            write,
            tag_open: false,
            in_attribute: false,
        }
    }

    /// Terminate any open start tag and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, Error> {
        self.close_tag()?;
        Ok(self.write)
    }

    fn close_tag(&mut self) -> Result<(), Error> {
        if self.tag_open {
            self.write.write_all(b">")?;
            self.tag_open = false;
        }
        Ok(())
    }

    fn escaped(&mut self, text: &str, in_attribute: bool) -> Result<(), Error> {
        for c in text.chars() {
            match c {
                '&' => self.write.write_all(b"&amp;")?,
                '<' => self.write.write_all(b"&lt;")?,
                '>' => self.write.write_all(b"&gt;")?,
                '"' if in_attribute => self.write.write_all(b"&quot;")?,
                _ => {
                    let mut buf = [0u8; 4];
                    self.write.write_all(c.encode_utf8(&mut buf).as_bytes())?;
                }
            }
        }
        Ok(())
    }
}

impl<W: io::Write> XmlSink for XmlWriter<W> {
    fn xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), Error> {
        self.close_tag()?;
        write!(self.write, "<?xml version=\"{}\"", version)?;
        if let Some(encoding) = encoding {
            write!(self.write, " encoding=\"{}\"", encoding)?;
        }
        if let Some(standalone) = standalone {
            write!(
                self.write,
                " standalone=\"{}\"",
                if standalone { "yes" } else { "no" }
            )?;
        }
        self.write.write_all(b"?>")?;
        Ok(())
    }

    fn document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        internal_subset: Option<&str>,
    ) -> Result<(), Error> {
        self.close_tag()?;
        write!(self.write, "<!DOCTYPE {}", name)?;
        match (public_id, system_id) {
            (Some(public), Some(system)) => {
                write!(self.write, " PUBLIC \"{}\" \"{}\"", public, system)?
            }
            (None, Some(system)) => write!(self.write, " SYSTEM \"{}\"", system)?,
            _ => {}
        }
        if let Some(subset) = internal_subset {
            write!(self.write, " [{}]", subset)?;
        }
        self.write.write_all(b">")?;
        Ok(())
    }

    fn start_element(&mut self, name: &Name) -> Result<(), Error> {
        self.close_tag()?;
        write!(self.write, "<{}", name.qualified())?;
        self.tag_open = true;
        Ok(())
    }

    fn end_element(&mut self, name: &Name, empty_tag: bool) -> Result<(), Error> {
        if self.tag_open {
            self.tag_open = false;
            if empty_tag {
                self.write.write_all(b"/>")?;
            } else {
                write!(self.write, "></{}>", name.qualified())?;
            }
        } else {
            write!(self.write, "</{}>", name.qualified())?;
        }
        Ok(())
    }

    fn start_attribute(&mut self, name: &Name) -> Result<(), Error> {
        write!(self.write, " {}=\"", name.qualified())?;
        self.in_attribute = true;
        Ok(())
    }

    fn end_attribute(&mut self) -> Result<(), Error> {
        self.write.write_all(b"\"")?;
        self.in_attribute = false;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        if self.in_attribute {
            return self.escaped(text, true);
        }
        self.close_tag()?;
        self.escaped(text, false)
    }

    fn cdata(&mut self, text: &str) -> Result<(), Error> {
        self.close_tag()?;
        write!(self.write, "<![CDATA[{}]]>", text)?;
        Ok(())
    }

    fn whitespace(&mut self, text: &str) -> Result<(), Error> {
        self.close_tag()?;
        self.write.write_all(text.as_bytes())?;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), Error> {
        self.close_tag()?;
        write!(self.write, "<!--{}-->", text)?;
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: Option<&str>) -> Result<(), Error> {
        self.close_tag()?;
        match data {
            Some(data) => write!(self.write, "<?{} {}?>", target, data)?,
            None => write!(self.write, "<?{}?>", target)?,
        }
        Ok(())
    }

    fn entity_reference(&mut self, name: &str) -> Result<(), Error> {
        if !self.in_attribute {
            self.close_tag()?;
        }
        write!(self.write, "&{};", name)?;
        Ok(())
    }
}
