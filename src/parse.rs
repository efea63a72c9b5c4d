use xmlparser::{ElementEnd, ExternalId, Token, Tokenizer};

use crate::document::{Document, Node};
use crate::error::Error;
use crate::name::{XMLNS_NAMESPACE, XML_NAMESPACE};

/// A decoded piece of character data: plain text, or a reference to an
/// entity the parser does not know.
enum TextPiece {
    Text(String),
    Entity(String),
}

/// Decode character and predefined entity references. References to unknown
/// entities are kept as separate pieces and become entity reference nodes.
fn decode(content: &str) -> Result<Vec<TextPiece>, Error> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut rest = content;
    while let Some(amp) = rest.find('&') {
        text.push_str(&rest[..amp]);
        rest = &rest[amp + 1..];
        let semicolon = rest.find(';').ok_or_else(|| {
            Error::InvalidStructure("unterminated entity reference".into())
        })?;
        let name = &rest[..semicolon];
        rest = &rest[semicolon + 1..];
        match name {
            "lt" => text.push('<'),
            "gt" => text.push('>'),
            "amp" => text.push('&'),
            "apos" => text.push('\''),
            "quot" => text.push('"'),
            _ if name.starts_with("#x") || name.starts_with("#X") => {
                let code = u32::from_str_radix(&name[2..], 16).map_err(|_| {
                    Error::InvalidStructure(format!("invalid character reference: &{};", name))
                })?;
                text.push(char::from_u32(code).ok_or_else(|| {
                    Error::InvalidStructure(format!("invalid character reference: &{};", name))
                })?);
            }
            _ if name.starts_with('#') => {
                let code = name[1..].parse::<u32>().map_err(|_| {
                    Error::InvalidStructure(format!("invalid character reference: &{};", name))
                })?;
                text.push(char::from_u32(code).ok_or_else(|| {
                    Error::InvalidStructure(format!("invalid character reference: &{};", name))
                })?);
            }
            _ => {
                if !text.is_empty() {
                    pieces.push(TextPiece::Text(std::mem::take(&mut text)));
                }
                pieces.push(TextPiece::Entity(name.to_string()));
            }
        }
    }
    text.push_str(rest);
    if !text.is_empty() {
        pieces.push(TextPiece::Text(text));
    }
    Ok(pieces)
}

fn is_xml_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// An element whose start tag is being read: attributes and namespace
/// declarations arrive before we know whether the tag is open or empty.
struct PendingElement {
    prefix: String,
    local: String,
    /// Raw attributes in document order, `(prefix, local, value)`.
    /// Namespace declarations are included; they are attributes too.
    attributes: Vec<(String, String, String)>,
    /// Prefix bindings declared on this element.
    declarations: Vec<(String, String)>,
}

struct Parser<'a> {
    doc: &'a mut Document,
    /// Open containers, innermost last; the element prefix/local is kept for
    /// close tag matching.
    stack: Vec<(Node, String, String)>,
    /// One namespace scope per open element.
    scopes: Vec<Vec<(String, String)>>,
    pending: Option<PendingElement>,
}

impl<'a> Parser<'a> {
    fn new(doc: &'a mut Document) -> Self {
        let root = doc.root();
        Parser {
            doc,
            stack: vec![(root, String::new(), String::new())],
            scopes: Vec::new(),
            pending: None,
        }
    }

    fn top(&self) -> Node {
        // the stack always holds at least the document root
        self.stack[self.stack.len() - 1].0
    }

    fn at_root(&self) -> bool {
        self.stack.len() == 1
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        for scope in self.scopes.iter().rev() {
            for (declared, uri) in scope.iter().rev() {
                if declared == prefix {
                    return Some(uri.clone());
                }
            }
        }
        match prefix {
            "" => Some(String::new()),
            "xml" => Some(XML_NAMESPACE.to_string()),
            "xmlns" => Some(XMLNS_NAMESPACE.to_string()),
            _ => None,
        }
    }

    fn token(&mut self, token: Token) -> Result<(), Error> {
        match token {
            Token::Declaration {
                version,
                encoding,
                standalone,
                ..
            } => {
                let node = self.doc.create_xml_declaration(
                    version.as_str(),
                    encoding.map(|e| e.as_str()).as_deref(),
                    standalone,
                );
                let top = self.top();
                self.doc.append_for_load(top, node)?;
            }
            Token::DtdStart {
                name, external_id, ..
            }
            | Token::EmptyDtd {
                name, external_id, ..
            } => {
                let (public_id, system_id) = match external_id {
                    Some(ExternalId::System(system)) => (None, Some(system.as_str())),
                    Some(ExternalId::Public(public, system)) => {
                        (Some(public.as_str()), Some(system.as_str()))
                    }
                    None => (None, None),
                };
                let node =
                    self.doc
                        .create_document_type(name.as_str(), public_id, system_id, None);
                let top = self.top();
                self.doc.append_for_load(top, node)?;
            }
            Token::EntityDeclaration { .. } | Token::DtdEnd { .. } => {
                // the internal subset is not modeled
            }
            Token::ElementStart { prefix, local, .. } => {
                self.pending = Some(PendingElement {
                    prefix: prefix.as_str().to_string(),
                    local: local.as_str().to_string(),
                    attributes: Vec::new(),
                    declarations: Vec::new(),
                });
            }
            Token::Attribute {
                prefix,
                local,
                value,
                ..
            } => {
                let pending = self.pending.as_mut().ok_or_else(|| {
                    Error::InvalidStructure("attribute outside a start tag".into())
                })?;
                if prefix.as_str() == "xmlns" {
                    pending
                        .declarations
                        .push((local.as_str().to_string(), value.as_str().to_string()));
                } else if prefix.as_str().is_empty() && local.as_str() == "xmlns" {
                    pending
                        .declarations
                        .push((String::new(), value.as_str().to_string()));
                }
                pending.attributes.push((
                    prefix.as_str().to_string(),
                    local.as_str().to_string(),
                    value.as_str().to_string(),
                ));
            }
            Token::ElementEnd { end, .. } => match end {
                ElementEnd::Open => {
                    let (element, prefix, local) = self.materialize(false)?;
                    self.stack.push((element, prefix, local));
                }
                ElementEnd::Empty => {
                    self.materialize(true)?;
                    self.scopes.pop();
                }
                ElementEnd::Close(prefix, local) => {
                    let (_, open_prefix, open_local) =
                        self.stack.pop().ok_or_else(|| {
                            Error::MismatchedCloseTag(format!(
                                "unexpected close tag </{}>",
                                local.as_str()
                            ))
                        })?;
                    if self.stack.is_empty()
                        || open_prefix != prefix.as_str()
                        || open_local != local.as_str()
                    {
                        let expected = if open_prefix.is_empty() {
                            open_local
                        } else {
                            format!("{}:{}", open_prefix, open_local)
                        };
                        return Err(Error::MismatchedCloseTag(format!(
                            "expected </{}>, got </{}>",
                            expected,
                            local.as_str()
                        )));
                    }
                    self.scopes.pop();
                }
            },
            Token::Text { text } => {
                self.text(text.as_str())?;
            }
            Token::Cdata { text, .. } => {
                if self.at_root() {
                    return Err(Error::InvalidStructure(
                        "CDATA is not allowed outside the document element".into(),
                    ));
                }
                let node = self.doc.create_cdata(text.as_str());
                let top = self.top();
                self.doc.append_for_load(top, node)?;
            }
            Token::Comment { text, .. } => {
                let node = self.doc.create_comment(text.as_str());
                let top = self.top();
                self.doc.append_for_load(top, node)?;
            }
            Token::ProcessingInstruction {
                target, content, ..
            } => {
                let node = self
                    .doc
                    .create_processing_instruction(target.as_str(), content.map(|c| c.as_str()).as_deref());
                let top = self.top();
                self.doc.append_for_load(top, node)?;
            }
        }
        Ok(())
    }

    fn text(&mut self, raw: &str) -> Result<(), Error> {
        for piece in decode(raw)? {
            let node = match piece {
                TextPiece::Text(text) => {
                    if is_xml_whitespace(&text) {
                        // markup-only whitespace gets its own kind
                        self.doc.create_whitespace(&text)
                    } else if self.at_root() {
                        return Err(Error::InvalidStructure(
                            "text is not allowed outside the document element".into(),
                        ));
                    } else {
                        self.doc.create_text(&text)
                    }
                }
                TextPiece::Entity(name) => {
                    if self.at_root() {
                        return Err(Error::InvalidStructure(
                            "an entity reference is not allowed outside the document element"
                                .into(),
                        ));
                    }
                    self.doc.create_entity_reference(&name)
                }
            };
            let top = self.top();
            self.doc.append_for_load(top, node)?;
        }
        Ok(())
    }

    /// Turn the pending start tag into an element with its attributes and
    /// append it to the open container. Returns the element along with its
    /// raw prefix and local name for close tag matching.
    fn materialize(&mut self, empty: bool) -> Result<(Node, String, String), Error> {
        let pending = self.pending.take().ok_or_else(|| {
            Error::InvalidStructure("element end without a start tag".into())
        })?;
        // the element's own declarations are in scope for its name and its
        // attributes
        self.scopes.push(pending.declarations);
        let namespace = self.resolve(&pending.prefix).ok_or_else(|| {
            Error::UnknownPrefix(pending.prefix.clone())
        })?;
        let name_id = self
            .doc
            .add_name_ns(&pending.prefix, &pending.local, &namespace);
        let element = self.doc.create_element(name_id);
        for (prefix, local, value) in &pending.attributes {
            let namespace = if prefix == "xmlns" || (prefix.is_empty() && local == "xmlns") {
                XMLNS_NAMESPACE.to_string()
            } else if prefix.is_empty() {
                // unprefixed attributes are in no namespace
                String::new()
            } else {
                self.resolve(prefix)
                    .ok_or_else(|| Error::UnknownPrefix(prefix.clone()))?
            };
            let name_id = self.doc.add_name_ns(prefix, local, &namespace);
            let attribute = self.doc.create_attribute(name_id);
            for piece in decode(value)? {
                let child = match piece {
                    TextPiece::Text(text) => self.doc.create_text(&text),
                    TextPiece::Entity(name) => self.doc.create_entity_reference(&name),
                };
                self.doc.splice_last(attribute, child);
            }
            self.doc.append_attribute(element, attribute)?;
        }
        if !empty {
            if let Some(data) = self.doc.element_mut(element) {
                data.set_empty_tag(false);
            }
        }
        let top = self.top();
        self.doc.append_for_load(top, element)?;
        Ok((element, pending.prefix, pending.local))
    }
}

/// ## Parsing
impl Document {
    /// Parse XML text into a new document.
    ///
    /// While loading, pre-mutation notifications are suppressed; a single
    /// `Inserted` event is raised per node for any subscriber registered
    /// before parsing (none can be, for this constructor, but the same
    /// loading path is shared with fragment parsing onto a live document).
    ///
    /// ```rust
    /// let doc = xdom::Document::parse("<hello>world</hello>").unwrap();
    /// let hello = doc.document_element().unwrap();
    /// let text = doc.first_child(hello).unwrap();
    /// assert_eq!(doc.text_str(text), Some("world"));
    /// ```
    pub fn parse(xml: &str) -> Result<Document, Error> {
        let mut doc = Document::new();
        doc.loading = true;
        let result = doc.load(xml);
        doc.loading = false;
        result?;
        Ok(doc)
    }

    fn load(&mut self, xml: &str) -> Result<(), Error> {
        let mut parser = Parser::new(self);
        for token in Tokenizer::from(xml) {
            parser.token(token?)?;
        }
        if parser.stack.len() > 1 {
            let (_, prefix, local) = &parser.stack[parser.stack.len() - 1];
            let name = if prefix.is_empty() {
                local.clone()
            } else {
                format!("{}:{}", prefix, local)
            };
            return Err(Error::MismatchedCloseTag(format!(
                "<{}> was never closed",
                name
            )));
        }
        Ok(())
    }
}
