use std::fmt::Debug;

use crate::document::Node;
use crate::error::Error;
use crate::name::NameId;

/// The kind of an XML node.
///
/// Access it using [`Value::value_type`] or
/// [`Document::value_type`](crate::document::Document::value_type).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ValueType {
    /// Document root that holds everything. Note that this is not the same
    /// as the document element.
    Document,
    /// Element; it has a name, attributes and children.
    Element,
    /// Attribute; owned by an element, its value is a child chain of text
    /// and entity reference nodes.
    Attribute,
    /// Text.
    Text,
    /// CDATA section.
    CData,
    /// Insignificant whitespace between markup.
    Whitespace,
    /// Whitespace inside mixed content.
    SignificantWhitespace,
    /// Comment.
    Comment,
    /// Processing instruction.
    ProcessingInstruction,
    /// Entity reference; its children are the expanded replacement and are
    /// read-only.
    EntityReference,
    /// Document type declaration.
    DocumentType,
    /// XML declaration (`<?xml version="1.0"?>`).
    XmlDeclaration,
    /// Containerless grouping for nodes not yet attached to a tree.
    Fragment,
}

impl ValueType {
    /// Text-like kinds that form runs: adjacent siblings of these kinds are
    /// chained through their parent slot and merged by
    /// [`Document::normalize`](crate::document::Document::normalize).
    ///
    /// CDATA maps to the XPath text kind but never joins a run.
    pub(crate) fn is_text_run(&self) -> bool {
        matches!(
            self,
            ValueType::Text | ValueType::Whitespace | ValueType::SignificantWhitespace
        )
    }

    /// Kinds whose node carries character data.
    pub(crate) fn is_character_data(&self) -> bool {
        matches!(
            self,
            ValueType::Text
                | ValueType::CData
                | ValueType::Whitespace
                | ValueType::SignificantWhitespace
        )
    }

    /// Kinds that may own children.
    pub(crate) fn is_container(&self) -> bool {
        matches!(
            self,
            ValueType::Document
                | ValueType::Element
                | ValueType::Attribute
                | ValueType::EntityReference
                | ValueType::Fragment
        )
    }
}

/// An XML node value.
///
/// Access it using [`Document::value`](crate::document::Document::value) or
/// mutably using [`Document::value_mut`](crate::document::Document::value_mut).
#[derive(Debug, Clone)]
pub enum Value {
    /// Document root.
    Document,
    /// Element.
    Element(Element),
    /// Attribute.
    Attribute(Attribute),
    /// Text.
    Text(Text),
    /// CDATA section.
    CData(Text),
    /// Insignificant whitespace.
    Whitespace(Text),
    /// Significant whitespace.
    SignificantWhitespace(Text),
    /// Comment.
    Comment(Comment),
    /// Processing instruction.
    ProcessingInstruction(ProcessingInstruction),
    /// Entity reference.
    EntityReference(EntityReference),
    /// Document type declaration.
    DocumentType(DocumentType),
    /// XML declaration.
    XmlDeclaration(XmlDeclaration),
    /// Fragment.
    Fragment,
}

impl Value {
    /// Returns the kind of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Document => ValueType::Document,
            Value::Element(_) => ValueType::Element,
            Value::Attribute(_) => ValueType::Attribute,
            Value::Text(_) => ValueType::Text,
            Value::CData(_) => ValueType::CData,
            Value::Whitespace(_) => ValueType::Whitespace,
            Value::SignificantWhitespace(_) => ValueType::SignificantWhitespace,
            Value::Comment(_) => ValueType::Comment,
            Value::ProcessingInstruction(_) => ValueType::ProcessingInstruction,
            Value::EntityReference(_) => ValueType::EntityReference,
            Value::DocumentType(_) => ValueType::DocumentType,
            Value::XmlDeclaration(_) => ValueType::XmlDeclaration,
            Value::Fragment => ValueType::Fragment,
        }
    }

    pub(crate) fn character_data(&self) -> Option<&str> {
        match self {
            Value::Text(t)
            | Value::CData(t)
            | Value::Whitespace(t)
            | Value::SignificantWhitespace(t) => Some(t.get()),
            _ => None,
        }
    }
}

/// XML element value.
///
/// Example: `<foo/>` or `<foo bar="baz"/>`.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) name_id: NameId,
    pub(crate) attributes: Vec<Node>,
    pub(crate) empty: bool,
}

impl Element {
    pub(crate) fn new(name_id: NameId) -> Self {
        Element {
            name_id,
            attributes: Vec::new(),
            empty: true,
        }
    }

    /// The name of the element.
    pub fn name(&self) -> NameId {
        self.name_id
    }

    /// Rename the element.
    pub fn set_name(&mut self, name_id: NameId) {
        self.name_id = name_id;
    }

    /// Whether the element was written as an empty tag (`<foo/>`).
    pub fn is_empty_tag(&self) -> bool {
        self.empty
    }

    /// Set the empty-tag flag. Only affects serialization of childless
    /// elements.
    pub fn set_empty_tag(&mut self, empty: bool) {
        self.empty = empty;
    }
}

/// XML attribute value.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub(crate) name_id: NameId,
    pub(crate) specified: bool,
}

impl Attribute {
    pub(crate) fn new(name_id: NameId) -> Self {
        Attribute {
            name_id,
            specified: true,
        }
    }

    /// The name of the attribute.
    pub fn name(&self) -> NameId {
        self.name_id
    }

    /// True if the attribute was given explicitly, false if it was
    /// synthesized from a schema default.
    pub fn is_specified(&self) -> bool {
        self.specified
    }

    pub(crate) fn set_specified(&mut self, specified: bool) {
        self.specified = specified;
    }
}

/// Character data shared by text, CDATA and whitespace nodes.
#[derive(Debug, Clone)]
pub struct Text {
    pub(crate) text: String,
}

impl Text {
    pub(crate) fn new(text: String) -> Self {
        Text { text }
    }

    /// Get the text value.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the text value.
    pub fn set<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }
}

/// XML comment.
///
/// Example: `<!-- foo -->`.
#[derive(Debug, Clone)]
pub struct Comment {
    pub(crate) text: String,
}

impl Comment {
    pub(crate) fn new(text: String) -> Self {
        Comment { text }
    }

    /// Get the comment text.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the comment text.
    ///
    /// Rejects comments that contain `--` as illegal.
    pub fn set<S: Into<String>>(&mut self, text: S) -> Result<(), Error> {
        let text = text.into();
        if text.contains("--") {
            return Err(Error::InvalidComment(text));
        }
        self.text = text;
        Ok(())
    }
}

/// XML processing instruction value.
///
/// Example: `<?foo?>` or `<?foo bar?>`.
#[derive(Debug, Clone)]
pub struct ProcessingInstruction {
    pub(crate) target: String,
    pub(crate) data: Option<String>,
}

impl ProcessingInstruction {
    pub(crate) fn new(target: String, data: Option<String>) -> Self {
        ProcessingInstruction { target, data }
    }

    /// Get processing instruction target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get processing instruction data.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Set target.
    ///
    /// Rejects any target that is the string `"xml"` (or case variations) as
    /// it's reserved for XML.
    pub fn set_target<S: Into<String>>(&mut self, target: S) -> Result<(), Error> {
        let target = target.into();
        if target.to_lowercase() == "xml" {
            return Err(Error::InvalidTarget(target));
        }
        if target.is_empty() {
            return Err(Error::InvalidTarget(target));
        }
        self.target = target;
        Ok(())
    }

    /// Set data.
    pub fn set_data<S: Into<String>>(&mut self, data: Option<S>) {
        if let Some(data) = data {
            let data = data.into();
            if !data.is_empty() {
                self.data = Some(data);
                return;
            }
        }
        self.data = None;
    }
}

/// Entity reference.
///
/// Its children, if any, hold the expanded replacement text and are
/// read-only.
#[derive(Debug, Clone)]
pub struct EntityReference {
    pub(crate) name: String,
}

impl EntityReference {
    pub(crate) fn new(name: String) -> Self {
        EntityReference { name }
    }

    /// The entity name, without `&` and `;`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Document type declaration.
#[derive(Debug, Clone)]
pub struct DocumentType {
    pub(crate) name: String,
    pub(crate) public_id: Option<String>,
    pub(crate) system_id: Option<String>,
    pub(crate) internal_subset: Option<String>,
}

impl DocumentType {
    pub(crate) fn new(
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
        internal_subset: Option<String>,
    ) -> Self {
        DocumentType {
            name,
            public_id,
            system_id,
            internal_subset,
        }
    }

    /// The document type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public identifier, if any.
    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    /// System identifier, if any.
    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }

    /// Internal subset text, if any.
    pub fn internal_subset(&self) -> Option<&str> {
        self.internal_subset.as_deref()
    }
}

/// XML declaration.
#[derive(Debug, Clone)]
pub struct XmlDeclaration {
    pub(crate) version: String,
    pub(crate) encoding: Option<String>,
    pub(crate) standalone: Option<bool>,
}

impl XmlDeclaration {
    pub(crate) fn new(version: String, encoding: Option<String>, standalone: Option<bool>) -> Self {
        XmlDeclaration {
            version,
            encoding,
            standalone,
        }
    }

    /// The XML version, normally `1.0`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The declared encoding, if any.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// The standalone flag, if declared.
    pub fn standalone(&self) -> Option<bool> {
        self.standalone
    }
}
