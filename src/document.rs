use std::sync::atomic::{AtomicU32, Ordering};

use ahash::HashMap;

use crate::error::Error;
use crate::events::Subscribers;
use crate::name::{Name, NameId, NameLookup};
use crate::value::{
    Attribute, Comment, DocumentType, Element, EntityReference, ProcessingInstruction, Text,
    Value, ValueType, XmlDeclaration,
};

static DOCUMENT_COUNTER: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DocumentId(u32);

impl DocumentId {
    fn next() -> Self {
        DocumentId(DOCUMENT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A node in a document tree.
///
/// This is a lightweight handle and can be copied. It is only meaningful for
/// the [`Document`] that created it; using it with another document fails
/// with [`Error::WrongDocument`] (or panics, for infallible accessors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    pub(crate) document: DocumentId,
    pub(crate) index: u32,
}

/// The parent slot of a node.
///
/// For the first member of a text run (and for every non-text node) this is
/// the real container. Every later member of a run instead points at the
/// previous text-like sibling, forming a backward chain; resolving the real
/// container walks the chain to the run head first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParentSlot {
    Detached,
    Parent(Node),
    PrevTextRun(Node),
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) value: Value,
    pub(crate) slot: ParentSlot,
    /// Next sibling. Circular: the last child points back at the first
    /// child. `None` only while detached with no siblings.
    pub(crate) next: Option<Node>,
    /// Containers store only their last child; the first child is derived
    /// as `last_child.next`.
    pub(crate) last_child: Option<Node>,
    pub(crate) annotation: Option<NameId>,
}

impl NodeData {
    fn new(value: Value) -> Self {
        NodeData {
            value,
            slot: ParentSlot::Detached,
            next: None,
            last_child: None,
            annotation: None,
        }
    }
}

/// An XML document: the root container that owns every node created from it,
/// the name interner, the id index and the mutation notification table.
///
/// The `Document` API is split over several impl blocks focusing on
/// different aspects of accessing and manipulating the tree.
pub struct Document {
    pub(crate) id: DocumentId,
    pub(crate) arena: Vec<NodeData>,
    pub(crate) names: NameLookup,
    pub(crate) ids: HashMap<String, Node>,
    pub(crate) subscribers: Subscribers,
    pub(crate) loading: bool,
    pub(crate) has_entity_references: bool,
    root: Node,
}

/// ## Creation
impl Document {
    /// Create a new, empty document.
    pub fn new() -> Self {
        let id = DocumentId::next();
        let root = Node { document: id, index: 0 };
        let mut doc = Document {
            id,
            arena: Vec::new(),
            names: NameLookup::new(),
            ids: HashMap::default(),
            subscribers: Subscribers::new(),
            loading: false,
            has_entity_references: false,
            root,
        };
        doc.arena.push(NodeData::new(Value::Document));
        doc
    }

    /// The root node of the document. Its kind is [`ValueType::Document`].
    pub fn root(&self) -> Node {
        self.root
    }

    pub(crate) fn new_node(&mut self, value: Value) -> Node {
        let node = Node {
            document: self.id,
            index: self.arena.len() as u32,
        };
        self.arena.push(NodeData::new(value));
        node
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name_id: NameId) -> Node {
        self.new_node(Value::Element(Element::new(name_id)))
    }

    /// Create a detached attribute node with no value children.
    pub fn create_attribute(&mut self, name_id: NameId) -> Node {
        self.new_node(Value::Attribute(Attribute::new(name_id)))
    }

    /// Create a detached attribute node with a single text child as value.
    pub fn create_attribute_with_value(&mut self, name_id: NameId, value: &str) -> Node {
        let attr = self.create_attribute(name_id);
        let text = self.create_text(value);
        // fresh attribute node, the splice cannot fail
        self.splice_last(attr, text);
        attr
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> Node {
        self.new_node(Value::Text(Text::new(text.to_string())))
    }

    /// Create a detached CDATA section node.
    pub fn create_cdata(&mut self, text: &str) -> Node {
        self.new_node(Value::CData(Text::new(text.to_string())))
    }

    /// Create a detached whitespace node.
    pub fn create_whitespace(&mut self, text: &str) -> Node {
        self.new_node(Value::Whitespace(Text::new(text.to_string())))
    }

    /// Create a detached significant whitespace node.
    pub fn create_significant_whitespace(&mut self, text: &str) -> Node {
        self.new_node(Value::SignificantWhitespace(Text::new(text.to_string())))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: &str) -> Node {
        self.new_node(Value::Comment(Comment::new(text.to_string())))
    }

    /// Create a detached processing instruction node.
    pub fn create_processing_instruction(&mut self, target: &str, data: Option<&str>) -> Node {
        self.new_node(Value::ProcessingInstruction(ProcessingInstruction::new(
            target.to_string(),
            data.map(|s| s.to_string()),
        )))
    }

    /// Create a detached entity reference node.
    ///
    /// This marks the document as containing entity references, which makes
    /// [`Navigator`](crate::navigator::Navigator) traversal treat entity
    /// reference content as inlined.
    pub fn create_entity_reference(&mut self, name: &str) -> Node {
        self.has_entity_references = true;
        self.new_node(Value::EntityReference(EntityReference::new(
            name.to_string(),
        )))
    }

    /// Create a detached document type node.
    pub fn create_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        internal_subset: Option<&str>,
    ) -> Node {
        self.new_node(Value::DocumentType(DocumentType::new(
            name.to_string(),
            public_id.map(|s| s.to_string()),
            system_id.map(|s| s.to_string()),
            internal_subset.map(|s| s.to_string()),
        )))
    }

    /// Create a detached XML declaration node.
    pub fn create_xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Node {
        self.new_node(Value::XmlDeclaration(XmlDeclaration::new(
            version.to_string(),
            encoding.map(|s| s.to_string()),
            standalone,
        )))
    }

    /// Create an empty fragment, a containerless staging area for nodes not
    /// yet attached to the tree.
    pub fn create_fragment(&mut self) -> Node {
        self.new_node(Value::Fragment)
    }
}

/// ## Names
impl Document {
    /// Intern a name without a namespace.
    pub fn add_name(&mut self, local: &str) -> NameId {
        self.names.get_id(Name::new("", local, ""))
    }

    /// Intern a name with a prefix and namespace URI.
    pub fn add_name_ns(&mut self, prefix: &str, local: &str, namespace: &str) -> NameId {
        self.names.get_id(Name::new(prefix, local, namespace))
    }

    /// Look up a previously interned name without a namespace.
    pub fn name(&self, local: &str) -> Option<NameId> {
        self.names.lookup(&Name::new("", local, ""))
    }

    /// Look up a previously interned name with prefix and namespace URI.
    pub fn name_ns(&self, prefix: &str, local: &str, namespace: &str) -> Option<NameId> {
        self.names.lookup(&Name::new(prefix, local, namespace))
    }

    /// Resolve a name id back to the name.
    pub fn name_ref(&self, name_id: NameId) -> &Name {
        self.names.value(name_id)
    }

    /// The cached type annotation on an interned name, if any.
    pub fn name_annotation(&self, name_id: NameId) -> Option<NameId> {
        self.names.annotation(name_id)
    }

    /// Cache a type annotation on an interned name.
    pub fn set_name_annotation(&mut self, name_id: NameId, annotation: Option<NameId>) {
        self.names.set_annotation(name_id, annotation)
    }
}

/// ## Values
impl Document {
    #[inline]
    pub(crate) fn data(&self, node: Node) -> &NodeData {
        assert!(
            node.document == self.id,
            "node belongs to a different document"
        );
        &self.arena[node.index as usize]
    }

    #[inline]
    pub(crate) fn data_mut(&mut self, node: Node) -> &mut NodeData {
        assert!(
            node.document == self.id,
            "node belongs to a different document"
        );
        &mut self.arena[node.index as usize]
    }

    pub(crate) fn check_owner(&self, node: Node) -> Result<(), Error> {
        if node.document != self.id || node.index as usize >= self.arena.len() {
            return Err(Error::WrongDocument);
        }
        Ok(())
    }

    /// Access to the value for this node.
    #[inline]
    pub fn value(&self, node: Node) -> &Value {
        &self.data(node).value
    }

    /// Mutable access to the value for this node.
    ///
    /// Value edits through this accessor do not raise change notifications;
    /// use [`Document::set_text`](crate::document::Document::set_text) when
    /// those matter.
    #[inline]
    pub fn value_mut(&mut self, node: Node) -> &mut Value {
        &mut self.data_mut(node).value
    }

    /// Get the [`ValueType`] of a node.
    pub fn value_type(&self, node: Node) -> ValueType {
        self.value(node).value_type()
    }

    /// Return true if node is the document root.
    pub fn is_document(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Document
    }

    /// Return true if node is an element.
    pub fn is_element(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Element
    }

    /// Return true if node is an attribute.
    pub fn is_attribute(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Attribute
    }

    /// Return true if node carries character data (text, CDATA or
    /// whitespace).
    pub fn is_text(&self, node: Node) -> bool {
        self.value_type(node).is_character_data()
    }

    /// Return true if node is a comment.
    pub fn is_comment(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Comment
    }

    /// If this node carries character data, return it as a string slice.
    pub fn text_str(&self, node: Node) -> Option<&str> {
        self.value(node).character_data()
    }

    /// If this node is an element, return a reference to it.
    pub fn element(&self, node: Node) -> Option<&Element> {
        if let Value::Element(element) = self.value(node) {
            Some(element)
        } else {
            None
        }
    }

    /// If this node is an element, return a mutable reference to it.
    pub fn element_mut(&mut self, node: Node) -> Option<&mut Element> {
        if let Value::Element(element) = self.value_mut(node) {
            Some(element)
        } else {
            None
        }
    }

    /// The element or attribute name, for nodes that have one.
    pub fn node_name(&self, node: Node) -> Option<NameId> {
        match self.value(node) {
            Value::Element(element) => Some(element.name_id),
            Value::Attribute(attribute) => Some(attribute.name_id),
            _ => None,
        }
    }

    /// The schema type annotation attached to this node, if any.
    ///
    /// Annotations are attached by an external validator; the tree only
    /// stores them.
    pub fn annotation(&self, node: Node) -> Option<NameId> {
        self.data(node).annotation
    }

    /// Attach or clear the schema type annotation for this node.
    pub fn set_annotation(&mut self, node: Node, annotation: Option<NameId>) {
        self.data_mut(node).annotation = annotation;
    }
}

/// ## Id index
impl Document {
    /// Look up an element by the value of its `id` (or `xml:id`) attribute.
    ///
    /// The index is maintained as id attributes are attached and removed;
    /// entries whose element has since been detached from the tree are not
    /// returned.
    pub fn element_by_id(&self, id: &str) -> Option<Node> {
        let element = *self.ids.get(id)?;
        if self.is_attached(element) {
            Some(element)
        } else {
            None
        }
    }

    pub(crate) fn is_id_name(&self, name_id: NameId) -> bool {
        let name = self.names.value(name_id);
        (name.prefix.is_empty() && name.local == "id")
            || (name.prefix == "xml" && name.local == "id")
    }

    pub(crate) fn register_id(&mut self, id: String, element: Node) {
        self.ids.insert(id, element);
    }

    pub(crate) fn unregister_id(&mut self, id: &str, element: Node) {
        if self.ids.get(id) == Some(&element) {
            self.ids.remove(id);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
