use crate::document::{Document, Node};
use crate::error::Error;
use crate::name::XML_NAMESPACE;
use crate::order::Comparison;
use crate::value::{Value, ValueType};
use crate::writer::{InsertionMode, TreeWriter};

/// The seven node kinds of the XPath data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XPathKind {
    /// The document root (also used for fragments).
    Root,
    /// An element.
    Element,
    /// An attribute (namespace declarations excluded).
    Attribute,
    /// A namespace binding in scope on an element.
    Namespace,
    /// Character data: text, CDATA and whitespace map here.
    Text,
    /// A comment.
    Comment,
    /// A processing instruction.
    ProcessingInstruction,
}

/// Which namespace bindings the namespace axis yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceScope {
    /// Only bindings declared on the current element.
    Local,
    /// Bindings in scope, except the reserved `xml` binding.
    ExcludeXml,
    /// All bindings in scope, with the `xml` binding synthesized if it is
    /// not declared.
    All,
}

/// A namespace binding as seen on the namespace axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    /// The bound prefix; empty for the default namespace.
    pub prefix: String,
    /// The namespace URI.
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Position {
    Node(Node),
    Attribute { owner: Node, index: usize },
    Namespace {
        owner: Node,
        bindings: Vec<NamespaceBinding>,
        index: usize,
    },
}

/// A movable cursor over a document tree, conforming to the XPath data
/// model.
///
/// A navigator is a lightweight position; every operation borrows the
/// [`Document`] it walks. Text positions are kept calibrated: the cursor
/// always sits on the first member of a text run, and
/// [`Navigator::value`] concatenates the whole run.
///
/// ```rust
/// use xdom::{Document, Navigator};
///
/// let doc = Document::parse("<a><b/>hello</a>").unwrap();
/// let a = doc.document_element().unwrap();
/// let mut nav = Navigator::new(&doc, a).unwrap();
/// assert!(nav.move_to_first_child(&doc));
/// assert!(nav.move_to_next_sibling(&doc));
/// assert_eq!(nav.value(&doc), "hello");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Navigator {
    position: Position,
}

impl Navigator {
    /// Create a navigator positioned on a node.
    ///
    /// Fails with [`Error::InvalidOperation`] for node kinds outside the
    /// XPath data model (entity references, document types, XML
    /// declarations) and for unattached attributes.
    pub fn new(doc: &Document, node: Node) -> Result<Navigator, Error> {
        doc.check_owner(node)?;
        match doc.value_type(node) {
            ValueType::Attribute => {
                let owner = doc.attribute_owner(node).ok_or_else(|| {
                    Error::InvalidOperation("attribute is not owned by an element".into())
                })?;
                let index = doc.attribute_index(owner, node).ok_or_else(|| {
                    Error::InvalidOperation("attribute is not owned by an element".into())
                })?;
                Ok(Navigator {
                    position: Position::Attribute { owner, index },
                })
            }
            ValueType::EntityReference | ValueType::DocumentType | ValueType::XmlDeclaration => {
                Err(Error::InvalidOperation(format!(
                    "{:?} nodes are not navigable",
                    doc.value_type(node)
                )))
            }
            _ => Ok(Navigator {
                position: Position::Node(doc.run_head(node)),
            }),
        }
    }

    /// Reposition the navigator onto a node.
    pub fn move_to(&mut self, doc: &Document, node: Node) -> Result<(), Error> {
        *self = Navigator::new(doc, node)?;
        Ok(())
    }

    /// The XPath kind of the current position.
    pub fn kind(&self, doc: &Document) -> XPathKind {
        match &self.position {
            Position::Node(node) => match doc.value_type(*node) {
                ValueType::Document | ValueType::Fragment => XPathKind::Root,
                ValueType::Element => XPathKind::Element,
                ValueType::Text
                | ValueType::CData
                | ValueType::Whitespace
                | ValueType::SignificantWhitespace => XPathKind::Text,
                ValueType::Comment => XPathKind::Comment,
                ValueType::ProcessingInstruction => XPathKind::ProcessingInstruction,
                // not reachable through navigation
                _ => XPathKind::Root,
            },
            Position::Attribute { .. } => XPathKind::Attribute,
            Position::Namespace { .. } => XPathKind::Namespace,
        }
    }

    /// The underlying tree node, if the position corresponds to one.
    /// Namespace positions are virtual and yield [`None`].
    pub fn node(&self, doc: &Document) -> Option<Node> {
        match &self.position {
            Position::Node(node) => Some(*node),
            Position::Attribute { owner, index } => {
                doc.attributes(*owner).get(*index).copied()
            }
            Position::Namespace { .. } => None,
        }
    }

    fn anchor(&self) -> Node {
        match &self.position {
            Position::Node(node) => *node,
            Position::Attribute { owner, .. } => *owner,
            Position::Namespace { owner, .. } => *owner,
        }
    }

    pub(crate) fn set_node(&mut self, doc: &Document, node: Node) {
        self.position = Position::Node(doc.run_head(node));
    }

    /// The local name of the current element, attribute or processing
    /// instruction target; for a namespace position, the bound prefix.
    pub fn local_name<'a>(&'a self, doc: &'a Document) -> &'a str {
        match &self.position {
            Position::Node(node) => match doc.value(*node) {
                Value::Element(element) => doc.name_ref(element.name()).local(),
                Value::ProcessingInstruction(pi) => pi.target(),
                _ => "",
            },
            Position::Attribute { .. } => match self.node(doc) {
                Some(attr) => doc
                    .node_name(attr)
                    .map(|n| doc.name_ref(n).local())
                    .unwrap_or(""),
                None => "",
            },
            Position::Namespace {
                bindings, index, ..
            } => bindings.get(*index).map(|b| b.prefix.as_str()).unwrap_or(""),
        }
    }

    /// The namespace URI of the current element or attribute.
    pub fn namespace_uri<'a>(&'a self, doc: &'a Document) -> &'a str {
        match &self.position {
            Position::Node(node) => match doc.value(*node) {
                Value::Element(element) => doc.name_ref(element.name()).namespace(),
                _ => "",
            },
            Position::Attribute { .. } => match self.node(doc) {
                Some(attr) => doc
                    .node_name(attr)
                    .map(|n| doc.name_ref(n).namespace())
                    .unwrap_or(""),
                None => "",
            },
            Position::Namespace { .. } => "",
        }
    }

    /// The prefix of the current element or attribute.
    pub fn prefix<'a>(&'a self, doc: &'a Document) -> &'a str {
        match &self.position {
            Position::Node(node) => match doc.value(*node) {
                Value::Element(element) => doc.name_ref(element.name()).prefix(),
                _ => "",
            },
            Position::Attribute { .. } => match self.node(doc) {
                Some(attr) => doc
                    .node_name(attr)
                    .map(|n| doc.name_ref(n).prefix())
                    .unwrap_or(""),
                None => "",
            },
            Position::Namespace { .. } => "",
        }
    }

    /// The string value of the current position.
    ///
    /// On a text position this is the whole logical text run: the current
    /// node's text concatenated with all immediately following text-like
    /// siblings. On an element or root it is the concatenated character
    /// data of the subtree. The tree is never mutated.
    pub fn value(&self, doc: &Document) -> String {
        match &self.position {
            Position::Node(node) => match doc.value_type(*node) {
                ValueType::Document | ValueType::Fragment | ValueType::Element => {
                    let mut text = String::new();
                    for n in doc.descendants(*node) {
                        if let Some(s) = doc.value(n).character_data() {
                            text.push_str(s);
                        }
                    }
                    text
                }
                kind if kind.is_text_run() => {
                    let mut text = String::new();
                    let mut current = Some(*node);
                    while let Some(n) = current {
                        if !doc.value_type(n).is_text_run() {
                            break;
                        }
                        if let Some(s) = doc.value(n).character_data() {
                            text.push_str(s);
                        }
                        current = doc.next_sibling(n);
                    }
                    text
                }
                ValueType::CData => doc.text_str(*node).unwrap_or("").to_string(),
                ValueType::Comment => match doc.value(*node) {
                    Value::Comment(c) => c.get().to_string(),
                    _ => String::new(),
                },
                ValueType::ProcessingInstruction => match doc.value(*node) {
                    Value::ProcessingInstruction(pi) => {
                        pi.data().unwrap_or("").to_string()
                    }
                    _ => String::new(),
                },
                _ => String::new(),
            },
            Position::Attribute { .. } => self
                .node(doc)
                .map(|attr| doc.attribute_text(attr))
                .unwrap_or_default(),
            Position::Namespace {
                bindings, index, ..
            } => bindings
                .get(*index)
                .map(|b| b.uri.clone())
                .unwrap_or_default(),
        }
    }
}

/// ## Tree axes
impl Navigator {
    fn transparent(doc: &Document) -> bool {
        doc.has_entity_references
    }

    fn skipped(doc: &Document, node: Node) -> bool {
        matches!(
            doc.value_type(node),
            ValueType::DocumentType | ValueType::XmlDeclaration
        )
    }

    /// First navigable node inside an entity reference, descending through
    /// nested references.
    fn descend_first(doc: &Document, entity: Node) -> Option<Node> {
        let mut current = doc.first_child(entity);
        while let Some(node) = current {
            if doc.value_type(node) == ValueType::EntityReference {
                if let Some(inner) = Self::descend_first(doc, node) {
                    return Some(inner);
                }
                current = doc.next_sibling(node);
            } else if Self::skipped(doc, node) {
                current = doc.next_sibling(node);
            } else {
                return Some(node);
            }
        }
        None
    }

    /// Last navigable node inside an entity reference.
    fn descend_last(doc: &Document, entity: Node) -> Option<Node> {
        let mut current = doc.last_child(entity);
        while let Some(node) = current {
            if doc.value_type(node) == ValueType::EntityReference {
                if let Some(inner) = Self::descend_last(doc, node) {
                    return Some(inner);
                }
                current = doc.previous_sibling(node);
            } else if Self::skipped(doc, node) {
                current = doc.previous_sibling(node);
            } else {
                return Some(node);
            }
        }
        None
    }

    fn logical_first_child(doc: &Document, node: Node) -> Option<Node> {
        let mut current = doc.first_child(node);
        while let Some(child) = current {
            if doc.value_type(child) == ValueType::EntityReference && Self::transparent(doc) {
                if let Some(inner) = Self::descend_first(doc, child) {
                    return Some(inner);
                }
                current = doc.next_sibling(child);
            } else if Self::skipped(doc, child)
                || doc.value_type(child) == ValueType::EntityReference
            {
                current = doc.next_sibling(child);
            } else {
                return Some(child);
            }
        }
        None
    }

    fn logical_next(doc: &Document, node: Node) -> Option<Node> {
        // a text run is one logical node; skip to its tail first
        let mut current = node;
        if doc.value_type(current).is_text_run() {
            while let Some(next) = doc.next_sibling(current) {
                if !doc.value_type(next).is_text_run() {
                    break;
                }
                current = next;
            }
        }
        loop {
            match doc.next_sibling(current) {
                Some(next) => {
                    if doc.value_type(next) == ValueType::EntityReference
                        && Self::transparent(doc)
                    {
                        if let Some(inner) = Self::descend_first(doc, next) {
                            return Some(inner);
                        }
                        current = next;
                    } else if Self::skipped(doc, next)
                        || doc.value_type(next) == ValueType::EntityReference
                    {
                        current = next;
                    } else {
                        return Some(next);
                    }
                }
                None => {
                    // pop out of an inlined entity reference frame
                    let parent = doc.parent(current)?;
                    if Self::transparent(doc)
                        && doc.value_type(parent) == ValueType::EntityReference
                    {
                        current = parent;
                    } else {
                        return None;
                    }
                }
            }
        }
    }

    fn logical_previous(doc: &Document, node: Node) -> Option<Node> {
        let mut current = node;
        loop {
            match doc.previous_sibling(current) {
                Some(prev) => {
                    if doc.value_type(prev) == ValueType::EntityReference
                        && Self::transparent(doc)
                    {
                        if let Some(inner) = Self::descend_last(doc, prev) {
                            return Some(inner);
                        }
                        current = prev;
                    } else if Self::skipped(doc, prev)
                        || doc.value_type(prev) == ValueType::EntityReference
                    {
                        current = prev;
                    } else {
                        return Some(prev);
                    }
                }
                None => {
                    let parent = doc.parent(current)?;
                    if Self::transparent(doc)
                        && doc.value_type(parent) == ValueType::EntityReference
                    {
                        current = parent;
                    } else {
                        return None;
                    }
                }
            }
        }
    }

    fn logical_parent(doc: &Document, node: Node) -> Option<Node> {
        let mut parent = doc.parent(node)?;
        while Self::transparent(doc) && doc.value_type(parent) == ValueType::EntityReference {
            parent = doc.parent(parent)?;
        }
        Some(parent)
    }

    /// Move to the parent. Attribute and namespace positions move to the
    /// owning element.
    pub fn move_to_parent(&mut self, doc: &Document) -> bool {
        match &self.position {
            Position::Node(node) => match Self::logical_parent(doc, *node) {
                Some(parent) => {
                    self.set_node(doc, parent);
                    true
                }
                None => false,
            },
            Position::Attribute { owner, .. } | Position::Namespace { owner, .. } => {
                let owner = *owner;
                self.set_node(doc, owner);
                true
            }
        }
    }

    /// Move to the first child.
    pub fn move_to_first_child(&mut self, doc: &Document) -> bool {
        match &self.position {
            Position::Node(node) => match Self::logical_first_child(doc, *node) {
                Some(child) => {
                    self.set_node(doc, child);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Move to the next sibling. A text run counts as one position.
    pub fn move_to_next_sibling(&mut self, doc: &Document) -> bool {
        match &self.position {
            Position::Node(node) => match Self::logical_next(doc, *node) {
                Some(next) => {
                    self.set_node(doc, next);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Move to the previous sibling.
    pub fn move_to_previous_sibling(&mut self, doc: &Document) -> bool {
        match &self.position {
            Position::Node(node) => match Self::logical_previous(doc, *node) {
                Some(prev) => {
                    self.set_node(doc, prev);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Move to the root of the tree the cursor is in.
    pub fn move_to_root(&mut self, doc: &Document) {
        let top = doc
            .ancestors(self.anchor())
            .last()
            .unwrap_or_else(|| self.anchor());
        self.set_node(doc, top);
    }
}

/// ## Attribute axis
impl Navigator {
    fn is_declaration(doc: &Document, attr: Node) -> bool {
        doc.node_name(attr)
            .map(|n| doc.name_ref(n).is_namespace_declaration())
            .unwrap_or(false)
    }

    fn attribute_at(&self, doc: &Document, owner: Node, from: usize) -> Option<usize> {
        doc.attributes(owner)
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, a)| !Self::is_declaration(doc, **a))
            .map(|(i, _)| i)
    }

    /// Move to the first attribute of the current element. Namespace
    /// declarations are not visible on this axis.
    pub fn move_to_first_attribute(&mut self, doc: &Document) -> bool {
        if let Position::Node(node) = &self.position {
            if doc.is_element(*node) {
                if let Some(index) = self.attribute_at(doc, *node, 0) {
                    self.position = Position::Attribute {
                        owner: *node,
                        index,
                    };
                    return true;
                }
            }
        }
        false
    }

    /// Move to the next attribute of the owning element.
    pub fn move_to_next_attribute(&mut self, doc: &Document) -> bool {
        if let Position::Attribute { owner, index } = &self.position {
            let owner = *owner;
            if let Some(next) = self.attribute_at(doc, owner, index + 1) {
                self.position = Position::Attribute { owner, index: next };
                return true;
            }
        }
        false
    }

    /// Move to the attribute of the current element with the given local
    /// name and namespace URI.
    pub fn move_to_attribute(&mut self, doc: &Document, local: &str, namespace: &str) -> bool {
        if let Position::Node(node) = &self.position {
            if doc.is_element(*node) {
                for (index, attr) in doc.attributes(*node).iter().enumerate() {
                    if Self::is_declaration(doc, *attr) {
                        continue;
                    }
                    if let Some(name_id) = doc.node_name(*attr) {
                        let name = doc.name_ref(name_id);
                        if name.local() == local && name.namespace() == namespace {
                            self.position = Position::Attribute {
                                owner: *node,
                                index,
                            };
                            return true;
                        }
                    }
                }
            }
        }
        false
    }
}

/// ## Namespace axis
impl Navigator {
    /// Collect the namespace bindings visible on an element, nearest
    /// declaration first, de-duplicated by prefix across ancestors.
    fn namespace_bindings(
        doc: &Document,
        element: Node,
        scope: NamespaceScope,
    ) -> Vec<NamespaceBinding> {
        let mut bindings: Vec<NamespaceBinding> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        let chain: Box<dyn Iterator<Item = Node>> = match scope {
            NamespaceScope::Local => Box::new(std::iter::once(element)),
            _ => Box::new(doc.ancestors(element)),
        };
        for ancestor in chain {
            if !doc.is_element(ancestor) {
                continue;
            }
            for attr in doc.attributes(ancestor) {
                let name_id = match doc.node_name(*attr) {
                    Some(name_id) => name_id,
                    None => continue,
                };
                let name = doc.name_ref(name_id);
                if !name.is_namespace_declaration() {
                    continue;
                }
                let prefix = name.declared_prefix().to_string();
                if seen.contains(&prefix) {
                    continue;
                }
                seen.push(prefix.clone());
                let uri = doc.attribute_text(*attr);
                if uri.is_empty() {
                    // an undeclaration hides outer bindings
                    continue;
                }
                if scope == NamespaceScope::ExcludeXml && prefix == "xml" {
                    continue;
                }
                bindings.push(NamespaceBinding { prefix, uri });
            }
        }
        if scope == NamespaceScope::All && !seen.iter().any(|p| p == "xml") {
            bindings.push(NamespaceBinding {
                prefix: "xml".to_string(),
                uri: XML_NAMESPACE.to_string(),
            });
        }
        bindings
    }

    /// Move to the first namespace binding in the given scope.
    pub fn move_to_first_namespace(&mut self, doc: &Document, scope: NamespaceScope) -> bool {
        if let Position::Node(node) = &self.position {
            if doc.is_element(*node) {
                let bindings = Self::namespace_bindings(doc, *node, scope);
                if !bindings.is_empty() {
                    self.position = Position::Namespace {
                        owner: *node,
                        bindings,
                        index: 0,
                    };
                    return true;
                }
            }
        }
        false
    }

    /// Move to the next namespace binding in the scope the axis was
    /// entered with.
    pub fn move_to_next_namespace(&mut self, _doc: &Document) -> bool {
        if let Position::Namespace {
            bindings, index, ..
        } = &mut self.position
        {
            if *index + 1 < bindings.len() {
                *index += 1;
                return true;
            }
        }
        false
    }
}

/// ## Comparisons
impl Navigator {
    /// True if both navigators sit on the same position. Text positions are
    /// calibrated, so two cursors anywhere on the same run compare equal.
    pub fn is_same_position(&self, other: &Navigator) -> bool {
        self.position == other.position
    }

    /// Compare the document order of two cursor positions.
    pub fn compare_position(&self, doc: &Document, other: &Navigator) -> Comparison {
        if self.position == other.position {
            return Comparison::Same;
        }
        let a_anchor = self.anchor();
        let b_anchor = other.anchor();
        if a_anchor == b_anchor {
            // same element: element itself, then namespaces, then
            // attributes, in that order
            let rank = |p: &Position| match p {
                Position::Node(_) => 0u8,
                Position::Namespace { .. } => 1,
                Position::Attribute { .. } => 2,
            };
            let (ra, rb) = (rank(&self.position), rank(&other.position));
            if ra != rb {
                return if ra < rb {
                    Comparison::Before
                } else {
                    Comparison::After
                };
            }
            let index = |p: &Position| match p {
                Position::Attribute { index, .. } | Position::Namespace { index, .. } => *index,
                Position::Node(_) => 0,
            };
            return if index(&self.position) < index(&other.position) {
                Comparison::Before
            } else {
                Comparison::After
            };
        }
        match (&self.position, &other.position) {
            (Position::Node(a), Position::Node(b)) => doc.compare_order(*a, *b),
            _ => doc.compare_order(a_anchor, b_anchor),
        }
    }

    /// True if the other navigator's position is a descendant of this one.
    /// Attributes and namespaces count as descendants of their element.
    pub fn is_descendant(&self, doc: &Document, other: &Navigator) -> bool {
        let node = match &self.position {
            Position::Node(node) => *node,
            _ => return false,
        };
        match &other.position {
            Position::Node(n) => doc.is_descendant(node, *n),
            Position::Attribute { owner, .. } | Position::Namespace { owner, .. } => {
                *owner == node || doc.is_descendant(node, *owner)
            }
        }
    }
}

/// ## Editing
impl Navigator {
    fn container_anchor(&self, doc: &Document) -> Result<Node, Error> {
        match &self.position {
            Position::Node(node)
                if matches!(
                    doc.value_type(*node),
                    ValueType::Document | ValueType::Element | ValueType::Fragment
                ) =>
            {
                Ok(*node)
            }
            _ => Err(Error::InvalidOperation(
                "only elements, documents and fragments accept children".into(),
            )),
        }
    }

    fn sibling_anchor(&self, doc: &Document) -> Result<Node, Error> {
        match &self.position {
            Position::Node(node) => {
                if matches!(
                    doc.value_type(*node),
                    ValueType::Document | ValueType::Fragment
                ) {
                    return Err(Error::InvalidOperation(
                        "cannot create siblings for a root node".into(),
                    ));
                }
                if doc.parent(*node).is_none() {
                    return Err(Error::InvalidPosition("node has no parent".into()));
                }
                Ok(*node)
            }
            _ => Err(Error::InvalidOperation(
                "attributes and namespaces have no siblings".into(),
            )),
        }
    }

    /// Open a writer that will prepend its content as the first children of
    /// the current node.
    pub fn prepend_child<'a>(
        &'a mut self,
        doc: &'a mut Document,
    ) -> Result<TreeWriter<'a>, Error> {
        let anchor = self.container_anchor(doc)?;
        TreeWriter::new(doc, self, InsertionMode::PrependChild, anchor, None)
    }

    /// Open a writer that will append its content as the last children of
    /// the current node.
    pub fn append_child<'a>(
        &'a mut self,
        doc: &'a mut Document,
    ) -> Result<TreeWriter<'a>, Error> {
        let anchor = self.container_anchor(doc)?;
        TreeWriter::new(doc, self, InsertionMode::AppendChild, anchor, None)
    }

    /// Open a writer that will insert its content immediately before the
    /// current node.
    pub fn insert_before<'a>(
        &'a mut self,
        doc: &'a mut Document,
    ) -> Result<TreeWriter<'a>, Error> {
        let anchor = self.sibling_anchor(doc)?;
        TreeWriter::new(doc, self, InsertionMode::InsertBefore, anchor, None)
    }

    /// Open a writer that will insert its content immediately after the
    /// current node.
    pub fn insert_after<'a>(
        &'a mut self,
        doc: &'a mut Document,
    ) -> Result<TreeWriter<'a>, Error> {
        let anchor = self.sibling_anchor(doc)?;
        TreeWriter::new(doc, self, InsertionMode::InsertAfter, anchor, None)
    }

    /// Open a writer that accepts only attributes and appends them to the
    /// current element on close.
    pub fn create_attributes<'a>(
        &'a mut self,
        doc: &'a mut Document,
    ) -> Result<TreeWriter<'a>, Error> {
        let anchor = match &self.position {
            Position::Node(node) if doc.is_element(*node) => *node,
            _ => {
                return Err(Error::InvalidOperation(
                    "attributes can only be created on an element".into(),
                ))
            }
        };
        TreeWriter::new(doc, self, InsertionMode::AppendAttribute, anchor, None)
    }

    /// Open a writer whose content replaces the sibling range from the
    /// current node up to and including `end` on close. The navigator is
    /// repositioned onto the first written node.
    pub fn replace_range<'a>(
        &'a mut self,
        doc: &'a mut Document,
        end: &Navigator,
    ) -> Result<TreeWriter<'a>, Error> {
        let anchor = self.sibling_anchor(doc)?;
        let end = match &end.position {
            Position::Node(node) => *node,
            _ => {
                return Err(Error::InvalidPosition(
                    "range end must be a sibling node".into(),
                ))
            }
        };
        if !doc.following_siblings(anchor).any(|n| n == end) {
            return Err(Error::InvalidPosition(
                "range end is not a following sibling of the anchor".into(),
            ));
        }
        TreeWriter::new(doc, self, InsertionMode::ReplaceRange, anchor, Some(end))
    }

    /// Delete the sibling range from the current node up to and including
    /// `end`, then reposition onto the parent.
    pub fn delete_range(&mut self, doc: &mut Document, end: &Navigator) -> Result<(), Error> {
        let anchor = self.sibling_anchor(doc)?;
        let end = match &end.position {
            Position::Node(node) => doc.run_head(*node),
            _ => {
                return Err(Error::InvalidPosition(
                    "range end must be a sibling node".into(),
                ))
            }
        };
        let mut range: Vec<Node> = Vec::new();
        let mut found = false;
        for node in doc.following_siblings(anchor) {
            range.push(node);
            if node == end {
                found = true;
                break;
            }
        }
        if !found {
            return Err(Error::InvalidPosition(
                "range end is not a following sibling of the anchor".into(),
            ));
        }
        let parent = doc.parent(anchor).ok_or_else(|| {
            Error::InvalidPosition("node has no parent".into())
        })?;
        for node in range {
            doc.remove(node)?;
        }
        self.set_node(doc, parent);
        Ok(())
    }

    /// Delete the current node and reposition onto its parent (for
    /// attribute positions, onto the owning element).
    pub fn delete_self(&mut self, doc: &mut Document) -> Result<(), Error> {
        match self.position.clone() {
            Position::Node(node) => {
                let parent = doc
                    .parent(node)
                    .ok_or_else(|| Error::InvalidOperation("node has no parent".into()))?;
                doc.remove(node)?;
                self.set_node(doc, parent);
                Ok(())
            }
            Position::Attribute { owner, index } => {
                let attr = doc.attributes(owner).get(index).copied().ok_or_else(|| {
                    Error::InvalidOperation("attribute position is stale".into())
                })?;
                doc.remove_attribute_node(owner, attr)?;
                self.set_node(doc, owner);
                Ok(())
            }
            Position::Namespace { .. } => Err(Error::InvalidOperation(
                "namespace nodes cannot be deleted".into(),
            )),
        }
    }
}
