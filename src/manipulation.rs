use crate::document::{Document, Node, ParentSlot};
use crate::error::Error;
use crate::events::{MutationAction, MutationEvent};
use crate::name::NameId;
use crate::value::{Text, Value, ValueType};

/// Where a node is to be inserted.
#[derive(Debug, Clone, Copy)]
enum InsertPos {
    /// As the first child of a container.
    First(Node),
    /// As the last child of a container.
    Last(Node),
    /// As the sibling immediately before a reference node.
    Before(Node),
    /// As the sibling immediately after a reference node.
    After(Node),
}

/// ## Manipulation
///
/// Tree mutation maintains the XML structure:
/// - the document root holds at most one element, at most one document type
///   (which must precede the element) and at most one XML declaration
///   (which must be first);
/// - only containers accept children, and only children of a legal kind;
/// - entity reference subtrees are read-only;
/// - adjacent text-like siblings form runs chained through their parent
///   slot; the chain is repaired on both the joined and the separated side
///   of every splice.
///
/// Adjacent text nodes are not merged implicitly; [`Document::normalize`]
/// merges them on request.
impl Document {
    /// Append a child as the new last child of the given parent.
    ///
    /// ```rust
    /// let mut doc = xdom::Document::parse("<doc/>").unwrap();
    /// let root_el = doc.document_element().unwrap();
    /// let name = doc.add_name("child");
    /// let child = doc.create_element(name);
    /// doc.append(root_el, child).unwrap();
    /// assert_eq!(doc.last_child(root_el), Some(child));
    /// ```
    pub fn append(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        self.insert(InsertPos::Last(parent), child)
    }

    /// Prepend a child as the new first child of the given parent.
    pub fn prepend(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        self.insert(InsertPos::First(parent), child)
    }

    /// Insert a new sibling before a reference node.
    pub fn insert_before(&mut self, reference: Node, new_sibling: Node) -> Result<(), Error> {
        self.insert(InsertPos::Before(reference), new_sibling)
    }

    /// Insert a new sibling after a reference node.
    pub fn insert_after(&mut self, reference: Node, new_sibling: Node) -> Result<(), Error> {
        self.insert(InsertPos::After(reference), new_sibling)
    }

    /// Append a text node to a parent given text.
    pub fn append_text(&mut self, parent: Node, text: &str) -> Result<Node, Error> {
        let node = self.create_text(text);
        self.append(parent, node)?;
        Ok(node)
    }

    /// Append an element node to a parent given a name.
    pub fn append_element(&mut self, parent: Node, name_id: NameId) -> Result<Node, Error> {
        let node = self.create_element(name_id);
        self.append(parent, node)?;
        Ok(node)
    }

    /// Append a comment node to a parent given comment text.
    pub fn append_comment(&mut self, parent: Node, comment: &str) -> Result<Node, Error> {
        let node = self.create_comment(comment);
        self.append(parent, node)?;
        Ok(node)
    }

    /// Remove a node (and its subtree) from its container.
    ///
    /// The detached subtree stays internally valid and can be inserted
    /// elsewhere. Removing an attribute node detaches it from its owning
    /// element's attribute collection.
    pub fn remove(&mut self, node: Node) -> Result<(), Error> {
        self.check_owner(node)?;
        if self.value_type(node) == ValueType::Attribute {
            let owner = self.parent(node).ok_or_else(|| {
                Error::InvalidOperation("attribute is not owned by an element".into())
            })?;
            return self.remove_attribute_node(owner, node);
        }
        let parent = self
            .parent(node)
            .ok_or_else(|| Error::InvalidOperation("node has no parent".into()))?;
        self.check_read_only(parent)?;
        self.remove_internal(parent, node);
        Ok(())
    }

    /// Replace an old child with a new node, at the same position.
    ///
    /// If the new node cannot go where the old one was, the old child is
    /// reinstated and the error returned.
    pub fn replace(&mut self, old: Node, new: Node) -> Result<(), Error> {
        self.check_owner(old)?;
        self.check_owner(new)?;
        let parent = self
            .parent(old)
            .ok_or_else(|| Error::InvalidOperation("node has no parent".into()))?;
        let prev = self.previous_sibling(old);
        self.remove(old)?;
        let result = match prev {
            Some(prev) => self.insert_after(prev, new),
            None => self.prepend(parent, new),
        };
        if result.is_err() {
            // put the old child back; it fit before, so this cannot fail
            let _ = match prev {
                Some(prev) => self.insert_after(prev, old),
                None => self.prepend(parent, old),
            };
        }
        result
    }

    /// Fast append used while a document is loading.
    ///
    /// Skips the validity machinery and pre-mutation events; a single
    /// `Inserted` notification is synthesized per node.
    pub fn append_for_load(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        self.check_owner(parent)?;
        self.check_owner(child)?;
        let prev = self.last_child(parent);
        self.splice_after(parent, prev, child);
        self.mark_not_empty(parent);
        if self.wants_post_events() {
            self.emit(MutationEvent {
                action: MutationAction::Inserted,
                node: child,
                old_parent: None,
                new_parent: Some(parent),
                old_value: None,
                new_value: None,
            });
        }
        Ok(())
    }

    fn insert(&mut self, pos: InsertPos, child: Node) -> Result<(), Error> {
        self.check_owner(child)?;
        match pos {
            InsertPos::First(p) | InsertPos::Last(p) => self.check_owner(p)?,
            InsertPos::Before(r) | InsertPos::After(r) => {
                self.check_owner(r)?;
                if r == child {
                    return Err(Error::InvalidPosition(
                        "cannot insert a node relative to itself".into(),
                    ));
                }
            }
        }
        if self.value_type(child) == ValueType::Fragment {
            return self.insert_fragment(pos, child);
        }
        let (parent, prev) = self.resolve(pos)?;
        self.check_insertion(parent, child, prev)?;
        // moves are allowed: detach from the old location first; leaving a
        // fragment is silent, since a fragment is a staging container and
        // its children were never part of the tree
        if let Some(old_parent) = self.parent(child) {
            if self.value_type(old_parent) == ValueType::Fragment {
                self.splice_out(old_parent, child);
            } else {
                self.remove(child)?;
            }
        }
        // the detach may have shifted sibling positions
        let (parent, prev) = self.resolve(pos)?;
        if self.wants_pre_events() {
            self.emit(MutationEvent {
                action: MutationAction::Inserting,
                node: child,
                old_parent: None,
                new_parent: Some(parent),
                old_value: None,
                new_value: None,
            });
        }
        self.splice_after(parent, prev, child);
        self.mark_not_empty(parent);
        if self.wants_post_events() {
            self.emit(MutationEvent {
                action: MutationAction::Inserted,
                node: child,
                old_parent: None,
                new_parent: Some(parent),
                old_value: None,
                new_value: None,
            });
        }
        Ok(())
    }

    fn insert_fragment(&mut self, pos: InsertPos, fragment: Node) -> Result<(), Error> {
        // a fragment is decomposed: each child is inserted individually in
        // original order, and the fragment ends up empty. The whole sequence
        // is validated first, so a failure leaves the tree untouched.
        let children: Vec<Node> = self.children(fragment).collect();
        let (parent, prev) = self.resolve(pos)?;
        self.check_sequence_insertion(parent, prev, &children, &[])?;
        match pos {
            InsertPos::Last(parent) => {
                for child in children {
                    self.insert(InsertPos::Last(parent), child)?;
                }
            }
            InsertPos::First(parent) => {
                let mut anchor: Option<Node> = None;
                for child in children {
                    match anchor {
                        None => self.insert(InsertPos::First(parent), child)?,
                        Some(anchor) => self.insert(InsertPos::After(anchor), child)?,
                    }
                    anchor = Some(child);
                }
            }
            InsertPos::Before(reference) => {
                for child in children {
                    self.insert(InsertPos::Before(reference), child)?;
                }
            }
            InsertPos::After(reference) => {
                let mut anchor = reference;
                for child in children {
                    self.insert(InsertPos::After(anchor), child)?;
                    anchor = child;
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, pos: InsertPos) -> Result<(Node, Option<Node>), Error> {
        match pos {
            InsertPos::First(parent) => Ok((parent, None)),
            InsertPos::Last(parent) => Ok((parent, self.last_child(parent))),
            InsertPos::Before(reference) => {
                let parent = self.parent(reference).ok_or_else(|| {
                    Error::InvalidPosition("reference node has no parent".into())
                })?;
                Ok((parent, self.previous_sibling(reference)))
            }
            InsertPos::After(reference) => {
                let parent = self.parent(reference).ok_or_else(|| {
                    Error::InvalidPosition("reference node has no parent".into())
                })?;
                Ok((parent, Some(reference)))
            }
        }
    }

    fn check_insertion(&self, parent: Node, child: Node, prev: Option<Node>) -> Result<(), Error> {
        self.check_read_only(parent)?;
        self.check_cycle(parent, child)?;
        self.check_child_kind(parent, child)?;
        if self.value_type(parent) == ValueType::Document {
            self.check_document_position(parent, child, prev)?;
        }
        Ok(())
    }

    fn check_read_only(&self, parent: Node) -> Result<(), Error> {
        if self
            .ancestors(parent)
            .any(|n| self.value_type(n) == ValueType::EntityReference)
        {
            return Err(Error::ReadOnly(
                "cannot mutate inside an entity reference".into(),
            ));
        }
        Ok(())
    }

    fn check_cycle(&self, parent: Node, child: Node) -> Result<(), Error> {
        if self.ancestors(parent).any(|n| n == child) {
            return Err(Error::InvalidStructure(
                "cannot insert a node under itself or its own descendant".into(),
            ));
        }
        Ok(())
    }

    fn check_child_kind(&self, parent: Node, child: Node) -> Result<(), Error> {
        use ValueType::*;
        let parent_type = self.value_type(parent);
        let child_type = self.value_type(child);
        let allowed = match parent_type {
            Document => matches!(
                child_type,
                Element | Comment | ProcessingInstruction | Whitespace | DocumentType
                    | XmlDeclaration
            ),
            Element | Fragment | EntityReference => matches!(
                child_type,
                Element
                    | Text
                    | CData
                    | Whitespace
                    | SignificantWhitespace
                    | Comment
                    | ProcessingInstruction
                    | EntityReference
            ),
            Attribute => matches!(child_type, Text | EntityReference),
            _ => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidStructure(format!(
                "a {:?} node cannot be a child of a {:?} node",
                child_type, parent_type
            )))
        }
    }

    /// Ordering and cardinality constraints for direct children of the
    /// document root. `prev` describes the insertion point.
    fn check_document_position(
        &self,
        parent: Node,
        child: Node,
        prev: Option<Node>,
    ) -> Result<(), Error> {
        // the child may currently sit under this parent (a move); ignore it
        let children: Vec<Node> = self.children(parent).filter(|n| *n != child).collect();
        let insert_at = Self::slot_index(&children, prev);
        let kinds: Vec<ValueType> = children.iter().map(|n| self.value_type(*n)).collect();
        Self::check_document_slot(&kinds, insert_at, self.value_type(child))
    }

    fn slot_index(children: &[Node], prev: Option<Node>) -> usize {
        match prev {
            None => 0,
            Some(prev) => children
                .iter()
                .position(|n| *n == prev)
                .map(|i| i + 1)
                .unwrap_or(children.len()),
        }
    }

    /// The document-root constraints as a pure check over child kinds, so a
    /// whole sequence can be validated against a simulated child list before
    /// anything is spliced.
    fn check_document_slot(
        kinds: &[ValueType],
        insert_at: usize,
        kind: ValueType,
    ) -> Result<(), Error> {
        use ValueType::*;
        match kind {
            Element => {
                if kinds.iter().any(|k| *k == Element) {
                    return Err(Error::InvalidPosition(
                        "document already has a document element".into(),
                    ));
                }
                if kinds.iter().skip(insert_at).any(|k| *k == DocumentType) {
                    return Err(Error::InvalidPosition(
                        "the document element cannot precede the document type".into(),
                    ));
                }
            }
            DocumentType => {
                if kinds.iter().any(|k| *k == DocumentType) {
                    return Err(Error::InvalidPosition(
                        "document already has a document type".into(),
                    ));
                }
                if kinds.iter().take(insert_at).any(|k| *k == Element) {
                    return Err(Error::InvalidPosition(
                        "the document type must precede the document element".into(),
                    ));
                }
            }
            XmlDeclaration => {
                if kinds.iter().any(|k| *k == XmlDeclaration) {
                    return Err(Error::InvalidPosition(
                        "document already has an XML declaration".into(),
                    ));
                }
                if insert_at != 0 {
                    return Err(Error::InvalidPosition(
                        "the XML declaration must be the first child".into(),
                    ));
                }
            }
            _ => {
                if insert_at == 0 && kinds.first() == Some(&XmlDeclaration) {
                    return Err(Error::InvalidPosition(
                        "nothing may precede the XML declaration".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate a whole node sequence against an insertion point before any
    /// of it is spliced, so a mid-sequence failure cannot leave a prefix in
    /// the tree. `removed` names nodes that will be gone by the time the
    /// sequence lands (a replaced range).
    pub(crate) fn check_sequence_insertion(
        &self,
        parent: Node,
        prev: Option<Node>,
        sequence: &[Node],
        removed: &[Node],
    ) -> Result<(), Error> {
        self.check_read_only(parent)?;
        let children: Vec<Node> = self
            .children(parent)
            .filter(|n| !removed.contains(n))
            .collect();
        let mut kinds: Vec<ValueType> = children.iter().map(|n| self.value_type(*n)).collect();
        let mut at = Self::slot_index(&children, prev);
        let is_document = self.value_type(parent) == ValueType::Document;
        for node in sequence {
            self.check_cycle(parent, *node)?;
            self.check_child_kind(parent, *node)?;
            if is_document {
                Self::check_document_slot(&kinds, at, self.value_type(*node))?;
            }
            kinds.insert(at, self.value_type(*node));
            at += 1;
        }
        Ok(())
    }

    fn mark_not_empty(&mut self, parent: Node) {
        if let Value::Element(element) = self.value_mut(parent) {
            element.empty = false;
        }
    }

    fn remove_internal(&mut self, parent: Node, node: Node) {
        if self.wants_pre_events() {
            self.emit(MutationEvent {
                action: MutationAction::Removing,
                node,
                old_parent: Some(parent),
                new_parent: None,
                old_value: None,
                new_value: None,
            });
        }
        self.splice_out(parent, node);
        if self.wants_post_events() {
            self.emit(MutationEvent {
                action: MutationAction::Removed,
                node,
                old_parent: Some(parent),
                new_parent: None,
                old_value: None,
                new_value: None,
            });
        }
    }

    /// Physically link `child` into `parent`'s circular child list so that
    /// it follows `prev` (`None` puts it at the head), then repair the
    /// parent slots of the child and of the sibling that now follows it.
    pub(crate) fn splice_after(&mut self, parent: Node, prev: Option<Node>, child: Node) {
        match prev {
            None => match self.data(parent).last_child {
                // insert as only child: the circle is the node itself
                None => {
                    self.data_mut(child).next = Some(child);
                    self.data_mut(parent).last_child = Some(child);
                }
                // insert at head: the old last child points at the new first
                Some(last) => {
                    let first = self.data(last).next;
                    self.data_mut(child).next = first;
                    self.data_mut(last).next = Some(child);
                }
            },
            Some(prev) => {
                // interior or tail
                let next = self.data(prev).next;
                self.data_mut(child).next = next;
                self.data_mut(prev).next = Some(child);
                if self.data(parent).last_child == Some(prev) {
                    self.data_mut(parent).last_child = Some(child);
                }
            }
        }
        self.assign_slot(parent, child, prev);
        if let Some(next) = self.next_sibling(child) {
            self.assign_slot(parent, next, Some(child));
        }
    }

    pub(crate) fn splice_last(&mut self, parent: Node, child: Node) {
        let prev = self.data(parent).last_child;
        self.splice_after(parent, prev, child);
    }

    /// Physically unlink `node` from `parent`'s circular child list and
    /// repair the slot of the sibling that followed it.
    pub(crate) fn splice_out(&mut self, parent: Node, node: Node) {
        let prev = self.previous_sibling(node);
        let next = self.next_sibling(node);
        match prev {
            Some(prev) => {
                let node_next = self.data(node).next;
                self.data_mut(prev).next = node_next;
                if self.data(parent).last_child == Some(node) {
                    self.data_mut(parent).last_child = Some(prev);
                }
            }
            None => match next {
                // head removal: the last child must point at the new first
                Some(_) => {
                    let node_next = self.data(node).next;
                    if let Some(last) = self.data(parent).last_child {
                        self.data_mut(last).next = node_next;
                    }
                }
                // only child
                None => {
                    self.data_mut(parent).last_child = None;
                }
            },
        }
        self.data_mut(node).slot = ParentSlot::Detached;
        self.data_mut(node).next = None;
        if let Some(next) = next {
            self.assign_slot(parent, next, prev);
        }
    }

    /// Point a node's parent slot either at its container or, when it joins
    /// a text run behind `prev`, at the previous run member.
    fn assign_slot(&mut self, parent: Node, node: Node, prev: Option<Node>) {
        let slot = match prev {
            Some(prev)
                if self.value_type(node).is_text_run()
                    && self.value_type(prev).is_text_run() =>
            {
                ParentSlot::PrevTextRun(prev)
            }
            _ => ParentSlot::Parent(parent),
        };
        self.data_mut(node).slot = slot;
    }
}

/// ## Attribute manipulation
impl Document {
    /// Append an attribute node to an element's attribute collection.
    ///
    /// Fails with [`Error::DuplicateAttribute`] if the element already
    /// carries a specified attribute with the same name; a schema-default
    /// attribute with that name is replaced in place instead.
    pub fn append_attribute(&mut self, element: Node, attribute: Node) -> Result<(), Error> {
        self.check_owner(element)?;
        self.check_owner(attribute)?;
        if self.value_type(element) != ValueType::Element {
            return Err(Error::InvalidStructure(
                "attributes can only be appended to elements".into(),
            ));
        }
        if self.value_type(attribute) != ValueType::Attribute {
            return Err(Error::InvalidStructure(
                "only attribute nodes can join an attribute collection".into(),
            ));
        }
        self.check_read_only(element)?;
        if self.parent(attribute).is_some() {
            return Err(Error::InvalidOperation(
                "attribute is already owned by an element".into(),
            ));
        }
        let name_id = match self.value(attribute) {
            Value::Attribute(a) => a.name_id,
            _ => unreachable!(),
        };
        let existing = self.attribute_node(element, name_id);
        if let Some(existing) = existing {
            let specified = match self.value(existing) {
                Value::Attribute(a) => a.specified,
                _ => false,
            };
            if specified {
                return Err(Error::DuplicateAttribute(
                    self.name_ref(name_id).qualified(),
                ));
            }
        }
        if self.wants_pre_events() {
            self.emit(MutationEvent {
                action: MutationAction::Inserting,
                node: attribute,
                old_parent: None,
                new_parent: Some(element),
                old_value: None,
                new_value: None,
            });
        }
        if let Some(existing) = existing {
            // an unspecified schema default is replaced in place
            let index = self
                .attribute_index(element, existing)
                .unwrap_or_default();
            self.data_mut(existing).slot = ParentSlot::Detached;
            if let Value::Element(el) = self.value_mut(element) {
                el.attributes[index] = attribute;
            }
        } else if let Value::Element(el) = self.value_mut(element) {
            el.attributes.push(attribute);
        }
        self.data_mut(attribute).slot = ParentSlot::Parent(element);
        if self.is_id_name(name_id) {
            let id = self.attribute_text(attribute);
            self.register_id(id, element);
        }
        if self.wants_post_events() {
            self.emit(MutationEvent {
                action: MutationAction::Inserted,
                node: attribute,
                old_parent: None,
                new_parent: Some(element),
                old_value: None,
                new_value: None,
            });
        }
        Ok(())
    }

    /// Remove an attribute of an element by name. Returns the detached
    /// attribute node, if one was present.
    pub fn remove_attribute(
        &mut self,
        element: Node,
        name_id: NameId,
    ) -> Result<Option<Node>, Error> {
        self.check_owner(element)?;
        match self.attribute_node(element, name_id) {
            Some(attribute) => {
                self.remove_attribute_node(element, attribute)?;
                Ok(Some(attribute))
            }
            None => Ok(None),
        }
    }

    pub(crate) fn remove_attribute_node(
        &mut self,
        element: Node,
        attribute: Node,
    ) -> Result<(), Error> {
        self.check_read_only(element)?;
        let index = self.attribute_index(element, attribute).ok_or_else(|| {
            Error::InvalidOperation("attribute is not owned by this element".into())
        })?;
        if self.wants_pre_events() {
            self.emit(MutationEvent {
                action: MutationAction::Removing,
                node: attribute,
                old_parent: Some(element),
                new_parent: None,
                old_value: None,
                new_value: None,
            });
        }
        let name_id = match self.value(attribute) {
            Value::Attribute(a) => Some(a.name_id),
            _ => None,
        };
        if let Value::Element(el) = self.value_mut(element) {
            el.attributes.remove(index);
        }
        self.data_mut(attribute).slot = ParentSlot::Detached;
        if let Some(name_id) = name_id {
            if self.is_id_name(name_id) {
                let id = self.attribute_text(attribute);
                self.unregister_id(&id, element);
            }
        }
        if self.wants_post_events() {
            self.emit(MutationEvent {
                action: MutationAction::Removed,
                node: attribute,
                old_parent: Some(element),
                new_parent: None,
                old_value: None,
                new_value: None,
            });
        }
        Ok(())
    }

    /// Set an attribute value on an element, creating the attribute if it
    /// does not exist yet.
    pub fn set_attribute(
        &mut self,
        element: Node,
        name_id: NameId,
        value: &str,
    ) -> Result<(), Error> {
        self.check_owner(element)?;
        if let Some(attribute) = self.attribute_node(element, name_id) {
            let old = self.attribute_text(attribute);
            if self.wants_pre_events() {
                self.emit(MutationEvent {
                    action: MutationAction::Changing,
                    node: attribute,
                    old_parent: Some(element),
                    new_parent: Some(element),
                    old_value: Some(old.clone()),
                    new_value: Some(value.to_string()),
                });
            }
            // rebuild the value chain as a single text node
            let children: Vec<Node> = self.children(attribute).collect();
            for child in children {
                self.splice_out(attribute, child);
            }
            let text = self.create_text(value);
            self.splice_last(attribute, text);
            if self.is_id_name(name_id) {
                self.unregister_id(&old, element);
                self.register_id(value.to_string(), element);
            }
            if self.wants_post_events() {
                self.emit(MutationEvent {
                    action: MutationAction::Changed,
                    node: attribute,
                    old_parent: Some(element),
                    new_parent: Some(element),
                    old_value: Some(old),
                    new_value: Some(value.to_string()),
                });
            }
            Ok(())
        } else {
            let attribute = self.create_attribute_with_value(name_id, value);
            self.append_attribute(element, attribute)
        }
    }
}

/// ## Text
impl Document {
    /// Set the character data of a text-like or comment node, raising
    /// changing/changed notifications.
    pub fn set_text(&mut self, node: Node, text: &str) -> Result<(), Error> {
        self.check_owner(node)?;
        if let Some(parent) = self.parent(node) {
            self.check_read_only(parent)?;
        }
        let old = match self.value(node) {
            Value::Text(t)
            | Value::CData(t)
            | Value::Whitespace(t)
            | Value::SignificantWhitespace(t) => t.get().to_string(),
            Value::Comment(c) => c.get().to_string(),
            _ => {
                return Err(Error::InvalidOperation(
                    "node does not carry character data".into(),
                ))
            }
        };
        // the old id must be captured before the text changes
        let id_context = self.id_context(node);
        if self.wants_pre_events() {
            self.emit(MutationEvent {
                action: MutationAction::Changing,
                node,
                old_parent: self.parent(node),
                new_parent: self.parent(node),
                old_value: Some(old.clone()),
                new_value: Some(text.to_string()),
            });
        }
        match self.value_mut(node) {
            Value::Text(t)
            | Value::CData(t)
            | Value::Whitespace(t)
            | Value::SignificantWhitespace(t) => t.set(text),
            Value::Comment(c) => c.set(text)?,
            _ => {}
        }
        if let Some((attribute, element, old_id)) = id_context {
            self.unregister_id(&old_id, element);
            let id = self.attribute_text(attribute);
            self.register_id(id, element);
        }
        if self.wants_post_events() {
            self.emit(MutationEvent {
                action: MutationAction::Changed,
                node,
                old_parent: self.parent(node),
                new_parent: self.parent(node),
                old_value: Some(old),
                new_value: Some(text.to_string()),
            });
        }
        Ok(())
    }

    /// If the node sits inside an id attribute's value chain, return the
    /// attribute, the owning element and the current id value, so the index
    /// entry can be moved after the text changes.
    fn id_context(&self, node: Node) -> Option<(Node, Node, String)> {
        let attribute = self
            .ancestors(node)
            .find(|n| self.value_type(*n) == ValueType::Attribute)?;
        let name_id = match self.value(attribute) {
            Value::Attribute(a) => a.name_id,
            _ => return None,
        };
        if !self.is_id_name(name_id) {
            return None;
        }
        let element = self.parent(attribute)?;
        Some((attribute, element, self.attribute_text(attribute)))
    }

    /// Merge every maximal run of adjacent text-like children into a single
    /// text node, recursing into element children.
    ///
    /// Applying `normalize` twice yields the same tree as applying it once.
    pub fn normalize(&mut self, node: Node) -> Result<(), Error> {
        self.check_owner(node)?;
        let children: Vec<Node> = self.children(node).collect();
        let mut run: Vec<Node> = Vec::new();
        for child in &children {
            if self.value_type(*child).is_text_run() {
                run.push(*child);
            } else {
                if run.len() > 1 {
                    self.merge_run(&run)?;
                }
                run.clear();
            }
        }
        if run.len() > 1 {
            self.merge_run(&run)?;
        }
        for child in children {
            if self.is_element(child) && self.parent(child) == Some(node) {
                self.normalize(child)?;
            }
        }
        Ok(())
    }

    fn merge_run(&mut self, run: &[Node]) -> Result<(), Error> {
        let mut text = String::new();
        for member in run {
            if let Some(s) = self.value(*member).character_data() {
                text.push_str(s);
            }
        }
        let head = run[0];
        let old = self
            .value(head)
            .character_data()
            .unwrap_or_default()
            .to_string();
        if self.wants_pre_events() {
            self.emit(MutationEvent {
                action: MutationAction::Changing,
                node: head,
                old_parent: self.parent(head),
                new_parent: self.parent(head),
                old_value: Some(old.clone()),
                new_value: Some(text.clone()),
            });
        }
        // the merged node is always a plain text node
        self.data_mut(head).value = Value::Text(Text::new(text.clone()));
        if self.wants_post_events() {
            self.emit(MutationEvent {
                action: MutationAction::Changed,
                node: head,
                old_parent: self.parent(head),
                new_parent: self.parent(head),
                old_value: Some(old),
                new_value: Some(text),
            });
        }
        for member in &run[1..] {
            self.remove(*member)?;
        }
        Ok(())
    }
}
