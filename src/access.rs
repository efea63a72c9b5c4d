use crate::document::{Document, Node, ParentSlot};
use crate::name::NameId;
use crate::value::{Value, ValueType};

/// Node edges, used by [`Document::traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEdge {
    /// The start edge of a node. In case of an element this is the start
    /// tag, in case of the root the start of the document.
    Start(Node),
    /// The end edge of a node. For values without children the end edge
    /// occurs immediately after the start edge.
    End(Node),
}

/// ## Read-only access
impl Document {
    /// Obtain the document element, the single element child of the root.
    ///
    /// ```rust
    /// let doc = xdom::Document::parse("<p>Example</p>").unwrap();
    /// let p = doc.document_element().unwrap();
    /// assert_eq!(doc.name_ref(doc.node_name(p).unwrap()).local(), "p");
    /// ```
    pub fn document_element(&self) -> Option<Node> {
        self.children(self.root()).find(|n| self.is_element(*n))
    }

    /// Walk a text-run chain back to the run's first member.
    ///
    /// For any node that is not a later member of a text run this is the
    /// node itself.
    pub(crate) fn run_head(&self, node: Node) -> Node {
        let mut current = node;
        while let ParentSlot::PrevTextRun(prev) = self.data(current).slot {
            current = prev;
        }
        current
    }

    /// Get the parent node.
    ///
    /// Returns [`None`] for the root and for detached nodes. For attributes
    /// this is the owning element. For later members of a text run the
    /// chain is resolved first, so the real container is returned.
    pub fn parent(&self, node: Node) -> Option<Node> {
        match self.data(node).slot {
            ParentSlot::Detached => None,
            ParentSlot::Parent(parent) => Some(parent),
            ParentSlot::PrevTextRun(_) => {
                let head = self.run_head(node);
                match self.data(head).slot {
                    ParentSlot::Parent(parent) => Some(parent),
                    _ => None,
                }
            }
        }
    }

    /// Get the first child.
    ///
    /// Derived from the stored last child: the circular sibling list makes
    /// `last_child.next` the first child.
    pub fn first_child(&self, node: Node) -> Option<Node> {
        let last = self.data(node).last_child?;
        self.data(last).next
    }

    /// Get the last child.
    pub fn last_child(&self, node: Node) -> Option<Node> {
        self.data(node).last_child
    }

    /// Get the next sibling.
    ///
    /// Attributes have no siblings on this axis.
    ///
    /// ```rust
    /// let doc = xdom::Document::parse("<p><a/><b/></p>").unwrap();
    /// let p = doc.document_element().unwrap();
    /// let a = doc.first_child(p).unwrap();
    /// let b = doc.next_sibling(a).unwrap();
    /// assert_eq!(doc.next_sibling(b), None);
    /// ```
    pub fn next_sibling(&self, node: Node) -> Option<Node> {
        if self.is_attribute(node) {
            return None;
        }
        let container = self.parent(node)?;
        let last = self.data(container).last_child?;
        if node == last {
            None
        } else {
            self.data(node).next
        }
    }

    /// Get the previous sibling.
    ///
    /// For a later member of a text run this is exactly the chained
    /// previous run member; otherwise the circular list is scanned from the
    /// first child.
    pub fn previous_sibling(&self, node: Node) -> Option<Node> {
        if self.is_attribute(node) {
            return None;
        }
        match self.data(node).slot {
            ParentSlot::PrevTextRun(prev) => Some(prev),
            ParentSlot::Detached => None,
            ParentSlot::Parent(parent) => {
                let first = self.first_child(parent)?;
                if node == first {
                    return None;
                }
                let mut current = first;
                loop {
                    let next = self.data(current).next?;
                    if next == node {
                        return Some(current);
                    }
                    if next == first {
                        return None;
                    }
                    current = next;
                }
            }
        }
    }

    /// Iterator over the child nodes of this node.
    ///
    /// Attributes are not children even though they have a parent element.
    pub fn children(&self, node: Node) -> Children<'_> {
        let last = self.data(node).last_child;
        Children {
            doc: self,
            next: last.and_then(|l| self.data(l).next),
            last,
        }
    }

    /// Number of children of this node.
    pub fn child_count(&self, node: Node) -> usize {
        self.children(node).count()
    }

    /// Get the index of a child under a parent, or [`None`] if it is not a
    /// child of this node.
    pub fn child_index(&self, parent: Node, child: Node) -> Option<usize> {
        if self.parent(child) != Some(parent) || self.is_attribute(child) {
            return None;
        }
        self.children(parent).position(|n| n == child)
    }

    /// Iterator over ancestor nodes, including this one.
    ///
    /// For attributes the owning element counts as an ancestor step.
    pub fn ancestors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        std::iter::successors(Some(node), move |n| self.parent(*n))
    }

    /// Iterator over the following siblings of this node, including this
    /// one.
    pub fn following_siblings(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        std::iter::successors(Some(node), move |n| self.next_sibling(*n))
    }

    /// Iterator over the descendants of this node, including this one, in
    /// document order (pre-order depth-first). Attributes are not included.
    pub fn descendants(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.traverse(node).filter_map(|edge| match edge {
            NodeEdge::Start(n) => Some(n),
            NodeEdge::End(_) => None,
        })
    }

    /// Traverse over node edges in document order.
    ///
    /// This walks the subtree iteratively, yielding a
    /// [`NodeEdge::Start`]/[`NodeEdge::End`] pair per node.
    pub fn traverse(&self, node: Node) -> Traverse<'_> {
        Traverse {
            doc: self,
            root: node,
            next: Some(NodeEdge::Start(node)),
        }
    }

    /// True if the node is attached under this document's root.
    pub fn is_attached(&self, node: Node) -> bool {
        self.ancestors(node).last() == Some(self.root())
    }
}

/// ## Attribute access
impl Document {
    /// The ordered attribute collection of an element.
    ///
    /// Empty for any other node kind. Namespace declaration attributes are
    /// included; the [`Navigator`](crate::navigator::Navigator) attribute
    /// axis filters them out.
    pub fn attributes(&self, node: Node) -> &[Node] {
        match self.value(node) {
            Value::Element(element) => &element.attributes,
            _ => &[],
        }
    }

    /// Get an attribute node of an element by name.
    pub fn attribute_node(&self, element: Node, name_id: NameId) -> Option<Node> {
        self.attributes(element)
            .iter()
            .copied()
            .find(|a| self.node_name(*a) == Some(name_id))
    }

    /// Position of an attribute in its element's collection.
    pub fn attribute_index(&self, element: Node, attribute: Node) -> Option<usize> {
        self.attributes(element).iter().position(|a| *a == attribute)
    }

    /// The string value of an attribute node: the concatenated character
    /// data of its value children, looking through entity references.
    pub fn attribute_text(&self, attribute: Node) -> String {
        let mut text = String::new();
        for node in self.descendants(attribute) {
            if let Some(s) = self.value(node).character_data() {
                text.push_str(s);
            }
        }
        text
    }

    /// Get an attribute value of an element by name.
    pub fn attribute_value(&self, element: Node, name_id: NameId) -> Option<String> {
        self.attribute_node(element, name_id)
            .map(|a| self.attribute_text(a))
    }

    /// The element owning an attribute node, if it is attached.
    pub fn attribute_owner(&self, attribute: Node) -> Option<Node> {
        if self.value_type(attribute) != ValueType::Attribute {
            return None;
        }
        self.parent(attribute)
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<Node>,
    last: Option<Node>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let node = self.next?;
        if Some(node) == self.last {
            self.next = None;
        } else {
            self.next = self.doc.data(node).next;
        }
        Some(node)
    }
}

/// Iterator over node edges, see [`Document::traverse`].
pub struct Traverse<'a> {
    doc: &'a Document,
    root: Node,
    next: Option<NodeEdge>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = NodeEdge;

    fn next(&mut self) -> Option<NodeEdge> {
        let edge = self.next?;
        self.next = match edge {
            NodeEdge::Start(node) => match self.doc.first_child(node) {
                Some(child) => Some(NodeEdge::Start(child)),
                None => Some(NodeEdge::End(node)),
            },
            NodeEdge::End(node) => {
                if node == self.root {
                    None
                } else {
                    match self.doc.next_sibling(node) {
                        Some(sibling) => Some(NodeEdge::Start(sibling)),
                        None => self.doc.parent(node).map(NodeEdge::End),
                    }
                }
            }
        };
        Some(edge)
    }
}
