use crate::document::{Document, Node};

/// Relative document order of two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The first node comes before the second.
    Before,
    /// The first node comes after the second.
    After,
    /// The two nodes are the same node.
    Same,
    /// The nodes share no common ancestor (detached subtrees, or nodes from
    /// different documents).
    Unknown,
}

impl Comparison {
    pub(crate) fn invert(self) -> Comparison {
        match self {
            Comparison::Before => Comparison::After,
            Comparison::After => Comparison::Before,
            other => other,
        }
    }
}

/// ## Document order
impl Document {
    /// Compare the document order of two nodes.
    ///
    /// Document order is depth-first with attributes directly after their
    /// owning element and before its children; attributes of one element
    /// are ordered by their position in the attribute collection.
    ///
    /// `Compare(a, b)` and `Compare(b, a)` are exact inverses and
    /// `Compare(a, a)` is [`Comparison::Same`]; nodes without a common
    /// ancestor compare as [`Comparison::Unknown`].
    pub fn compare_order(&self, a: Node, b: Node) -> Comparison {
        if self.check_owner(a).is_err() || self.check_owner(b).is_err() {
            return Comparison::Unknown;
        }
        if a == b {
            return Comparison::Same;
        }
        let a_attr = self.is_attribute(a);
        let b_attr = self.is_attribute(b);
        if a_attr && b_attr {
            let a_owner = self.parent(a);
            let b_owner = self.parent(b);
            return match (a_owner, b_owner) {
                (Some(a_owner), Some(b_owner)) if a_owner == b_owner => {
                    let a_index = self.attribute_index(a_owner, a);
                    let b_index = self.attribute_index(b_owner, b);
                    if a_index < b_index {
                        Comparison::Before
                    } else {
                        Comparison::After
                    }
                }
                (Some(a_owner), Some(b_owner)) => self.compare_tree(a_owner, b_owner),
                _ => Comparison::Unknown,
            };
        }
        if a_attr {
            let owner = match self.parent(a) {
                Some(owner) => owner,
                None => return Comparison::Unknown,
            };
            if owner == b {
                // an element precedes its attributes
                return Comparison::After;
            }
            // attributes sit between their element and its children, so the
            // owner's position stands in for the attribute's
            return self.compare_tree(owner, b);
        }
        if b_attr {
            return self.compare_order(b, a).invert();
        }
        self.compare_tree(a, b)
    }

    /// Compare two non-attribute nodes by ascending their ancestor chains
    /// to a common frame and walking the sibling list under it.
    fn compare_tree(&self, a: Node, b: Node) -> Comparison {
        if a == b {
            return Comparison::Same;
        }
        let mut chain_a: Vec<Node> = self.ancestors(a).collect();
        let mut chain_b: Vec<Node> = self.ancestors(b).collect();
        chain_a.reverse();
        chain_b.reverse();
        if chain_a[0] != chain_b[0] {
            return Comparison::Unknown;
        }
        let mut depth = 0;
        while depth < chain_a.len() && depth < chain_b.len() && chain_a[depth] == chain_b[depth] {
            depth += 1;
        }
        if depth == chain_a.len() {
            // a is an ancestor of b
            return Comparison::Before;
        }
        if depth == chain_b.len() {
            return Comparison::After;
        }
        let frame = chain_a[depth - 1];
        let sibling_a = chain_a[depth];
        let sibling_b = chain_b[depth];
        for child in self.children(frame) {
            if child == sibling_a {
                return Comparison::Before;
            }
            if child == sibling_b {
                return Comparison::After;
            }
        }
        Comparison::Unknown
    }

    /// True if `node` is a descendant of `ancestor`. Attributes count as
    /// descendants of their owning element.
    pub fn is_descendant(&self, ancestor: Node, node: Node) -> bool {
        if ancestor == node {
            return false;
        }
        self.ancestors(node).skip(1).any(|n| n == ancestor)
    }
}
