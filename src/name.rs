use std::fmt::{Display, Formatter};

use ahash::HashMap;

pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub(crate) const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Id of an interned name.
///
/// Within one document, two names with equal (prefix, local name, namespace
/// URI) triples always get the same `NameId`, so names compare by id.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct NameId(u32);

/// An XML name: prefix, local name and namespace URI.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Name {
    pub(crate) prefix: String,
    pub(crate) local: String,
    pub(crate) namespace: String,
}

impl Name {
    pub(crate) fn new(prefix: &str, local: &str, namespace: &str) -> Self {
        Name {
            prefix: prefix.to_string(),
            local: local.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// The prefix, or the empty string if there is none.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The local name.
    pub fn local(&self) -> &str {
        &self.local
    }

    /// The namespace URI, or the empty string if the name is in no namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The qualified name, `prefix:local` or plain `local`.
    pub fn qualified(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    /// True for `xmlns` and `xmlns:prefix` names.
    pub fn is_namespace_declaration(&self) -> bool {
        self.prefix == "xmlns" || (self.prefix.is_empty() && self.local == "xmlns")
    }

    /// The prefix such a declaration binds; only meaningful if
    /// [`Name::is_namespace_declaration`] is true.
    pub(crate) fn declared_prefix(&self) -> &str {
        if self.prefix == "xmlns" {
            &self.local
        } else {
            ""
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// Interning table for names.
///
/// Also carries the per-name cached schema type annotation; the triple alone
/// is the interning key, the annotation is a cache slot.
pub(crate) struct NameLookup {
    by_id: Vec<Name>,
    by_value: HashMap<Name, NameId>,
    annotations: Vec<Option<NameId>>,
}

impl NameLookup {
    pub(crate) fn new() -> Self {
        NameLookup {
            by_id: Vec::new(),
            by_value: HashMap::default(),
            annotations: Vec::new(),
        }
    }

    pub(crate) fn get_id(&mut self, name: Name) -> NameId {
        if let Some(id) = self.by_value.get(&name) {
            *id
        } else {
            let id = NameId(self.by_id.len() as u32);
            self.by_value.insert(name.clone(), id);
            self.by_id.push(name);
            self.annotations.push(None);
            id
        }
    }

    pub(crate) fn lookup(&self, name: &Name) -> Option<NameId> {
        self.by_value.get(name).copied()
    }

    #[inline]
    pub(crate) fn value(&self, id: NameId) -> &Name {
        &self.by_id[id.0 as usize]
    }

    pub(crate) fn annotation(&self, id: NameId) -> Option<NameId> {
        self.annotations[id.0 as usize]
    }

    pub(crate) fn set_annotation(&mut self, id: NameId, annotation: Option<NameId>) {
        self.annotations[id.0 as usize] = annotation;
    }
}
