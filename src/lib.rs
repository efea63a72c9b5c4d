#![forbid(unsafe_code)]

//! An in-memory XML document model.
//!
//! A [`Document`] owns a tree of nodes addressed by lightweight [`Node`]
//! handles. The tree can be parsed from XML text, queried, edited directly
//! or through the writer-shaped [`TreeWriter`], walked with the XPath-model
//! [`Navigator`], and serialized back out.

mod access;
mod document;
mod error;
mod events;
mod manipulation;
mod name;
mod navigator;
mod order;
mod parse;
mod serialize;
mod value;
mod writer;

pub use access::{Children, NodeEdge, Traverse};
pub use document::{Document, Node};
pub use error::Error;
pub use events::{MutationAction, MutationEvent};
pub use name::{Name, NameId};
pub use navigator::{NamespaceBinding, NamespaceScope, Navigator, XPathKind};
pub use order::Comparison;
pub use serialize::{XmlSink, XmlWriter};
pub use value::{
    Attribute, Comment, DocumentType, Element, EntityReference, ProcessingInstruction, Text,
    Value, ValueType, XmlDeclaration,
};
pub use writer::TreeWriter;
