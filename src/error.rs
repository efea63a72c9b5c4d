use std::fmt::{Display, Formatter};

/// Errors that can occur while building, querying or editing a document.
#[derive(Debug)]
pub enum Error {
    /// The parent/child kind combination is illegal, or the insertion
    /// would create a cycle.
    InvalidStructure(String),
    /// The insertion or replacement violates an ordering or cardinality
    /// constraint (e.g. a second document element, a document type after
    /// the document element, a replace range whose end node is not a
    /// following sibling of the anchor).
    InvalidPosition(String),
    /// A node created by one document was used with another.
    WrongDocument,
    /// Mutation attempted inside an entity reference subtree.
    ReadOnly(String),
    /// An attribute with the same qualified name is already present.
    DuplicateAttribute(String),
    /// A call was made out of sequence, or on a node kind that does not
    /// support it.
    InvalidOperation(String),
    /// Comment text containing `--`.
    InvalidComment(String),
    /// Processing instruction target that is empty or reserved.
    InvalidTarget(String),
    /// A prefix was used without a namespace declaration in scope.
    UnknownPrefix(String),
    /// A close tag did not match the open tag.
    MismatchedCloseTag(String),
    /// IO error while serializing.
    Io(std::io::Error),
    /// Tokenizer error while parsing.
    Parser(xmlparser::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidStructure(s) => write!(f, "invalid structure: {}", s),
            Error::InvalidPosition(s) => write!(f, "invalid position: {}", s),
            Error::WrongDocument => write!(f, "node belongs to a different document"),
            Error::ReadOnly(s) => write!(f, "read-only: {}", s),
            Error::DuplicateAttribute(s) => write!(f, "duplicate attribute: {}", s),
            Error::InvalidOperation(s) => write!(f, "invalid operation: {}", s),
            Error::InvalidComment(s) => write!(f, "invalid comment: {}", s),
            Error::InvalidTarget(s) => write!(f, "invalid processing instruction target: {}", s),
            Error::UnknownPrefix(s) => write!(f, "unknown prefix: {}", s),
            Error::MismatchedCloseTag(s) => write!(f, "mismatched close tag: {}", s),
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Parser(e) => write!(f, "parser error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<xmlparser::Error> for Error {
    #[inline]
    fn from(e: xmlparser::Error) -> Self {
        Error::Parser(e)
    }
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
