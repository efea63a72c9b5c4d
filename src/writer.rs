use crate::document::{Document, Node};
use crate::error::Error;
use crate::name::NameId;
use crate::navigator::Navigator;

/// Where the staged content goes when the writer is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertionMode {
    PrependChild,
    AppendChild,
    InsertBefore,
    InsertAfter,
    AppendAttribute,
    ReplaceRange,
}

/// Writer state. One state per call category; illegal sequences collapse
/// into `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Nothing but prolog items written yet: XML declaration, document
    /// type, comments, processing instructions, whitespace.
    Prolog,
    /// An element's start tag is open; attributes are still accepted.
    Content,
    /// Content is flowing; attributes are no longer accepted.
    Fragment,
    /// Inside an open attribute; only character data and entity references
    /// are accepted.
    Attribute,
    /// Between attributes of an attribute-only writer.
    Last,
    /// A call was illegal; every further call fails and close is a no-op.
    Error,
}

/// The call categories the transition table is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    StartElement,
    EndElement,
    StartAttribute,
    EndAttribute,
    /// Text, CDATA or an entity reference in content.
    Content,
    /// Comment, processing instruction or whitespace; legal in the prolog
    /// and in content.
    Misc,
    /// XML declaration or document type; legal only in the prolog.
    Prolog,
}

/// A writer-shaped editor over a [`Document`].
///
/// Obtained from the editing entry points on [`Navigator`]
/// ([`Navigator::append_child`], [`Navigator::insert_before`] and friends),
/// it accepts a stream of `write_*` calls describing new content. Nothing
/// touches the tree until [`TreeWriter::close`]: written nodes are staged on
/// a detached fragment and spliced in as one operation, so structural
/// validation happens against the final shape. Dropping the writer without
/// closing discards the staged content and leaves the tree untouched.
///
/// ```rust
/// use xdom::{Document, Navigator};
///
/// let mut doc = Document::parse("<doc/>").unwrap();
/// let root_el = doc.document_element().unwrap();
/// let name = doc.add_name("item");
/// let mut nav = Navigator::new(&doc, root_el).unwrap();
/// let mut writer = nav.append_child(&mut doc).unwrap();
/// writer.write_start_element(name).unwrap();
/// writer.write_string("content").unwrap();
/// let first = writer.close().unwrap();
/// assert_eq!(first, doc.first_child(root_el));
/// ```
pub struct TreeWriter<'a> {
    doc: &'a mut Document,
    navigator: &'a mut Navigator,
    mode: InsertionMode,
    anchor: Node,
    end: Option<Node>,
    /// Detached fragment the written nodes are staged on.
    staging: Node,
    open_elements: Vec<Node>,
    open_attribute: Option<Node>,
    /// Attributes awaiting attachment to the anchor element
    /// (`AppendAttribute` mode only).
    pending_attributes: Vec<Node>,
    state: WriterState,
}

impl<'a> TreeWriter<'a> {
    pub(crate) fn new(
        doc: &'a mut Document,
        navigator: &'a mut Navigator,
        mode: InsertionMode,
        anchor: Node,
        end: Option<Node>,
    ) -> Result<TreeWriter<'a>, Error> {
        let staging = doc.create_fragment();
        let state = if mode == InsertionMode::AppendAttribute {
            WriterState::Last
        } else {
            WriterState::Prolog
        };
        Ok(TreeWriter {
            doc,
            navigator,
            mode,
            anchor,
            end,
            staging,
            open_elements: Vec::new(),
            open_attribute: None,
            pending_attributes: Vec::new(),
            state,
        })
    }

    /// The transition table: `(state, call) -> state`, with `Error`
    /// absorbing every illegal sequence. Returns the error for illegal
    /// calls and leaves the writer poisoned.
    fn advance(&mut self, call: Call) -> Result<(), Error> {
        use WriterState as S;
        let next = match (self.state, call) {
            (S::Prolog, Call::Prolog) | (S::Prolog, Call::Misc) => S::Prolog,
            (S::Prolog, Call::StartElement) => S::Content,
            (S::Prolog, Call::Content) => S::Fragment,

            (S::Content, Call::StartElement) => S::Content,
            (S::Content, Call::StartAttribute) => S::Attribute,
            (S::Content, Call::Content) | (S::Content, Call::Misc) => S::Fragment,
            (S::Content, Call::EndElement) => S::Fragment,

            (S::Fragment, Call::StartElement) => S::Content,
            (S::Fragment, Call::Content) | (S::Fragment, Call::Misc) => S::Fragment,
            (S::Fragment, Call::EndElement) if !self.open_elements.is_empty() => S::Fragment,

            (S::Attribute, Call::Content) => S::Attribute,
            (S::Attribute, Call::EndAttribute) => {
                if self.mode == InsertionMode::AppendAttribute {
                    S::Last
                } else {
                    S::Content
                }
            }

            (S::Last, Call::StartAttribute) => S::Attribute,

            (S::Error, _) => {
                return Err(Error::InvalidOperation(
                    "writer is in the error state".into(),
                ))
            }
            (state, call) => {
                self.state = S::Error;
                return Err(Error::InvalidOperation(format!(
                    "{:?} is not legal in the {:?} state",
                    call, state
                )));
            }
        };
        self.state = next;
        Ok(())
    }

    /// The staged parent new content goes under: the innermost open element,
    /// or the staging fragment at the top level.
    fn staged_parent(&self) -> Node {
        self.open_elements.last().copied().unwrap_or(self.staging)
    }

    /// Stage a node. Staged nodes are detached from the tree, so no
    /// structural checks or notifications apply yet; both happen when the
    /// fragment is spliced in on close.
    fn stage(&mut self, node: Node) {
        let parent = self.staged_parent();
        self.doc.splice_last(parent, node);
        if let Some(element) = self.doc.element_mut(parent) {
            element.set_empty_tag(false);
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        self.state = WriterState::Error;
        error
    }

    /// Open an element. Subsequent attribute writes attach to it; content
    /// writes go inside it until the matching
    /// [`TreeWriter::write_end_element`].
    pub fn write_start_element(&mut self, name_id: NameId) -> Result<(), Error> {
        self.advance(Call::StartElement)?;
        let element = self.doc.create_element(name_id);
        self.stage(element);
        self.open_elements.push(element);
        Ok(())
    }

    /// Close the innermost open element.
    pub fn write_end_element(&mut self) -> Result<(), Error> {
        if self.open_elements.is_empty() && self.state != WriterState::Error {
            self.state = WriterState::Error;
            return Err(Error::InvalidOperation("no open element to end".into()));
        }
        self.advance(Call::EndElement)?;
        self.open_elements.pop();
        Ok(())
    }

    /// Open an attribute on the innermost open element, or on the anchor
    /// element for a writer opened with
    /// [`Navigator::create_attributes`](crate::navigator::Navigator::create_attributes).
    /// Until [`TreeWriter::write_end_attribute`], character data and entity
    /// references go into the attribute value. Attributes cannot be written
    /// once an element has content.
    pub fn write_start_attribute(&mut self, name_id: NameId) -> Result<(), Error> {
        self.advance(Call::StartAttribute)?;
        let attribute = self.doc.create_attribute(name_id);
        self.open_attribute = Some(attribute);
        Ok(())
    }

    /// Close the open attribute and attach it.
    ///
    /// On an open element the attachment happens immediately, so a duplicate
    /// name fails here; in attribute mode the attribute is held back and
    /// attached to the anchor element on close.
    pub fn write_end_attribute(&mut self) -> Result<(), Error> {
        self.advance(Call::EndAttribute)?;
        let attribute = match self.open_attribute.take() {
            Some(attribute) => attribute,
            None => {
                return Err(self.fail(Error::InvalidOperation(
                    "no open attribute to end".into(),
                )))
            }
        };
        match self.open_elements.last().copied() {
            Some(element) => {
                if let Err(e) = self.doc.append_attribute(element, attribute) {
                    return Err(self.fail(e));
                }
            }
            None => self.pending_attributes.push(attribute),
        }
        Ok(())
    }

    /// Write an attribute with a plain text value in one call.
    pub fn write_attribute(&mut self, name_id: NameId, value: &str) -> Result<(), Error> {
        self.write_start_attribute(name_id)?;
        self.write_string(value)?;
        self.write_end_attribute()
    }

    /// Write character data: into the open attribute's value chain, or as a
    /// text node in content.
    pub fn write_string(&mut self, text: &str) -> Result<(), Error> {
        self.advance(Call::Content)?;
        if let Some(attribute) = self.open_attribute {
            let value = self.doc.create_text(text);
            self.doc.splice_last(attribute, value);
        } else {
            let node = self.doc.create_text(text);
            self.stage(node);
        }
        Ok(())
    }

    /// Write a CDATA section.
    pub fn write_cdata(&mut self, text: &str) -> Result<(), Error> {
        self.advance(Call::Content)?;
        if self.open_attribute.is_some() {
            return Err(self.fail(Error::InvalidOperation(
                "CDATA is not allowed inside an attribute".into(),
            )));
        }
        let node = self.doc.create_cdata(text);
        self.stage(node);
        Ok(())
    }

    /// Write insignificant whitespace.
    pub fn write_whitespace(&mut self, text: &str) -> Result<(), Error> {
        self.advance(Call::Misc)?;
        let node = self.doc.create_whitespace(text);
        self.stage(node);
        Ok(())
    }

    /// Write significant whitespace.
    pub fn write_significant_whitespace(&mut self, text: &str) -> Result<(), Error> {
        self.advance(Call::Content)?;
        let node = self.doc.create_significant_whitespace(text);
        self.stage(node);
        Ok(())
    }

    /// Write a comment. Comment text may not contain `--`.
    pub fn write_comment(&mut self, text: &str) -> Result<(), Error> {
        self.advance(Call::Misc)?;
        if text.contains("--") {
            return Err(self.fail(Error::InvalidComment(text.to_string())));
        }
        let node = self.doc.create_comment(text);
        self.stage(node);
        Ok(())
    }

    /// Write a processing instruction.
    pub fn write_processing_instruction(
        &mut self,
        target: &str,
        data: Option<&str>,
    ) -> Result<(), Error> {
        self.advance(Call::Misc)?;
        if target.is_empty() || target.eq_ignore_ascii_case("xml") {
            return Err(self.fail(Error::InvalidTarget(target.to_string())));
        }
        let node = self.doc.create_processing_instruction(target, data);
        self.stage(node);
        Ok(())
    }

    /// Write an entity reference, in content or inside an attribute value.
    pub fn write_entity_ref(&mut self, name: &str) -> Result<(), Error> {
        self.advance(Call::Content)?;
        let node = self.doc.create_entity_reference(name);
        if let Some(attribute) = self.open_attribute {
            self.doc.splice_last(attribute, node);
        } else {
            self.stage(node);
        }
        Ok(())
    }

    /// Write a document type declaration. Only legal in the prolog; whether
    /// the splice target accepts one is checked when the writer is closed.
    pub fn write_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        internal_subset: Option<&str>,
    ) -> Result<(), Error> {
        self.advance(Call::Prolog)?;
        let node = self
            .doc
            .create_document_type(name, public_id, system_id, internal_subset);
        self.stage(node);
        Ok(())
    }

    /// Write an XML declaration. Only legal in the prolog; it must end up
    /// as the very first child of the document root, which is checked when
    /// the writer is closed.
    pub fn write_xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), Error> {
        self.advance(Call::Prolog)?;
        let node = self.doc.create_xml_declaration(version, encoding, standalone);
        self.stage(node);
        Ok(())
    }

    /// Discard the staged content without touching the tree.
    pub fn abort(self) {}

    /// Splice the staged content into the tree.
    ///
    /// Any elements and attributes still open are closed first. Returns the
    /// first node written at the top level, or [`None`] if nothing was
    /// written. A writer in the error state closes as a no-op.
    ///
    /// Structural validation runs here, against the tree the content lands
    /// in: an illegal child kind or a violated document-root constraint
    /// fails the close and the staged content stays out of the tree.
    pub fn close(mut self) -> Result<Option<Node>, Error> {
        if self.state == WriterState::Error {
            return Ok(None);
        }
        if self.state == WriterState::Attribute {
            self.write_end_attribute()?;
        }
        self.open_elements.clear();
        if self.mode == InsertionMode::AppendAttribute {
            let first = self.pending_attributes.first().copied();
            for attribute in std::mem::take(&mut self.pending_attributes) {
                self.doc.append_attribute(self.anchor, attribute)?;
            }
            return Ok(first);
        }
        let staged: Vec<Node> = self.doc.children(self.staging).collect();
        let first = staged.first().copied();
        match self.mode {
            InsertionMode::PrependChild => {
                if first.is_some() {
                    self.doc.prepend(self.anchor, self.staging)?;
                }
            }
            InsertionMode::AppendChild => {
                if first.is_some() {
                    self.doc.append(self.anchor, self.staging)?;
                }
            }
            InsertionMode::InsertBefore => {
                if first.is_some() {
                    self.doc.insert_before(self.anchor, self.staging)?;
                }
            }
            InsertionMode::InsertAfter => {
                if first.is_some() {
                    self.doc.insert_after(self.anchor, self.staging)?;
                }
            }
            InsertionMode::ReplaceRange => {
                let first = match first {
                    Some(first) => first,
                    None => {
                        return Err(Error::InvalidPosition(
                            "a replacement range needs at least one node".into(),
                        ))
                    }
                };
                let end = self.end.ok_or_else(|| {
                    Error::InvalidPosition("replacement range has no end node".into())
                })?;
                // re-collect the range; nothing was inserted yet, so a stale
                // end leaves the tree untouched
                let mut range: Vec<Node> = Vec::new();
                let mut found = false;
                for node in self.doc.following_siblings(self.anchor) {
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
                let parent = self.doc.parent(self.anchor).ok_or_else(|| {
                    Error::InvalidPosition("range anchor has no parent".into())
                })?;
                let prev = self.doc.previous_sibling(self.anchor);
                // validate against the tree as it will look once the range
                // is gone, so the replacement may reuse its slots (e.g.
                // swapping out the document element)
                self.doc
                    .check_sequence_insertion(parent, prev, &staged, &range)?;
                for node in range {
                    self.doc.remove(node)?;
                }
                match prev {
                    Some(prev) => self.doc.insert_after(prev, self.staging)?,
                    None => self.doc.prepend(parent, self.staging)?,
                }
                self.navigator.set_node(self.doc, first);
            }
            InsertionMode::AppendAttribute => unreachable!(),
        }
        Ok(first)
    }
}
