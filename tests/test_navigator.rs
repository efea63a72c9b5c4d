use xdom::{Comparison, Document, Error, NamespaceScope, Navigator, XPathKind};

#[test]
fn test_kinds() {
    let doc =
        Document::parse("<a x=\"1\"><!--note-->text<![CDATA[raw]]><?pi data?></a>").unwrap();
    let a = doc.document_element().unwrap();
    let mut nav = Navigator::new(&doc, doc.root()).unwrap();
    assert_eq!(nav.kind(&doc), XPathKind::Root);
    nav.move_to(&doc, a).unwrap();
    assert_eq!(nav.kind(&doc), XPathKind::Element);
    assert!(nav.move_to_first_attribute(&doc));
    assert_eq!(nav.kind(&doc), XPathKind::Attribute);
    assert!(nav.move_to_parent(&doc));
    assert!(nav.move_to_first_child(&doc));
    assert_eq!(nav.kind(&doc), XPathKind::Comment);
    assert!(nav.move_to_next_sibling(&doc));
    assert_eq!(nav.kind(&doc), XPathKind::Text);
    assert!(nav.move_to_next_sibling(&doc));
    // CDATA maps to the text kind
    assert_eq!(nav.kind(&doc), XPathKind::Text);
    assert!(nav.move_to_next_sibling(&doc));
    assert_eq!(nav.kind(&doc), XPathKind::ProcessingInstruction);
    assert!(!nav.move_to_next_sibling(&doc));
}

#[test]
fn test_names() {
    let doc = Document::parse("<p:a xmlns:p=\"urn:x\" y=\"2\"/>").unwrap();
    let a = doc.document_element().unwrap();
    let mut nav = Navigator::new(&doc, a).unwrap();
    assert_eq!(nav.local_name(&doc), "a");
    assert_eq!(nav.prefix(&doc), "p");
    assert_eq!(nav.namespace_uri(&doc), "urn:x");
    assert!(nav.move_to_first_attribute(&doc));
    assert_eq!(nav.local_name(&doc), "y");
    assert_eq!(nav.namespace_uri(&doc), "");
}

#[test]
fn test_text_run_is_one_logical_node() {
    let mut doc = Document::parse("<a><b/></a>").unwrap();
    let a = doc.document_element().unwrap();
    doc.append_text(a, "text1").unwrap();
    doc.append_text(a, "text2").unwrap();
    let mut nav = Navigator::new(&doc, a).unwrap();
    assert!(nav.move_to_first_child(&doc));
    assert_eq!(nav.kind(&doc), XPathKind::Element);
    assert!(nav.move_to_next_sibling(&doc));
    assert_eq!(nav.kind(&doc), XPathKind::Text);
    // the whole run reads as one value, without mutating the tree
    assert_eq!(nav.value(&doc), "text1text2");
    assert_eq!(doc.child_count(a), 3);
    // and the run is a single sibling position
    assert!(!nav.move_to_next_sibling(&doc));
    // a cursor created on a later run member calibrates to the head
    let t2 = doc.last_child(a).unwrap();
    let other = Navigator::new(&doc, t2).unwrap();
    assert!(other.is_same_position(&nav));
}

#[test]
fn test_string_value_of_element() {
    let doc = Document::parse("<a>one<b>two</b><!--skip-->three</a>").unwrap();
    let a = doc.document_element().unwrap();
    let nav = Navigator::new(&doc, a).unwrap();
    assert_eq!(nav.value(&doc), "onetwothree");
    let root_nav = Navigator::new(&doc, doc.root()).unwrap();
    assert_eq!(root_nav.value(&doc), "onetwothree");
}

#[test]
fn test_attribute_axis_skips_namespace_declarations() {
    let doc = Document::parse("<a xmlns:p=\"urn:x\" x=\"1\" y=\"2\"/>").unwrap();
    let a = doc.document_element().unwrap();
    let mut nav = Navigator::new(&doc, a).unwrap();
    assert!(nav.move_to_first_attribute(&doc));
    assert_eq!(nav.local_name(&doc), "x");
    assert_eq!(nav.value(&doc), "1");
    assert!(nav.move_to_next_attribute(&doc));
    assert_eq!(nav.local_name(&doc), "y");
    assert!(!nav.move_to_next_attribute(&doc));
    assert!(nav.move_to_parent(&doc));
    assert_eq!(nav.kind(&doc), XPathKind::Element);
    // direct lookup
    assert!(nav.move_to_attribute(&doc, "y", ""));
    assert_eq!(nav.value(&doc), "2");
    assert!(!nav.move_to_attribute(&doc, "p", "urn:x"));
}

#[test]
fn test_namespace_axis() {
    let doc = Document::parse("<a xmlns:p=\"urn:x\"><b xmlns:q=\"urn:y\"/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    let mut nav = Navigator::new(&doc, b).unwrap();

    // All scope: nearest declarations first, xml synthesized last
    assert!(nav.move_to_first_namespace(&doc, NamespaceScope::All));
    assert_eq!(nav.kind(&doc), XPathKind::Namespace);
    assert_eq!(nav.local_name(&doc), "q");
    assert_eq!(nav.value(&doc), "urn:y");
    assert!(nav.move_to_next_namespace(&doc));
    assert_eq!(nav.local_name(&doc), "p");
    assert!(nav.move_to_next_namespace(&doc));
    assert_eq!(nav.local_name(&doc), "xml");
    assert_eq!(nav.value(&doc), "http://www.w3.org/XML/1998/namespace");
    assert!(!nav.move_to_next_namespace(&doc));
    assert!(nav.move_to_parent(&doc));

    // ExcludeXml drops the synthesized binding
    assert!(nav.move_to_first_namespace(&doc, NamespaceScope::ExcludeXml));
    assert_eq!(nav.local_name(&doc), "q");
    assert!(nav.move_to_next_namespace(&doc));
    assert_eq!(nav.local_name(&doc), "p");
    assert!(!nav.move_to_next_namespace(&doc));
    assert!(nav.move_to_parent(&doc));

    // Local sees only this element's declarations
    assert!(nav.move_to_first_namespace(&doc, NamespaceScope::Local));
    assert_eq!(nav.local_name(&doc), "q");
    assert!(!nav.move_to_next_namespace(&doc));
}

#[test]
fn test_namespace_axis_inner_declaration_wins() {
    let doc =
        Document::parse("<a xmlns:p=\"urn:outer\"><b xmlns:p=\"urn:inner\"/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    let mut nav = Navigator::new(&doc, b).unwrap();
    assert!(nav.move_to_first_namespace(&doc, NamespaceScope::ExcludeXml));
    assert_eq!(nav.local_name(&doc), "p");
    assert_eq!(nav.value(&doc), "urn:inner");
    assert!(!nav.move_to_next_namespace(&doc));
}

#[test]
fn test_entity_reference_transparency() {
    let mut doc = Document::parse("<a>x</a>").unwrap();
    let a = doc.document_element().unwrap();
    // build an entity reference with expanded content, as a loader would
    let reference = doc.create_entity_reference("foo");
    let inner = doc.create_text("inside");
    doc.append_for_load(reference, inner).unwrap();
    doc.append(a, reference).unwrap();

    let mut nav = Navigator::new(&doc, a).unwrap();
    assert!(nav.move_to_first_child(&doc));
    assert_eq!(nav.value(&doc), "x");
    // the reference node is invisible; its content is walked instead
    assert!(nav.move_to_next_sibling(&doc));
    assert_eq!(nav.kind(&doc), XPathKind::Text);
    assert_eq!(nav.value(&doc), "inside");
    assert!(!nav.move_to_next_sibling(&doc));
    // the parent is the element, not the reference
    let mut up = nav.clone();
    assert!(up.move_to_parent(&doc));
    assert!(up.is_same_position(&Navigator::new(&doc, a).unwrap()));
    // and walking back crosses the reference boundary again
    assert!(nav.move_to_previous_sibling(&doc));
    assert_eq!(nav.value(&doc), "x");
    // string value sees through the reference
    assert_eq!(Navigator::new(&doc, a).unwrap().value(&doc), "xinside");
}

#[test]
fn test_entity_reference_subtree_is_read_only() {
    let mut doc = Document::parse("<a/>").unwrap();
    let a = doc.document_element().unwrap();
    let reference = doc.create_entity_reference("foo");
    let inner = doc.create_text("inside");
    doc.append_for_load(reference, inner).unwrap();
    doc.append(a, reference).unwrap();
    let more = doc.create_text("more");
    assert!(matches!(
        doc.append(reference, more),
        Err(Error::ReadOnly(_))
    ));
    assert!(matches!(doc.remove(inner), Err(Error::ReadOnly(_))));
}

#[test]
fn test_navigator_rejects_non_model_nodes() {
    let mut doc = Document::parse("<a/>").unwrap();
    let doctype = doc.create_document_type("a", None, None, None);
    assert!(matches!(
        Navigator::new(&doc, doctype),
        Err(Error::InvalidOperation(_))
    ));
}

#[test]
fn test_compare_position() {
    let doc = Document::parse("<a x=\"1\" xmlns:p=\"urn:x\"><b/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    let element = Navigator::new(&doc, a).unwrap();
    let child = Navigator::new(&doc, b).unwrap();
    let mut attribute = Navigator::new(&doc, a).unwrap();
    assert!(attribute.move_to_first_attribute(&doc));
    let mut namespace = Navigator::new(&doc, a).unwrap();
    assert!(namespace.move_to_first_namespace(&doc, NamespaceScope::Local));

    assert_eq!(element.compare_position(&doc, &child), Comparison::Before);
    // element, then namespaces, then attributes
    assert_eq!(
        element.compare_position(&doc, &namespace),
        Comparison::Before
    );
    assert_eq!(
        namespace.compare_position(&doc, &attribute),
        Comparison::Before
    );
    assert_eq!(
        attribute.compare_position(&doc, &element),
        Comparison::After
    );
    // attributes and namespaces precede the element's children
    assert_eq!(attribute.compare_position(&doc, &child), Comparison::Before);
    assert_eq!(
        attribute.compare_position(&doc, &attribute),
        Comparison::Same
    );
    // descendant checks count attributes as inside their element
    assert!(element.is_descendant(&doc, &attribute));
    assert!(element.is_descendant(&doc, &child));
    assert!(!child.is_descendant(&doc, &element));
}

#[test]
fn test_move_to_root() {
    let doc = Document::parse("<a><b><c/></b></a>").unwrap();
    let a = doc.document_element().unwrap();
    let c = doc.first_child(doc.first_child(a).unwrap()).unwrap();
    let mut nav = Navigator::new(&doc, c).unwrap();
    nav.move_to_root(&doc);
    assert_eq!(nav.kind(&doc), XPathKind::Root);
    assert!(nav.is_same_position(&Navigator::new(&doc, doc.root()).unwrap()));
}

#[test]
fn test_delete_self_repositions_to_parent() {
    let mut doc = Document::parse("<a><b/><c/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    let mut nav = Navigator::new(&doc, b).unwrap();
    nav.delete_self(&mut doc).unwrap();
    assert!(nav.is_same_position(&Navigator::new(&doc, a).unwrap()));
    assert_eq!(doc.to_string(a).unwrap(), "<a><c/></a>");
}

#[test]
fn test_delete_range() {
    let mut doc = Document::parse("<a><b/><c/><d/><e/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let children: Vec<_> = doc.children(a).collect();
    let mut nav = Navigator::new(&doc, children[1]).unwrap();
    let end = Navigator::new(&doc, children[2]).unwrap();
    nav.delete_range(&mut doc, &end).unwrap();
    assert_eq!(doc.to_string(a).unwrap(), "<a><b/><e/></a>");
    assert!(nav.is_same_position(&Navigator::new(&doc, a).unwrap()));
}

#[test]
fn test_delete_range_end_must_follow() {
    let mut doc = Document::parse("<a><b/><c/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    let c = doc.next_sibling(b).unwrap();
    let mut nav = Navigator::new(&doc, c).unwrap();
    let end = Navigator::new(&doc, b).unwrap();
    assert!(matches!(
        nav.delete_range(&mut doc, &end),
        Err(Error::InvalidPosition(_))
    ));
    // nothing was deleted
    assert_eq!(doc.to_string(a).unwrap(), "<a><b/><c/></a>");
}
