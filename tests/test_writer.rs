use xdom::{Document, Error, Navigator};

#[test]
fn test_append_child() {
    let mut doc = Document::parse("<doc><existing/></doc>").unwrap();
    let root_el = doc.document_element().unwrap();
    let item = doc.add_name("item");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(item).unwrap();
    writer.write_string("one").unwrap();
    writer.write_end_element().unwrap();
    writer.write_start_element(item).unwrap();
    writer.write_end_element().unwrap();
    let first = writer.close().unwrap().unwrap();
    assert_eq!(
        doc.to_string(root_el).unwrap(),
        "<doc><existing/><item>one</item><item/></doc>"
    );
    let children: Vec<_> = doc.children(root_el).collect();
    assert_eq!(first, children[1]);
}

#[test]
fn test_prepend_child() {
    let mut doc = Document::parse("<doc><existing/></doc>").unwrap();
    let root_el = doc.document_element().unwrap();
    let item = doc.add_name("item");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.prepend_child(&mut doc).unwrap();
    writer.write_start_element(item).unwrap();
    writer.close().unwrap();
    assert_eq!(
        doc.to_string(root_el).unwrap(),
        "<doc><item/><existing/></doc>"
    );
}

#[test]
fn test_insert_before_and_after() {
    let mut doc = Document::parse("<doc><mid/></doc>").unwrap();
    let root_el = doc.document_element().unwrap();
    let mid = doc.first_child(root_el).unwrap();
    let before = doc.add_name("before");
    let after = doc.add_name("after");

    let mut nav = Navigator::new(&doc, mid).unwrap();
    let mut writer = nav.insert_before(&mut doc).unwrap();
    writer.write_start_element(before).unwrap();
    writer.close().unwrap();

    let mut writer = nav.insert_after(&mut doc).unwrap();
    writer.write_start_element(after).unwrap();
    writer.close().unwrap();

    assert_eq!(
        doc.to_string(root_el).unwrap(),
        "<doc><before/><mid/><after/></doc>"
    );
}

#[test]
fn test_close_auto_closes_open_elements() {
    let mut doc = Document::parse("<doc/>").unwrap();
    let root_el = doc.document_element().unwrap();
    let outer = doc.add_name("outer");
    let inner = doc.add_name("inner");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(outer).unwrap();
    writer.write_start_element(inner).unwrap();
    writer.write_string("deep").unwrap();
    // no write_end_element calls
    writer.close().unwrap();
    assert_eq!(
        doc.to_string(root_el).unwrap(),
        "<doc><outer><inner>deep</inner></outer></doc>"
    );
}

#[test]
fn test_nothing_written_means_no_change() {
    let mut doc = Document::parse("<doc><a/></doc>").unwrap();
    let root_el = doc.document_element().unwrap();
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let writer = nav.append_child(&mut doc).unwrap();
    assert_eq!(writer.close().unwrap(), None);
    assert_eq!(doc.to_string(root_el).unwrap(), "<doc><a/></doc>");
}

#[test]
fn test_abort_leaves_tree_untouched() {
    let mut doc = Document::parse("<doc/>").unwrap();
    let root_el = doc.document_element().unwrap();
    let item = doc.add_name("item");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(item).unwrap();
    writer.write_string("staged").unwrap();
    writer.abort();
    assert_eq!(doc.to_string(root_el).unwrap(), "<doc/>");
}

#[test]
fn test_error_state_close_is_a_no_op() {
    let mut doc = Document::parse("<doc/>").unwrap();
    let root_el = doc.document_element().unwrap();
    let item = doc.add_name("item");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(item).unwrap();
    writer.write_end_element().unwrap();
    // a second end has nothing to close
    assert!(matches!(
        writer.write_end_element(),
        Err(Error::InvalidOperation(_))
    ));
    // the writer is now poisoned
    assert!(matches!(
        writer.write_string("late"),
        Err(Error::InvalidOperation(_))
    ));
    assert_eq!(writer.close().unwrap(), None);
    assert_eq!(doc.to_string(root_el).unwrap(), "<doc/>");
}

#[test]
fn test_attributes_on_open_element() {
    let mut doc = Document::parse("<doc/>").unwrap();
    let root_el = doc.document_element().unwrap();
    let item = doc.add_name("item");
    let x = doc.add_name("x");
    let y = doc.add_name("y");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(item).unwrap();
    writer.write_attribute(x, "1").unwrap();
    writer.write_start_attribute(y).unwrap();
    writer.write_string("2").unwrap();
    writer.write_end_attribute().unwrap();
    writer.close().unwrap();
    assert_eq!(
        doc.to_string(root_el).unwrap(),
        "<doc><item x=\"1\" y=\"2\"/></doc>"
    );
}

#[test]
fn test_duplicate_attribute_on_open_element() {
    let mut doc = Document::parse("<doc/>").unwrap();
    let root_el = doc.document_element().unwrap();
    let item = doc.add_name("item");
    let x = doc.add_name("x");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(item).unwrap();
    writer.write_attribute(x, "1").unwrap();
    assert!(matches!(
        writer.write_attribute(x, "2"),
        Err(Error::DuplicateAttribute(_))
    ));
    assert_eq!(writer.close().unwrap(), None);
    assert_eq!(doc.to_string(root_el).unwrap(), "<doc/>");
}

#[test]
fn test_attribute_after_content_is_rejected() {
    let mut doc = Document::parse("<doc/>").unwrap();
    let root_el = doc.document_element().unwrap();
    let item = doc.add_name("item");
    let x = doc.add_name("x");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(item).unwrap();
    writer.write_string("content").unwrap();
    // the start tag is closed once content flows
    assert!(matches!(
        writer.write_attribute(x, "1"),
        Err(Error::InvalidOperation(_))
    ));
    assert_eq!(writer.close().unwrap(), None);
}

#[test]
fn test_attribute_after_child_element_is_rejected() {
    let mut doc = Document::parse("<doc/>").unwrap();
    let root_el = doc.document_element().unwrap();
    let outer = doc.add_name("outer");
    let inner = doc.add_name("inner");
    let x = doc.add_name("x");
    let mut nav = Navigator::new(&doc, root_el).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(outer).unwrap();
    writer.write_start_element(inner).unwrap();
    writer.write_end_element().unwrap();
    // back inside outer, whose start tag closed when inner opened
    assert!(matches!(
        writer.write_attribute(x, "1"),
        Err(Error::InvalidOperation(_))
    ));
}

#[test]
fn test_prolog_after_content_is_rejected() {
    let mut doc = Document::new();
    let root = doc.root();
    let a = doc.add_name("a");
    let mut nav = Navigator::new(&doc, root).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_start_element(a).unwrap();
    writer.write_end_element().unwrap();
    assert!(matches!(
        writer.write_xml_declaration("1.0", None, None),
        Err(Error::InvalidOperation(_))
    ));
    writer.abort();
    assert!(doc.document_element().is_none());
}

#[test]
fn test_create_attributes() {
    let mut doc = Document::parse("<a/>").unwrap();
    let a = doc.document_element().unwrap();
    let x = doc.add_name("x");
    let y = doc.add_name("y");
    let mut nav = Navigator::new(&doc, a).unwrap();
    let mut writer = nav.create_attributes(&mut doc).unwrap();
    writer.write_attribute(x, "1").unwrap();
    writer.write_attribute(y, "2").unwrap();
    writer.close().unwrap();
    assert_eq!(doc.to_string(a).unwrap(), "<a x=\"1\" y=\"2\"/>");
}

#[test]
fn test_create_attributes_duplicate_id_fails_on_close() {
    let mut doc = Document::parse("<a/>").unwrap();
    let a = doc.document_element().unwrap();
    let id = doc.add_name("id");
    let mut nav = Navigator::new(&doc, a).unwrap();
    let mut writer = nav.create_attributes(&mut doc).unwrap();
    // both stage fine; the clash surfaces when they are attached
    writer.write_attribute(id, "5").unwrap();
    writer.write_attribute(id, "5").unwrap();
    assert!(matches!(
        writer.close(),
        Err(Error::DuplicateAttribute(_))
    ));
}

#[test]
fn test_create_attributes_rejects_content() {
    let mut doc = Document::parse("<a/>").unwrap();
    let a = doc.document_element().unwrap();
    let item = doc.add_name("item");
    let mut nav = Navigator::new(&doc, a).unwrap();
    let mut writer = nav.create_attributes(&mut doc).unwrap();
    assert!(matches!(
        writer.write_start_element(item),
        Err(Error::InvalidOperation(_))
    ));
}

#[test]
fn test_attribute_value_with_entity_reference() {
    let mut doc = Document::parse("<a/>").unwrap();
    let a = doc.document_element().unwrap();
    let x = doc.add_name("x");
    let mut nav = Navigator::new(&doc, a).unwrap();
    let mut writer = nav.create_attributes(&mut doc).unwrap();
    writer.write_start_attribute(x).unwrap();
    writer.write_string("pre ").unwrap();
    writer.write_entity_ref("thing").unwrap();
    writer.write_end_attribute().unwrap();
    writer.close().unwrap();
    assert_eq!(doc.to_string(a).unwrap(), "<a x=\"pre &thing;\"/>");
}

#[test]
fn test_replace_range() {
    let mut doc = Document::parse("<a><b/><c/><d/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let children: Vec<_> = doc.children(a).collect();
    let replacement = doc.add_name("e");
    let mut nav = Navigator::new(&doc, children[0]).unwrap();
    let end = Navigator::new(&doc, children[1]).unwrap();
    let mut writer = nav.replace_range(&mut doc, &end).unwrap();
    writer.write_start_element(replacement).unwrap();
    writer.write_end_element().unwrap();
    let first = writer.close().unwrap().unwrap();
    assert_eq!(doc.to_string(a).unwrap(), "<a><e/><d/></a>");
    // the navigator moved onto the first replacement node
    assert!(nav.is_same_position(&Navigator::new(&doc, first).unwrap()));
    assert_eq!(nav.local_name(&doc), "e");
}

#[test]
fn test_replace_range_can_swap_the_document_element() {
    let mut doc = Document::parse("<old/>").unwrap();
    let old = doc.document_element().unwrap();
    let new = doc.add_name("new");
    let mut nav = Navigator::new(&doc, old).unwrap();
    let end = nav.clone();
    let mut writer = nav.replace_range(&mut doc, &end).unwrap();
    writer.write_start_element(new).unwrap();
    let first = writer.close().unwrap().unwrap();
    assert_eq!(doc.to_string(doc.root()).unwrap(), "<new/>");
    assert_eq!(doc.document_element(), Some(first));
}

#[test]
fn test_replace_range_keeps_one_element_cardinality() {
    // the replacement may reuse the removed element's slot, but two staged
    // elements still overflow it
    let mut doc = Document::parse("<old/>").unwrap();
    let old = doc.document_element().unwrap();
    let new = doc.add_name("new");
    let mut nav = Navigator::new(&doc, old).unwrap();
    let end = nav.clone();
    let mut writer = nav.replace_range(&mut doc, &end).unwrap();
    writer.write_start_element(new).unwrap();
    writer.write_end_element().unwrap();
    writer.write_start_element(new).unwrap();
    writer.write_end_element().unwrap();
    assert!(matches!(writer.close(), Err(Error::InvalidPosition(_))));
    assert_eq!(doc.to_string(doc.root()).unwrap(), "<old/>");
}

#[test]
fn test_replace_range_end_must_follow() {
    let mut doc = Document::parse("<a><b/><c/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    let c = doc.next_sibling(b).unwrap();
    let mut nav = Navigator::new(&doc, c).unwrap();
    let end = Navigator::new(&doc, b).unwrap();
    assert!(matches!(
        nav.replace_range(&mut doc, &end),
        Err(Error::InvalidPosition(_))
    ));
    assert_eq!(doc.to_string(a).unwrap(), "<a><b/><c/></a>");
}

#[test]
fn test_replace_range_needs_content() {
    let mut doc = Document::parse("<a><b/><c/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    let mut nav = Navigator::new(&doc, b).unwrap();
    let end = nav.clone();
    let writer = nav.replace_range(&mut doc, &end).unwrap();
    assert!(matches!(writer.close(), Err(Error::InvalidPosition(_))));
    // the tree is untouched
    assert_eq!(doc.to_string(a).unwrap(), "<a><b/><c/></a>");
}

#[test]
fn test_write_prolog_into_empty_document() {
    let mut doc = Document::new();
    let root = doc.root();
    let html = doc.add_name("html");
    let mut nav = Navigator::new(&doc, root).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer
        .write_xml_declaration("1.0", Some("UTF-8"), None)
        .unwrap();
    writer
        .write_document_type("html", None, None, None)
        .unwrap();
    writer.write_start_element(html).unwrap();
    writer.close().unwrap();
    assert_eq!(
        doc.to_string(root).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><!DOCTYPE html><html/>"
    );
}

#[test]
fn test_writer_validates_against_root_constraints() {
    let mut doc = Document::parse("<a/>").unwrap();
    let root = doc.root();
    let mut nav = Navigator::new(&doc, root).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    // staging accepts it; the splice does not
    writer.write_document_type("a", None, None, None).unwrap();
    assert!(matches!(writer.close(), Err(Error::InvalidPosition(_))));
    assert_eq!(doc.to_string(root).unwrap(), "<a/>");
}

#[test]
fn test_failed_close_leaves_no_partial_splice() {
    let mut doc = Document::parse("<a/>").unwrap();
    let root = doc.root();
    let b = doc.add_name("b");
    let mut nav = Navigator::new(&doc, root).unwrap();
    let mut writer = nav.append_child(&mut doc).unwrap();
    writer.write_comment("note").unwrap();
    writer.write_start_element(b).unwrap();
    // the second document element fails the close; the comment written
    // before it must not land either
    assert!(matches!(writer.close(), Err(Error::InvalidPosition(_))));
    assert_eq!(doc.to_string(root).unwrap(), "<a/>");
}

#[test]
fn test_siblings_of_root_are_rejected() {
    let mut doc = Document::parse("<a/>").unwrap();
    let root = doc.root();
    let mut nav = Navigator::new(&doc, root).unwrap();
    assert!(matches!(
        nav.insert_before(&mut doc),
        Err(Error::InvalidOperation(_))
    ));
}
