use rstest::rstest;
use xdom::{Document, Error, ValueType};

#[rstest]
#[case("<a/>")]
#[case("<a></a>")]
#[case("<a><b/>text</a>")]
#[case("<a x=\"1\" y=\"2\"/>")]
#[case("<a>\n  <b/>\n</a>")]
#[case("<?xml version=\"1.0\"?><a/>")]
#[case("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?><a/>")]
#[case("<!DOCTYPE a><a/>")]
#[case("<!DOCTYPE a SYSTEM \"a.dtd\"><a/>")]
#[case("<a><![CDATA[1 < 2]]></a>")]
#[case("<a>x&amp;y</a>")]
#[case("<a>1 &lt; 2</a>")]
#[case("<a x=\"say &quot;hi&quot;\"/>")]
#[case("<a><!--note--></a>")]
#[case("<a><?pi data?></a>")]
#[case("<a><?pi?></a>")]
#[case("<a xmlns=\"urn:x\"><b p=\"q\"/></a>")]
#[case("<p:a xmlns:p=\"urn:x\"><p:b/></p:a>")]
#[case("<a>&foo;</a>")]
#[case("<a x=\"&foo;\"/>")]
fn test_roundtrip(#[case] xml: &str) {
    let doc = Document::parse(xml).unwrap();
    assert_eq!(doc.to_string(doc.root()).unwrap(), xml);
}

#[test]
fn test_empty_and_open_tags_are_remembered() {
    let doc = Document::parse("<a><b/><c></c></a>").unwrap();
    let a = doc.document_element().unwrap();
    assert_eq!(doc.to_string(a).unwrap(), "<a><b/><c></c></a>");
}

#[test]
fn test_whitespace_between_markup() {
    let doc = Document::parse("<a>\n  <b/>\n</a>").unwrap();
    let a = doc.document_element().unwrap();
    let children: Vec<_> = doc.children(a).collect();
    assert_eq!(children.len(), 3);
    assert_eq!(doc.value_type(children[0]), ValueType::Whitespace);
    assert_eq!(doc.value_type(children[1]), ValueType::Element);
    assert_eq!(doc.value_type(children[2]), ValueType::Whitespace);
}

#[test]
fn test_namespace_resolution() {
    let doc = Document::parse("<a xmlns=\"urn:x\" xmlns:p=\"urn:y\"><p:b/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    let a_name = doc.name_ref(doc.node_name(a).unwrap());
    assert_eq!(a_name.local(), "a");
    assert_eq!(a_name.namespace(), "urn:x");
    let b_name = doc.name_ref(doc.node_name(b).unwrap());
    assert_eq!(b_name.prefix(), "p");
    assert_eq!(b_name.namespace(), "urn:y");
    // declarations are kept as attributes
    assert_eq!(doc.attributes(a).len(), 2);
}

#[test]
fn test_unknown_prefix() {
    assert!(matches!(
        Document::parse("<p:a/>"),
        Err(Error::UnknownPrefix(p)) if p == "p"
    ));
}

#[test]
fn test_mismatched_close_tag() {
    assert!(matches!(
        Document::parse("<a><b></a></b>"),
        Err(Error::MismatchedCloseTag(_))
    ));
}

#[test]
fn test_unclosed_element() {
    assert!(Document::parse("<a><b>").is_err());
}

#[test]
fn test_duplicate_attribute_in_source() {
    assert!(matches!(
        Document::parse("<a x=\"1\" x=\"2\"/>"),
        Err(Error::DuplicateAttribute(_))
    ));
}

#[test]
fn test_predefined_entities_decode() {
    let doc = Document::parse("<a>&lt;tag&gt; &amp; &quot;q&quot; &apos;a&apos;</a>").unwrap();
    let a = doc.document_element().unwrap();
    let text = doc.first_child(a).unwrap();
    assert_eq!(doc.text_str(text), Some("<tag> & \"q\" 'a'"));
}

#[test]
fn test_character_references_decode() {
    let doc = Document::parse("<a>&#65;&#x42;</a>").unwrap();
    let a = doc.document_element().unwrap();
    let text = doc.first_child(a).unwrap();
    assert_eq!(doc.text_str(text), Some("AB"));
}

#[test]
fn test_unknown_entity_becomes_reference_node() {
    let doc = Document::parse("<a>x&foo;y</a>").unwrap();
    let a = doc.document_element().unwrap();
    let children: Vec<_> = doc.children(a).collect();
    assert_eq!(children.len(), 3);
    assert_eq!(doc.value_type(children[0]), ValueType::Text);
    assert_eq!(doc.value_type(children[1]), ValueType::EntityReference);
    assert_eq!(doc.value_type(children[2]), ValueType::Text);
    assert_eq!(doc.to_string(a).unwrap(), "<a>x&foo;y</a>");
}

#[test]
fn test_attribute_entity_reference() {
    let doc = Document::parse("<a x=\"pre &foo; post\"/>").unwrap();
    let a = doc.document_element().unwrap();
    let x = doc.name("x").unwrap();
    let attribute = doc.attribute_node(a, x).unwrap();
    assert_eq!(doc.child_count(attribute), 3);
    // the string value concatenates around the reference
    assert_eq!(doc.attribute_text(attribute), "pre  post");
}

#[test]
fn test_doctype_fields() {
    let doc =
        Document::parse("<!DOCTYPE a PUBLIC \"-//X//EN\" \"a.dtd\"><a/>").unwrap();
    let doctype = doc.first_child(doc.root()).unwrap();
    assert_eq!(doc.value_type(doctype), ValueType::DocumentType);
    match doc.value(doctype) {
        xdom::Value::DocumentType(dt) => {
            assert_eq!(dt.name(), "a");
            assert_eq!(dt.public_id(), Some("-//X//EN"));
            assert_eq!(dt.system_id(), Some("a.dtd"));
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_xml_declaration_fields() {
    let doc =
        Document::parse("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?><a/>")
            .unwrap();
    let decl = doc.first_child(doc.root()).unwrap();
    match doc.value(decl) {
        xdom::Value::XmlDeclaration(d) => {
            assert_eq!(d.version(), "1.0");
            assert_eq!(d.encoding(), Some("UTF-8"));
            assert_eq!(d.standalone(), Some(false));
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_serialize_escapes_text_and_attributes() {
    let mut doc = Document::parse("<a/>").unwrap();
    let a = doc.document_element().unwrap();
    doc.append_text(a, "1 < 2 & 3 > 2").unwrap();
    let x = doc.add_name("x");
    doc.set_attribute(a, x, "say \"hi\" & <bye>").unwrap();
    assert_eq!(
        doc.to_string(a).unwrap(),
        "<a x=\"say &quot;hi&quot; &amp; &lt;bye&gt;\">1 &lt; 2 &amp; 3 &gt; 2</a>"
    );
}

#[test]
fn test_serialize_subtree_only() {
    let doc = Document::parse("<a><b>inner</b><c/></a>").unwrap();
    let a = doc.document_element().unwrap();
    let b = doc.first_child(a).unwrap();
    assert_eq!(doc.to_string(b).unwrap(), "<b>inner</b>");
}

#[test]
fn test_serialize_single_attribute_node() {
    let doc = Document::parse("<a x=\"1\"/>").unwrap();
    let a = doc.document_element().unwrap();
    let x = doc.attribute_node(a, doc.name("x").unwrap()).unwrap();
    assert_eq!(doc.to_string(x).unwrap(), " x=\"1\"");
}

#[test]
fn test_write_node_into_custom_sink() {
    // a sink that only collects element names
    struct Names(Vec<String>);
    impl xdom::XmlSink for Names {
        fn xml_declaration(
            &mut self,
            _: &str,
            _: Option<&str>,
            _: Option<bool>,
        ) -> Result<(), Error> {
            Ok(())
        }
        fn document_type(
            &mut self,
            _: &str,
            _: Option<&str>,
            _: Option<&str>,
            _: Option<&str>,
        ) -> Result<(), Error> {
            Ok(())
        }
        fn start_element(&mut self, name: &xdom::Name) -> Result<(), Error> {
            self.0.push(name.local().to_string());
            Ok(())
        }
        fn end_element(&mut self, _: &xdom::Name, _: bool) -> Result<(), Error> {
            Ok(())
        }
        fn start_attribute(&mut self, _: &xdom::Name) -> Result<(), Error> {
            Ok(())
        }
        fn end_attribute(&mut self) -> Result<(), Error> {
            Ok(())
        }
        fn text(&mut self, _: &str) -> Result<(), Error> {
            Ok(())
        }
        fn cdata(&mut self, _: &str) -> Result<(), Error> {
            Ok(())
        }
        fn comment(&mut self, _: &str) -> Result<(), Error> {
            Ok(())
        }
        fn processing_instruction(&mut self, _: &str, _: Option<&str>) -> Result<(), Error> {
            Ok(())
        }
        fn entity_reference(&mut self, _: &str) -> Result<(), Error> {
            Ok(())
        }
    }

    let doc = Document::parse("<a><b/><c><d/></c></a>").unwrap();
    let mut sink = Names(Vec::new());
    doc.write_node(doc.root(), &mut sink).unwrap();
    assert_eq!(sink.0, vec!["a", "b", "c", "d"]);
}
