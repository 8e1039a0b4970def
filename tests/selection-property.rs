mod data;

use data::{data, ids, page, DATA_FILE};
use qpath::{qp_select, Node, ELEMENT_NODE, TEXT_NODE};

#[test]
fn test_attr() {
    let sel = qp_select(DATA_FILE, "unary").unwrap();
    assert_eq!(sel.attr("a").as_deref(), Some("b"));
    assert_eq!(sel.attr("missing"), None);

    let empty = qp_select(DATA_FILE, "nothing").unwrap();
    assert_eq!(empty.attr("a"), None);
}

#[test]
fn test_attr_node_type() {
    let mut sel = qp_select(DATA_FILE, "#inner-one").unwrap();
    assert_eq!(sel.attr("nodeType"), Some(ELEMENT_NODE.to_string()));

    sel.contents();
    assert_eq!(sel.attr("nodeType"), Some(TEXT_NODE.to_string()));
}

#[test]
fn test_set_attr() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.set_attr("lang", "en");
    assert!(sel.has_attr("lang"));
    assert_eq!(sel.eq(4).attr("lang").as_deref(), Some("en"));

    sel.set_attr("id", "same");
    assert_eq!(sel.document().select("#same").unwrap().len(), 5);
}

#[test]
fn test_set_attrs() {
    let mut sel = qp_select(DATA_FILE, "#one").unwrap();
    sel.set_attrs(vec![("a", "1"), ("b", "2")]);
    assert_eq!(sel.attr("a").as_deref(), Some("1"));
    assert_eq!(sel.attr("b").as_deref(), Some("2"));

    let pairs = vec![("a".to_string(), "3".to_string())];
    sel.set_attrs(pairs);
    assert_eq!(sel.attr("a").as_deref(), Some("3"));
}

#[test]
fn test_has_attr() {
    let sel = qp_select(DATA_FILE, "inner").unwrap();
    assert!(sel.has_attr("id"));
    assert!(!sel.has_attr("class"));
    assert!(!qp_select(DATA_FILE, "nothing").unwrap().has_attr("id"));
}

#[test]
fn test_remove_attr() {
    let mut sel = qp_select(DATA_FILE, "inner").unwrap();
    sel.remove_attr("class").remove_attr("id");
    assert!(!sel.has_attr("id"));
    assert_eq!(sel.document().select(".innerClass").unwrap().len(), 0);
}

#[test]
fn test_val() {
    let mut sel = page();
    sel.find("input[name=mail]").unwrap();
    assert_eq!(sel.val(), None);

    sel.set_val("me@example.com");
    assert_eq!(sel.val().as_deref(), Some("me@example.com"));
}

#[test]
fn test_css() {
    let mut sel = qp_select(DATA_FILE, "#one").unwrap();
    assert_eq!(sel.css(), None);

    sel.set_css("foo", "bar");
    assert_eq!(sel.css().as_deref(), Some("foo: bar"));

    sel.set_css("color", "red");
    assert_eq!(sel.css().as_deref(), Some("foo: bar; color: red"));

    sel.set_css("foo", "baz");
    assert_eq!(sel.css().as_deref(), Some("foo: baz; color: red"));

    sel.set_css_map(vec![("margin", "0"), ("color", "blue")]);
    assert_eq!(sel.css().as_deref(), Some("foo: baz; color: blue; margin: 0"));
}

#[test]
fn test_classes() {
    let mut sel = qp_select(DATA_FILE, "inner").unwrap();
    assert!(sel.has_class("innerClass"));

    sel.add_class("extra").add_class("extra");
    assert_eq!(sel.attr("class").as_deref(), Some("innerClass extra"));
    assert_eq!(sel.eq(1).attr("class").as_deref(), Some("extra"));

    sel.remove_class("innerClass");
    assert_eq!(sel.attr("class").as_deref(), Some("extra"));

    sel.remove_class("extra");
    assert!(!sel.has_attr("class"));
    assert!(!sel.has_class("extra"));
}

#[test]
fn test_has_class_checks_first_node() {
    let mut sel = qp_select(DATA_FILE, "inner").unwrap();
    sel.slice(1, None);
    assert!(!sel.has_class("innerClass"));
}

#[test]
fn test_tag() {
    let mut sel = data();
    assert_eq!(sel.tag(), "root");

    sel.find("nothing").unwrap();
    assert_eq!(sel.tag(), "");
}

#[test]
fn test_text() {
    let sel = qp_select(DATA_FILE, "li").unwrap();
    assert_eq!(sel.text(), "HelloGoodbyeHiByeYo");

    let head = qp_select(DATA_FILE, "head").unwrap();
    assert_eq!(head.text(), "This is the title");
}

#[test]
fn test_text_in_document_order() {
    let mut sel = qp_select(DATA_FILE, "#one, #two").unwrap();
    let reversed: Vec<Node> = sel.nodes().iter().rev().cloned().collect();
    sel.map(move |i: usize, _: &Node| reversed[i].clone()).unwrap();

    assert_eq!(ids(&sel), vec!["two", "one"]);
    assert_eq!(sel.text(), "HelloGoodbye");
}

#[test]
fn test_set_text() {
    let mut sel = qp_select(DATA_FILE, "#inner-one").unwrap();
    sel.set_text("<escaped> & plain");
    assert_eq!(sel.text(), "<escaped> & plain");

    sel.contents();
    assert_eq!(sel.size(), 1);
    assert_eq!(sel.attr("nodeType"), Some(TEXT_NODE.to_string()));
}

#[test]
fn test_text_implode() {
    let sel = qp_select(DATA_FILE, "li").unwrap();
    assert_eq!(sel.text_implode(", ", false), "Hello, Goodbye, Hi, Bye, Yo");

    let inner = qp_select(DATA_FILE, "#inner-one, head").unwrap();
    assert_eq!(inner.text_implode("|", true), "");

    let mut mixed = qp_select(DATA_FILE, "#inner-one").unwrap();
    mixed.add("head > title").unwrap();
    assert_eq!(mixed.text_implode("|", true), "This is the title");
    assert_eq!(mixed.text_implode("|", false).split('|').count(), 2);
}

#[test]
fn test_text_on_html() {
    let mut sel = page();
    sel.find("p.intro").unwrap();
    assert_eq!(sel.text(), "Hello world");
    assert_eq!(sel.text_implode("", false), "Hello ");
}
