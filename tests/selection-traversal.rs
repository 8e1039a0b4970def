mod data;

use data::{data, ids, DATA_FILE};
use qpath::{qp, qp_select, Error, Node};

#[test]
fn test_find() {
    let mut sel = data();
    sel.find("li").unwrap();
    assert_eq!(sel.size(), 5);
    assert_eq!(ids(&sel), vec!["one", "two", "three", "four", "five"]);
}

#[test]
fn test_find_by_id() {
    let mut sel = data();
    sel.find("#one").unwrap();
    assert_eq!(sel.size(), 1);
    assert_eq!(sel.tag(), "li");
}

#[test]
fn test_find_not_self() {
    let mut sel = qp_select(DATA_FILE, "inner").unwrap();
    sel.find("inner").unwrap();
    assert_eq!(sel.size(), 0);
}

#[test]
fn test_find_dedupes_nested_roots() {
    let mut sel = data();
    sel.find("*").unwrap().find("li").unwrap();
    assert_eq!(sel.size(), 5);
}

#[test]
fn test_find_invalid() {
    let mut sel = data();
    assert!(matches!(sel.find(":+ ^"), Err(Error::Selector { .. })));
    assert_eq!(sel.size(), 1);
}

#[test]
fn test_children() {
    let mut sel = qp_select(DATA_FILE, "#inner-one").unwrap();
    sel.children(None).unwrap();
    assert_eq!(sel.size(), 4);

    sel.end().children(Some("#two")).unwrap();
    assert_eq!(ids(&sel), vec!["two"]);
}

#[test]
fn test_contents() {
    let mut sel = qp_select(DATA_FILE, "#inner-one").unwrap();
    sel.contents();
    assert_eq!(sel.size(), 9);
    assert!(sel.first().unwrap().is_text());
}

#[test]
fn test_parent() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.parent(None).unwrap();
    assert_eq!(ids(&sel), vec!["inner-one", "inner-two"]);

    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.parent(Some("root")).unwrap();
    assert_eq!(sel.size(), 1);
    assert_eq!(sel.tag(), "root");
}

#[test]
fn test_parent_of_document_element() {
    let mut sel = data();
    sel.parent(None).unwrap();
    assert_eq!(sel.size(), 0);
}

#[test]
fn test_parents() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.parents(None).unwrap();
    assert_eq!(sel.size(), 3);
    assert_eq!(sel.tag(), "root");

    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.parents(Some("root")).unwrap();
    assert_eq!(sel.size(), 1);
    assert_eq!(sel.tag(), "root");
}

#[test]
fn test_closest() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.closest("inner").unwrap();
    assert_eq!(sel.size(), 2);

    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.closest("li").unwrap();
    assert_eq!(sel.size(), 5);

    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.closest("nothing").unwrap();
    assert_eq!(sel.size(), 0);
}

#[test]
fn test_siblings() {
    let mut sel = qp_select(DATA_FILE, "#one").unwrap();
    sel.siblings(None).unwrap();
    assert_eq!(ids(&sel), vec!["two", "three", "four"]);

    let mut sel = qp_select(DATA_FILE, "#one").unwrap();
    sel.siblings(Some("#three")).unwrap();
    assert_eq!(ids(&sel), vec!["three"]);

    let mut sel = qp_select(DATA_FILE, "#five").unwrap();
    sel.siblings(None).unwrap();
    assert_eq!(sel.size(), 0);
}

#[test]
fn test_next_and_prev() {
    let mut sel = qp_select(DATA_FILE, "#one").unwrap();
    sel.next(None).unwrap();
    assert_eq!(ids(&sel), vec!["two"]);

    let mut sel = qp_select(DATA_FILE, "#one").unwrap();
    sel.next(Some("#four")).unwrap();
    assert_eq!(ids(&sel), vec!["four"]);

    let mut sel = qp_select(DATA_FILE, "#four").unwrap();
    sel.next(None).unwrap();
    assert_eq!(sel.size(), 0);

    let mut sel = qp_select(DATA_FILE, "#three").unwrap();
    sel.prev(None).unwrap();
    assert_eq!(ids(&sel), vec!["two"]);

    let mut sel = qp_select(DATA_FILE, "#four").unwrap();
    sel.prev(Some("#one")).unwrap();
    assert_eq!(ids(&sel), vec!["one"]);
}

#[test]
fn test_next_all_and_prev_all() {
    let mut sel = qp_select(DATA_FILE, "#two").unwrap();
    sel.next_all(None).unwrap();
    assert_eq!(ids(&sel), vec!["three", "four"]);

    let mut sel = qp_select(DATA_FILE, "#three").unwrap();
    sel.prev_all(None).unwrap();
    assert_eq!(ids(&sel), vec!["one", "two"]);

    let mut sel = qp_select(DATA_FILE, "#one").unwrap();
    sel.next_all(Some("#two, #four")).unwrap();
    assert_eq!(ids(&sel), vec!["two", "four"]);
}

#[test]
fn test_deepest() {
    let mut sel = data();
    sel.deepest();
    assert_eq!(sel.size(), 6);
    assert_eq!(sel.tag(), "title");

    let mut sel = qp("<?xml version=\"1.0\"?><root>Only text</root>").unwrap();
    sel.deepest();
    assert_eq!(sel.size(), 1);
    assert_eq!(sel.tag(), "root");
}

#[test]
fn test_filter() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.filter("#two, #four").unwrap();
    assert_eq!(ids(&sel), vec!["two", "four"]);
}

#[test]
fn test_filter_callback() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.filter_callback(|i: usize, _: &Node| i % 2 == 0).unwrap();
    assert_eq!(ids(&sel), vec!["one", "three", "five"]);
}

#[test]
fn test_map_keeps_duplicates() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.map(|_: usize, node: &Node| node.parent()).unwrap();
    assert_eq!(sel.size(), 5);
    assert_eq!(
        ids(&sel),
        vec!["inner-one", "inner-one", "inner-one", "inner-one", "inner-two"]
    );
}

#[test]
fn test_slice() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.slice(1, Some(2));
    assert_eq!(ids(&sel), vec!["two", "three"]);

    sel.end().slice(3, None);
    assert_eq!(ids(&sel), vec!["four", "five"]);

    sel.end().slice(10, Some(2));
    assert_eq!(sel.size(), 0);
}

#[test]
fn test_end_and_and_self() {
    let mut sel = data();
    sel.find("inner").unwrap().find("li").unwrap().and_self();
    assert_eq!(sel.size(), 7);

    sel.end();
    assert_eq!(sel.size(), 2);
    sel.end();
    assert_eq!(sel.size(), 1);
    assert_eq!(sel.tag(), "root");

    sel.end();
    assert_eq!(sel.size(), 1);
    assert_eq!(sel.tag(), "root");
}

#[test]
fn test_and_self_keeps_document_order() {
    let mut sel = qp_select(DATA_FILE, "#three").unwrap();
    sel.prev_all(None).unwrap().and_self();
    assert_eq!(ids(&sel), vec!["one", "two", "three"]);
}

#[test]
fn test_top() {
    let mut sel = data();
    sel.find("li").unwrap().top(None).unwrap();
    assert_eq!(sel.size(), 1);
    assert_eq!(sel.tag(), "root");

    sel.find("#one").unwrap().top(Some("li")).unwrap();
    assert_eq!(sel.size(), 5);

    sel.end();
    assert_eq!(sel.size(), 5);
}

#[test]
fn test_branch() {
    let mut sel = data();
    let branch = sel.branch(Some("li")).unwrap();
    assert_eq!(branch.size(), 5);
    assert_eq!(sel.size(), 1);

    sel.find("li").unwrap();
    let mut copy = sel.clone();
    copy.end();
    assert_eq!(copy.size(), 5);
    assert!(copy.document().same(sel.document()));
}

#[test]
fn test_iter() {
    let mut sel = data();
    sel.find("li").unwrap();

    let singles: Vec<_> = sel.iter().collect();
    assert_eq!(singles.len(), 5);
    assert!(singles.iter().all(|single| single.size() == 1));
    assert_eq!(singles[3].attr("id").as_deref(), Some("four"));
}

#[test]
fn test_iter_snapshot() {
    let mut sel = data();
    sel.find("li").unwrap();

    let mut seen = 0;
    for mut single in sel.iter() {
        single.after("<li/>").unwrap();
        seen += 1;
    }
    assert_eq!(seen, 5);
    assert_eq!(sel.size(), 5);
    assert_eq!(sel.top(Some("li")).unwrap().size(), 10);
}
