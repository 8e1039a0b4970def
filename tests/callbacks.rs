mod data;

use data::{ids, DATA_FILE};
use qpath::{qp_select, register, Error, Flow, Mapped, Named, Node};

fn is_even(index: usize, _: &Node) -> bool {
    index % 2 == 0
}

fn first_child(_: usize, node: &Node) -> Mapped {
    node.first_child().into()
}

fn stop_at_three(_: usize, node: &Node) -> Flow {
    if node.attr("id").as_deref() == Some("three") {
        Flow::Break
    } else {
        node.set_attr("visited", "yes");
        Flow::Continue
    }
}

#[test]
fn test_filter_with_closure() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.filter_callback(|_: usize, node: &Node| node.text().len() <= 3)
        .unwrap();
    assert_eq!(ids(&sel), vec!["three", "four", "five"]);
}

#[test]
fn test_filter_with_named() {
    register("callbacks-even", is_even);

    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.filter_callback(Named::new("callbacks-even")).unwrap();
    assert_eq!(ids(&sel), vec!["one", "three", "five"]);
}

#[test]
fn test_map_with_named() {
    register("callbacks-first-child", first_child);

    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.map(Named::new("callbacks-first-child")).unwrap();
    assert_eq!(sel.size(), 5);
    assert!(sel.nodes().iter().all(Node::is_text));
    assert_eq!(sel.text(), "HelloGoodbyeHiByeYo");
}

#[test]
fn test_each_with_named() {
    register("callbacks-stop-at-three", stop_at_three);

    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.each(Named::new("callbacks-stop-at-three")).unwrap();

    let visited: Vec<bool> = sel.iter().map(|one| one.has_attr("visited")).collect();
    assert_eq!(visited, vec![true, true, false, false, false]);
}

#[test]
fn test_same_name_per_result_type() {
    fn keep_none(_: usize, _: &Node) -> bool {
        false
    }
    fn map_none(_: usize, _: &Node) -> Mapped {
        Mapped::Nothing
    }
    register("callbacks-shared", keep_none);
    register("callbacks-shared", map_none);

    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.filter_callback(Named::new("callbacks-shared")).unwrap();
    assert_eq!(sel.size(), 0);

    sel.end().map(Named::new("callbacks-shared")).unwrap();
    assert_eq!(sel.size(), 0);
}

#[test]
fn test_unknown_name() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    let result = sel.filter_callback(Named::<bool>::new("callbacks-missing"));
    assert!(matches!(result, Err(Error::Invocation(_))));
    assert_eq!(sel.size(), 5);

    let mut empty = qp_select(DATA_FILE, "nothing").unwrap();
    assert!(matches!(
        empty.each(Named::<Flow>::new("callbacks-missing")),
        Err(Error::Invocation(_))
    ));
    assert!(matches!(
        empty.map(Named::<Mapped>::new("callbacks-missing")),
        Err(Error::Invocation(_))
    ));
}

#[test]
fn test_map_results() {
    let mut sel = qp_select(DATA_FILE, "inner").unwrap();

    sel.map(|_: usize, node: &Node| node.element_children()).unwrap();
    assert_eq!(sel.size(), 5);

    sel.end().map(|_: usize, _: &Node| ()).unwrap();
    assert_eq!(sel.size(), 0);

    sel.end()
        .map(|i: usize, node: &Node| if i == 0 { Some(node.clone()) } else { None })
        .unwrap();
    assert_eq!(ids(&sel), vec!["inner-one"]);

    sel.end().map(|_: usize, node: &Node| node.clone()).unwrap();
    assert_eq!(ids(&sel), vec!["inner-one", "inner-two"]);
}

#[test]
fn test_map_may_leave_document_order() {
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.map(|_: usize, node: &Node| {
        let mut pair = vec![node.clone()];
        pair.extend(node.prev_element_sibling());
        pair
    })
    .unwrap();

    assert_eq!(sel.size(), 8);
    assert_eq!(ids(&sel)[..3], ["one", "two", "one"]);
}

#[test]
fn test_callback_positions() {
    let mut positions = vec![];
    let mut sel = qp_select(DATA_FILE, "li").unwrap();
    sel.filter("#two, #four").unwrap();
    sel.each(|i: usize, _: &Node| {
        positions.push(i);
        true
    })
    .unwrap();
    assert_eq!(positions, vec![0, 1]);
}
