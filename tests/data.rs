#![allow(dead_code)]
use qpath::{qp, Selection};
use std::fs;

pub const DATA_FILE: &str = "testdata/data.xml";
pub const PAGE_FILE: &str = "testdata/page.html";

pub fn data() -> Selection {
    qp(DATA_FILE).unwrap()
}

pub fn page() -> Selection {
    qp(PAGE_FILE).unwrap()
}

pub fn data_markup() -> String {
    fs::read_to_string(DATA_FILE).unwrap()
}

pub fn ids(sel: &Selection) -> Vec<String> {
    sel.nodes()
        .iter()
        .map(|node| node.attr("id").map(|id| id.to_string()).unwrap_or_default())
        .collect()
}
