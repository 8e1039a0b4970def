//! jQuery-like traversal and manipulation of XML and HTML documents.
//!
//! ```
//! use qpath::qp;
//!
//! let mut sel = qp("<?xml version=\"1.0\"?><ul><li>one</li><li>two</li></ul>").unwrap();
//! sel.find("li").unwrap().add_class("item").end().append("<li>three</li>").unwrap();
//! assert_eq!(sel.find("li.item").unwrap().size(), 2);
//! assert_eq!(sel.end().children(None).unwrap().text(), "onetwothree");
//! ```

mod callback;
mod document;
mod dom_tree;
mod element;
mod entities;
mod error;
mod manipulation;
mod matcher;
mod node;
mod node_set;
pub mod options;
mod property;
mod query;
mod selection;
mod serializing;
mod source;
mod traversal;

pub use callback::{register, Callback, Flow, Invocable, Mapped, Named, Registered};
pub use document::{ContentType, Document};
pub use dom_tree::NodeId;
pub use error::{Error, Result};
pub use manipulation::{Destination, Fragment};
pub use matcher::Matcher;
pub use node::{Element, Node, NodeData};
pub use node::{
    COMMENT_NODE, DOCUMENT_NODE, DOCUMENT_TYPE_NODE, ELEMENT_NODE, PROCESSING_INSTRUCTION_NODE,
    TEXT_NODE,
};
pub use node_set::NodeSet;
pub use options::{Options, Overrides, ParserFlags};
pub use query::Target;
pub use selection::{Selection, Selections};
pub use source::{qp, qp_as, qp_select, qp_with, Source, HTML_STUB};
