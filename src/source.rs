use crate::document::{ContentType, Document};
use crate::error::{Error, Result};
use crate::matcher::Matcher;
use crate::node::Node;
use crate::node_set::NodeSet;
use crate::options::{self, Options, Overrides};
use crate::selection::Selection;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// A minimal XHTML document to start building pages from.
pub const HTML_STUB: &str = r#"<?xml version="1.0"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html lang="en" xmlns="http://www.w3.org/1999/xhtml">
<head>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8"></meta>
<title>Untitled</title>
</head>
<body></body>
</html>"#;

/// What a selection can be loaded from.
///
/// Strings that look like markup (`<` somewhere before a later `>`) are
/// parsed, other strings are taken as file paths.
#[derive(Debug, Clone)]
pub enum Source {
    /// A new, empty document.
    Empty,
    Markup(String),
    Path(PathBuf),
    Node(Node),
    Nodes(NodeSet),
    Selection(Selection),
    Document(Document),
}

/// Whether a string is markup rather than a path.
pub(crate) fn is_xmlish(s: &str) -> bool {
    match (s.find('<'), s.rfind('>')) {
        (Some(open), Some(close)) => close > open + 1,
        _ => false,
    }
}

impl From<()> for Source {
    fn from(_: ()) -> Source {
        Source::Empty
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Source {
        if is_xmlish(s) {
            Source::Markup(s.to_string())
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl From<String> for Source {
    fn from(s: String) -> Source {
        if is_xmlish(&s) {
            Source::Markup(s)
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl From<&String> for Source {
    fn from(s: &String) -> Source {
        Source::from(s.as_str())
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Source {
        Source::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Source {
        Source::Path(path)
    }
}

impl From<Node> for Source {
    fn from(node: Node) -> Source {
        Source::Node(node)
    }
}

impl From<&Node> for Source {
    fn from(node: &Node) -> Source {
        Source::Node(node.clone())
    }
}

impl From<Vec<Node>> for Source {
    fn from(nodes: Vec<Node>) -> Source {
        Source::Nodes(NodeSet::from(nodes))
    }
}

impl From<NodeSet> for Source {
    fn from(nodes: NodeSet) -> Source {
        Source::Nodes(nodes)
    }
}

impl From<Selection> for Source {
    fn from(selection: Selection) -> Source {
        Source::Selection(selection)
    }
}

impl From<&Selection> for Source {
    fn from(selection: &Selection) -> Source {
        Source::Selection(selection.clone())
    }
}

impl From<Document> for Source {
    fn from(document: Document) -> Source {
        Source::Document(document)
    }
}

impl From<&Document> for Source {
    fn from(document: &Document) -> Source {
        Source::Document(document.clone())
    }
}

/// Loads a selection with the process-wide default options. The current set
/// is the document element, or the given nodes.
///
/// ```
/// let sel = qpath::qp("<?xml version=\"1.0\"?><root><a/></root>").unwrap();
/// assert_eq!(sel.tag(), "root");
/// ```
pub fn qp<S: Into<Source>>(source: S) -> Result<Selection> {
    qp_with(source, None, &Overrides::default())
}

/// Loads a selection and selects `sel` in it.
pub fn qp_select<S: Into<Source>>(source: S, sel: &str) -> Result<Selection> {
    qp_with(source, Some(sel), &Overrides::default())
}

/// Loads a selection with options overriding the process-wide defaults.
///
/// With a selector, documents are searched as a whole (the document element
/// can match) while nodes and selections are searched below their nodes.
pub fn qp_with<S: Into<Source>>(
    source: S,
    sel: Option<&str>,
    overrides: &Overrides,
) -> Result<Selection> {
    let options = options::resolve(overrides);

    let (document, nodes) = match source.into() {
        Source::Empty => {
            let content_type = options.content_type.unwrap_or(ContentType::Xml);
            (Document::new(content_type), None)
        }
        Source::Markup(markup) => {
            let content_type = options
                .content_type
                .unwrap_or_else(|| ContentType::detect(&markup));
            (Document::parse(&markup, content_type, &options)?, None)
        }
        Source::Path(path) => (load_file(&path, &options)?, None),
        Source::Document(document) => (document, None),
        Source::Node(node) => (node.document().clone(), Some(NodeSet::from(node))),
        Source::Nodes(nodes) => {
            let document = match nodes.first() {
                Some(node) => node.document().clone(),
                None => Document::new(options.content_type.unwrap_or(ContentType::Xml)),
            };
            (document, Some(nodes))
        }
        Source::Selection(selection) => (selection.document, Some(selection.nodes)),
    };

    let nodes = match (nodes, sel) {
        (None, None) => document.document_element().into_iter().collect(),
        (None, Some(sel)) => document.select(sel)?,
        (Some(nodes), None) => nodes,
        (Some(nodes), Some(sel)) => Matcher::new(sel)?.match_all(&nodes),
    };

    Ok(Selection::new(document, nodes, options))
}

/// Loads a selection and converts it into another cursor type.
///
/// ```
/// use qpath::{qp_as, Overrides, Selection};
///
/// struct Page(Selection);
///
/// impl From<Selection> for Page {
///     fn from(sel: Selection) -> Self {
///         Page(sel)
///     }
/// }
///
/// let page: Page = qp_as(qpath::HTML_STUB, Some("title"), &Overrides::default()).unwrap();
/// assert_eq!(page.0.text(), "Untitled");
/// ```
pub fn qp_as<T, S>(source: S, sel: Option<&str>, overrides: &Overrides) -> Result<T>
where
    T: From<Selection>,
    S: Into<Source>,
{
    qp_with(source, sel, overrides).map(T::from)
}

fn load_file(path: &Path, options: &Options) -> Result<Document> {
    let markup = fs::read_to_string(path)
        .map_err(|e| Error::Parse(format!("cannot read {}: {}", path.display(), e)))?;

    let content_type = options.content_type.unwrap_or_else(|| {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
                ContentType::Html
            }
            _ => ContentType::Xml,
        }
    });

    debug!("loading {} as {:?}", path.display(), content_type);
    Document::parse(&markup, content_type, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_xmlish() {
        assert!(is_xmlish("<a/>"));
        assert!(is_xmlish("text <b>bold</b> text"));
        assert!(!is_xmlish("<>"));
        assert!(!is_xmlish("data.xml"));
        assert!(!is_xmlish("> <"));
    }

    #[test]
    fn test_string_sources() {
        assert!(matches!(Source::from("<r/>"), Source::Markup(_)));
        assert!(matches!(Source::from("testdata/data.xml"), Source::Path(_)));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(qp("no/such/file.xml"), Err(Error::Parse(_))));
    }
}
