use crate::dom_tree::{NodeId, Tree};
use crate::entities::replace_entities;
use crate::error::{Error, Result};
use crate::matcher::Matcher;
use crate::node::{append_to_existing_text, Element, Node, NodeData};
use crate::node_set::NodeSet;
use crate::options::Options;
use html5ever::tokenizer::TokenizerOpts;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use log::debug;
use markup5ever::interface::tree_builder;
use markup5ever::interface::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use markup5ever::{local_name, namespace_url, ns};
use markup5ever::{Attribute, ExpandedName, QualName};
use std::borrow::Cow;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tendril::StrTendril;
use tendril::TendrilSink;
use xml5ever::driver::XmlParseOpts;
use xml5ever::tokenizer::XmlTokenizerOpts;

// Local name of the element XML fragments are parsed inside of.
const FRAGMENT_WRAPPER: &str = "qpath-fragment";

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);

/// How markup is parsed and how the document serializes by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Xml,
    Html,
}

impl ContentType {
    /// Markup starting with an XML declaration is XML, anything else HTML.
    pub fn detect(markup: &str) -> ContentType {
        if markup.trim_start().starts_with("<?xml") {
            ContentType::Xml
        } else {
            ContentType::Html
        }
    }
}

struct DocumentInner {
    serial: u64,
    tree: RefCell<Tree<NodeData>>,
    // Document order ranks, dropped on every mutable borrow of the tree.
    order: RefCell<Option<Rc<Vec<usize>>>>,
    content_type: ContentType,
    encoding: Option<String>,
    errors: Vec<Cow<'static, str>>,
    quirks_mode: QuirksMode,
}

/// Document represents a parsed XML or HTML document.
///
/// `Document` is a shared handle: clones refer to the same tree, and two
/// handles are the same document when `same` says so.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("serial", &self.inner.serial)
            .field("content_type", &self.inner.content_type)
            .field("nodes", &self.tree().len())
            .finish()
    }
}

impl Document {
    fn from_sink(sink: Sink, content_type: ContentType, encoding: Option<String>) -> Document {
        Document {
            inner: Rc::new(DocumentInner {
                serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
                tree: RefCell::new(sink.tree),
                order: RefCell::new(None),
                content_type,
                encoding,
                errors: sink.errors,
                quirks_mode: sink.quirks_mode,
            }),
        }
    }

    /// An empty document, holding only its document node.
    pub fn new(content_type: ContentType) -> Document {
        Document::from_sink(Sink::default(), content_type, None)
    }

    /// Parses a whole document.
    ///
    /// HTML is parsed the way browsers do and never fails. XML parse errors
    /// fail unless `ignore_parser_warnings` is set.
    pub fn parse(markup: &str, content_type: ContentType, options: &Options) -> Result<Document> {
        let markup = prepare(markup, options);

        match content_type {
            ContentType::Html => {
                let sink = html5ever::parse_document(Sink::default(), html_opts(options))
                    .one(&*markup);
                log_errors(&sink.errors);
                Ok(Document::from_sink(sink, content_type, None))
            }
            ContentType::Xml => {
                let mut sink = xml5ever::driver::parse_document(Sink::default(), xml_opts(options))
                    .one(&*markup);
                check_errors(&sink.errors, options)?;
                let encoding = sink.take_xml_declaration();
                Ok(Document::from_sink(sink, content_type, encoding))
            }
        }
    }

    /// Parses markup into detached nodes of a new scratch document.
    ///
    /// HTML is parsed as the contents of a `<body>`. XML may hold several top
    /// level nodes; a leading XML declaration is ignored.
    pub fn parse_fragment(
        markup: &str,
        content_type: ContentType,
        options: &Options,
    ) -> Result<Vec<Node>> {
        let markup = prepare(markup, options);
        debug!("parsing {:?} fragment of {} bytes", content_type, markup.len());

        let mut sink = match content_type {
            ContentType::Html => {
                let sink = html5ever::parse_fragment(
                    Sink::default(),
                    html_opts(options),
                    QualName::new(None, ns!(html), local_name!("body")),
                    vec![],
                )
                .one(&*markup);
                log_errors(&sink.errors);
                sink
            }
            ContentType::Xml => {
                let wrapped = format!(
                    "<{0}>{1}</{0}>",
                    FRAGMENT_WRAPPER,
                    strip_xml_declaration(&markup)
                );
                let sink = xml5ever::driver::parse_document(Sink::default(), xml_opts(options))
                    .one(wrapped);
                check_errors(&sink.errors, options)?;
                sink
            }
        };

        let ids = sink.take_fragment_nodes();
        let document = Document::from_sink(sink, content_type, None);
        Ok(ids
            .into_iter()
            .map(|id| Node::new(id, document.clone()))
            .collect())
    }

    pub(crate) fn tree(&self) -> Ref<'_, Tree<NodeData>> {
        self.inner.tree.borrow()
    }

    pub(crate) fn tree_mut(&self) -> RefMut<'_, Tree<NodeData>> {
        self.inner.order.replace(None);
        self.inner.tree.borrow_mut()
    }

    // Ranks of all nodes in document order, computed once per tree state.
    pub(crate) fn order(&self) -> Rc<Vec<usize>> {
        if let Some(order) = &*self.inner.order.borrow() {
            return Rc::clone(order);
        }

        let order = Rc::new(self.tree().document_order());
        self.inner.order.replace(Some(Rc::clone(&order)));
        order
    }

    pub(crate) fn serial(&self) -> u64 {
        self.inner.serial
    }

    /// Whether both handles refer to the same document.
    pub fn same(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn content_type(&self) -> ContentType {
        self.inner.content_type
    }

    /// The encoding named by the XML declaration the document was parsed
    /// with, if any.
    pub fn encoding(&self) -> Option<&str> {
        self.inner.encoding.as_deref()
    }

    /// Errors reported while parsing.
    pub fn errors(&self) -> &[Cow<'static, str>] {
        &self.inner.errors
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.inner.quirks_mode
    }

    /// Return the underlying root document node.
    pub fn root(&self) -> Node {
        let id = self.tree().root_id();
        Node::new(id, self.clone())
    }

    /// The first element child of the document node.
    pub fn document_element(&self) -> Option<Node> {
        self.root().children().into_iter().find(|node| node.is_element())
    }

    /// Nodes of the whole document matching the selector, the document
    /// element included.
    pub fn select(&self, sel: &str) -> Result<NodeSet> {
        let matcher = Matcher::new(sel)?;
        Ok(matcher.match_all(&[self.root()]))
    }

    /// Copies the subtree of `node` into this document. The copy is detached.
    pub(crate) fn import(&self, node: &Node) -> Node {
        let id = if self.same(&node.document) {
            self.tree_mut().deep_clone(&node.id)
        } else {
            let source = node.document.tree();
            self.tree_mut().import(&source, &node.id)
        };
        Node::new(id, self.clone())
    }
}

fn prepare<'a>(markup: &'a str, options: &Options) -> Cow<'a, str> {
    if options.replace_entities {
        Cow::Owned(replace_entities(markup))
    } else {
        Cow::Borrowed(markup)
    }
}

fn html_opts(options: &Options) -> ParseOpts {
    let flags = options.parser_flags;
    ParseOpts {
        tokenizer: TokenizerOpts {
            exact_errors: flags.exact_errors,
            discard_bom: flags.discard_bom,
            ..Default::default()
        },
        tree_builder: TreeBuilderOpts {
            exact_errors: flags.exact_errors,
            scripting_enabled: flags.scripting_enabled,
            ..Default::default()
        },
    }
}

fn xml_opts(options: &Options) -> XmlParseOpts {
    let flags = options.parser_flags;
    XmlParseOpts {
        tokenizer: XmlTokenizerOpts {
            exact_errors: flags.exact_errors,
            discard_bom: flags.discard_bom,
            ..Default::default()
        },
        tree_builder: Default::default(),
    }
}

fn log_errors(errors: &[Cow<'static, str>]) {
    for error in errors {
        debug!("recovered from html parse error: {}", error);
    }
}

fn check_errors(errors: &[Cow<'static, str>], options: &Options) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    if options.ignore_parser_warnings {
        for error in errors {
            debug!("ignoring xml parse error: {}", error);
        }
        return Ok(());
    }

    let messages: Vec<&str> = errors.iter().map(|e| e.as_ref()).collect();
    Err(Error::Parse(messages.join("; ")))
}

fn strip_xml_declaration(markup: &str) -> &str {
    let trimmed = markup.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    markup
}

/// Reads `name="value"` (or single quoted) out of a processing instruction.
fn pseudo_attribute(data: &str, name: &str) -> Option<String> {
    let start = data.find(name)? + name.len();
    let rest = data[start..].trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let end = value.find(quote)?;
    Some(value[..end].to_string())
}

/// The tree builder target shared by the HTML and the XML parser.
pub(crate) struct Sink {
    tree: Tree<NodeData>,
    errors: Vec<Cow<'static, str>>,
    quirks_mode: QuirksMode,
}

impl Default for Sink {
    fn default() -> Sink {
        Sink {
            tree: Tree::new(NodeData::Document),
            errors: vec![],
            quirks_mode: tree_builder::NoQuirks,
        }
    }
}

impl Sink {
    // Removes the `<?xml ...?>` processing instruction, returning its encoding.
    fn take_xml_declaration(&mut self) -> Option<String> {
        let root = self.tree.root_id();
        let declaration = self.tree.children_of(&root).into_iter().find(|id| {
            matches!(self.tree.node(id).data,
                NodeData::ProcessingInstruction { ref target, .. } if &**target == "xml")
        })?;

        self.tree.remove_from_parent(&declaration);
        match self.tree.node(&declaration).data {
            NodeData::ProcessingInstruction { ref contents, .. } => {
                pseudo_attribute(contents, "encoding")
            }
            _ => None,
        }
    }

    // Detaches the parsed fragment nodes from the html root or the XML wrapper.
    fn take_fragment_nodes(&mut self) -> Vec<NodeId> {
        let root = self.tree.root_id();
        let container = self
            .tree
            .children_of(&root)
            .into_iter()
            .find(|id| matches!(self.tree.node(id).data, NodeData::Element(_)));

        let container = match container {
            Some(container) => container,
            None => return vec![],
        };

        let ids = self.tree.children_of(&container);
        for id in &ids {
            self.tree.remove_from_parent(id);
        }
        ids
    }
}

impl TreeSink for Sink {
    type Output = Self;

    fn finish(self) -> Self {
        self
    }

    type Handle = NodeId;

    fn parse_error(&mut self, msg: Cow<'static, str>) {
        self.errors.push(msg);
    }

    fn get_document(&mut self) -> NodeId {
        self.tree.root_id()
    }

    // Template contents stay the template's own children so selectors reach them.
    fn get_template_contents(&mut self, target: &NodeId) -> NodeId {
        *target
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        *x == *y
    }

    // Only ever asked about elements.
    fn elem_name<'a>(&'a self, target: &'a NodeId) -> ExpandedName<'a> {
        match self.tree.node(target).data {
            NodeData::Element(Element { ref name, .. }) => name.expanded(),
            _ => panic!("not an element!"),
        }
    }

    fn create_element(
        &mut self,
        name: QualName,
        attrs: Vec<Attribute>,
        flags: ElementFlags,
    ) -> NodeId {
        self.tree.create_node(NodeData::Element(Element::new(
            name,
            attrs,
            flags.mathml_annotation_xml_integration_point,
        )))
    }

    fn create_comment(&mut self, text: StrTendril) -> NodeId {
        self.tree.create_node(NodeData::Comment { contents: text })
    }

    fn create_pi(&mut self, target: StrTendril, data: StrTendril) -> NodeId {
        self.tree.create_node(NodeData::ProcessingInstruction {
            target,
            contents: data,
        })
    }

    // Adjacent text is merged into one node.
    fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendNode(id) => {
                self.tree.append_child_of(parent, &id);
            }
            NodeOrText::AppendText(text) => {
                if let Some(last) = self.tree.last_child_of(parent) {
                    if append_to_existing_text(self.tree.node_mut(&last), &text) {
                        return;
                    }
                }

                let id = self.tree.create_node(NodeData::Text { contents: text });
                self.tree.append_child_of(parent, &id);
            }
        }
    }

    // `sibling` is never text, but the node before it may be.
    fn append_before_sibling(&mut self, sibling: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendText(text) => {
                if let Some(prev) = self.tree.prev_sibling_of(sibling) {
                    if append_to_existing_text(self.tree.node_mut(&prev), &text) {
                        return;
                    }
                }

                let id = self.tree.create_node(NodeData::Text { contents: text });
                self.tree.append_prev_sibling_of(sibling, &id);
            }

            NodeOrText::AppendNode(id) => {
                self.tree.append_prev_sibling_of(sibling, &id);
            }
        }
    }

    // Foster parenting: before `element` when it is attached, else into `prev_element`.
    fn append_based_on_parent_node(
        &mut self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        if self.tree.parent_of(element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &mut self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let root = self.tree.root_id();
        let id = self.tree.create_node(NodeData::Doctype {
            name,
            public_id,
            system_id,
        });
        self.tree.append_child_of(&root, &id);
    }

    // Attributes already present win.
    fn add_attrs_if_missing(&mut self, target: &NodeId, attrs: Vec<Attribute>) {
        let existing = match self.tree.node_mut(target).data {
            NodeData::Element(Element { ref mut attrs, .. }) => attrs,
            _ => panic!("not an element"),
        };

        let existing_names = existing
            .iter()
            .map(|e| e.name.clone())
            .collect::<HashSet<_>>();
        existing.extend(
            attrs
                .into_iter()
                .filter(|attr| !existing_names.contains(&attr.name)),
        );
    }

    fn remove_from_parent(&mut self, target: &NodeId) {
        self.tree.remove_from_parent(target);
    }

    fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
        self.tree.reparent_children_of(node, Some(*new_parent));
    }

    fn is_mathml_annotation_xml_integration_point(&self, handle: &NodeId) -> bool {
        match self.tree.node(handle).data {
            NodeData::Element(ref e) => e.mathml_annotation_xml_integration_point,
            _ => false,
        }
    }
}
