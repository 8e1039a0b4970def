use crate::document::Document;
use crate::dom_tree::{InnerNode, NodeId, Tree};
use markup5ever::serialize::{Serialize, Serializer, TraversalScope};
use markup5ever::{namespace_url, ns};
use markup5ever::{Attribute, LocalName, QualName};
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use tendril::StrTendril;

/// The DOM node type numbers, as reported by the `nodeType` pseudo attribute.
pub const ELEMENT_NODE: u16 = 1;
pub const TEXT_NODE: u16 = 3;
pub const PROCESSING_INSTRUCTION_NODE: u16 = 7;
pub const COMMENT_NODE: u16 = 8;
pub const DOCUMENT_NODE: u16 = 9;
pub const DOCUMENT_TYPE_NODE: u16 = 10;

/// The different kinds of nodes in the DOM.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The `Tree` itself - the root node of a HTML or XML document.
    Document,

    /// A `DOCTYPE` with name, public id, and system id.
    Doctype {
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    },

    /// A text node. CDATA sections are parsed into text nodes too.
    Text { contents: StrTendril },

    /// A comment.
    Comment { contents: StrTendril },

    /// An element with attributes.
    Element(Element),

    /// A Processing instruction.
    ProcessingInstruction {
        target: StrTendril,
        contents: StrTendril,
    },
}

/// An element with attributes.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: QualName,
    pub attrs: Vec<Attribute>,

    /// Whether the node is a [HTML integration point]
    ///
    /// [HTML integration point]: https://html.spec.whatwg.org/multipage/#html-integration-point
    pub(crate) mathml_annotation_xml_integration_point: bool,
}

impl Element {
    pub(crate) fn new(
        name: QualName,
        attrs: Vec<Attribute>,
        mathml_annotation_xml_integration_point: bool,
    ) -> Element {
        Element {
            name,
            attrs,
            mathml_annotation_xml_integration_point,
        }
    }

    /// The element name as written in markup, prefix included.
    pub fn tag_name(&self) -> String {
        qualified_name(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<StrTendril> {
        self.attrs
            .iter()
            .find(|attr| name_matches(&attr.name, name))
            .map(|attr| attr.value.clone())
    }

    pub(crate) fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|attr| name_matches(&attr.name, name)) {
            Some(attr) => attr.value = StrTendril::from(value),
            None => self.attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: StrTendril::from(value),
            }),
        }
    }

    pub(crate) fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|attr| !name_matches(&attr.name, name));
    }
}

pub(crate) fn qualified_name(name: &QualName) -> String {
    match name.prefix {
        Some(ref prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

fn name_matches(name: &QualName, wanted: &str) -> bool {
    match name.prefix {
        Some(_) => qualified_name(name) == wanted,
        None => &*name.local == wanted,
    }
}

/// Concatenate `text` onto the node if it is a text node.
pub(crate) fn append_to_existing_text(prev: &mut InnerNode<NodeData>, text: &str) -> bool {
    match prev.data {
        NodeData::Text { ref mut contents } => {
            contents.push_slice(text);
            true
        }
        _ => false,
    }
}

/// A handle to a node of a document.
///
/// Handles are cheap to clone. Two handles are equal when they point at the
/// same node of the same document; a detached node stays valid and can be
/// inserted again.
#[derive(Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) document: Document,
}

impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        self.id == other.id && self.document.same(&other.document)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.document.serial().hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("document", &self.document.serial())
            .field("id", &self.id.value())
            .field("name", &self.node_name())
            .finish()
    }
}

/// Sort key placing nodes in document order. Documents order by creation;
/// detached subtrees order after the attached tree.
pub(crate) type OrderKey = (u64, usize);

impl Node {
    pub(crate) fn new(id: NodeId, document: Document) -> Self {
        Node { id, document }
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<Node> {
        id.map(|id| Node::new(id, self.document.clone()))
    }

    fn wrap_all(&self, ids: Vec<NodeId>) -> Vec<Node> {
        ids.into_iter()
            .map(|id| Node::new(id, self.document.clone()))
            .collect()
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The document owning this node.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn query<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&InnerNode<NodeData>) -> R,
    {
        let tree = self.document.tree();
        f(tree.node(&self.id))
    }

    pub(crate) fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut InnerNode<NodeData>) -> R,
    {
        let mut tree = self.document.tree_mut();
        f(tree.node_mut(&self.id))
    }

    pub(crate) fn order_key(&self) -> OrderKey {
        let rank = self.document.order().get(self.id.value()).copied();
        (self.document.serial(), rank.unwrap_or(usize::MAX))
    }
}

// Navigation.
impl Node {
    pub fn parent(&self) -> Option<Node> {
        self.wrap(self.document.tree().parent_of(&self.id))
    }

    pub fn first_child(&self) -> Option<Node> {
        self.wrap(self.document.tree().first_child_of(&self.id))
    }

    pub fn last_child(&self) -> Option<Node> {
        self.wrap(self.document.tree().last_child_of(&self.id))
    }

    pub fn prev_sibling(&self) -> Option<Node> {
        self.wrap(self.document.tree().prev_sibling_of(&self.id))
    }

    pub fn next_sibling(&self) -> Option<Node> {
        self.wrap(self.document.tree().next_sibling_of(&self.id))
    }

    /// All child nodes: elements, text, comments and processing instructions.
    pub fn children(&self) -> Vec<Node> {
        self.wrap_all(self.document.tree().children_of(&self.id))
    }

    /// Element children only.
    pub fn element_children(&self) -> Vec<Node> {
        self.children()
            .into_iter()
            .filter(|child| child.is_element())
            .collect()
    }

    /// Ancestors, nearest first, up to and including the document node.
    pub fn ancestors(&self) -> Vec<Node> {
        self.wrap_all(self.document.tree().ancestors_of(&self.id))
    }

    /// Descendants in document order.
    pub fn descendants(&self) -> Vec<Node> {
        self.wrap_all(self.document.tree().descendants_of(&self.id))
    }

    pub fn prev_element_sibling(&self) -> Option<Node> {
        let mut prev = self.prev_sibling();
        while let Some(sibling) = prev {
            if sibling.is_element() {
                return Some(sibling);
            }
            prev = sibling.prev_sibling();
        }
        None
    }

    pub fn next_element_sibling(&self) -> Option<Node> {
        let mut next = self.next_sibling();
        while let Some(sibling) = next {
            if sibling.is_element() {
                return Some(sibling);
            }
            next = sibling.next_sibling();
        }
        None
    }

    /// Whether the node hangs below its document node.
    pub fn is_attached(&self) -> bool {
        let tree = self.document.tree();
        tree.top_of(&self.id) == tree.root_id()
    }

    /// Number of ancestors.
    pub fn depth(&self) -> usize {
        self.document.tree().ancestors_of(&self.id).len()
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        self.document.same(&other.document)
            && self.document.tree().is_ancestor_or_self(&self.id, &other.id)
    }
}

// Node kinds.
impl Node {
    pub fn is_document(&self) -> bool {
        self.query(|node| matches!(node.data, NodeData::Document))
    }

    pub fn is_element(&self) -> bool {
        self.query(|node| matches!(node.data, NodeData::Element(_)))
    }

    pub fn is_text(&self) -> bool {
        self.query(|node| matches!(node.data, NodeData::Text { .. }))
    }

    pub fn is_comment(&self) -> bool {
        self.query(|node| matches!(node.data, NodeData::Comment { .. }))
    }

    pub fn is_doctype(&self) -> bool {
        self.query(|node| matches!(node.data, NodeData::Doctype { .. }))
    }

    pub fn is_processing_instruction(&self) -> bool {
        self.query(|node| matches!(node.data, NodeData::ProcessingInstruction { .. }))
    }

    /// The DOM `nodeType` number of this node.
    pub fn node_type(&self) -> u16 {
        self.query(|node| match node.data {
            NodeData::Element(_) => ELEMENT_NODE,
            NodeData::Text { .. } => TEXT_NODE,
            NodeData::ProcessingInstruction { .. } => PROCESSING_INSTRUCTION_NODE,
            NodeData::Comment { .. } => COMMENT_NODE,
            NodeData::Document => DOCUMENT_NODE,
            NodeData::Doctype { .. } => DOCUMENT_TYPE_NODE,
        })
    }

    /// The DOM `nodeName`: the tag name for elements, `#text`, `#comment`
    /// and `#document` for the others.
    pub fn node_name(&self) -> String {
        self.query(|node| match node.data {
            NodeData::Element(ref e) => e.tag_name(),
            NodeData::Text { .. } => "#text".to_string(),
            NodeData::Comment { .. } => "#comment".to_string(),
            NodeData::Document => "#document".to_string(),
            NodeData::Doctype { ref name, .. } => name.to_string(),
            NodeData::ProcessingInstruction { ref target, .. } => target.to_string(),
        })
    }

    /// The tag name of an element.
    pub fn tag_name(&self) -> Option<String> {
        self.query(|node| match node.data {
            NodeData::Element(ref e) => Some(e.tag_name()),
            _ => None,
        })
    }

    pub(crate) fn qual_name(&self) -> Option<QualName> {
        self.query(|node| match node.data {
            NodeData::Element(ref e) => Some(e.name.clone()),
            _ => None,
        })
    }
}

// Attributes and text.
impl Node {
    /// Gets the specified attribute's value.
    pub fn attr(&self, name: &str) -> Option<StrTendril> {
        self.query(|node| match node.data {
            NodeData::Element(ref e) => e.attr(name),
            _ => None,
        })
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Sets the attribute. Does nothing on non-element nodes.
    pub fn set_attr(&self, name: &str, value: &str) {
        self.update(|node| {
            if let NodeData::Element(ref mut e) = node.data {
                e.set_attr(name, value);
            }
        })
    }

    pub fn remove_attr(&self, name: &str) {
        self.update(|node| {
            if let NodeData::Element(ref mut e) = node.data {
                e.remove_attr(name);
            }
        })
    }

    /// The attributes as `(name, value)` pairs in document order.
    pub fn attrs(&self) -> Vec<(String, String)> {
        self.query(|node| match node.data {
            NodeData::Element(ref e) => e
                .attrs
                .iter()
                .map(|attr| (qualified_name(&attr.name), attr.value.to_string()))
                .collect(),
            _ => vec![],
        })
    }

    /// The text content of the node and its descendants.
    pub fn text(&self) -> StrTendril {
        let tree = self.document.tree();
        let mut text = StrTendril::new();

        if let NodeData::Text { ref contents } = tree.node(&self.id).data {
            text.push_tendril(contents);
            return text;
        }

        for id in tree.descendants_of(&self.id) {
            if let NodeData::Text { ref contents } = tree.node(&id).data {
                text.push_tendril(contents);
            }
        }

        text
    }

    /// The text of the node's own text children.
    pub fn direct_text(&self) -> StrTendril {
        let tree = self.document.tree();
        let mut text = StrTendril::new();

        for id in tree.children_of(&self.id) {
            if let NodeData::Text { ref contents } = tree.node(&id).data {
                text.push_tendril(contents);
            }
        }

        text
    }

    /// Replaces the children of the node with a single text node. A text or
    /// comment node gets its contents replaced instead.
    pub fn set_text(&self, value: &str) {
        let replaced = self.update(|node| match node.data {
            NodeData::Text { ref mut contents } | NodeData::Comment { ref mut contents } => {
                *contents = StrTendril::from(value);
                true
            }
            _ => false,
        });

        if replaced {
            return;
        }

        let mut tree = self.document.tree_mut();
        tree.remove_children_of(&self.id);
        let text = tree.create_node(NodeData::Text {
            contents: StrTendril::from(value),
        });
        tree.append_child_of(&self.id, &text);
    }
}

// Structure changes within the node's own document.
impl Node {
    pub fn remove_from_parent(&self) {
        self.document.tree_mut().remove_from_parent(&self.id)
    }

    pub fn remove_children(&self) {
        self.document.tree_mut().remove_children_of(&self.id)
    }

    pub(crate) fn append_child(&self, id: &NodeId) -> bool {
        self.document.tree_mut().append_child_of(&self.id, id)
    }

    pub(crate) fn prepend_child(&self, id: &NodeId) -> bool {
        self.document.tree_mut().prepend_child_of(&self.id, id)
    }

    pub(crate) fn append_prev_sibling(&self, id: &NodeId) -> bool {
        self.document.tree_mut().append_prev_sibling_of(&self.id, id)
    }

    pub(crate) fn append_next_sibling(&self, id: &NodeId) -> bool {
        self.document.tree_mut().append_next_sibling_of(&self.id, id)
    }

    /// A detached deep copy of the node in the same document.
    pub fn deep_clone(&self) -> Node {
        let id = self.document.tree_mut().deep_clone(&self.id);
        Node::new(id, self.document.clone())
    }
}

enum SerializeOp {
    Open(NodeId),
    Close(QualName),
}

/// Feeds a node of a borrowed tree to a markup5ever `Serializer`.
pub(crate) struct SerializableNodeRef<'a> {
    tree: &'a Tree<NodeData>,
    id: NodeId,
    html_namespace: bool,
}

impl<'a> SerializableNodeRef<'a> {
    pub(crate) fn new(tree: &'a Tree<NodeData>, id: NodeId) -> Self {
        SerializableNodeRef {
            tree,
            id,
            html_namespace: true,
        }
    }

    /// Reports HTML elements as having no namespace, so XML output of an
    /// HTML document carries no `xmlns` declaration.
    pub(crate) fn without_html_namespace(mut self) -> Self {
        self.html_namespace = false;
        self
    }

    fn element_name(&self, name: &QualName) -> QualName {
        if !self.html_namespace && name.ns == ns!(html) {
            QualName::new(name.prefix.clone(), ns!(), name.local.clone())
        } else {
            name.clone()
        }
    }
}

fn doctype_declaration(name: &str, public_id: &str, system_id: &str) -> String {
    match (public_id.is_empty(), system_id.is_empty()) {
        (true, true) => name.to_string(),
        (true, false) => format!("{} SYSTEM \"{}\"", name, system_id),
        (false, true) => format!("{} PUBLIC \"{}\"", name, public_id),
        (false, false) => format!("{} PUBLIC \"{}\" \"{}\"", name, public_id, system_id),
    }
}

impl<'a> Serialize for SerializableNodeRef<'a> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut ops: VecDeque<SerializeOp> = match traversal_scope {
            TraversalScope::IncludeNode => vec![SerializeOp::Open(self.id)].into(),
            TraversalScope::ChildrenOnly(_) => self
                .tree
                .children_of(&self.id)
                .into_iter()
                .map(SerializeOp::Open)
                .collect(),
        };

        while let Some(op) = ops.pop_front() {
            match op {
                SerializeOp::Open(id) => match self.tree.node(&id).data {
                    NodeData::Element(ref e) => {
                        let name = self.element_name(&e.name);
                        serializer.start_elem(
                            name.clone(),
                            e.attrs.iter().map(|at| (&at.name, &at.value[..])),
                        )?;

                        ops.push_front(SerializeOp::Close(name));
                        for child in self.tree.children_of(&id).into_iter().rev() {
                            ops.push_front(SerializeOp::Open(child));
                        }
                    }
                    NodeData::Doctype {
                        ref name,
                        ref public_id,
                        ref system_id,
                    } => serializer.write_doctype(&doctype_declaration(
                        name, public_id, system_id,
                    ))?,
                    NodeData::Text { ref contents } => serializer.write_text(contents)?,
                    NodeData::Comment { ref contents } => serializer.write_comment(contents)?,
                    NodeData::ProcessingInstruction {
                        ref target,
                        ref contents,
                    } => serializer.write_processing_instruction(target, contents)?,
                    NodeData::Document => {
                        for child in self.tree.children_of(&id).into_iter().rev() {
                            ops.push_front(SerializeOp::Open(child));
                        }
                    }
                },
                SerializeOp::Close(name) => serializer.end_elem(name)?,
            }
        }

        Ok(())
    }
}
