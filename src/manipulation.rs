use crate::document::{ContentType, Document};
use crate::error::Result;
use crate::matcher::Matcher;
use crate::node::Node;
use crate::node_set::NodeSet;
use crate::selection::Selection;
use log::debug;

/// Content inserted by the manipulation methods.
///
/// Markup is parsed as a fragment of the selection's content type. Nodes of
/// another document are copied; nodes of the target's document are moved to
/// the first target and copied for the others.
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
    Markup(&'a str),
    Selection(&'a Selection),
    Node(&'a Node),
    Nodes(&'a NodeSet),
}

impl<'a> From<&'a str> for Fragment<'a> {
    fn from(markup: &'a str) -> Self {
        Fragment::Markup(markup)
    }
}

impl<'a> From<&'a String> for Fragment<'a> {
    fn from(markup: &'a String) -> Self {
        Fragment::Markup(markup)
    }
}

impl<'a> From<&'a Selection> for Fragment<'a> {
    fn from(selection: &'a Selection) -> Self {
        Fragment::Selection(selection)
    }
}

impl<'a> From<&'a Node> for Fragment<'a> {
    fn from(node: &'a Node) -> Self {
        Fragment::Node(node)
    }
}

impl<'a> From<&'a NodeSet> for Fragment<'a> {
    fn from(nodes: &'a NodeSet) -> Self {
        Fragment::Nodes(nodes)
    }
}

/// Where `append_to` and friends put the current set. A document stands
/// for its document element.
#[derive(Debug, Clone, Copy)]
pub enum Destination<'a> {
    Selection(&'a Selection),
    Document(&'a Document),
}

impl<'a> From<&'a Selection> for Destination<'a> {
    fn from(selection: &'a Selection) -> Self {
        Destination::Selection(selection)
    }
}

impl<'a> From<&'a Document> for Destination<'a> {
    fn from(document: &'a Document) -> Self {
        Destination::Document(document)
    }
}

impl<'a> Destination<'a> {
    fn targets(self) -> Vec<Node> {
        match self {
            Destination::Selection(selection) => selection.nodes.as_slice().to_vec(),
            Destination::Document(document) => document.document_element().into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Append,
    Prepend,
    Before,
    After,
}

// The nodes to insert at `target`: the originals when allowed and in the
// target's document, copies otherwise.
fn materialize(fragment: &[Node], target: &Node, take_originals: bool) -> Vec<Node> {
    fragment
        .iter()
        .map(|node| {
            if take_originals && node.document().same(target.document()) {
                node.clone()
            } else {
                target.document().import(node)
            }
        })
        .collect()
}

fn insert(target: &Node, nodes: &[Node], position: Position) {
    match position {
        Position::Append => {
            for node in nodes {
                target.append_child(&node.id);
            }
        }
        Position::Prepend => {
            for node in nodes.iter().rev() {
                target.prepend_child(&node.id);
            }
        }
        Position::Before => {
            for node in nodes {
                target.append_prev_sibling(&node.id);
            }
        }
        Position::After => {
            let mut anchor = target.clone();
            for node in nodes {
                if anchor.append_next_sibling(&node.id) {
                    anchor = node.clone();
                }
            }
        }
    }
}

// Inserts the fragment at every target, returning the inserted nodes.
fn splice(fragment: &[Node], targets: &[Node], position: Position) -> Vec<Node> {
    let mut inserted = vec![];
    let mut first = true;

    for target in targets {
        let needs_parent = position == Position::Before || position == Position::After;
        if needs_parent && target.parent().is_none() {
            debug!("skipping {:?}: no sibling position without a parent", target);
            continue;
        }

        let nodes = materialize(fragment, target, first);
        first = false;
        insert(target, &nodes, position);
        inserted.extend(nodes);
    }

    inserted
}

// Puts the fragment in place of every target and detaches the targets.
fn replace(fragment: &[Node], targets: &[Node]) -> Vec<Node> {
    let mut inserted = vec![];
    let mut first = true;

    for target in targets {
        if target.parent().is_none() {
            continue;
        }

        let nodes = materialize(fragment, target, first);
        first = false;
        insert(target, &nodes, Position::Before);
        if !nodes.contains(target) {
            target.remove_from_parent();
        }
        inserted.extend(nodes);
    }

    inserted
}

// Descends through first element children.
fn innermost(wrapper: &Node) -> Node {
    let mut current = wrapper.clone();
    while let Some(child) = current.element_children().into_iter().next() {
        current = child;
    }
    current
}

impl Selection {
    // The fragment's nodes; markup parsed as a fragment of the document's
    // content type.
    fn resolve(&self, fragment: Fragment<'_>) -> Result<Vec<Node>> {
        match fragment {
            Fragment::Markup("") => Ok(vec![]),
            Fragment::Markup(markup) => {
                Document::parse_fragment(markup, self.document.content_type(), &self.options)
            }
            Fragment::Selection(selection) => Ok(selection.nodes.as_slice().to_vec()),
            Fragment::Node(node) => Ok(vec![node.clone()]),
            Fragment::Nodes(nodes) => Ok(nodes.as_slice().to_vec()),
        }
    }

    // The first element of the fragment, used as a wrapper template.
    fn resolve_wrapper(&self, fragment: Fragment<'_>) -> Result<Option<Node>> {
        let nodes = self.resolve(fragment)?;
        Ok(nodes.into_iter().find(|node| node.is_element()))
    }

    fn insert_fragment(&mut self, fragment: Fragment<'_>, position: Position) -> Result<&mut Self> {
        let nodes = self.resolve(fragment)?;
        if nodes.is_empty() {
            return Ok(self);
        }

        let targets = self.nodes.as_slice().to_vec();
        splice(&nodes, &targets, position);
        Ok(self)
    }

    /// append inserts the fragment as the last children of each node.
    ///
    /// On an empty selection whose document has no document element yet,
    /// the fragment becomes the document content and the new document
    /// element becomes the current set.
    pub fn append<'a, F: Into<Fragment<'a>>>(&mut self, fragment: F) -> Result<&mut Self> {
        if self.nodes.is_empty() && self.document.document_element().is_none() {
            let nodes = self.resolve(fragment.into())?;
            if nodes.is_empty() {
                return Ok(self);
            }

            let root = self.document.root();
            splice(&nodes, &[root], Position::Append);
            let root_element = self.document.document_element().into_iter().collect();
            return Ok(self.replace_current(root_element));
        }

        self.insert_fragment(fragment.into(), Position::Append)
    }

    /// prepend inserts the fragment as the first children of each node.
    pub fn prepend<'a, F: Into<Fragment<'a>>>(&mut self, fragment: F) -> Result<&mut Self> {
        self.insert_fragment(fragment.into(), Position::Prepend)
    }

    /// before inserts the fragment right before each node. Nodes without a
    /// parent are skipped.
    pub fn before<'a, F: Into<Fragment<'a>>>(&mut self, fragment: F) -> Result<&mut Self> {
        self.insert_fragment(fragment.into(), Position::Before)
    }

    /// after inserts the fragment right after each node. Nodes without a
    /// parent are skipped.
    pub fn after<'a, F: Into<Fragment<'a>>>(&mut self, fragment: F) -> Result<&mut Self> {
        self.insert_fragment(fragment.into(), Position::After)
    }

    fn insert_into<'a>(&mut self, destination: Destination<'a>, position: Position) -> &mut Self {
        let fragment = self.nodes.as_slice().to_vec();
        if !fragment.is_empty() {
            splice(&fragment, &destination.targets(), position);
        }
        self
    }

    /// append_to appends the current nodes to each destination node.
    pub fn append_to<'a, D: Into<Destination<'a>>>(&mut self, destination: D) -> &mut Self {
        self.insert_into(destination.into(), Position::Append)
    }

    /// prepend_to prepends the current nodes to each destination node.
    pub fn prepend_to<'a, D: Into<Destination<'a>>>(&mut self, destination: D) -> &mut Self {
        self.insert_into(destination.into(), Position::Prepend)
    }

    /// insert_before inserts the current nodes before each destination node.
    pub fn insert_before<'a, D: Into<Destination<'a>>>(&mut self, destination: D) -> &mut Self {
        self.insert_into(destination.into(), Position::Before)
    }

    /// insert_after inserts the current nodes after each destination node.
    pub fn insert_after<'a, D: Into<Destination<'a>>>(&mut self, destination: D) -> &mut Self {
        self.insert_into(destination.into(), Position::After)
    }

    /// replace_with puts the fragment in place of each node and detaches
    /// the nodes. The inserted nodes become the current set; the history is
    /// left as is.
    pub fn replace_with<'a, F: Into<Fragment<'a>>>(&mut self, fragment: F) -> Result<&mut Self> {
        let nodes = self.resolve(fragment.into())?;
        if nodes.is_empty() {
            return Ok(self);
        }

        let targets = self.nodes.as_slice().to_vec();
        let inserted = replace(&nodes, &targets);
        Ok(self.replace_current(NodeSet::from(inserted)))
    }

    /// replace_all puts the current nodes in place of every node matching
    /// the selector in `document`, then detaches the matched nodes.
    pub fn replace_all(&mut self, sel: &str, document: &Document) -> Result<&mut Self> {
        let targets = document.select(sel)?;
        let fragment = self.nodes.as_slice().to_vec();
        if !fragment.is_empty() {
            replace(&fragment, targets.as_slice());
        }
        Ok(self)
    }

    /// wrap wraps each node in its own copy of the wrapper. The nodes go
    /// into the innermost first element of the wrapper.
    pub fn wrap<'a, F: Into<Fragment<'a>>>(&mut self, fragment: F) -> Result<&mut Self> {
        let template = match self.resolve_wrapper(fragment.into())? {
            Some(template) => template,
            None => return Ok(self),
        };

        for node in &self.nodes {
            if node.parent().is_none() {
                continue;
            }

            let wrapper = node.document().import(&template);
            node.append_prev_sibling(&wrapper.id);
            innermost(&wrapper).append_child(&node.id);
        }

        Ok(self)
    }

    /// wrap_all puts one copy of the wrapper where the first node, in
    /// document order, is and moves every node into it. Nodes of another
    /// document leave it; the current set then holds their copies.
    pub fn wrap_all<'a, F: Into<Fragment<'a>>>(&mut self, fragment: F) -> Result<&mut Self> {
        let template = match self.resolve_wrapper(fragment.into())? {
            Some(template) => template,
            None => return Ok(self),
        };

        let ordered = self.nodes.clone().sorted();
        let first = match ordered.first() {
            Some(first) if first.parent().is_some() => first.clone(),
            _ => return Ok(self),
        };

        let wrapper = first.document().import(&template);
        first.append_prev_sibling(&wrapper.id);
        let inner = innermost(&wrapper);

        // Nodes of other documents are copied over and detached at home.
        let mut moved_across = false;
        let mut wrapped = vec![];
        for node in &ordered {
            let moved = if node.document().same(first.document()) {
                node.clone()
            } else {
                moved_across = true;
                let copy = first.document().import(node);
                node.remove_from_parent();
                copy
            };
            inner.append_child(&moved.id);
            wrapped.push(moved);
        }

        if moved_across {
            self.nodes = NodeSet::from(wrapped);
        }
        Ok(self)
    }

    /// wrap_inner moves the children of each node into a copy of the
    /// wrapper, which becomes the node's only child.
    pub fn wrap_inner<'a, F: Into<Fragment<'a>>>(&mut self, fragment: F) -> Result<&mut Self> {
        let template = match self.resolve_wrapper(fragment.into())? {
            Some(template) => template,
            None => return Ok(self),
        };

        for node in &self.nodes {
            let wrapper = node.document().import(&template);
            let inner = innermost(&wrapper);
            node.document()
                .tree_mut()
                .reparent_children_of(&node.id, Some(inner.id));
            node.append_child(&wrapper.id);
        }

        Ok(self)
    }

    /// remove detaches the current nodes, or the ones matching the
    /// selector, and returns them. They can be inserted again.
    pub fn remove(&mut self, sel: Option<&str>) -> Result<NodeSet> {
        let removed = match sel {
            Some(sel) => Matcher::new(sel)?.filter(&self.nodes),
            None => self.nodes.clone(),
        };

        for node in &removed {
            node.remove_from_parent();
        }

        Ok(removed)
    }

    /// remove_children detaches the children of each node.
    pub fn remove_children(&mut self) -> &mut Self {
        for node in &self.nodes {
            node.remove_children();
        }
        self
    }

    /// clone_all replaces the current set by detached deep copies of its
    /// nodes.
    pub fn clone_all(&mut self) -> &mut Self {
        let copies = self.nodes.iter().map(Node::deep_clone).collect();
        self.replace_current(NodeSet::from_raw(copies))
    }

    /// set_html replaces the children of each node with the parsed HTML.
    pub fn set_html(&mut self, markup: &str) -> Result<&mut Self> {
        self.set_markup(markup, ContentType::Html)
    }

    /// set_xml replaces the children of each node with the parsed XML.
    pub fn set_xml(&mut self, markup: &str) -> Result<&mut Self> {
        self.set_markup(markup, ContentType::Xml)
    }

    fn set_markup(&mut self, markup: &str, content_type: ContentType) -> Result<&mut Self> {
        if self.nodes.is_empty() {
            return Ok(self);
        }

        let fragment = if markup.is_empty() {
            vec![]
        } else {
            Document::parse_fragment(markup, content_type, &self.options)?
        };

        for node in &self.nodes {
            node.remove_children();
        }

        let targets = self.nodes.as_slice().to_vec();
        splice(&fragment, &targets, Position::Append);
        Ok(self)
    }
}
