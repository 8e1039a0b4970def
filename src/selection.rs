use crate::document::Document;
use crate::error::Result;
use crate::matcher::Matcher;
use crate::node::Node;
use crate::node_set::NodeSet;
use crate::options::Options;
use log::debug;
use std::vec::IntoIter;

/// Selection is the chainable cursor over a set of nodes.
///
/// Navigating methods (`find`, `children`, `parent`...) replace the current
/// set in place and push the previous one on a history stack, which `end`
/// and `and_self` read back. Cloning a selection behaves like `branch`: the
/// copy starts with the current set and no history.
#[derive(Debug)]
pub struct Selection {
    pub(crate) nodes: NodeSet,
    history: Vec<NodeSet>,
    pub(crate) document: Document,
    pub(crate) options: Options,
}

impl Clone for Selection {
    fn clone(&self) -> Self {
        Selection::new(self.document.clone(), self.nodes.clone(), self.options.clone())
    }
}

impl Selection {
    pub(crate) fn new(document: Document, nodes: NodeSet, options: Options) -> Selection {
        Selection {
            nodes,
            history: vec![],
            document,
            options,
        }
    }

    // A selection over `nodes` whose history is this cursor's history
    // followed by its current set.
    pub(crate) fn descend(&self, nodes: NodeSet) -> Selection {
        let mut history = self.history.clone();
        history.push(self.nodes.clone());
        Selection {
            nodes,
            history,
            document: self.document.clone(),
            options: self.options.clone(),
        }
    }

    /// Makes `nodes` the current set, remembering the previous one.
    pub(crate) fn navigate(&mut self, nodes: NodeSet) -> &mut Self {
        let previous = std::mem::replace(&mut self.nodes, nodes);
        self.history.push(previous);
        self
    }

    /// Replaces the current set without touching the history.
    pub(crate) fn replace_current(&mut self, nodes: NodeSet) -> &mut Self {
        self.nodes = nodes;
        self
    }

    /// end restores the set that was current before the last navigation.
    /// Does nothing when there is no history.
    pub fn end(&mut self) -> &mut Self {
        match self.history.pop() {
            Some(previous) => self.nodes = previous,
            None => debug!("end() called without history"),
        }
        self
    }

    /// and_self adds the previous set to the current one, in document
    /// order. The history is left as is.
    pub fn and_self(&mut self) -> &mut Self {
        if let Some(previous) = self.history.last() {
            self.nodes = self.nodes.union(previous);
        }
        self
    }

    /// top drops the history and selects the document element of the
    /// owning document, or with a selector everything matching it in the
    /// whole document.
    pub fn top(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let nodes = match sel {
            Some(sel) => self.document.select(sel)?,
            None => self.document.document_element().into_iter().collect(),
        };

        self.history.clear();
        self.nodes = nodes;
        Ok(self)
    }

    /// branch returns an independent selection over the same document,
    /// starting from the current set or, with a selector, from what `find`
    /// would select.
    pub fn branch(&self, sel: Option<&str>) -> Result<Selection> {
        let mut branch = self.clone();
        if let Some(sel) = sel {
            branch.find(sel)?;
        }
        Ok(branch)
    }

    /// iter returns single-node selections for the nodes of the current
    /// set, as it was when `iter` was called.
    pub fn iter(&self) -> Selections {
        Selections {
            iter: self.nodes.clone().into_iter(),
            options: self.options.clone(),
        }
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn first(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// size is the number of nodes in the current set.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// length is an alias of `size`.
    pub fn length(&self) -> usize {
        self.size()
    }

    pub fn exists(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// The document used when the current set is empty.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn matcher(sel: Option<&str>) -> Result<Option<Matcher>> {
        sel.map(Matcher::new).transpose()
    }
}

impl From<Selection> for NodeSet {
    fn from(selection: Selection) -> NodeSet {
        selection.nodes
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Iterator over single-node selections.
pub struct Selections {
    iter: IntoIter<Node>,
    options: Options,
}

impl Iterator for Selections {
    type Item = Selection;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|node| {
            let document = node.document().clone();
            Selection::new(document, NodeSet::from(node), self.options.clone())
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}
