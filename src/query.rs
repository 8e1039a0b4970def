use crate::callback::{Flow, Invocable};
use crate::document::Document;
use crate::error::Result;
use crate::matcher::Matcher;
use crate::node::Node;
use crate::node_set::NodeSet;
use crate::selection::Selection;
use crate::source::is_xmlish;

/// What `is`, `not` and `add` compare the current set against.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A CSS selector. `add` also accepts markup here.
    Selector(&'a str),
    Node(&'a Node),
    Nodes(&'a NodeSet),
    Selection(&'a Selection),
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(sel: &'a str) -> Self {
        Target::Selector(sel)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(sel: &'a String) -> Self {
        Target::Selector(sel)
    }
}

impl<'a> From<&'a Node> for Target<'a> {
    fn from(node: &'a Node) -> Self {
        Target::Node(node)
    }
}

impl<'a> From<&'a NodeSet> for Target<'a> {
    fn from(nodes: &'a NodeSet) -> Self {
        Target::Nodes(nodes)
    }
}

impl<'a> From<&'a Selection> for Target<'a> {
    fn from(selection: &'a Selection) -> Self {
        Target::Selection(selection)
    }
}

impl<'a> Target<'a> {
    // The target's nodes, selectors resolved against the whole document.
    fn resolve(self, document: &Document) -> Result<NodeSet> {
        match self {
            Target::Selector(sel) => document.select(sel),
            Target::Node(node) => Ok(NodeSet::from(node.clone())),
            Target::Nodes(nodes) => Ok(nodes.clone()),
            Target::Selection(selection) => Ok(selection.nodes.clone()),
        }
    }
}

impl Selection {
    /// is checks whether any node of the current set matches the selector,
    /// or is one of the given nodes.
    pub fn is<'a, T: Into<Target<'a>>>(&self, target: T) -> Result<bool> {
        match target.into() {
            Target::Selector(sel) => {
                let matcher = Matcher::new(sel)?;
                Ok(self.nodes.iter().any(|node| matcher.match_element(node)))
            }
            other => {
                let nodes = other.resolve(&self.document)?;
                Ok(self.nodes.iter().any(|node| nodes.contains(node)))
            }
        }
    }

    /// not removes the nodes matching the selector, or being one of the
    /// given nodes, from the current set.
    pub fn not<'a, T: Into<Target<'a>>>(&mut self, target: T) -> Result<&mut Self> {
        let kept = match target.into() {
            Target::Selector(sel) => {
                let matcher = Matcher::new(sel)?;
                self.nodes.filter(|_, node| !matcher.match_element(node))
            }
            other => {
                let excluded = other.resolve(&self.document)?;
                self.nodes.exclude(&excluded)
            }
        };

        Ok(self.navigate(kept))
    }

    /// add merges more nodes into the current set, keeping document order.
    /// A string is parsed when it is markup and matched against the whole
    /// document otherwise. The history is left as is.
    pub fn add<'a, T: Into<Target<'a>>>(&mut self, target: T) -> Result<&mut Self> {
        let added = match target.into() {
            Target::Selector(markup) if is_xmlish(markup) => NodeSet::from(
                Document::parse_fragment(markup, self.document.content_type(), &self.options)?,
            ),
            other => other.resolve(&self.document)?,
        };

        let merged = self.nodes.union(&added);
        Ok(self.replace_current(merged))
    }

    /// eq returns a selection holding only the node at `index`, or nothing
    /// when out of range. The new selection can `end` back to this one's
    /// current set.
    pub fn eq(&self, index: usize) -> Selection {
        let nodes = self.nodes.slice(index, Some(1));
        self.descend(nodes)
    }

    /// index gets the position of the node in the current set.
    pub fn index(&self, node: &Node) -> Option<usize> {
        self.nodes.index_of(node)
    }

    /// each calls the callback with the position and node of every node in
    /// the current set, stopping early when it returns `Flow::Break`.
    pub fn each<C>(&mut self, mut callback: C) -> Result<&mut Self>
    where
        C: Invocable<Flow>,
    {
        callback.resolve()?;

        let snapshot = self.nodes.clone();
        for (i, node) in snapshot.iter().enumerate() {
            if callback.invoke(i, node)? == Flow::Break {
                break;
            }
        }

        Ok(self)
    }
}
