use crate::callback::{Invocable, Mapped};
use crate::error::Result;
use crate::matcher::Matcher;
use crate::node::Node;
use crate::node_set::NodeSet;
use crate::selection::Selection;

// Keeps the nodes matching the optional matcher.
fn matching(nodes: Vec<Node>, matcher: &Option<Matcher>) -> impl Iterator<Item = Node> + '_ {
    nodes.into_iter().filter(move |node| match matcher {
        Some(matcher) => matcher.match_element(node),
        None => node.is_element(),
    })
}

impl Selection {
    /// find gets the descendants of each node in the current set that match
    /// the selector, in document order.
    pub fn find(&mut self, sel: &str) -> Result<&mut Self> {
        let found = Matcher::new(sel)?.match_all(&self.nodes);
        Ok(self.navigate(found))
    }

    /// children gets the element children of each node, optionally filtered
    /// by a selector.
    pub fn children(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let matcher = Selection::matcher(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            result.extend(matching(node.element_children(), &matcher));
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// contents gets every child node of each node: elements, text,
    /// comments and processing instructions.
    pub fn contents(&mut self) -> &mut Self {
        let mut result = vec![];

        for node in &self.nodes {
            result.extend(node.children());
        }

        self.navigate(NodeSet::from(result).sorted())
    }

    /// parent gets the parent element of each node. With a selector, the
    /// nearest ancestor element matching it.
    pub fn parent(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let matcher = Selection::matcher(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            if matcher.is_some() {
                result.extend(matching(node.ancestors(), &matcher).next());
            } else {
                result.extend(node.parent().filter(|parent| parent.is_element()));
            }
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// parents gets every ancestor element of each node, optionally
    /// filtered by a selector.
    pub fn parents(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let matcher = Selection::matcher(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            result.extend(matching(node.ancestors(), &matcher));
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// closest gets, for each node, the node itself or its nearest
    /// ancestor matching the selector. Nodes without such an ancestor
    /// contribute nothing.
    pub fn closest(&mut self, sel: &str) -> Result<&mut Self> {
        let matcher = Matcher::new(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            if matcher.match_element(node) {
                result.push(node.clone());
                continue;
            }

            result.extend(
                node.ancestors()
                    .into_iter()
                    .find(|ancestor| matcher.match_element(ancestor)),
            );
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// siblings gets the other element children of each node's parent,
    /// optionally filtered by a selector.
    pub fn siblings(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let matcher = Selection::matcher(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            if let Some(parent) = node.parent() {
                let siblings: Vec<Node> = parent
                    .element_children()
                    .into_iter()
                    .filter(|sibling| sibling != node)
                    .collect();
                result.extend(matching(siblings, &matcher));
            }
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// next gets the element following each node. With a selector, the
    /// nearest following element matching it.
    pub fn next(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let matcher = Selection::matcher(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            result.extend(matching(following(node), &matcher).next());
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// next_all gets every element following each node, optionally filtered
    /// by a selector.
    pub fn next_all(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let matcher = Selection::matcher(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            result.extend(matching(following(node), &matcher));
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// prev gets the element preceding each node. With a selector, the
    /// nearest preceding element matching it.
    pub fn prev(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let matcher = Selection::matcher(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            result.extend(matching(preceding(node), &matcher).next());
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// prev_all gets every element preceding each node, optionally filtered
    /// by a selector.
    pub fn prev_all(&mut self, sel: Option<&str>) -> Result<&mut Self> {
        let matcher = Selection::matcher(sel)?;
        let mut result = vec![];

        for node in &self.nodes {
            result.extend(matching(preceding(node), &matcher));
        }

        Ok(self.navigate(NodeSet::from(result).sorted()))
    }

    /// deepest gets the elements lying deepest below the current nodes.
    /// Depth is counted from each current node; a node without element
    /// descendants is its own deepest element.
    pub fn deepest(&mut self) -> &mut Self {
        let mut deepest = 0;
        let mut winners = vec![];

        for node in &self.nodes {
            if !node.is_element() {
                continue;
            }

            let base = node.depth();
            let mut local = vec![node.clone()];
            let mut local_deepest = 0;

            for descendant in node.descendants() {
                if !descendant.is_element() {
                    continue;
                }

                let depth = descendant.depth() - base;
                if depth > local_deepest {
                    local_deepest = depth;
                    local.clear();
                }
                if depth == local_deepest {
                    local.push(descendant);
                }
            }

            if local_deepest > deepest || winners.is_empty() {
                deepest = local_deepest;
                winners = local;
            } else if local_deepest == deepest {
                winners.extend(local);
            }
        }

        self.navigate(NodeSet::from(winners).sorted())
    }

    /// filter keeps the nodes matching the selector.
    pub fn filter(&mut self, sel: &str) -> Result<&mut Self> {
        let kept = Matcher::new(sel)?.filter(&self.nodes);
        Ok(self.navigate(kept))
    }

    /// filter_callback keeps the nodes for which the callback, given each
    /// position and node, returns true.
    pub fn filter_callback<C>(&mut self, mut callback: C) -> Result<&mut Self>
    where
        C: Invocable<bool>,
    {
        callback.resolve()?;

        let mut kept = vec![];
        for (i, node) in self.nodes.iter().enumerate() {
            if callback.invoke(i, node)? {
                kept.push(node.clone());
            }
        }

        Ok(self.navigate(NodeSet::from_raw(kept)))
    }

    /// map makes the callback results the current set, in call order and
    /// duplicates included.
    pub fn map<C>(&mut self, mut callback: C) -> Result<&mut Self>
    where
        C: Invocable<Mapped>,
    {
        callback.resolve()?;

        let mut mapped = vec![];
        for (i, node) in self.nodes.iter().enumerate() {
            callback.invoke(i, node)?.extend_into(&mut mapped);
        }

        Ok(self.navigate(NodeSet::from_raw(mapped)))
    }

    /// slice keeps at most `length` nodes starting at `start`, or all from
    /// `start` on. Out of range bounds give an empty or shorter set.
    pub fn slice(&mut self, start: usize, length: Option<usize>) -> &mut Self {
        let sliced = self.nodes.slice(start, length);
        self.navigate(sliced)
    }
}

fn following(node: &Node) -> Vec<Node> {
    let mut result = vec![];
    let mut next = node.next_element_sibling();
    while let Some(sibling) = next {
        next = sibling.next_element_sibling();
        result.push(sibling);
    }
    result
}

// Nearest first.
fn preceding(node: &Node) -> Vec<Node> {
    let mut result = vec![];
    let mut prev = node.prev_element_sibling();
    while let Some(sibling) = prev {
        prev = sibling.prev_element_sibling();
        result.push(sibling);
    }
    result
}
