use crate::callback::Mapped;
use crate::node::Node;
use std::collections::HashSet;
use std::iter::FromIterator;
use std::slice::Iter;
use std::vec::IntoIter;

/// An ordered set of node handles.
///
/// Building a `NodeSet` drops duplicate handles, keeping the first one.
/// Operations merging several sources (`union`, `sorted`) put the result in
/// document order; `map` is the one operation keeping duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: Vec<Node>,
}

impl NodeSet {
    pub fn new() -> NodeSet {
        NodeSet { nodes: vec![] }
    }

    // No deduplication.
    pub(crate) fn from_raw(nodes: Vec<Node>) -> NodeSet {
        NodeSet { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn first(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn iter(&self) -> Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.nodes
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    /// Adds the node at the end unless it is already in the set.
    pub fn push(&mut self, node: Node) {
        if !self.contains(&node) {
            self.nodes.push(node);
        }
    }

    /// The set deduplicated and in document order.
    pub fn sorted(self) -> NodeSet {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        let mut keyed: Vec<_> = self
            .nodes
            .into_iter()
            .filter(|node| seen.insert(node.clone()))
            .map(|node| (node.order_key(), node))
            .collect();

        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        NodeSet {
            nodes: keyed.into_iter().map(|(_, node)| node).collect(),
        }
    }

    /// Nodes of both sets, deduplicated and in document order.
    pub fn union(&self, other: &NodeSet) -> NodeSet {
        let nodes = self.nodes.iter().chain(other.nodes.iter()).cloned();
        NodeSet::from_raw(nodes.collect()).sorted()
    }

    /// At most `length` nodes starting at `start`; everything from `start`
    /// when `length` is `None`. Out of range bounds are clamped.
    pub fn slice(&self, start: usize, length: Option<usize>) -> NodeSet {
        if start >= self.nodes.len() {
            return NodeSet::new();
        }

        let available = self.nodes.len() - start;
        let end = start + length.map_or(available, |length| length.min(available));
        NodeSet::from_raw(self.nodes[start..end].to_vec())
    }

    /// Keeps the nodes for which the predicate, given each position and
    /// node, returns true.
    pub fn filter<P>(&self, mut predicate: P) -> NodeSet
    where
        P: FnMut(usize, &Node) -> bool,
    {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, node)| predicate(*i, node))
            .map(|(_, node)| node.clone())
            .collect();
        NodeSet::from_raw(nodes)
    }

    /// Concatenates the results of `f` in call order. Duplicates are kept.
    pub fn map<F>(&self, mut f: F) -> NodeSet
    where
        F: FnMut(usize, &Node) -> Mapped,
    {
        let mut nodes = vec![];
        for (i, node) in self.nodes.iter().enumerate() {
            f(i, node).extend_into(&mut nodes);
        }
        NodeSet::from_raw(nodes)
    }

    /// Position of the node, `None` when absent.
    pub fn index_of(&self, node: &Node) -> Option<usize> {
        self.nodes.iter().position(|n| n == node)
    }

    /// The nodes not in `other`, in their order.
    pub fn exclude(&self, other: &NodeSet) -> NodeSet {
        let other: HashSet<&Node> = other.nodes.iter().collect();
        let nodes = self
            .nodes
            .iter()
            .filter(|node| !other.contains(node))
            .cloned()
            .collect();
        NodeSet::from_raw(nodes)
    }
}

impl From<Vec<Node>> for NodeSet {
    fn from(nodes: Vec<Node>) -> NodeSet {
        nodes.into_iter().collect()
    }
}

impl From<Node> for NodeSet {
    fn from(node: Node) -> NodeSet {
        NodeSet::from_raw(vec![node])
    }
}

impl FromIterator<Node> for NodeSet {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> NodeSet {
        let mut seen = HashSet::new();
        let nodes = iter
            .into_iter()
            .filter(|node| seen.insert(node.clone()))
            .collect();
        NodeSet { nodes }
    }
}

impl IntoIterator for NodeSet {
    type Item = Node;
    type IntoIter = IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentType, Document};
    use crate::options::Options;

    fn items() -> (Document, Vec<Node>) {
        let xml = "<?xml version=\"1.0\"?><r><a/><b/><c/><d/></r>";
        let document = Document::parse(xml, ContentType::Xml, &Options::default()).unwrap();
        let nodes = document.document_element().unwrap().children();
        (document, nodes)
    }

    #[test]
    fn test_union_dedupes_in_document_order() {
        let (_doc, nodes) = items();
        let left = NodeSet::from(vec![nodes[2].clone(), nodes[0].clone()]);
        let right = NodeSet::from(vec![nodes[1].clone(), nodes[2].clone()]);
        let union = left.union(&right);
        assert_eq!(union.as_slice(), &nodes[0..3]);
    }

    #[test]
    fn test_detached_nodes_order_after_the_tree() {
        let (_doc, nodes) = items();
        nodes[0].remove_from_parent();
        let set = NodeSet::from(vec![nodes[0].clone(), nodes[3].clone()]).sorted();
        assert_eq!(set.as_slice(), &[nodes[3].clone(), nodes[0].clone()]);
    }

    #[test]
    fn test_order_follows_mutations() {
        let (_doc, nodes) = items();
        let set = NodeSet::from(vec![nodes[3].clone(), nodes[0].clone()]);
        assert_eq!(set.clone().sorted().as_slice(), &[nodes[0].clone(), nodes[3].clone()]);

        nodes[3].append_next_sibling(&nodes[0].id);
        assert_eq!(set.sorted().as_slice(), &[nodes[3].clone(), nodes[0].clone()]);
    }

    #[test]
    fn test_sorted_wide_tree() {
        let xml = format!("<?xml version=\"1.0\"?><r>{}</r>", "<i/>".repeat(5000));
        let document = Document::parse(&xml, ContentType::Xml, &Options::default()).unwrap();
        let children = document.document_element().unwrap().children();

        let reversed: Vec<Node> = children.iter().rev().cloned().collect();
        let set = NodeSet::from(reversed).sorted();
        assert_eq!(set.as_slice(), &children[..]);
    }

    #[test]
    fn test_slice_clamps() {
        let (_doc, nodes) = items();
        let set = NodeSet::from(nodes.clone());
        assert_eq!(set.slice(1, Some(2)).as_slice(), &nodes[1..3]);
        assert_eq!(set.slice(2, Some(100)).len(), 2);
        assert_eq!(set.slice(2, None).len(), 2);
        assert_eq!(set.slice(4, Some(1)).len(), 0);
        assert_eq!(set.slice(100, None).len(), 0);
        assert_eq!(set.slice(0, Some(0)).len(), 0);
    }

    #[test]
    fn test_map_keeps_order_and_duplicates() {
        let (_doc, nodes) = items();
        let set = NodeSet::from(nodes.clone());
        let first = nodes[0].clone();
        let mapped = set.map(|i, node| match i {
            0 => Mapped::Nothing,
            1 => Mapped::Many(vec![node.clone(), first.clone()]),
            _ => Mapped::One(first.clone()),
        });
        assert_eq!(
            mapped.as_slice(),
            &[nodes[1].clone(), first.clone(), first.clone(), first]
        );
    }

    #[test]
    fn test_filter_index_and_exclude() {
        let (_doc, nodes) = items();
        let set = NodeSet::from(nodes.clone());
        let odd = set.filter(|i, _| i % 2 == 1);
        assert_eq!(odd.as_slice(), &[nodes[1].clone(), nodes[3].clone()]);
        assert_eq!(set.index_of(&nodes[2]), Some(2));
        assert_eq!(odd.index_of(&nodes[2]), None);
        assert_eq!(set.exclude(&odd).as_slice(), &[nodes[0].clone(), nodes[2].clone()]);
    }
}
