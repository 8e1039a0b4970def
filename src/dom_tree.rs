use log::warn;

/// Identity of a node inside one document's tree.
///
/// Ids are indexes into the tree's arena and are never reused: a detached
/// node keeps its id and can be inserted again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    value: usize,
}

impl NodeId {
    pub(crate) fn new(value: usize) -> Self {
        NodeId { value }
    }

    /// The arena index of this node.
    pub fn value(&self) -> usize {
        self.value
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InnerNode<T> {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub data: T,
}

impl<T> InnerNode<T> {
    fn new(id: NodeId, data: T) -> Self {
        InnerNode {
            id,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
            data,
        }
    }
}

/// An arena of linked nodes. The node with id 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct Tree<T> {
    nodes: Vec<InnerNode<T>>,
}

impl<T: Clone> Tree<T> {
    /// Creates a tree holding only its root.
    pub fn new(root: T) -> Self {
        Tree {
            nodes: vec![InnerNode::new(NodeId::new(0), root)],
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::new(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Creates a new detached node.
    pub fn create_node(&mut self, data: T) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(InnerNode::new(id, data));
        id
    }

    pub fn node(&self, id: &NodeId) -> &InnerNode<T> {
        &self.nodes[id.value]
    }

    pub fn node_mut(&mut self, id: &NodeId) -> &mut InnerNode<T> {
        &mut self.nodes[id.value]
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child_of(&self, id: &NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn last_child_of(&self, id: &NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    pub fn prev_sibling_of(&self, id: &NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    pub fn next_sibling_of(&self, id: &NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    pub fn children_of(&self, id: &NodeId) -> Vec<NodeId> {
        let mut children = vec![];
        let mut next = self.first_child_of(id);

        while let Some(child) = next {
            children.push(child);
            next = self.next_sibling_of(&child);
        }

        children
    }

    /// Ancestors of the node, nearest first.
    pub fn ancestors_of(&self, id: &NodeId) -> Vec<NodeId> {
        let mut ancestors = vec![];
        let mut next = self.parent_of(id);

        while let Some(parent) = next {
            ancestors.push(parent);
            next = self.parent_of(&parent);
        }

        ancestors
    }

    /// Descendants of the node in document order, the node itself excluded.
    pub fn descendants_of(&self, id: &NodeId) -> Vec<NodeId> {
        let mut descendants = vec![];
        let mut stack = self.children_of(id);
        stack.reverse();

        while let Some(node) = stack.pop() {
            descendants.push(node);
            let mut children = self.children_of(&node);
            children.reverse();
            stack.extend(children);
        }

        descendants
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        if ancestor == id {
            return true;
        }

        let mut next = self.parent_of(id);
        while let Some(parent) = next {
            if parent == *ancestor {
                return true;
            }
            next = self.parent_of(&parent);
        }

        false
    }

    /// The top of the subtree holding the node: the root for attached nodes.
    pub fn top_of(&self, id: &NodeId) -> NodeId {
        let mut top = *id;
        while let Some(parent) = self.parent_of(&top) {
            top = parent;
        }
        top
    }

    /// Rank of every node in document order, indexed by id value. Detached
    /// subtrees follow the attached tree, in the order their tops were
    /// created.
    pub fn document_order(&self) -> Vec<usize> {
        let mut order = vec![0; self.nodes.len()];
        let mut rank = 0;

        for top in self.nodes.iter().filter(|node| node.parent.is_none()) {
            let mut stack = vec![top.id];
            while let Some(id) = stack.pop() {
                order[id.value] = rank;
                rank += 1;

                let mut child = self.last_child_of(&id);
                while let Some(current) = child {
                    stack.push(current);
                    child = self.prev_sibling_of(&current);
                }
            }
        }

        order
    }

    /// Detach the node from its parent and siblings. Children are kept.
    pub fn remove_from_parent(&mut self, id: &NodeId) {
        let (parent, prev, next) = {
            let node = self.node(id);
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        if let Some(prev) = prev {
            self.node_mut(&prev).next_sibling = next;
        } else if let Some(parent) = parent {
            self.node_mut(&parent).first_child = next;
        }

        if let Some(next) = next {
            self.node_mut(&next).prev_sibling = prev;
        } else if let Some(parent) = parent {
            self.node_mut(&parent).last_child = prev;
        }

        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    // Refuses moves that would make a node its own ancestor.
    fn can_insert(&self, anchor: &NodeId, id: &NodeId) -> bool {
        if self.is_ancestor_or_self(id, anchor) {
            warn!("refusing to insert node {:?} inside its own subtree", id);
            return false;
        }

        true
    }

    /// Append the node as the last child of `parent`.
    pub fn append_child_of(&mut self, parent: &NodeId, id: &NodeId) -> bool {
        if !self.can_insert(parent, id) {
            return false;
        }

        self.remove_from_parent(id);
        let last_child = self.last_child_of(parent);

        {
            let node = self.node_mut(id);
            node.parent = Some(*parent);
            node.prev_sibling = last_child;
        }

        match last_child {
            Some(last) => self.node_mut(&last).next_sibling = Some(*id),
            None => self.node_mut(parent).first_child = Some(*id),
        }
        self.node_mut(parent).last_child = Some(*id);

        true
    }

    /// Insert the node as the first child of `parent`.
    pub fn prepend_child_of(&mut self, parent: &NodeId, id: &NodeId) -> bool {
        match self.first_child_of(parent) {
            Some(first) => self.append_prev_sibling_of(&first, id),
            None => self.append_child_of(parent, id),
        }
    }

    /// Insert the node right before `sibling`. Does nothing when `sibling`
    /// has no parent.
    pub fn append_prev_sibling_of(&mut self, sibling: &NodeId, id: &NodeId) -> bool {
        let parent = match self.parent_of(sibling) {
            Some(parent) => parent,
            None => return false,
        };

        if sibling == id {
            return true;
        }

        if !self.can_insert(&parent, id) {
            return false;
        }

        self.remove_from_parent(id);
        let prev = self.prev_sibling_of(sibling);

        {
            let node = self.node_mut(id);
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(*sibling);
        }

        match prev {
            Some(prev) => self.node_mut(&prev).next_sibling = Some(*id),
            None => self.node_mut(&parent).first_child = Some(*id),
        }
        self.node_mut(sibling).prev_sibling = Some(*id);

        true
    }

    /// Insert the node right after `sibling`. Does nothing when `sibling`
    /// has no parent.
    pub fn append_next_sibling_of(&mut self, sibling: &NodeId, id: &NodeId) -> bool {
        match self.next_sibling_of(sibling) {
            Some(next) if next != *id => self.append_prev_sibling_of(&next, id),
            Some(_) => true,
            None => match self.parent_of(sibling) {
                Some(parent) => self.append_child_of(&parent, id),
                None => false,
            },
        }
    }

    /// Move every child of the node to the end of `new_parent`, or detach
    /// them when there is none.
    pub fn reparent_children_of(&mut self, id: &NodeId, new_parent: Option<NodeId>) {
        for child in self.children_of(id) {
            match new_parent {
                Some(ref parent) => {
                    self.append_child_of(parent, &child);
                }
                None => self.remove_from_parent(&child),
            }
        }
    }

    pub fn remove_children_of(&mut self, id: &NodeId) {
        self.reparent_children_of(id, None)
    }

    /// Copy the subtree rooted at the node. The copy is detached.
    pub fn deep_clone(&mut self, id: &NodeId) -> NodeId {
        let data = self.node(id).data.clone();
        let copy = self.create_node(data);

        for child in self.children_of(id) {
            let child_copy = self.deep_clone(&child);
            self.append_child_of(&copy, &child_copy);
        }

        copy
    }

    /// Copy the subtree rooted at `id` in `other` into this tree. The copy
    /// is detached.
    pub fn import(&mut self, other: &Tree<T>, id: &NodeId) -> NodeId {
        let copy = self.create_node(other.node(id).data.clone());

        for child in other.children_of(id) {
            let child_copy = self.import(other, &child);
            self.append_child_of(&copy, &child_copy);
        }

        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree<&'static str>, Vec<NodeId>) {
        let mut tree = Tree::new("root");
        let root = tree.root_id();
        let a = tree.create_node("a");
        let b = tree.create_node("b");
        let c = tree.create_node("c");
        tree.append_child_of(&root, &a);
        tree.append_child_of(&root, &b);
        tree.append_child_of(&a, &c);
        (tree, vec![root, a, b, c])
    }

    fn names(tree: &Tree<&'static str>, ids: &[NodeId]) -> Vec<&'static str> {
        ids.iter().map(|id| tree.node(id).data).collect()
    }

    #[test]
    fn test_children_and_descendants() {
        let (tree, ids) = sample();
        assert_eq!(names(&tree, &tree.children_of(&ids[0])), vec!["a", "b"]);
        assert_eq!(
            names(&tree, &tree.descendants_of(&ids[0])),
            vec!["a", "c", "b"]
        );
        assert_eq!(names(&tree, &tree.ancestors_of(&ids[3])), vec!["a", "root"]);
    }

    #[test]
    fn test_sibling_insertion() {
        let (mut tree, ids) = sample();
        let d = tree.create_node("d");
        let e = tree.create_node("e");
        assert!(tree.append_prev_sibling_of(&ids[1], &d));
        assert!(tree.append_next_sibling_of(&ids[2], &e));
        assert_eq!(
            names(&tree, &tree.children_of(&ids[0])),
            vec!["d", "a", "b", "e"]
        );
        assert_eq!(tree.prev_sibling_of(&ids[1]), Some(d));
        assert_eq!(tree.last_child_of(&ids[0]), Some(e));
    }

    #[test]
    fn test_detached_sibling_insertion_is_refused() {
        let (mut tree, _) = sample();
        let lonely = tree.create_node("lonely");
        let d = tree.create_node("d");
        assert!(!tree.append_prev_sibling_of(&lonely, &d));
        assert!(!tree.append_next_sibling_of(&lonely, &d));
        assert_eq!(tree.parent_of(&d), None);
    }

    #[test]
    fn test_remove_from_parent() {
        let (mut tree, ids) = sample();
        tree.remove_from_parent(&ids[1]);
        assert_eq!(names(&tree, &tree.children_of(&ids[0])), vec!["b"]);
        assert_eq!(tree.first_child_of(&ids[0]), Some(ids[2]));
        assert_eq!(tree.prev_sibling_of(&ids[2]), None);
        // the detached subtree stays intact
        assert_eq!(tree.children_of(&ids[1]), vec![ids[3]]);
        assert_eq!(tree.top_of(&ids[3]), ids[1]);
    }

    #[test]
    fn test_cycles_are_refused() {
        let (mut tree, ids) = sample();
        assert!(!tree.append_child_of(&ids[3], &ids[1]));
        assert!(!tree.append_child_of(&ids[1], &ids[1]));
        assert_eq!(tree.parent_of(&ids[1]), Some(ids[0]));
    }

    #[test]
    fn test_document_order() {
        let (mut tree, ids) = sample();
        let order = tree.document_order();
        assert_eq!(order[ids[0].value()], 0);
        assert_eq!(order[ids[1].value()], 1);
        assert_eq!(order[ids[3].value()], 2);
        assert_eq!(order[ids[2].value()], 3);

        // detached subtrees come after the tree, by creation
        let d = tree.create_node("d");
        tree.remove_from_parent(&ids[1]);
        let order = tree.document_order();
        assert_eq!(order[ids[2].value()], 1);
        assert_eq!(order[ids[1].value()], 2);
        assert_eq!(order[ids[3].value()], 3);
        assert_eq!(order[d.value()], 4);
    }

    #[test]
    fn test_deep_clone_and_import() {
        let (mut tree, ids) = sample();
        let copy = tree.deep_clone(&ids[1]);
        assert_eq!(tree.parent_of(&copy), None);
        assert_eq!(names(&tree, &tree.descendants_of(&copy)), vec!["c"]);

        let mut other = Tree::new("other");
        let imported = other.import(&tree, &ids[0]);
        assert_eq!(
            names(&other, &other.descendants_of(&imported)),
            vec!["a", "c", "b"]
        );
    }

    #[test]
    fn test_reparent_children() {
        let (mut tree, ids) = sample();
        tree.reparent_children_of(&ids[1], Some(ids[2]));
        assert!(tree.children_of(&ids[1]).is_empty());
        assert_eq!(tree.children_of(&ids[2]), vec![ids[3]]);
    }
}
