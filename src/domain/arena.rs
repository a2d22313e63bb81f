use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::entities::{NodeFlags, NodeKey, NodeKind, Payload};
use crate::domain::error::{DomainError, DomainResult};

/// Data payload for tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// What the node represents
    pub kind: NodeKind,
    /// Freshness and visibility flags
    pub flags: NodeFlags,
}

impl NodeData {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            flags: NodeFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Items this node contributes by itself to subtree counts.
    fn own_count(&self) -> usize {
        match self.kind {
            NodeKind::Item(_) if self.flags.is_actionable() => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.label())
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    data: NodeData,
    parent: Option<Index>,
    children: Vec<Index>,
    /// Live items in this subtree, the node itself included
    item_count: usize,
}

impl TreeNode {
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn kind(&self) -> &NodeKind {
        &self.data.kind
    }

    pub fn flags(&self) -> NodeFlags {
        self.data.flags
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.data.kind.payload()
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.data.flags.is_valid()
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn key(&self) -> NodeKey {
        self.data.kind.key()
    }
}

/// Arena-based tree structure owning every node of one hierarchy.
///
/// Indices are generational: a reference into a replaced or removed subtree
/// resolves to `None` instead of aliasing a newer node.
#[derive(Debug)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node below `parent`, or as the root when `parent` is `None`.
    ///
    /// Counts along the path to the root are recomputed.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> DomainResult<Index> {
        match parent {
            None if self.root.is_some() => return Err(DomainError::RootExists),
            Some(_) if matches!(data.kind, NodeKind::Root) => {
                return Err(DomainError::MisplacedRoot)
            }
            Some(p) if !self.arena.contains(p) => {
                return Err(DomainError::StaleNode(format!("{:?}", p)))
            }
            _ => {}
        }

        let node = TreeNode {
            item_count: data.own_count(),
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
            self.recount_to_root(parent_idx);
        } else {
            self.root = Some(node_idx);
        }

        Ok(node_idx)
    }

    /// Remove a node together with its whole subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> DomainResult<()> {
        let parent = self
            .arena
            .get(idx)
            .ok_or_else(|| DomainError::StaleNode(format!("{:?}", idx)))?
            .parent;

        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                stack.extend(node.children);
            }
        }

        match parent {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.retain(|&c| c != idx);
                }
                self.recount_to_root(parent_idx);
            }
            None => self.root = None,
        }
        Ok(())
    }

    /// Drop every child of `idx`, keeping the node itself.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_all_children(&mut self, idx: Index) -> DomainResult<()> {
        let children = self
            .arena
            .get(idx)
            .ok_or_else(|| DomainError::StaleNode(format!("{:?}", idx)))?
            .children
            .clone();
        for child in children {
            self.remove_subtree(child)?;
        }
        Ok(())
    }

    /// Change the flags of a node; counts along the path to the root follow.
    pub fn update_flags(&mut self, idx: Index, f: impl FnOnce(&mut NodeFlags)) -> DomainResult<()> {
        let node = self
            .arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::StaleNode(format!("{:?}", idx)))?;
        f(&mut node.data.flags);
        trace!("flags of {} now {:?}", node.data, node.data.flags);
        self.recount_to_root(idx);
        Ok(())
    }

    fn recount_to_root(&mut self, idx: Index) {
        let mut current = Some(idx);
        while let Some(node_idx) = current {
            let Some(node) = self.arena.get(node_idx) else {
                break;
            };
            let count = if node.is_valid() {
                node.data.own_count()
                    + node
                        .children
                        .iter()
                        .filter_map(|&c| self.arena.get(c))
                        .map(|c| c.item_count)
                        .sum::<usize>()
            } else {
                0
            };
            let parent = node.parent;
            if let Some(node) = self.arena.get_mut(node_idx) {
                node.item_count = count;
            }
            current = parent;
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `idx`.
    pub fn iter_from(&self, idx: Index) -> TreeIterator {
        TreeIterator::new(self, Some(idx))
    }

    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects all leaf nodes in pre-order.
    pub fn leaf_nodes(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Node indices from the root down to `idx`; empty for a stale index.
    pub fn path_to(&self, idx: Index) -> Vec<Index> {
        let mut path = Vec::new();
        let mut current = Some(idx);
        while let Some(node_idx) = current {
            match self.arena.get(node_idx) {
                Some(node) => {
                    path.push(node_idx);
                    current = node.parent;
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }

    /// Distance from the root (root is level 0).
    pub fn level(&self, idx: Index) -> Option<usize> {
        let path = self.path_to(idx);
        if path.is_empty() {
            None
        } else {
            Some(path.len() - 1)
        }
    }

    /// True if `ancestor` lies strictly above `node`.
    pub fn is_ancestor(&self, ancestor: Index, node: Index) -> bool {
        let mut current = self.arena.get(node).and_then(|n| n.parent);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.arena.get(idx).and_then(|n| n.parent);
        }
        false
    }

    /// True when no node sits below level 1.
    pub fn is_flat(&self) -> bool {
        let Some(root) = self.root.and_then(|r| self.arena.get(r)) else {
            return true;
        };
        root.children
            .iter()
            .filter_map(|&c| self.arena.get(c))
            .all(|c| c.is_leaf())
    }

    /// Resolve a label path starting at the root label, e.g. `["Group", "FileA", "D1"]`.
    pub fn find_by_labels(&self, labels: &[&str]) -> DomainResult<Index> {
        let missing = || DomainError::PathNotFound(labels.join("/"));
        let root = self.root.ok_or(DomainError::EmptyTree)?;
        let (first, rest) = labels.split_first().ok_or_else(missing)?;
        let root_node = self.arena.get(root).ok_or_else(missing)?;
        if root_node.kind().label() != *first {
            return Err(missing());
        }

        let mut current = root;
        for label in rest {
            let node = self.arena.get(current).ok_or_else(missing)?;
            current = node
                .children
                .iter()
                .copied()
                .find(|&c| {
                    self.arena
                        .get(c)
                        .is_some_and(|child| child.kind().label() == *label)
                })
                .ok_or_else(missing)?;
        }
        Ok(current)
    }

    /// First node in pre-order carrying `key`.
    pub fn find_by_key(&self, key: &NodeKey) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.key() == *key)
            .map(|(idx, _)| idx)
    }

    /// Payloads of the subtree rooted at `idx` (the node included), pre-order.
    ///
    /// An invalid node hides its whole subtree.
    pub fn items_under(&self, idx: Index) -> Vec<&Payload> {
        let mut items = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            let Some(node) = self.arena.get(current) else {
                continue;
            };
            if !node.is_valid() {
                continue;
            }
            if let Some(payload) = node.payload() {
                items.push(payload);
            }
            stack.extend(node.children.iter().rev());
        }
        items
    }

    /// Valid payloads of the whole tree.
    pub fn all_items(&self) -> Vec<&Payload> {
        match self.root {
            Some(root) => self.items_under(root),
            None => Vec::new(),
        }
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<Index>) -> Self {
        let mut stack = Vec::new();
        if let Some(start) = start {
            stack.push(start);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> NodeData {
        NodeData::new(NodeKind::item(Payload::new(id)))
    }

    #[test]
    fn given_nested_items_when_inserting_then_counts_propagate_to_root() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap();
        let file = tree
            .insert_node(NodeData::new(NodeKind::element("a.rs")), Some(root))
            .unwrap();
        tree.insert_node(item("D1"), Some(file)).unwrap();
        tree.insert_node(item("D2"), Some(file)).unwrap();

        assert_eq!(tree.get_node(file).unwrap().item_count(), 2);
        assert_eq!(tree.get_node(root).unwrap().item_count(), 2);
    }

    #[test]
    fn given_second_root_when_inserting_then_rejected() {
        let mut tree = TreeArena::new();
        tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap();
        let err = tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap_err();
        assert_eq!(err, DomainError::RootExists);
    }

    #[test]
    fn given_removed_subtree_when_querying_then_indices_are_stale() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap();
        let file = tree
            .insert_node(NodeData::new(NodeKind::element("a.rs")), Some(root))
            .unwrap();
        let d1 = tree.insert_node(item("D1"), Some(file)).unwrap();

        tree.remove_subtree(file).unwrap();

        assert!(tree.get_node(d1).is_none());
        assert!(tree.path_to(d1).is_empty());
        assert_eq!(tree.get_node(root).unwrap().item_count(), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn given_invalidated_item_when_updating_flags_then_count_drops() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap();
        let d1 = tree.insert_node(item("D1"), Some(root)).unwrap();
        tree.insert_node(item("D2"), Some(root)).unwrap();

        tree.update_flags(d1, |f| f.invalid = true).unwrap();

        assert_eq!(tree.get_node(root).unwrap().item_count(), 1);
    }

    #[test]
    fn given_tree_when_iterating_postorder_then_children_before_parent() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap();
        let a = tree.insert_node(item("A"), Some(root)).unwrap();
        let b = tree.insert_node(item("B"), Some(root)).unwrap();

        let order: Vec<Index> = tree.iter_postorder().map(|(idx, _)| idx).collect();
        assert_eq!(order, vec![a, b, root]);
    }
}
