//! Tri-state inclusion status and selection counting.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::TreeArena;
use crate::domain::entities::Status;
use crate::domain::inclusion::InclusionSet;
use crate::domain::selection::Selection;

/// Derives checkbox state from a tree and an inclusion set.
pub struct StatusAggregator<'a> {
    tree: &'a TreeArena,
    inclusion: &'a InclusionSet,
}

impl<'a> StatusAggregator<'a> {
    pub fn new(tree: &'a TreeArena, inclusion: &'a InclusionSet) -> Self {
        Self { tree, inclusion }
    }

    /// Status over the valid payloads of the node and its descendants.
    ///
    /// No payloads at all counts as `Clear`.
    pub fn status_of(&self, idx: Index) -> Status {
        let mut has_included = false;
        let mut has_excluded = false;

        for payload in self.tree.items_under(idx) {
            if self.inclusion.contains(&payload.id) {
                has_included = true;
            } else {
                has_excluded = true;
            }
            if has_included && has_excluded {
                return Status::Partial;
            }
        }

        if has_included {
            Status::Full
        } else {
            Status::Clear
        }
    }

    /// A partially included node has to be drilled into, not toggled as a unit.
    pub fn is_enabled(&self, idx: Index) -> bool {
        self.status_of(idx) != Status::Partial
    }

    /// Items covered by the selection, counting each subtree once.
    ///
    /// A node whose strict ancestor is already counted is skipped; a node met
    /// after some of its descendants replaces them.
    #[instrument(level = "debug", skip(self, selection), fields(paths = selection.len()))]
    pub fn count_selected_items(&self, selection: &Selection) -> usize {
        let mut counted: HashSet<Index> = HashSet::new();
        let mut descendants_seen: HashMap<Index, Vec<Index>> = HashMap::new();

        for path in selection.paths() {
            let node = path.terminal();
            if let Some(visited) = descendants_seen.get(&node) {
                for child in visited {
                    counted.remove(child);
                }
            }

            let mut covered = false;
            for &ancestor in path.ancestors() {
                descendants_seen.entry(ancestor).or_default().push(node);
                if counted.contains(&ancestor) {
                    covered = true;
                }
            }

            if !covered {
                counted.insert(node);
            }
        }

        counted
            .iter()
            .filter_map(|&idx| self.tree.get_node(idx))
            .map(|node| node.item_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::NodeData;
    use crate::domain::entities::{ItemId, NodeKind, Payload};

    #[test]
    fn given_childless_container_when_status_then_clear_and_enabled() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap();
        let inclusion = InclusionSet::from_items([ItemId::new("x")]);
        let aggregator = StatusAggregator::new(&tree, &inclusion);

        assert_eq!(aggregator.status_of(root), Status::Clear);
        assert!(aggregator.is_enabled(root));
    }

    #[test]
    fn given_item_node_when_status_then_reflects_own_inclusion() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap();
        let d1 = tree
            .insert_node(NodeData::new(NodeKind::item(Payload::new("D1"))), Some(root))
            .unwrap();
        let inclusion = InclusionSet::from_items([ItemId::new("D1")]);
        let aggregator = StatusAggregator::new(&tree, &inclusion);

        assert_eq!(aggregator.status_of(d1), Status::Full);
        assert_eq!(aggregator.status_of(root), Status::Full);
    }
}
