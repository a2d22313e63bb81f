//! View state (expansion, selection) that outlives a tree rebuild.

use std::collections::BTreeSet;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::entities::{NodeKey, Status};
use crate::domain::inclusion::InclusionSet;
use crate::domain::selection::Selection;
use crate::domain::status::StatusAggregator;

/// Expansion and selection of a tree, keyed by node identity rather than
/// by arena index so it can be re-applied to a freshly built tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeState {
    expanded: BTreeSet<NodeKey>,
    selected: Vec<NodeKey>,
}

/// Expansion and selection mapped onto a concrete tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoredView {
    pub expanded: Vec<Index>,
    pub selection: Selection,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(
        expanded: impl IntoIterator<Item = NodeKey>,
        selected: impl IntoIterator<Item = NodeKey>,
    ) -> Self {
        Self {
            expanded: expanded.into_iter().collect(),
            selected: selected.into_iter().collect(),
        }
    }

    pub fn expand(&mut self, key: NodeKey) {
        self.expanded.insert(key);
    }

    pub fn collapse(&mut self, key: &NodeKey) {
        self.expanded.remove(key);
    }

    pub fn is_expanded(&self, key: &NodeKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn expanded_keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.expanded.iter()
    }

    pub fn selected_keys(&self) -> &[NodeKey] {
        &self.selected
    }

    pub fn set_selection(&mut self, keys: impl IntoIterator<Item = NodeKey>) {
        self.selected = keys.into_iter().collect();
    }

    /// Remember the selection of `tree` by node key.
    pub fn record_selection(&mut self, tree: &TreeArena, selection: &Selection) {
        self.selected = selection
            .terminals()
            .filter_map(|idx| tree.get_node(idx))
            .map(|node| node.key())
            .collect();
    }

    /// Map the remembered keys onto `tree`; keys without a node are ignored.
    #[instrument(level = "debug", skip_all)]
    pub fn restore(&self, tree: &TreeArena) -> RestoredView {
        let expanded: Vec<Index> = tree
            .iter()
            .filter(|(_, node)| self.expanded.contains(&node.key()))
            .map(|(idx, _)| idx)
            .collect();
        let selection = Selection::of_nodes(
            tree,
            self.selected.iter().filter_map(|key| tree.find_by_key(key)),
        );
        debug!(
            "restored {} expanded, {} selected",
            expanded.len(),
            selection.len()
        );
        RestoredView {
            expanded,
            selection,
        }
    }

    /// Expand everything; with a non-empty inclusion set, collapse unchecked
    /// branches and select the first fully included leaf.
    #[instrument(level = "debug", skip_all)]
    pub fn auto_expand(tree: &TreeArena, inclusion: &InclusionSet) -> RestoredView {
        let root = tree.root();
        if inclusion.is_empty() {
            return RestoredView {
                expanded: tree.iter().map(|(idx, _)| idx).collect(),
                selection: Selection::new(),
            };
        }

        let aggregator = StatusAggregator::new(tree, inclusion);
        let expanded = tree
            .iter_postorder()
            .filter(|(idx, _)| Some(*idx) == root || aggregator.status_of(*idx) != Status::Clear)
            .map(|(idx, _)| idx)
            .collect();
        let first_full_leaf = tree
            .leaf_nodes()
            .into_iter()
            .find(|&idx| aggregator.status_of(idx) == Status::Full);

        RestoredView {
            expanded,
            selection: Selection::of_nodes(tree, first_full_leaf),
        }
    }
}
