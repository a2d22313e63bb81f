//! Tree view model
//!
//! Owns the current tree together with inclusion, selection and expansion,
//! and swaps in rebuilt trees as a whole.

use std::collections::HashSet;
use std::fmt;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::application::services::snapshot::LoadedSnapshot;
use crate::domain::{
    DomainResult, InclusionSet, ItemId, Payload, ResolveOrder, Selection, SelectionReducer, Status,
    StatusAggregator, TreeArena, TreeState,
};

/// View behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeViewOptions {
    /// Expand everything after a rebuild instead of restoring saved state
    pub always_expand: bool,
    /// Default sibling order of resolved selections
    pub order: ResolveOrder,
}

impl Default for TreeViewOptions {
    fn default() -> Self {
        Self {
            always_expand: true,
            order: ResolveOrder::Insertion,
        }
    }
}

/// Structural notification, delivered synchronously after the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureChange {
    Replaced,
    Cleared,
}

pub type StructureListener = Box<dyn FnMut(StructureChange)>;

pub struct TreeView {
    tree: TreeArena,
    inclusion: InclusionSet,
    state: TreeState,
    selection: Selection,
    expanded: HashSet<Index>,
    options: TreeViewOptions,
    queue_update: bool,
    structure_listeners: Vec<StructureListener>,
}

impl fmt::Debug for TreeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeView")
            .field("nodes", &self.tree.len())
            .field("inclusion", &self.inclusion)
            .field("selection", &self.selection.len())
            .field("options", &self.options)
            .finish()
    }
}

impl TreeView {
    pub fn new(
        tree: TreeArena,
        inclusion: InclusionSet,
        state: TreeState,
        options: TreeViewOptions,
    ) -> Self {
        let mut view = Self {
            tree,
            inclusion,
            state,
            selection: Selection::new(),
            expanded: HashSet::new(),
            options,
            queue_update: false,
            structure_listeners: Vec::new(),
        };
        view.apply_view();
        view
    }

    pub fn from_snapshot(loaded: LoadedSnapshot, options: TreeViewOptions) -> Self {
        Self::new(loaded.tree, loaded.inclusion, loaded.state, options)
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn inclusion(&self) -> &InclusionSet {
        &self.inclusion
    }

    pub fn inclusion_mut(&mut self) -> &mut InclusionSet {
        &mut self.inclusion
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn options(&self) -> TreeViewOptions {
        self.options
    }

    pub fn add_structure_listener(&mut self, listener: impl FnMut(StructureChange) + 'static) {
        self.structure_listeners.push(Box::new(listener));
    }

    /// While set, selection changes are not recorded into the saved state.
    pub fn set_queue_update(&mut self, queue_update: bool) {
        self.queue_update = queue_update;
    }

    pub fn is_under_queue_update(&self) -> bool {
        self.queue_update
    }

    pub fn set_selection(&mut self, selection: Selection) {
        if !self.queue_update {
            self.state.record_selection(&self.tree, &selection);
        }
        self.selection = selection;
    }

    /// Select every node carrying one of `items`.
    pub fn select_items(&mut self, items: &[ItemId]) {
        let selection = SelectionReducer::new(&self.tree).paths_for_items(items);
        self.set_selection(selection);
    }

    pub fn is_expanded(&self, idx: Index) -> bool {
        self.expanded.contains(&idx)
    }

    pub fn expanded(&self) -> impl Iterator<Item = Index> + '_ {
        self.expanded.iter().copied()
    }

    pub fn expand(&mut self, idx: Index) -> bool {
        let Some(node) = self.tree.get_node(idx) else {
            return false;
        };
        self.state.expand(node.key());
        self.expanded.insert(idx)
    }

    pub fn collapse(&mut self, idx: Index) -> bool {
        let Some(node) = self.tree.get_node(idx) else {
            return false;
        };
        self.state.collapse(&node.key());
        self.expanded.remove(&idx)
    }

    /// Swap in a rebuilt tree and re-apply expansion and selection by node key.
    ///
    /// Returns the previous tree.
    #[instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
    pub fn replace_tree(&mut self, tree: TreeArena) -> TreeArena {
        if !self.queue_update {
            self.state.record_selection(&self.tree, &self.selection);
        }
        let old = std::mem::replace(&mut self.tree, tree);
        self.notify(StructureChange::Replaced);
        self.apply_view();
        old
    }

    pub fn remove_all_nodes(&mut self) -> DomainResult<()> {
        if let Some(root) = self.tree.root() {
            self.tree.remove_all_children(root)?;
        }
        let tree = &self.tree;
        self.expanded.retain(|&idx| tree.contains(idx));
        self.selection = Selection::of_nodes(tree, self.selection.terminals().collect::<Vec<_>>());
        self.notify(StructureChange::Cleared);
        Ok(())
    }

    fn apply_view(&mut self) {
        let view = if self.options.always_expand {
            TreeState::auto_expand(&self.tree, &self.inclusion)
        } else {
            self.state.restore(&self.tree)
        };
        debug!(
            "apply_view: {} expanded, {} selected",
            view.expanded.len(),
            view.selection.len()
        );
        self.expanded = view.expanded.into_iter().collect();
        self.selection = view.selection;
    }

    fn notify(&mut self, change: StructureChange) {
        for listener in self.structure_listeners.iter_mut() {
            listener(change);
        }
    }

    pub fn resolve_selection(&self) -> Vec<&Payload> {
        self.resolve_selection_with(self.options.order)
    }

    pub fn resolve_selection_with(&self, order: ResolveOrder) -> Vec<&Payload> {
        SelectionReducer::new(&self.tree).resolve(&self.selection, order)
    }

    pub fn count_selection(&self) -> usize {
        StatusAggregator::new(&self.tree, &self.inclusion).count_selected_items(&self.selection)
    }

    pub fn status_of(&self, idx: Index) -> Status {
        StatusAggregator::new(&self.tree, &self.inclusion).status_of(idx)
    }

    pub fn is_enabled(&self, idx: Index) -> bool {
        StatusAggregator::new(&self.tree, &self.inclusion).is_enabled(idx)
    }

    /// Selected items, or every item when the selection yields none.
    fn selected_ids(&self) -> Vec<ItemId> {
        SelectionReducer::new(&self.tree)
            .selected_items_or_all(&self.selection)
            .into_iter()
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn include_selection(&mut self) -> bool {
        let ids = self.selected_ids();
        self.inclusion.include(&ids)
    }

    pub fn exclude_selection(&mut self) -> bool {
        let ids = self.selected_ids();
        self.inclusion.exclude(&ids)
    }

    /// Toggle the selected items, or every item when nothing is selected.
    ///
    /// Returns true when the batch ended up included.
    pub fn toggle_selection(&mut self) -> bool {
        let ids = self.selected_ids();
        self.inclusion.toggle(&ids)
    }
}
