//! Mapping multi-path tree selections onto payload items.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::entities::{compare_by_position, ElementId, ItemId, NodeKind, Payload, ResolveOrder};

/// Nodes from the root down to a selected node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPath(Vec<Index>);

impl SelectionPath {
    /// Returns `None` for an empty node list.
    pub fn new(nodes: Vec<Index>) -> Option<Self> {
        if nodes.is_empty() {
            None
        } else {
            Some(Self(nodes))
        }
    }

    /// Path of `idx` in `tree`; `None` if the index is stale.
    pub fn of(tree: &TreeArena, idx: Index) -> Option<Self> {
        Self::new(tree.path_to(idx))
    }

    pub fn nodes(&self) -> &[Index] {
        &self.0
    }

    pub fn terminal(&self) -> Index {
        self.0[self.0.len() - 1]
    }

    /// Immediate parent of the terminal node.
    pub fn parent(&self) -> Option<Index> {
        let len = self.0.len();
        if len >= 2 {
            Some(self.0[len - 2])
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Strict ancestors of the terminal node, root first.
    pub fn ancestors(&self) -> &[Index] {
        &self.0[..self.0.len() - 1]
    }
}

/// Ordered set of selected paths, unique by terminal node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<SelectionPath>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths(paths: impl IntoIterator<Item = SelectionPath>) -> Self {
        let mut selection = Self::new();
        for path in paths {
            selection.push(path);
        }
        selection
    }

    /// Selection of the given nodes; stale indices are dropped.
    pub fn of_nodes(tree: &TreeArena, nodes: impl IntoIterator<Item = Index>) -> Self {
        Self::from_paths(nodes.into_iter().filter_map(|idx| SelectionPath::of(tree, idx)))
    }

    /// Adds a path unless its terminal node is already selected.
    pub fn push(&mut self, path: SelectionPath) -> bool {
        if self.paths.iter().any(|p| p.terminal() == path.terminal()) {
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn paths(&self) -> &[SelectionPath] {
        &self.paths
    }

    pub fn terminals(&self) -> impl Iterator<Item = Index> + '_ {
        self.paths.iter().map(|p| p.terminal())
    }

    /// The first selected path.
    pub fn lead(&self) -> Option<&SelectionPath> {
        self.paths.first()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Insertion-ordered payload set keyed by item id.
struct OrderedItems<'a> {
    seen: HashSet<&'a ItemId>,
    items: Vec<&'a Payload>,
}

impl<'a> OrderedItems<'a> {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    fn add(&mut self, payload: &'a Payload) {
        if self.seen.insert(&payload.id) {
            self.items.push(payload);
        }
    }

    fn extend(&mut self, payloads: impl IntoIterator<Item = &'a Payload>) {
        for payload in payloads {
            self.add(payload);
        }
    }
}

/// Read-only queries mapping a selection onto the payloads of one tree.
pub struct SelectionReducer<'a> {
    tree: &'a TreeArena,
}

impl<'a> SelectionReducer<'a> {
    pub fn new(tree: &'a TreeArena) -> Self {
        Self { tree }
    }

    /// Drops every path whose terminal node has a selected strict ancestor;
    /// the selected ancestor already represents it.
    pub fn maximal_paths<'s>(&self, selection: &'s Selection) -> Vec<&'s SelectionPath> {
        let selected: Vec<Index> = selection.terminals().collect();
        selection
            .paths()
            .iter()
            .filter(|path| {
                !selected
                    .iter()
                    .any(|&other| self.tree.is_ancestor(other, path.terminal()))
            })
            .collect()
    }

    /// Payloads represented by the selection, without duplicates.
    ///
    /// Selected containers contribute their actionable items depth-first;
    /// selected item nodes are grouped by parent and, with
    /// [`ResolveOrder::ByPosition`], each sibling group is sorted by position.
    #[instrument(level = "debug", skip(self, selection), fields(paths = selection.len()))]
    pub fn resolve(&self, selection: &Selection, order: ResolveOrder) -> Vec<&'a Payload> {
        let mut result = OrderedItems::new();
        let mut sibling_groups: Vec<(Index, Vec<&'a Payload>)> = Vec::new();
        let mut group_slots: HashMap<Index, usize> = HashMap::new();
        let mut containers = Vec::new();

        for path in self.maximal_paths(selection) {
            let idx = path.terminal();
            let Some(node) = self.tree.get_node(idx) else {
                continue;
            };
            if !node.is_valid() {
                continue;
            }
            match node.kind() {
                NodeKind::Item(payload) => {
                    if !node.flags().is_actionable() {
                        continue;
                    }
                    let key = path.parent().unwrap_or(idx);
                    let slot = *group_slots.entry(key).or_insert_with(|| {
                        sibling_groups.push((key, Vec::new()));
                        sibling_groups.len() - 1
                    });
                    sibling_groups[slot].1.push(payload);
                }
                _ => containers.push(idx),
            }
        }

        for idx in containers {
            self.collect_items_deep(idx, &mut result, order);
        }

        for (_, mut siblings) in sibling_groups {
            if siblings.len() > 1 && order == ResolveOrder::ByPosition {
                siblings.sort_by(|a, b| compare_by_position(a, b));
            }
            result.extend(siblings);
        }

        debug!("resolved {} item(s)", result.items.len());
        result.items
    }

    fn collect_items_deep(&self, idx: Index, out: &mut OrderedItems<'a>, order: ResolveOrder) {
        let Some(node) = self.tree.get_node(idx) else {
            return;
        };
        let mut item_children = Vec::new();
        for &child_idx in node.children() {
            let Some(child) = self.tree.get_node(child_idx) else {
                continue;
            };
            if !child.is_valid() {
                continue;
            }
            match child.kind() {
                NodeKind::Item(payload) => {
                    if child.flags().is_actionable() {
                        match order {
                            ResolveOrder::ByPosition => item_children.push(payload),
                            ResolveOrder::Insertion => out.add(payload),
                        }
                    }
                    if !child.is_leaf() {
                        self.collect_items_deep(child_idx, out, order);
                    }
                }
                _ => self.collect_items_deep(child_idx, out, order),
            }
        }

        if !item_children.is_empty() {
            item_children.sort_by(|a, b| compare_by_position(a, b));
            out.extend(item_children);
        }
    }

    /// Every valid item under each selected node, first-seen order.
    pub fn selected_items(&self, selection: &Selection) -> Vec<&'a Payload> {
        let mut result = OrderedItems::new();
        for idx in selection.terminals() {
            result.extend(self.tree.items_under(idx));
        }
        result.items
    }

    /// Selected items, or every item of the tree when the selection yields none.
    pub fn selected_items_or_all(&self, selection: &Selection) -> Vec<&'a Payload> {
        let selected = self.selected_items(selection);
        if selected.is_empty() {
            let mut all = OrderedItems::new();
            all.extend(self.tree.all_items());
            all.items
        } else {
            selected
        }
    }

    pub fn lead_item(&self, selection: &Selection) -> Option<&'a Payload> {
        let lead = selection.lead()?;
        self.tree.items_under(lead.terminal()).into_iter().next()
    }

    /// Tool shared by every selected path, looking upwards from each terminal.
    ///
    /// A group met before any tool means the selection spans several tools.
    pub fn selected_tool(&self, selection: &Selection) -> Option<&'a str> {
        let mut tool: Option<&'a str> = None;
        for path in selection.paths() {
            for &idx in path.nodes().iter().rev() {
                let Some(node) = self.tree.get_node(idx) else {
                    continue;
                };
                match node.kind() {
                    NodeKind::Group { .. } => return None,
                    NodeKind::Tool { name } => {
                        match tool {
                            None => tool = Some(name.as_str()),
                            Some(existing) if existing != name.as_str() => return None,
                            Some(_) => {}
                        }
                        break;
                    }
                    _ => {}
                }
            }
        }
        tool
    }

    /// Elements under the selection, most recently found first.
    ///
    /// Empty unless the selection is confined to a single tool.
    pub fn selected_elements(&self, selection: &Selection) -> Vec<&'a ElementId> {
        if selection.is_empty() || self.selected_tool(selection).is_none() {
            return Vec::new();
        }
        let mut out: Vec<&'a ElementId> = Vec::new();
        for idx in selection.terminals() {
            self.collect_elements(idx, &mut out);
        }
        out
    }

    fn collect_elements(&self, idx: Index, out: &mut Vec<&'a ElementId>) {
        let Some(node) = self.tree.get_node(idx) else {
            return;
        };
        if !node.is_valid() {
            return;
        }
        let element = match node.kind() {
            NodeKind::Element { element } => Some(element),
            NodeKind::Item(payload) => payload.element.as_ref(),
            _ => None,
        };
        if let Some(element) = element {
            if !out.contains(&element) {
                out.insert(0, element);
            }
        }
        for &child in node.children() {
            self.collect_elements(child, out);
        }
    }

    /// Deepest node lying on every selected path.
    pub fn common_node(&self, selection: &Selection) -> Option<Index> {
        let (first, rest) = selection.paths().split_first()?;
        let mut common = None;
        for (depth, &idx) in first.nodes().iter().enumerate() {
            if rest.iter().any(|p| p.nodes().get(depth) != Some(&idx)) {
                break;
            }
            common = Some(idx);
        }
        common
    }

    /// True iff the selection is non-empty and consists of item nodes only.
    pub fn only_items_selected(&self, selection: &Selection) -> bool {
        !selection.is_empty()
            && selection.terminals().all(|idx| {
                self.tree
                    .get_node(idx)
                    .is_some_and(|node| node.kind().is_item())
            })
    }

    /// Selection of every node carrying one of `items`.
    pub fn paths_for_items(&self, items: &[ItemId]) -> Selection {
        let wanted: HashSet<&ItemId> = items.iter().collect();
        let nodes = self
            .tree
            .iter()
            .filter(|(_, node)| node.payload().is_some_and(|p| wanted.contains(&&p.id)))
            .map(|(idx, _)| idx);
        Selection::of_nodes(self.tree, nodes)
    }
}
