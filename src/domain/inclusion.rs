//! Inclusion (checked state) of items, independent of tree shape.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::domain::entities::ItemId;

/// Change delivered to listeners, once per batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionChange {
    /// Items that were newly included by the batch
    Included(Vec<ItemId>),
    /// Items that were newly excluded by the batch
    Excluded(Vec<ItemId>),
}

pub type InclusionListener = Box<dyn FnMut(&InclusionChange)>;

/// Set of included items.
///
/// The same item may appear under several tree paths; inclusion applies to the
/// item, not to a position in the tree.
#[derive(Default)]
pub struct InclusionSet {
    items: BTreeSet<ItemId>,
    listeners: Vec<InclusionListener>,
}

impl fmt::Debug for InclusionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InclusionSet")
            .field("items", &self.items)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl InclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            items: items.into_iter().collect(),
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&InclusionChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn contains(&self, item: &ItemId) -> bool {
        self.items.contains(item)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Include a batch. Returns true if anything changed.
    pub fn include<'a>(&mut self, items: impl IntoIterator<Item = &'a ItemId>) -> bool {
        let added: Vec<ItemId> = items
            .into_iter()
            .filter(|item| self.items.insert((*item).clone()))
            .cloned()
            .collect();
        if added.is_empty() {
            return false;
        }
        debug!("included {} item(s)", added.len());
        self.notify(&InclusionChange::Included(added));
        true
    }

    /// Exclude a batch. Returns true if anything changed.
    pub fn exclude<'a>(&mut self, items: impl IntoIterator<Item = &'a ItemId>) -> bool {
        let removed: Vec<ItemId> = items
            .into_iter()
            .filter(|item| self.items.remove(*item))
            .cloned()
            .collect();
        if removed.is_empty() {
            return false;
        }
        debug!("excluded {} item(s)", removed.len());
        self.notify(&InclusionChange::Excluded(removed));
        true
    }

    /// All-or-nothing toggle: if any item of the batch is excluded the whole
    /// batch gets included, otherwise the whole batch gets excluded.
    ///
    /// Returns true when the batch ended up included.
    pub fn toggle(&mut self, items: &[ItemId]) -> bool {
        let has_excluded = items.iter().any(|item| !self.items.contains(item));
        if has_excluded {
            self.include(items);
        } else {
            self.exclude(items);
        }
        has_excluded
    }

    /// Replace the whole set without notifying listeners.
    pub fn set_included(&mut self, items: impl IntoIterator<Item = ItemId>) {
        self.items = items.into_iter().collect();
    }

    fn notify(&mut self, change: &InclusionChange) {
        for listener in self.listeners.iter_mut() {
            listener(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn ids(names: &[&str]) -> Vec<ItemId> {
        names.iter().map(|n| ItemId::new(*n)).collect()
    }

    #[test]
    fn given_batch_when_including_then_notifies_once() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let mut set = InclusionSet::new();
        set.add_listener(move |change| sink.borrow_mut().push(change.clone()));

        set.include(&ids(&["a", "b", "c"]));

        assert_eq!(events.borrow().len(), 1);
        assert_eq!(
            events.borrow()[0],
            InclusionChange::Included(ids(&["a", "b", "c"]))
        );
    }

    #[test]
    fn given_partially_included_batch_when_toggling_then_includes_all() {
        let mut set = InclusionSet::from_items(ids(&["a"]));
        let included = set.toggle(&ids(&["a", "b"]));
        assert!(included);
        assert!(set.contains(&ItemId::new("a")));
        assert!(set.contains(&ItemId::new("b")));
    }

    #[test]
    fn given_fully_included_batch_when_toggling_then_excludes_all() {
        let mut set = InclusionSet::from_items(ids(&["a", "b", "c"]));
        let included = set.toggle(&ids(&["a", "b"]));
        assert!(!included);
        assert_eq!(set.items().cloned().collect::<Vec<_>>(), ids(&["c"]));
    }

    #[test]
    fn given_listener_when_setting_included_then_silent() {
        let events = Rc::new(RefCell::new(0));
        let sink = events.clone();
        let mut set = InclusionSet::new();
        set.add_listener(move |_| *sink.borrow_mut() += 1);

        set.set_included(ids(&["x", "y"]));

        assert_eq!(*events.borrow(), 0);
        assert_eq!(set.len(), 2);
    }
}
