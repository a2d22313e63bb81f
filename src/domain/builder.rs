//! Tree builder turning a nested blueprint into an arena tree.

use generational_arena::Index;
use tracing::debug;

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::error::DomainResult;

/// Source hierarchy a tree can be built from (parsed snapshot, scan result, ...).
pub trait Blueprint: Sized {
    fn node_data(&self) -> DomainResult<NodeData>;
    fn child_blueprints(&self) -> &[Self];
}

/// Constructs arena trees from blueprints.
///
/// Trees are always built from scratch; callers swap the result in as a whole.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    built_nodes: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes created by the last build.
    pub fn built_nodes(&self) -> usize {
        self.built_nodes
    }

    pub fn build<B: Blueprint>(&mut self, root: &B) -> DomainResult<TreeArena> {
        self.built_nodes = 0;
        let mut tree = TreeArena::new();
        let mut stack: Vec<(&B, Option<Index>)> = vec![(root, None)];

        while let Some((current, parent_idx)) = stack.pop() {
            let current_idx = tree.insert_node(current.node_data()?, parent_idx)?;
            self.built_nodes += 1;

            // Reverse so children are inserted in declaration order
            for child in current.child_blueprints().iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        debug!("built tree with {} nodes", self.built_nodes);
        Ok(tree)
    }
}
