//! Text rendering of trees with checkbox glyphs.

use generational_arena::Index;
use termtree::Tree;

use crate::application::services::TreeView;
use crate::config::GlyphConfig;
use crate::domain::{NodeKind, TreeNode};

pub trait TreeRender {
    fn to_tree_string(&self, glyphs: &GlyphConfig) -> Tree<String>;
}

fn node_line(view: &TreeView, idx: Index, node: &TreeNode, glyphs: &GlyphConfig) -> String {
    let glyph = glyphs.for_status(view.status_of(idx));
    let mut line = match node.kind() {
        NodeKind::Item(payload) => match payload.position {
            Some(position) => format!("{} {} @{}", glyph, payload.id, position),
            None => format!("{} {}", glyph, payload.id),
        },
        kind => format!("{} {} ({})", glyph, kind.label(), node.item_count()),
    };
    if !node.is_valid() {
        line.push_str(" [invalid]");
    } else if !node.flags().is_actionable() {
        line.push_str(" [hidden]");
    }
    line
}

impl TreeRender for TreeView {
    fn to_tree_string(&self, glyphs: &GlyphConfig) -> Tree<String> {
        let tree = self.tree();
        let Some(root_idx) = tree.root() else {
            return Tree::new("Empty tree".to_string());
        };
        let Some(root) = tree.get_node(root_idx) else {
            return Tree::new("Empty tree".to_string());
        };

        fn build_tree(
            view: &TreeView,
            node_idx: Index,
            glyphs: &GlyphConfig,
            parent_tree: &mut Tree<String>,
        ) {
            let Some(node) = view.tree().get_node(node_idx) else {
                return;
            };
            for &child_idx in node.children() {
                if let Some(child) = view.tree().get_node(child_idx) {
                    let mut child_tree = Tree::new(node_line(view, child_idx, child, glyphs));
                    build_tree(view, child_idx, glyphs, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut rendered = Tree::new(node_line(self, root_idx, root, glyphs));
        build_tree(self, root_idx, glyphs, &mut rendered);
        rendered
    }
}
