//! Integration tests for the arena tree: counts, lookup and structural edits.

use rstest::rstest;

use seltree::application::{NodeSpec, SpecKind};
use seltree::domain::{
    DomainError, InclusionSet, ItemId, NodeData, NodeKey, NodeKind, Payload, ResolveOrder,
    Selection, SelectionReducer, Status, StatusAggregator, TreeArena, TreeBuilder,
};
use seltree::util::testing::{init_test_setup, sample_tree};

fn item(id: &str) -> NodeSpec {
    NodeSpec::new(SpecKind::Item, Some(id))
}

#[rstest]
fn given_sample_tree_when_counting_then_cached_counts_follow_subtrees() {
    init_test_setup();
    let tree = sample_tree();
    let count = |labels: &[&str]| {
        let idx = tree.find_by_labels(labels).unwrap();
        tree.get_node(idx).unwrap().item_count()
    };

    assert_eq!(count(&["Group"]), 3);
    assert_eq!(count(&["Group", "FileA"]), 2);
    assert_eq!(count(&["Group", "FileA", "E1"]), 1);
    assert_eq!(count(&["Group", "FileB", "D3"]), 1);
}

#[rstest]
fn given_removed_subtree_when_looking_up_then_stale_and_counts_updated() {
    init_test_setup();
    let mut tree = sample_tree();
    let root = tree.root().unwrap();
    let file_a = tree.find_by_labels(&["Group", "FileA"]).unwrap();
    let d1 = tree.find_by_labels(&["Group", "FileA", "E1", "D1"]).unwrap();

    tree.remove_subtree(file_a).unwrap();

    assert!(tree.get_node(file_a).is_none());
    assert!(tree.get_node(d1).is_none());
    assert_eq!(tree.get_node(root).unwrap().item_count(), 1);
    assert_eq!(tree.len(), 3);
    assert!(matches!(
        tree.remove_subtree(file_a),
        Err(DomainError::StaleNode(_))
    ));
}

#[rstest]
fn given_flag_change_when_updating_then_ancestor_counts_recomputed() {
    init_test_setup();
    let mut tree = sample_tree();
    let root = tree.root().unwrap();
    let d2 = tree.find_by_labels(&["Group", "FileA", "D2"]).unwrap();

    tree.update_flags(d2, |f| f.suppressed = true).unwrap();
    assert_eq!(tree.get_node(root).unwrap().item_count(), 2);

    tree.update_flags(d2, |f| f.suppressed = false).unwrap();
    assert_eq!(tree.get_node(root).unwrap().item_count(), 3);
}

#[rstest]
fn given_existing_root_when_inserting_second_root_then_rejected() {
    let mut tree = TreeArena::new();
    let root = tree.insert_node(NodeData::new(NodeKind::Root), None).unwrap();

    assert_eq!(
        tree.insert_node(NodeData::new(NodeKind::group("G")), None),
        Err(DomainError::RootExists)
    );
    assert_eq!(
        tree.insert_node(NodeData::new(NodeKind::Root), Some(root)),
        Err(DomainError::MisplacedRoot)
    );
}

#[rstest]
#[case::unknown_child(&["Group", "FileC"])]
#[case::wrong_root(&["Other", "FileA"])]
#[case::empty(&[])]
fn given_unknown_label_path_when_finding_then_path_not_found(#[case] labels: &[&str]) {
    let tree = sample_tree();

    assert!(matches!(
        tree.find_by_labels(labels),
        Err(DomainError::PathNotFound(_))
    ));
}

#[rstest]
fn given_rebuilt_tree_when_finding_by_key_then_same_node_found() {
    let first = sample_tree();
    let second = sample_tree();
    let d3 = first.find_by_labels(&["Group", "FileB", "D3"]).unwrap();
    let key = first.get_node(d3).unwrap().key();

    let found = second.find_by_key(&key).unwrap();

    assert_eq!(key, NodeKey::new("item:D3"));
    assert_eq!(second.get_node(found).unwrap().key(), key);
}

#[rstest]
fn given_nested_blueprint_when_building_then_children_keep_order() {
    init_test_setup();
    let blueprint = NodeSpec::new(SpecKind::Group, Some("G")).with_children(vec![
        NodeSpec::new(SpecKind::Tool, Some("T"))
            .with_children(vec![item("first"), item("second"), item("third")]),
        item("loose"),
    ]);
    let mut builder = TreeBuilder::new();

    let tree = builder.build(&blueprint).unwrap();

    assert_eq!(builder.built_nodes(), 6);
    let labels: Vec<&str> = tree.iter().map(|(_, n)| n.kind().label()).collect();
    assert_eq!(labels, vec!["G", "T", "first", "second", "third", "loose"]);
    let tool = tree.find_by_labels(&["G", "T"]).unwrap();
    assert_eq!(tree.level(tool), Some(1));
    assert_eq!(tree.depth(), 3);
    assert!(!tree.is_flat());
}

#[rstest]
fn given_unnamed_item_when_building_then_invalid_node() {
    let blueprint = NodeSpec::new(SpecKind::Group, Some("G"))
        .with_children(vec![NodeSpec::new(SpecKind::Item, None)]);

    let result = TreeBuilder::new().build(&blueprint);

    assert!(matches!(result, Err(DomainError::InvalidNode(_))));
}

#[rstest]
fn given_postorder_iteration_when_walking_then_children_before_parents() {
    let tree = sample_tree();

    let labels: Vec<&str> = tree
        .iter_postorder()
        .map(|(_, n)| n.kind().label())
        .collect();

    assert_eq!(labels, vec!["D1", "E1", "D2", "FileA", "D3", "FileB", "Group"]);
}

#[rstest]
fn given_item_payload_when_listing_all_items_then_preorder() {
    let mut tree = sample_tree();
    let d2 = tree.find_by_labels(&["Group", "FileA", "D2"]).unwrap();
    tree.update_flags(d2, |f| f.invalid = true).unwrap();

    let items: Vec<&Payload> = tree.all_items();

    assert_eq!(
        items.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["D1", "D3"]
    );
}

#[rstest]
fn given_sample_tree_when_listing_leaves_then_items_in_tree_order() {
    let tree = sample_tree();

    let labels: Vec<&str> = tree
        .leaf_nodes()
        .into_iter()
        .filter_map(|idx| tree.get_node(idx))
        .map(|n| n.kind().label())
        .collect();

    assert_eq!(labels, vec!["D1", "D2", "D3"]);
}

#[rstest]
fn given_nodes_when_checking_ancestry_then_only_strict_ancestors_match() {
    let tree = sample_tree();
    let root = tree.root().unwrap();
    let file_b = tree.find_by_labels(&["Group", "FileB"]).unwrap();
    let d1 = tree.find_by_labels(&["Group", "FileA", "E1", "D1"]).unwrap();

    assert!(tree.is_ancestor(root, d1));
    assert!(!tree.is_ancestor(file_b, d1));
    assert!(!tree.is_ancestor(d1, d1));
    assert!(!tree.is_ancestor(d1, root));
}

#[rstest]
fn given_invalid_container_when_aggregating_then_whole_subtree_skipped() {
    init_test_setup();
    let mut tree = sample_tree();
    let root = tree.root().unwrap();
    let file_a = tree.find_by_labels(&["Group", "FileA"]).unwrap();
    let e1 = tree.find_by_labels(&["Group", "FileA", "E1"]).unwrap();

    tree.update_flags(e1, |f| f.invalid = true).unwrap();

    assert_eq!(tree.get_node(file_a).unwrap().item_count(), 1);
    assert_eq!(tree.get_node(root).unwrap().item_count(), 2);
    let under: Vec<&str> = tree.items_under(file_a).iter().map(|p| p.id.as_str()).collect();
    assert_eq!(under, vec!["D2"]);

    let inclusion = InclusionSet::from_items([ItemId::new("D2")]);
    assert_eq!(
        StatusAggregator::new(&tree, &inclusion).status_of(file_a),
        Status::Full
    );
    let reducer = SelectionReducer::new(&tree);
    let selection = Selection::of_nodes(&tree, [file_a]);
    let resolved: Vec<&str> = reducer
        .resolve(&selection, ResolveOrder::Insertion)
        .into_iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(resolved, vec!["D2"]);
    assert!(reducer
        .resolve(&Selection::of_nodes(&tree, [e1]), ResolveOrder::Insertion)
        .is_empty());

    tree.update_flags(e1, |f| f.invalid = false).unwrap();
    assert_eq!(tree.get_node(root).unwrap().item_count(), 3);
}
