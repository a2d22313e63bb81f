//! Integration tests for tri-state status and selection counting.

use rstest::{fixture, rstest};

use seltree::domain::{
    InclusionSet, ItemId, NodeData, NodeKind, Payload, Selection, Status, StatusAggregator,
    TreeArena,
};
use seltree::util::testing::init_test_setup;

/// Group{FileA{D1, D2}, FileB{D3}}
#[fixture]
fn group() -> TreeArena {
    init_test_setup();
    let mut tree = TreeArena::new();
    let root = tree.insert_node(NodeData::new(NodeKind::group("Group")), None).unwrap();
    for (file, items) in [("FileA", vec!["D1", "D2"]), ("FileB", vec!["D3"])] {
        let f = tree
            .insert_node(NodeData::new(NodeKind::element(file)), Some(root))
            .unwrap();
        for id in items {
            tree.insert_node(NodeData::new(NodeKind::item(Payload::new(id))), Some(f))
                .unwrap();
        }
    }
    tree
}

fn included(ids: &[&str]) -> InclusionSet {
    InclusionSet::from_items(ids.iter().map(|id| ItemId::new(*id)))
}

#[rstest]
fn given_mixed_inclusion_when_aggregating_then_tri_state(group: TreeArena) {
    let inclusion = included(&["D1", "D3"]);
    let aggregator = StatusAggregator::new(&group, &inclusion);
    let at = |labels: &[&str]| aggregator.status_of(group.find_by_labels(labels).unwrap());

    assert_eq!(at(&["Group", "FileA"]), Status::Partial);
    assert_eq!(at(&["Group", "FileB"]), Status::Full);
    assert_eq!(at(&["Group"]), Status::Partial);
    assert_eq!(at(&["Group", "FileA", "D2"]), Status::Clear);
    assert!(!aggregator.is_enabled(group.root().unwrap()));
    assert!(aggregator.is_enabled(group.find_by_labels(&["Group", "FileB"]).unwrap()));

    let selection = Selection::of_nodes(&group, group.root());
    assert_eq!(aggregator.count_selected_items(&selection), 3);
}

#[rstest]
#[case(&[])]
#[case(&["D1"])]
#[case(&["D2", "D3"])]
#[case(&["D1", "D2", "D3"])]
fn given_any_inclusion_when_node_full_then_parent_not_clear(
    group: TreeArena,
    #[case] ids: &[&str],
) {
    let inclusion = included(ids);
    let aggregator = StatusAggregator::new(&group, &inclusion);

    for (idx, node) in group.iter() {
        let Some(parent) = node.parent() else {
            continue;
        };
        if aggregator.status_of(idx) == Status::Full {
            assert_ne!(aggregator.status_of(parent), Status::Clear);
        }
    }
}

#[rstest]
fn given_invalid_item_when_aggregating_then_ignored(group: TreeArena) {
    let mut tree = group;
    let d2 = tree.find_by_labels(&["Group", "FileA", "D2"]).unwrap();
    tree.update_flags(d2, |f| f.invalid = true).unwrap();
    let file_a = tree.find_by_labels(&["Group", "FileA"]).unwrap();

    let only_d1 = included(&["D1"]);
    let only_d2 = included(&["D2"]);

    assert_eq!(StatusAggregator::new(&tree, &only_d1).status_of(file_a), Status::Full);
    assert_eq!(StatusAggregator::new(&tree, &only_d2).status_of(file_a), Status::Clear);
}

#[rstest]
fn given_excluded_item_when_aggregating_then_still_counts_for_status(group: TreeArena) {
    let mut tree = group;
    let d2 = tree.find_by_labels(&["Group", "FileA", "D2"]).unwrap();
    tree.update_flags(d2, |f| f.excluded = true).unwrap();
    let file_a = tree.find_by_labels(&["Group", "FileA"]).unwrap();
    let inclusion = included(&["D1"]);
    let aggregator = StatusAggregator::new(&tree, &inclusion);

    assert_eq!(aggregator.status_of(file_a), Status::Partial);
    assert_eq!(
        aggregator.count_selected_items(&Selection::of_nodes(&tree, [file_a])),
        1
    );
}

#[rstest]
fn given_descendants_selected_before_ancestor_when_counting_then_ancestor_replaces_them(
    group: TreeArena,
) {
    let inclusion = InclusionSet::new();
    let aggregator = StatusAggregator::new(&group, &inclusion);
    let d1 = group.find_by_labels(&["Group", "FileA", "D1"]).unwrap();
    let d3 = group.find_by_labels(&["Group", "FileB", "D3"]).unwrap();
    let file_a = group.find_by_labels(&["Group", "FileA"]).unwrap();

    let selection = Selection::of_nodes(&group, [d1, d3, file_a]);

    assert_eq!(aggregator.count_selected_items(&selection), 3);
}
