use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{NodeData, NodeKind, Payload, TreeArena};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "seltree=trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Fixture used across the test suites:
///
/// ```text
/// Group
/// ├── FileA (tool)
/// │   ├── E1 (element)
/// │   │   └── D1
/// │   └── D2
/// └── FileB (tool)
///     └── D3
/// ```
///
/// D1 carries element E1 and position 10, D2 position 20, D3 position 5.
pub fn sample_tree() -> TreeArena {
    let mut tree = TreeArena::new();
    let add = |tree: &mut TreeArena, kind, parent| {
        tree.insert_node(NodeData::new(kind), parent)
            .expect("sample tree insert")
    };
    let group = add(&mut tree, NodeKind::group("Group"), None);
    let file_a = add(&mut tree, NodeKind::tool("FileA"), Some(group));
    let e1 = add(&mut tree, NodeKind::element("E1"), Some(file_a));
    add(
        &mut tree,
        NodeKind::item(Payload::new("D1").with_element("E1").with_position(10)),
        Some(e1),
    );
    add(
        &mut tree,
        NodeKind::item(Payload::new("D2").with_position(20)),
        Some(file_a),
    );
    let file_b = add(&mut tree, NodeKind::tool("FileB"), Some(group));
    add(
        &mut tree,
        NodeKind::item(Payload::new("D3").with_position(5)),
        Some(file_b),
    );
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_sample_tree_when_built_then_counts_all_items() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        assert_eq!(tree.get_node(root).unwrap().item_count(), 3);
        assert_eq!(tree.len(), 7);
    }
}
