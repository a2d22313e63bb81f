//! Snapshot persistence service
//!
//! Loads snapshot files into trees and writes inclusion/view state back.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::snapshot::{Snapshot, SnapshotState};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{InclusionSet, TreeArena, TreeBuilder, TreeState};
use crate::infrastructure::traits::FileSystem;

/// Everything a snapshot file describes, ready for a view.
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub tree: TreeArena,
    pub inclusion: InclusionSet,
    pub state: TreeState,
}

/// Service reading and writing snapshot files.
pub struct SnapshotService {
    fs: Arc<dyn FileSystem>,
}

impl SnapshotService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse the snapshot document at `path`.
    pub fn read(&self, path: &Path) -> ApplicationResult<Snapshot> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::SnapshotNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read snapshot", path)?;
        Snapshot::from_toml(&content).map_err(|e| ApplicationError::InvalidSnapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse the snapshot and build its tree.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<LoadedSnapshot> {
        let snapshot = self.read(path)?;
        let mut builder = TreeBuilder::new();
        let tree = builder.build(&snapshot.root)?;
        debug!(
            "load: {} nodes, {} included",
            builder.built_nodes(),
            snapshot.included.len()
        );
        Ok(LoadedSnapshot {
            inclusion: snapshot.inclusion_set(),
            state: snapshot.state.to_tree_state(),
            tree,
            snapshot,
        })
    }

    pub fn write(&self, path: &Path, snapshot: &Snapshot) -> ApplicationResult<()> {
        let content = snapshot.to_toml().map_err(|e| ApplicationError::InvalidSnapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.fs
            .write_atomic(path, &content)
            .with_path_context("write snapshot", path)
    }

    /// Rewrite the `included` list, keeping the rest of the document.
    #[instrument(level = "debug", skip(self, inclusion))]
    pub fn save_inclusion(&self, path: &Path, inclusion: &InclusionSet) -> ApplicationResult<()> {
        let mut snapshot = self.read(path)?;
        snapshot.set_included(inclusion);
        self.write(path, &snapshot)
    }

    /// Rewrite the persisted view state, keeping the rest of the document.
    pub fn save_state(&self, path: &Path, state: &TreeState) -> ApplicationResult<()> {
        let mut snapshot = self.read(path)?;
        snapshot.state = SnapshotState::from_tree_state(state);
        self.write(path, &snapshot)
    }
}
