//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod snapshot;
mod tree_view;

pub use snapshot::{LoadedSnapshot, SnapshotService};
pub use tree_view::{StructureChange, TreeView, TreeViewOptions};
