//! Domain layer: tree model, inclusion, selection and status
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod inclusion;
pub mod selection;
pub mod state;
pub mod status;

pub use arena::{NodeData, TreeArena, TreeNode};
pub use builder::{Blueprint, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use inclusion::{InclusionChange, InclusionSet};
pub use selection::{Selection, SelectionPath, SelectionReducer};
pub use state::{RestoredView, TreeState};
pub use status::StatusAggregator;
