//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree model.
/// Queries over an existing tree never fail; these cover construction and lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("stale node reference: {0}")]
    StaleNode(String),

    #[error("tree already has a root")]
    RootExists,

    #[error("root node must be the top of the tree")]
    MisplacedRoot,

    #[error("invalid node: {0}")]
    InvalidNode(String),

    #[error("no node at path: {0}")]
    PathNotFound(String),

    #[error("tree is empty")]
    EmptyTree,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
