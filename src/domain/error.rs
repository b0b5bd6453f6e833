//! Domain-level errors (no external dependencies)

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::arena::NodeId;

/// Catalog errors represent rejected tree operations.
/// A failed operation never leaves the catalog partially mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("attaching {child} under {container} would create a cycle")]
    CycleDetected { container: NodeId, child: NodeId },

    #[error("node {child} is already attached under {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("node {child} is not a direct child of {container}")]
    NotFound { container: NodeId, child: NodeId },

    #[error("index {index} out of range for container with {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is an item, not a container")]
    NotAContainer(NodeId),

    #[error("unit price must not be negative: {0}")]
    NegativePrice(Decimal),

    #[error("price arithmetic overflowed")]
    Overflow,
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
