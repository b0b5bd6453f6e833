//! Domain layer: catalog tree, descriptor interning and tree operations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod arena;
pub mod descriptor;
pub mod error;
pub mod visitor;

pub use aggregate::{
    compute_total, display, format_price, DisplayLines, ItemCount, KindTally, TotalPrice,
};
pub use arena::{Catalog, CatalogNode, Container, Item, NodeId, TreeIterator};
pub use descriptor::{Descriptor, DescriptorCache};
pub use error::{CatalogError, CatalogResult};
pub use visitor::CatalogVisitor;
