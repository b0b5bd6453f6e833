//! Hierarchical catalog aggregation with interned item descriptors.
//!
//! Items reference shared [`domain::Descriptor`]s handed out by a
//! [`domain::DescriptorCache`]; containers own their children inside a
//! [`domain::Catalog`] arena; read-only operations plug in through
//! [`domain::CatalogVisitor`].

pub mod builder;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use domain::{
    compute_total, display, Catalog, CatalogError, CatalogResult, CatalogVisitor, Descriptor,
    DescriptorCache, NodeId,
};
