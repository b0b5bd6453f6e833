//! Pluggable read-only operations over a catalog tree.
//!
//! The traversal lives in [`Catalog::walk`]; an operation only says what to do
//! with an item and how to combine a container's already computed child
//! results. New operations never touch the node types.

use tracing::instrument;

use crate::domain::arena::{Catalog, CatalogNode, Container, Item, NodeId};
use crate::domain::error::{CatalogError, CatalogResult};

pub trait CatalogVisitor {
    type Output;

    fn visit_item(&mut self, item: &Item) -> Self::Output;

    /// Called after all children of `container` were visited. `child_results`
    /// follows insertion order.
    fn visit_container(
        &mut self,
        container: &Container,
        child_results: Vec<Self::Output>,
    ) -> Self::Output;
}

impl Catalog {
    /// Drives `visitor` depth-first over the subtree rooted at `root`.
    ///
    /// Uses an explicit stack, so deep trees don't exhaust the call stack.
    #[instrument(level = "debug", skip(self, visitor))]
    pub fn walk<V: CatalogVisitor>(&self, root: NodeId, visitor: &mut V) -> CatalogResult<V::Output> {
        let mut stack = vec![(root, false)];
        let mut results: Vec<V::Output> = Vec::new();

        while let Some((current, expanded)) = stack.pop() {
            match self.node(current)? {
                CatalogNode::Item(item) => results.push(visitor.visit_item(item)),
                CatalogNode::Container(container) if !expanded => {
                    stack.push((current, true));
                    for &child in container.children().iter().rev() {
                        stack.push((child, false));
                    }
                }
                CatalogNode::Container(container) => {
                    let start = results.len() - container.children().len();
                    let child_results = results.split_off(start);
                    results.push(visitor.visit_container(container, child_results));
                }
            }
        }

        results.pop().ok_or(CatalogError::UnknownNode(root))
    }
}
