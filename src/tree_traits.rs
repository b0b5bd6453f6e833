use termtree::Tree;
use tracing::instrument;

use crate::domain::{Catalog, CatalogResult, CatalogVisitor, Container, DisplayLines, Item, NodeId};

pub trait TreeNodeConvert {
    fn to_tree_string(&self, root: NodeId) -> CatalogResult<Tree<String>>;
}

/// Renders containers by name and items as display lines.
#[derive(Debug, Default)]
pub struct TreeRender {
    lines: DisplayLines,
}

impl TreeRender {
    pub fn new(lines: DisplayLines) -> Self {
        Self { lines }
    }
}

impl CatalogVisitor for TreeRender {
    type Output = Tree<String>;

    fn visit_item(&mut self, item: &Item) -> Tree<String> {
        Tree::new(self.lines.format_item(item))
    }

    fn visit_container(&mut self, container: &Container, child_results: Vec<Tree<String>>) -> Tree<String> {
        Tree::new(container.name.clone()).with_leaves(child_results)
    }
}

impl TreeNodeConvert for Catalog {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, root: NodeId) -> CatalogResult<Tree<String>> {
        self.walk(root, &mut TreeRender::default())
    }
}
