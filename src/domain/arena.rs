use std::fmt;
use std::sync::Arc;

use generational_arena::{Arena, Index};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::domain::descriptor::Descriptor;
use crate::domain::error::{CatalogError, CatalogResult};

/// Handle to a node stored in a [`Catalog`].
///
/// Handles are generational: once a node is discarded its handle stays
/// invalid even if the slot gets reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Leaf node: a quantity of one item kind at a unit price.
#[derive(Debug, Clone)]
pub struct Item {
    pub descriptor: Arc<Descriptor>,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl Item {
    /// `quantity * unit_price`, failing instead of wrapping past Decimal's range.
    pub fn subtotal(&self) -> CatalogResult<Decimal> {
        Decimal::from(self.quantity)
            .checked_mul(self.unit_price)
            .ok_or(CatalogError::Overflow)
    }
}

/// Branch node owning an ordered list of children.
#[derive(Debug, Clone)]
pub struct Container {
    pub name: String,
    children: Vec<NodeId>,
}

impl Container {
    /// Child handles in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub enum CatalogNode {
    Item(Item),
    Container(Container),
}

impl CatalogNode {
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            CatalogNode::Item(item) => Some(item),
            CatalogNode::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            CatalogNode::Container(container) => Some(container),
            CatalogNode::Item(_) => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, CatalogNode::Container(_))
    }
}

#[derive(Debug)]
struct Slot {
    node: CatalogNode,
    /// Owning container, None for detached nodes
    parent: Option<NodeId>,
}

/// Arena holding every node of one or more catalog trees.
///
/// Nodes are created detached and become part of a tree through
/// [`Catalog::add`]. A container exclusively owns its children: discarding it
/// destroys the whole subtree. Descriptors are only referenced, never owned.
#[derive(Debug, Default)]
pub struct Catalog {
    arena: Arena<Slot>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self, descriptor), fields(key = descriptor.key()))]
    pub fn new_item(
        &mut self,
        descriptor: Arc<Descriptor>,
        quantity: u32,
        unit_price: Decimal,
    ) -> CatalogResult<NodeId> {
        if unit_price < Decimal::ZERO {
            return Err(CatalogError::NegativePrice(unit_price));
        }
        Ok(self.insert(CatalogNode::Item(Item {
            descriptor,
            quantity,
            unit_price,
        })))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn new_container(&mut self, name: &str) -> NodeId {
        self.insert(CatalogNode::Container(Container {
            name: name.to_string(),
            children: Vec::new(),
        }))
    }

    fn insert(&mut self, node: CatalogNode) -> NodeId {
        NodeId(self.arena.insert(Slot { node, parent: None }))
    }

    fn slot(&self, id: NodeId) -> CatalogResult<&Slot> {
        self.arena.get(id.0).ok_or(CatalogError::UnknownNode(id))
    }

    fn container_mut(&mut self, id: NodeId) -> CatalogResult<&mut Container> {
        match self.arena.get_mut(id.0) {
            Some(Slot {
                node: CatalogNode::Container(container),
                ..
            }) => Ok(container),
            Some(_) => Err(CatalogError::NotAContainer(id)),
            None => Err(CatalogError::UnknownNode(id)),
        }
    }

    pub fn node(&self, id: NodeId) -> CatalogResult<&CatalogNode> {
        self.slot(id).map(|slot| &slot.node)
    }

    pub fn container(&self, id: NodeId) -> CatalogResult<&Container> {
        self.node(id)?
            .as_container()
            .ok_or(CatalogError::NotAContainer(id))
    }

    pub fn parent(&self, id: NodeId) -> CatalogResult<Option<NodeId>> {
        self.slot(id).map(|slot| slot.parent)
    }

    pub fn children(&self, id: NodeId) -> CatalogResult<&[NodeId]> {
        self.container(id).map(Container::children)
    }

    pub fn child_count(&self, id: NodeId) -> CatalogResult<usize> {
        self.children(id).map(<[NodeId]>::len)
    }

    pub fn child_at(&self, container: NodeId, index: usize) -> CatalogResult<NodeId> {
        let children = self.children(container)?;
        children
            .get(index)
            .copied()
            .ok_or(CatalogError::IndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// True when `ancestor` is `node` itself or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> CatalogResult<bool> {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == ancestor {
                return Ok(true);
            }
            current = self.parent(idx)?;
        }
        Ok(false)
    }

    /// Appends `child` as the last child of `container`.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&mut self, container: NodeId, child: NodeId) -> CatalogResult<()> {
        self.container(container)?;
        let child_parent = self.parent(child)?;

        if self.is_ancestor(child, container)? {
            return Err(CatalogError::CycleDetected { container, child });
        }
        if let Some(parent) = child_parent {
            return Err(CatalogError::AlreadyAttached { child, parent });
        }

        self.container_mut(container)?.children.push(child);
        if let Some(slot) = self.arena.get_mut(child.0) {
            slot.parent = Some(container);
        }
        debug!(%container, %child, "attached");
        Ok(())
    }

    /// Detaches the direct child `child` from `container`. The child stays
    /// alive as a detached node and may be attached again.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, container: NodeId, child: NodeId) -> CatalogResult<()> {
        let position = self
            .children(container)?
            .iter()
            .position(|&c| c == child)
            .ok_or(CatalogError::NotFound { container, child })?;

        self.container_mut(container)?.children.remove(position);
        if let Some(slot) = self.arena.get_mut(child.0) {
            slot.parent = None;
        }
        debug!(%container, %child, "detached");
        Ok(())
    }

    /// Destroys `id` and everything below it, detaching it first if needed.
    /// Returns the number of destroyed nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, id: NodeId) -> CatalogResult<usize> {
        if let Some(parent) = self.parent(id)? {
            self.remove(parent, id)?;
        }
        let doomed: Vec<NodeId> = self.iter(id).map(|(idx, _)| idx).collect();
        for idx in &doomed {
            self.arena.remove(idx.0);
        }
        debug!(%id, count = doomed.len(), "discarded subtree");
        Ok(doomed.len())
    }

    /// Pre-order, left-to-right traversal of the subtree rooted at `root`.
    /// An unknown root yields nothing.
    pub fn iter(&self, root: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, root)
    }

    /// Items below `root` in display order.
    pub fn items(&self, root: NodeId) -> impl Iterator<Item = &Item> {
        self.iter(root).filter_map(|(_, node)| node.as_item())
    }

    /// Number of levels in the subtree; a lone node has depth 1.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, root: NodeId) -> CatalogResult<usize> {
        let mut stack = vec![(root, 1)];
        let mut deepest = 0;
        while let Some((current, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(container) = self.node(current)?.as_container() {
                stack.extend(container.children().iter().map(|&child| (child, level + 1)));
            }
        }
        Ok(deepest)
    }
}

pub struct TreeIterator<'a> {
    catalog: &'a Catalog,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(catalog: &'a Catalog, root: NodeId) -> Self {
        let mut stack = Vec::new();
        if catalog.contains(root) {
            stack.push(root);
        }
        Self { catalog, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a CatalogNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Ok(node) = self.catalog.node(current) {
                if let Some(container) = node.as_container() {
                    // Push children in reverse order for left-to-right traversal
                    for &child in container.children().iter().rev() {
                        self.stack.push(child);
                    }
                }
                return Some((current, node));
            }
        }
        None
    }
}
