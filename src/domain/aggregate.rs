//! Built-in catalog operations, all driven by [`Catalog::walk`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::arena::{Catalog, Container, Item, NodeId};
use crate::domain::error::{CatalogError, CatalogResult};
use crate::domain::visitor::CatalogVisitor;

/// Sum of `quantity * unit_price` over all items. Empty containers add zero.
/// A product or sum outside Decimal's range yields `CatalogError::Overflow`.
#[derive(Debug, Default)]
pub struct TotalPrice;

impl CatalogVisitor for TotalPrice {
    type Output = CatalogResult<Decimal>;

    fn visit_item(&mut self, item: &Item) -> Self::Output {
        item.subtotal()
    }

    fn visit_container(&mut self, _container: &Container, child_results: Vec<Self::Output>) -> Self::Output {
        child_results.into_iter().try_fold(Decimal::ZERO, |sum, child| {
            sum.checked_add(child?).ok_or(CatalogError::Overflow)
        })
    }
}

/// Price as stored, or with exactly `precision` decimal places.
pub fn format_price(price: Decimal, precision: Option<u32>) -> String {
    match precision {
        Some(dp) => format!("{:.*}", dp as usize, price),
        None => price.to_string(),
    }
}

/// One line per item in depth-first, left-to-right order. Containers
/// contribute no line of their own.
#[derive(Debug, Default)]
pub struct DisplayLines {
    precision: Option<u32>,
}

impl DisplayLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render unit prices with exactly `precision` decimal places.
    pub fn with_precision(precision: u32) -> Self {
        Self {
            precision: Some(precision),
        }
    }

    pub fn format_item(&self, item: &Item) -> String {
        format!(
            "{} (quantity: {}, unit price: {})",
            item.descriptor.display_name(),
            item.quantity,
            format_price(item.unit_price, self.precision)
        )
    }
}

impl CatalogVisitor for DisplayLines {
    type Output = Vec<String>;

    fn visit_item(&mut self, item: &Item) -> Vec<String> {
        vec![self.format_item(item)]
    }

    fn visit_container(&mut self, _container: &Container, child_results: Vec<Vec<String>>) -> Vec<String> {
        child_results.into_iter().flatten().collect()
    }
}

/// Number of item nodes.
#[derive(Debug, Default)]
pub struct ItemCount;

impl CatalogVisitor for ItemCount {
    type Output = usize;

    fn visit_item(&mut self, _item: &Item) -> usize {
        1
    }

    fn visit_container(&mut self, _container: &Container, child_results: Vec<usize>) -> usize {
        child_results.into_iter().sum()
    }
}

/// Total quantity per descriptor key.
#[derive(Debug, Default)]
pub struct KindTally;

impl CatalogVisitor for KindTally {
    type Output = BTreeMap<String, u64>;

    fn visit_item(&mut self, item: &Item) -> Self::Output {
        BTreeMap::from([(item.descriptor.key().to_string(), u64::from(item.quantity))])
    }

    fn visit_container(&mut self, _container: &Container, child_results: Vec<Self::Output>) -> Self::Output {
        let mut tally = BTreeMap::new();
        for child in child_results {
            for (key, quantity) in child {
                *tally.entry(key).or_insert(0) += quantity;
            }
        }
        tally
    }
}

pub fn compute_total(catalog: &Catalog, root: NodeId) -> CatalogResult<Decimal> {
    catalog.walk(root, &mut TotalPrice)?
}

pub fn display(catalog: &Catalog, root: NodeId) -> CatalogResult<Vec<String>> {
    catalog.walk(root, &mut DisplayLines::new())
}
