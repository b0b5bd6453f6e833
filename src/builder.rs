use rust_decimal::Decimal;
use tracing::instrument;

use crate::domain::{Catalog, CatalogResult, DescriptorCache, NodeId};

/// Builds catalog trees, resolving item kinds through a descriptor cache.
pub struct CatalogBuilder<'a> {
    cache: &'a DescriptorCache,
    catalog: Catalog,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(cache: &'a DescriptorCache) -> Self {
        Self {
            cache,
            catalog: Catalog::new(),
        }
    }

    pub fn container(&mut self, name: &str) -> NodeId {
        self.catalog.new_container(name)
    }

    pub fn item(&mut self, key: &str, quantity: u32, unit_price: Decimal) -> CatalogResult<NodeId> {
        let descriptor = self.cache.get_or_create(key);
        self.catalog.new_item(descriptor, quantity, unit_price)
    }

    /// Creates an item and appends it to `container`.
    pub fn add_item(
        &mut self,
        container: NodeId,
        key: &str,
        quantity: u32,
        unit_price: Decimal,
    ) -> CatalogResult<NodeId> {
        let item = self.item(key, quantity, unit_price)?;
        self.catalog.add(container, item)?;
        Ok(item)
    }

    /// Creates a container and appends it to `parent`.
    pub fn add_container(&mut self, parent: NodeId, name: &str) -> CatalogResult<NodeId> {
        let container = self.container(name);
        self.catalog.add(parent, container)?;
        Ok(container)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn finish(self) -> Catalog {
        self.catalog
    }
}

/// The shopping trip: a big bag holding shoes, a white bag of mushrooms and
/// tea, and a middle bag with porcelain and a red bag of specialties and a map.
///
/// ```text
/// bigBag
/// ├── shoes      1 x 198
/// ├── whiteBag
/// │   ├── mushroom   2 x 68
/// │   └── tea        3 x 180
/// └── middleBag
///     ├── porcelain  1 x 380
///     └── redBag
///         ├── specialty  2 x 7.9
///         └── map        1 x 9.9
/// ```
#[instrument(level = "debug", skip(cache))]
pub fn shopping_bag(cache: &DescriptorCache) -> CatalogResult<(Catalog, NodeId)> {
    let mut builder = CatalogBuilder::new(cache);

    let big_bag = builder.container("bigBag");
    builder.add_item(big_bag, "shoes", 1, Decimal::from(198))?;

    let white_bag = builder.add_container(big_bag, "whiteBag")?;
    builder.add_item(white_bag, "mushroom", 2, Decimal::from(68))?;
    builder.add_item(white_bag, "tea", 3, Decimal::from(180))?;

    let middle_bag = builder.add_container(big_bag, "middleBag")?;
    builder.add_item(middle_bag, "porcelain", 1, Decimal::from(380))?;

    let red_bag = builder.add_container(middle_bag, "redBag")?;
    builder.add_item(red_bag, "specialty", 2, Decimal::new(79, 1))?;
    builder.add_item(red_bag, "map", 1, Decimal::new(99, 1))?;

    Ok((builder.finish(), big_bag))
}
