//! Tests for catalog tree structure: attach, detach, indexing and lifetime

use std::sync::Arc;

use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use rscatalog::domain::{Catalog, CatalogError, CatalogNode, DescriptorCache, NodeId};
use rscatalog::util::testing;

struct Fixture {
    cache: DescriptorCache,
    catalog: Catalog,
}

impl Fixture {
    fn item(&mut self, key: &str, quantity: u32, price: i64) -> NodeId {
        let descriptor = self.cache.get_or_create(key);
        self.catalog
            .new_item(descriptor, quantity, Decimal::from(price))
            .unwrap()
    }
}

#[fixture]
fn fx() -> Fixture {
    testing::init_test_setup();
    Fixture {
        cache: DescriptorCache::new(),
        catalog: Catalog::new(),
    }
}

// ============================================================
// add
// ============================================================

#[rstest]
fn given_container_when_adding_children_then_preserves_insertion_order(mut fx: Fixture) {
    let bag = fx.catalog.new_container("bag");
    let a = fx.item("a", 1, 1);
    let b = fx.item("b", 1, 1);
    let c = fx.catalog.new_container("inner");

    fx.catalog.add(bag, a).unwrap();
    fx.catalog.add(bag, b).unwrap();
    fx.catalog.add(bag, c).unwrap();

    assert_eq!(fx.catalog.children(bag).unwrap(), &[a, b, c]);
    assert_eq!(fx.catalog.parent(b).unwrap(), Some(bag));
    assert_eq!(fx.catalog.parent(bag).unwrap(), None);
}

#[rstest]
fn given_container_when_adding_itself_then_fails_with_cycle(mut fx: Fixture) {
    let bag = fx.catalog.new_container("bag");

    let err = fx.catalog.add(bag, bag).unwrap_err();

    assert_eq!(err, CatalogError::CycleDetected { container: bag, child: bag });
    assert_eq!(fx.catalog.child_count(bag).unwrap(), 0);
    assert_eq!(fx.catalog.parent(bag).unwrap(), None);
}

#[rstest]
fn given_nested_containers_when_adding_ancestor_under_descendant_then_fails_unchanged(mut fx: Fixture) {
    let outer = fx.catalog.new_container("outer");
    let middle = fx.catalog.new_container("middle");
    let inner = fx.catalog.new_container("inner");
    fx.catalog.add(outer, middle).unwrap();
    fx.catalog.add(middle, inner).unwrap();

    let err = fx.catalog.add(inner, outer).unwrap_err();

    assert!(matches!(err, CatalogError::CycleDetected { .. }));
    assert_eq!(fx.catalog.child_count(inner).unwrap(), 0);
    assert_eq!(fx.catalog.parent(outer).unwrap(), None);
    assert_eq!(fx.catalog.children(outer).unwrap(), &[middle]);
}

#[rstest]
fn given_attached_ancestor_when_adding_under_descendant_then_reports_cycle_first(mut fx: Fixture) {
    let root = fx.catalog.new_container("root");
    let middle = fx.catalog.new_container("middle");
    let inner = fx.catalog.new_container("inner");
    fx.catalog.add(root, middle).unwrap();
    fx.catalog.add(middle, inner).unwrap();

    let err = fx.catalog.add(inner, middle).unwrap_err();

    assert_eq!(err, CatalogError::CycleDetected { container: inner, child: middle });
}

#[rstest]
fn given_attached_child_when_adding_elsewhere_then_fails_with_already_attached(mut fx: Fixture) {
    let first = fx.catalog.new_container("first");
    let second = fx.catalog.new_container("second");
    let shoes = fx.item("shoes", 1, 198);
    fx.catalog.add(first, shoes).unwrap();

    let err = fx.catalog.add(second, shoes).unwrap_err();

    assert_eq!(err, CatalogError::AlreadyAttached { child: shoes, parent: first });
    assert_eq!(fx.catalog.child_count(second).unwrap(), 0);
    assert_eq!(fx.catalog.parent(shoes).unwrap(), Some(first));
}

#[rstest]
fn given_attached_child_when_adding_to_same_parent_then_fails_without_duplicate(mut fx: Fixture) {
    let bag = fx.catalog.new_container("bag");
    let tea = fx.item("tea", 3, 180);
    fx.catalog.add(bag, tea).unwrap();

    let err = fx.catalog.add(bag, tea).unwrap_err();

    assert!(matches!(err, CatalogError::AlreadyAttached { .. }));
    assert_eq!(fx.catalog.children(bag).unwrap(), &[tea]);
}

#[rstest]
fn given_item_when_adding_child_then_fails_with_not_a_container(mut fx: Fixture) {
    let tea = fx.item("tea", 3, 180);
    let map = fx.item("map", 1, 10);

    let err = fx.catalog.add(tea, map).unwrap_err();

    assert_eq!(err, CatalogError::NotAContainer(tea));
    assert_eq!(fx.catalog.parent(map).unwrap(), None);
}

#[rstest]
fn given_negative_price_when_creating_item_then_fails(mut fx: Fixture) {
    let descriptor = fx.cache.get_or_create("refund");

    let err = fx
        .catalog
        .new_item(descriptor, 1, Decimal::from(-5))
        .unwrap_err();

    assert_eq!(err, CatalogError::NegativePrice(Decimal::from(-5)));
    assert!(fx.catalog.is_empty());
}

// ============================================================
// remove
// ============================================================

#[rstest]
fn given_direct_child_when_removing_then_detaches_it(mut fx: Fixture) {
    let bag = fx.catalog.new_container("bag");
    let tea = fx.item("tea", 3, 180);
    let map = fx.item("map", 1, 10);
    fx.catalog.add(bag, tea).unwrap();
    fx.catalog.add(bag, map).unwrap();

    fx.catalog.remove(bag, tea).unwrap();

    assert_eq!(fx.catalog.children(bag).unwrap(), &[map]);
    assert_eq!(fx.catalog.parent(tea).unwrap(), None);
    assert!(fx.catalog.contains(tea));
}

#[rstest]
fn given_removed_child_when_adding_back_then_present_exactly_once(mut fx: Fixture) {
    let bag = fx.catalog.new_container("bag");
    let tea = fx.item("tea", 3, 180);
    let map = fx.item("map", 1, 10);
    fx.catalog.add(bag, tea).unwrap();
    fx.catalog.add(bag, map).unwrap();

    fx.catalog.remove(bag, tea).unwrap();
    fx.catalog.add(bag, tea).unwrap();

    let children = fx.catalog.children(bag).unwrap();
    assert_eq!(children.iter().filter(|&&c| c == tea).count(), 1);
    assert_eq!(children, &[map, tea]);
    assert_eq!(fx.catalog.parent(tea).unwrap(), Some(bag));
}

#[rstest]
fn given_grandchild_when_removing_from_grandparent_then_fails_with_not_found(mut fx: Fixture) {
    let outer = fx.catalog.new_container("outer");
    let inner = fx.catalog.new_container("inner");
    let tea = fx.item("tea", 3, 180);
    fx.catalog.add(outer, inner).unwrap();
    fx.catalog.add(inner, tea).unwrap();

    let err = fx.catalog.remove(outer, tea).unwrap_err();

    assert_eq!(err, CatalogError::NotFound { container: outer, child: tea });
    assert_eq!(fx.catalog.children(inner).unwrap(), &[tea]);
    assert_eq!(fx.catalog.parent(tea).unwrap(), Some(inner));
}

#[rstest]
fn given_detached_node_when_moving_between_containers_then_succeeds(mut fx: Fixture) {
    let white = fx.catalog.new_container("white");
    let red = fx.catalog.new_container("red");
    let map = fx.item("map", 1, 10);
    fx.catalog.add(white, map).unwrap();

    fx.catalog.remove(white, map).unwrap();
    fx.catalog.add(red, map).unwrap();

    assert_eq!(fx.catalog.child_count(white).unwrap(), 0);
    assert_eq!(fx.catalog.children(red).unwrap(), &[map]);
}

// ============================================================
// child_at
// ============================================================

#[rstest]
#[case(0, "first")]
#[case(1, "second")]
fn given_children_when_indexing_then_returns_insertion_order(
    mut fx: Fixture,
    #[case] index: usize,
    #[case] expected: &str,
) {
    let bag = fx.catalog.new_container("bag");
    let first = fx.item("first", 1, 1);
    let second = fx.item("second", 1, 1);
    fx.catalog.add(bag, first).unwrap();
    fx.catalog.add(bag, second).unwrap();

    let child = fx.catalog.child_at(bag, index).unwrap();

    match fx.catalog.node(child).unwrap() {
        CatalogNode::Item(item) => assert_eq!(item.descriptor.key(), expected),
        CatalogNode::Container(_) => panic!("expected an item"),
    }
}

#[rstest]
#[case(2)]
#[case(usize::MAX)]
fn given_index_past_end_when_indexing_then_fails_with_out_of_range(mut fx: Fixture, #[case] index: usize) {
    let bag = fx.catalog.new_container("bag");
    let first = fx.item("first", 1, 1);
    let second = fx.item("second", 1, 1);
    fx.catalog.add(bag, first).unwrap();
    fx.catalog.add(bag, second).unwrap();

    let err = fx.catalog.child_at(bag, index).unwrap_err();

    assert_eq!(err, CatalogError::IndexOutOfRange { index, len: 2 });
}

#[rstest]
fn given_sibling_subtree_grows_when_indexing_then_result_unaffected(mut fx: Fixture) {
    let bag = fx.catalog.new_container("bag");
    let inner = fx.catalog.new_container("inner");
    let tea = fx.item("tea", 3, 180);
    fx.catalog.add(bag, inner).unwrap();
    fx.catalog.add(bag, tea).unwrap();

    for n in 0..5 {
        let extra = fx.item(&format!("extra-{}", n), 1, 1);
        fx.catalog.add(inner, extra).unwrap();
    }

    assert_eq!(fx.catalog.child_at(bag, 1).unwrap(), tea);
    assert!(fx.catalog.child_at(bag, 2).is_err());
}

#[rstest]
fn given_empty_container_when_indexing_zero_then_fails(mut fx: Fixture) {
    let bag = fx.catalog.new_container("bag");

    assert_eq!(
        fx.catalog.child_at(bag, 0).unwrap_err(),
        CatalogError::IndexOutOfRange { index: 0, len: 0 }
    );
}

// ============================================================
// discard and descriptor lifetime
// ============================================================

#[rstest]
fn given_attached_subtree_when_discarding_then_destroys_it_and_keeps_descriptors(mut fx: Fixture) {
    let root = fx.catalog.new_container("root");
    let bag = fx.catalog.new_container("bag");
    let tea = fx.item("tea", 3, 180);
    let map = fx.item("map", 1, 10);
    fx.catalog.add(root, bag).unwrap();
    fx.catalog.add(bag, tea).unwrap();
    fx.catalog.add(bag, map).unwrap();
    let tea_descriptor = fx.cache.get("tea").unwrap();

    let destroyed = fx.catalog.discard(bag).unwrap();

    assert_eq!(destroyed, 3);
    assert_eq!(fx.catalog.child_count(root).unwrap(), 0);
    assert!(!fx.catalog.contains(bag));
    assert!(!fx.catalog.contains(tea));
    assert_eq!(fx.catalog.node(map).unwrap_err(), CatalogError::UnknownNode(map));
    assert!(Arc::ptr_eq(&tea_descriptor, &fx.cache.get_or_create("tea")));
    assert_eq!(fx.cache.len(), 2);
}

#[rstest]
fn given_discarded_node_when_slot_reused_then_old_handle_stays_invalid(mut fx: Fixture) {
    let old = fx.catalog.new_container("old");
    fx.catalog.discard(old).unwrap();

    let new = fx.catalog.new_container("new");

    assert_ne!(old, new);
    assert_eq!(fx.catalog.child_count(old).unwrap_err(), CatalogError::UnknownNode(old));
    assert_eq!(fx.catalog.child_count(new).unwrap(), 0);
}

#[rstest]
fn given_many_items_of_one_kind_then_all_share_one_descriptor(mut fx: Fixture) {
    let bag = fx.catalog.new_container("bag");
    for _ in 0..100 {
        let tea = fx.item("tea", 1, 180);
        fx.catalog.add(bag, tea).unwrap();
    }

    let descriptors: Vec<_> = fx.catalog.items(bag).map(|i| Arc::clone(&i.descriptor)).collect();

    assert_eq!(descriptors.len(), 100);
    assert!(descriptors.iter().all(|d| Arc::ptr_eq(d, &descriptors[0])));
    assert_eq!(fx.cache.len(), 1);
}

// ============================================================
// traversal helpers
// ============================================================

#[rstest]
fn given_nested_tree_when_iterating_then_visits_pre_order_left_to_right(mut fx: Fixture) {
    let root = fx.catalog.new_container("root");
    let left = fx.catalog.new_container("left");
    let a = fx.item("a", 1, 1);
    let b = fx.item("b", 1, 1);
    fx.catalog.add(root, left).unwrap();
    fx.catalog.add(left, a).unwrap();
    fx.catalog.add(root, b).unwrap();

    let order: Vec<NodeId> = fx.catalog.iter(root).map(|(id, _)| id).collect();

    assert_eq!(order, vec![root, left, a, b]);
    assert_eq!(fx.catalog.depth(root).unwrap(), 3);
    assert!(fx.catalog.is_ancestor(root, a).unwrap());
    assert!(!fx.catalog.is_ancestor(left, b).unwrap());
}

#[rstest]
#[case(3, Decimal::new(79, 1), Ok(Decimal::new(237, 1)))]
#[case(u32::MAX, Decimal::from_i128_with_scale(10i128.pow(20), 0), Err(CatalogError::Overflow))]
fn given_item_when_taking_subtotal_then_checked_product(
    mut fx: Fixture,
    #[case] quantity: u32,
    #[case] unit_price: Decimal,
    #[case] expected: Result<Decimal, CatalogError>,
) {
    let descriptor = fx.cache.get_or_create("bulk");
    let id = fx.catalog.new_item(descriptor, quantity, unit_price).unwrap();

    let CatalogNode::Item(item) = fx.catalog.node(id).unwrap() else {
        panic!("expected an item");
    };

    assert_eq!(item.subtotal(), expected);
}
