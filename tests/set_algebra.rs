// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! End-to-end scenarios exercised through the public API only.

use mojolib::{
    AbstractSet, Difference, DirectClosedDeep, Intersection, InverseClosedDeep, KeyMap, KeySet,
    MultiMap, Relation, SetCollector, StoreError, TableConfig, Union,
};

fn tight_config() -> TableConfig {
    TableConfig::new()
        .with_alloc_count_min(4)
        .with_table_count_min(4)
        .with_grow_threshold_percent(80)
        .with_shrink_threshold_percent(20)
}

fn materialise(node: &dyn AbstractSet<u32>) -> Vec<u32> {
    let mut sink = KeySet::new();
    sink.create("sink", None).expect("create sink");
    node.enumerate(&mut SetCollector::new(&mut sink), None);
    let mut keys: Vec<u32> = sink.iter().copied().collect();
    keys.sort_unstable();
    keys
}

#[test]
fn colliding_inserts_grow_and_stay_findable() {
    // Keys 1, 5, 9, 13 all home to slot 1 in a table of 4.
    let mut set = KeySet::<u32>::new();
    set.create("collisions", Some(&tight_config()))
        .expect("create");
    for key in [1u32, 5, 9, 13] {
        set.insert(&key).expect("insert");
    }
    assert_eq!(set.len(), 4);
    for key in [1u32, 5, 9, 13] {
        assert!(set.contains(&key));
    }

    // The table sits at 100% load, beyond the 80% threshold; the next
    // resize pass grows it and every key must survive the move.
    set.update().expect("update");
    for key in [1u32, 5, 9, 13] {
        assert!(set.contains(&key), "key {key} lost in the grow");
    }
}

#[test]
fn multimap_per_key_iteration_and_pair_queries() {
    let (a, b) = (1u32, 2u32);
    let mut map = MultiMap::<u32, u32>::new();
    map.create("pairs", 0, None).expect("create");
    map.insert(&a, &1).expect("insert");
    map.insert(&a, &2).expect("insert");
    map.insert(&b, &3).expect("insert");

    let mut values: Vec<u32> = map.values_of(&a).collect();
    values.sort_unstable();
    assert_eq!(values, vec![1, 2]);
    assert_eq!(map.values_of(&b).collect::<Vec<_>>(), vec![3]);

    assert!(map.contains_key(&a));
    assert!(map.contains_pair(&a, &2));
    assert!(!map.contains_pair(&a, &4));
}

#[test]
fn relation_closures_walk_lineages() {
    // c(3) -> b(2), b(2) -> a(1), d(4) -> a(1)
    let mut relation = Relation::<u32>::new();
    relation.create("lineage", None).expect("create");
    relation.insert(&3, &2).expect("edge");
    relation.insert(&2, &1).expect("edge");
    relation.insert(&4, &1).expect("edge");

    assert_eq!(relation.find_parent(&3), 2);
    assert_eq!(relation.find_parent(&2), 1);

    let mut just_c = KeySet::<u32>::new();
    just_c.create("just_c", None).expect("create");
    just_c.insert(&3).expect("insert");
    let deep_up = DirectClosedDeep::new(&relation, &just_c);
    assert_eq!(materialise(&deep_up), vec![1]);

    let mut just_a = KeySet::<u32>::new();
    just_a.create("just_a", None).expect("create");
    just_a.insert(&1).expect("insert");
    let deep_down = InverseClosedDeep::new(&relation, &just_a);
    assert_eq!(materialise(&deep_down), vec![2, 3, 4]);
}

#[test]
fn removing_a_parent_detaches_all_of_its_children() {
    let mut relation = Relation::<u32>::new();
    relation.create("lineage", None).expect("create");
    relation.insert(&3, &2).expect("edge");
    relation.insert(&2, &1).expect("edge");
    relation.insert(&4, &1).expect("edge");

    relation.remove_parent(&1).expect("remove parent");
    assert_eq!(relation.find_parent(&2), 0);
    assert_eq!(relation.find_parent(&4), 0);
    assert!(!relation.contains_parent(&1));

    // Both directions agree after the detach.
    assert!(relation.children_of(&1).next().is_none());
    assert_eq!(relation.find_parent(&3), 2);
    assert!(relation.children_of(&2).any(|child| child == 3));
}

#[test]
fn boolean_algebra_over_two_stores() {
    let mut a = KeySet::<u32>::new();
    a.create("a", None).expect("create");
    let mut b = KeySet::<u32>::new();
    b.create("b", None).expect("create");
    for key in [1u32, 2, 3] {
        a.insert(&key).expect("insert");
    }
    for key in [2u32, 3, 4] {
        b.insert(&key).expect("insert");
    }

    let operands: [&dyn AbstractSet<u32>; 2] = [&a, &b];
    assert_eq!(materialise(&Intersection::new(&operands)), vec![2, 3]);
    assert_eq!(materialise(&Difference::new(&a, &b)), vec![1]);
    assert_eq!(materialise(&Union::new(&operands)), vec![1, 2, 3, 4]);

    let expected = a.change_count() + b.change_count();
    assert_eq!(Union::new(&operands).change_count(), expected);
    assert_eq!(Intersection::new(&operands).change_count(), expected);
    assert_eq!(Difference::new(&a, &b).change_count(), expected);
}

#[test]
fn fixed_capacity_store_fails_over_gracefully() {
    let mut map = KeyMap::<u32, u32>::new();
    map.create_fixed("fixed", 0, Some(&tight_config()), 4)
        .expect("create");
    for key in 1..=4u32 {
        map.insert(&key, &key).expect("insert");
    }
    assert_eq!(map.insert(&5, &5), Err(StoreError::CouldNotAlloc));
    // Existing keys remain updatable at capacity.
    map.insert(&1, &11).expect("update");
    assert_eq!(map.find(&1), 11);
}

#[test]
fn caching_against_the_change_count() {
    let mut a = KeySet::<u32>::new();
    a.create("a", None).expect("create");
    let mut b = KeySet::<u32>::new();
    b.create("b", None).expect("create");
    a.insert(&1).expect("insert");
    b.insert(&1).expect("insert");

    let before = {
        let operands: [&dyn AbstractSet<u32>; 2] = [&a, &b];
        Intersection::new(&operands).change_count()
    };

    // No mutation: a cached result keyed on the count is still valid.
    let unchanged = {
        let operands: [&dyn AbstractSet<u32>; 2] = [&a, &b];
        Intersection::new(&operands).change_count()
    };
    assert_eq!(before, unchanged);

    b.insert(&2).expect("insert");
    let after = {
        let operands: [&dyn AbstractSet<u32>; 2] = [&a, &b];
        Intersection::new(&operands).change_count()
    };
    assert!(after > before);
}
