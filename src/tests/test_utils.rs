// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Shared fixtures for the test suites.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::alloc::Allocator;
use crate::config::TableConfig;
use crate::key::Key;
use crate::relation::Relation;
use crate::set::KeySet;
use crate::table::TableSlot;

/// A tight configuration that makes resize activity visible in small
/// tests: table floor of 4, thresholds 80/20.
pub fn tight_config() -> TableConfig {
    TableConfig::new()
        .with_alloc_count_min(4)
        .with_table_count_min(4)
        .with_grow_threshold_percent(80)
        .with_shrink_threshold_percent(20)
}

/// Allocator granting a limited number of requests and refusing the rest.
#[derive(Debug)]
pub struct GrudgingAllocator {
    grants_left: AtomicUsize,
}

impl GrudgingAllocator {
    pub fn new(grants: usize) -> Self {
        Self {
            grants_left: AtomicUsize::new(grants),
        }
    }
}

impl Allocator for GrudgingAllocator {
    fn allocate(&self, _bytes: usize, _label: &str) -> bool {
        self.grants_left
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }

    fn free(&self, _bytes: usize, _label: &str) {}
}

/// A created set holding the given keys.
pub fn set_of(name: &str, keys: &[u32]) -> KeySet<u32> {
    let mut set = KeySet::new();
    set.create(name, None).expect("create");
    for key in keys {
        set.insert(key).expect("insert");
    }
    set
}

/// The family fixture used across the closure-node tests:
/// c(3) -> b(2), b(2) -> a(1), d(4) -> a(1).
pub fn family_relation() -> Relation<u32> {
    let mut relation = Relation::new();
    relation.create("family", None).expect("create");
    relation.insert(&3, &2).expect("edge");
    relation.insert(&2, &1).expect("edge");
    relation.insert(&4, &1).expect("edge");
    relation
}

/// Materialises an abstract set into a sorted vector through a
/// deduplicating sink.
pub fn collect_sorted<S>(set: &S) -> Vec<u32>
where
    S: crate::abstract_set::AbstractSet<u32>,
{
    let mut sink = KeySet::new();
    sink.create("collected", None).expect("create");
    set.enumerate(&mut crate::set::SetCollector::new(&mut sink), None);
    let mut keys: Vec<u32> = sink.iter().copied().collect();
    keys.sort_unstable();
    keys
}

/// The keys of `domain` an abstract set claims as members, sorted.
pub fn members_over_domain<S>(set: &S, domain: &[u32]) -> Vec<u32>
where
    S: crate::abstract_set::AbstractSet<u32>,
{
    let mut keys: Vec<u32> = domain
        .iter()
        .filter(|key| set.contains(key))
        .copied()
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Checks the structural probe invariants of a set's slot array:
/// every occupied slot is reachable from its home position without
/// crossing a vacancy, and the live count matches the occupied count.
pub fn assert_probe_invariants(set: &KeySet<u32>) {
    let table = set.raw();
    let table_count = table.table_count();
    let mut occupied = 0;
    for index in 0..table_count {
        let slot = table.slot(index);
        if slot.is_vacant() {
            continue;
        }
        occupied += 1;
        let home = slot.0.key_hash() as usize % table_count;
        let mut probe = home;
        loop {
            assert!(
                !table.slot(probe).is_vacant(),
                "key {:?} at slot {index} is hidden behind a vacancy at {probe} (home {home})",
                slot.0
            );
            if probe == index {
                break;
            }
            probe = (probe + 1) % table_count;
        }
    }
    assert_eq!(table.len(), occupied, "live count disagrees with storage");
}
