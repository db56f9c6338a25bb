// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! A key-only hash store.
//!
//! `KeySet` is the simplest container over the open-addressed engine and
//! the workhorse sink of the expression algebra: enumerating any
//! expression into a `SetCollector` materialises its members with
//! duplicates folded away.
//!
//! # Example
//!
//! ```
//! use mojolib::{KeySet, AbstractSet};
//!
//! let mut names = KeySet::<u32>::new();
//! names.create("names", None).unwrap();
//!
//! names.insert(&7).unwrap();
//! names.insert(&7).unwrap(); // second insert is a no-op
//! assert!(names.contains(&7));
//! assert_eq!(names.len(), 1);
//!
//! names.remove(&7).unwrap();
//! assert!(!names.contains(&7));
//! ```

use std::sync::Arc;

use crate::abstract_set::{passes_limit, AbstractSet};
use crate::alloc::Allocator;
use crate::collector::Collector;
use crate::config::TableConfig;
use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::table::{KeySlot, RawTable};

/// A hash set of keys.
#[derive(Debug)]
pub struct KeySet<K: Key> {
    table: RawTable<KeySlot<K>>,
}

impl<K: Key> KeySet<K> {
    /// An inert set. Call `create` before use; until then every operation
    /// reports `NotInitialized`.
    pub fn new() -> Self {
        Self {
            table: RawTable::new_inert(),
        }
    }

    /// Brings the set to life with dynamically managed storage.
    ///
    /// # Arguments
    ///
    /// * `name` - Label for the set, also handed to the allocation port.
    /// * `config` - Resize tuning; `None` uses `TableConfig::default()`.
    pub fn create(&mut self, name: &str, config: Option<&TableConfig>) -> StoreResult<()> {
        self.table.create(name, config, None, None)
    }

    /// As `create`, routing storage requests through `alloc`.
    pub fn create_with_allocator(
        &mut self,
        name: &str,
        config: Option<&TableConfig>,
        alloc: Arc<dyn Allocator>,
    ) -> StoreResult<()> {
        self.table.create(name, config, Some(alloc), None)
    }

    /// Brings the set to life with a fixed slot count. No allocation port
    /// is used; once `len() == capacity` further novel keys are refused
    /// with `CouldNotAlloc` while existing keys keep working.
    pub fn create_fixed(
        &mut self,
        name: &str,
        config: Option<&TableConfig>,
        capacity: usize,
    ) -> StoreResult<()> {
        self.table.create(name, config, None, Some(capacity))
    }

    /// Releases all storage and returns to the inert state. Idempotent.
    pub fn destroy(&mut self) {
        self.table.destroy();
    }

    /// Removes every key and returns to the minimum footprint.
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Runs the grow and shrink policies once on demand.
    pub fn update(&mut self) -> StoreResult<()> {
        self.table.update()
    }

    /// The stored status, reflecting any creation failure.
    pub fn status(&self) -> StoreResult<()> {
        self.table.status()
    }

    /// The name given at `create`.
    pub fn name(&self) -> &str {
        self.table.name()
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Inserts `key`. Inserting a key that is already present is a no-op.
    pub fn insert(&mut self, key: &K) -> StoreResult<()> {
        self.table.insert_slot(KeySlot(key.clone())).map(|_| ())
    }

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key is absent, `InvalidArguments` for the null
    /// key.
    pub fn remove(&mut self, key: &K) -> StoreResult<()> {
        self.table.guard()?;
        if key.is_null() {
            return Err(StoreError::InvalidArguments);
        }
        if self.table.remove_where(key, |slot| &slot.0 == key) == 0 {
            return Err(StoreError::NotFound);
        }
        self.table.finish_removal();
        Ok(())
    }

    /// Iterates over the keys in slot order. The order is a function of
    /// the current layout and changes across mutations.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            table: &self.table,
            index: self.table.first_index(),
        }
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &RawTable<KeySlot<K>> {
        &self.table
    }
}

impl<K: Key> Default for KeySet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> AbstractSet<K> for KeySet<K> {
    fn contains(&self, key: &K) -> bool {
        self.table.find_key(key).is_some()
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        let mut index = self.table.first_index();
        while self.table.is_index_valid(index) {
            let key = self.table.slot(index).0.clone();
            if passes_limit(limit, &key) {
                collector.push(key);
            }
            index = self.table.next_index(index);
        }
    }

    fn enumeration_cost(&self) -> usize {
        self.table.len()
    }

    fn change_count(&self) -> u64 {
        self.table.change_count()
    }
}

/// Iterator over the keys of a `KeySet`.
#[derive(Debug)]
pub struct Iter<'a, K: Key> {
    table: &'a RawTable<KeySlot<K>>,
    index: usize,
}

impl<'a, K: Key> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if !self.table.is_index_valid(self.index) {
            return None;
        }
        let key = &self.table.slot(self.index).0;
        self.index = self.table.next_index(self.index);
        Some(key)
    }
}

/// Collector that inserts every pushed key into a `KeySet`, folding
/// duplicates away. Capacity refusals of the target are ignored, exactly
/// as a caller doing the inserts by hand could choose to do.
#[derive(Debug)]
pub struct SetCollector<'a, K: Key> {
    target: &'a mut KeySet<K>,
}

impl<'a, K: Key> SetCollector<'a, K> {
    /// Wraps `target` as the sink of an enumeration.
    pub fn new(target: &'a mut KeySet<K>) -> Self {
        Self { target }
    }
}

impl<K: Key> Collector<K> for SetCollector<'_, K> {
    fn push(&mut self, key: K) {
        let _ = self.target.insert(&key);
    }
}
