// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! A one-to-many key-to-value hash store.
//!
//! A key may carry any number of distinct values; the probe matches exact
//! key-value pairs, so inserting the same pair twice is a no-op while a
//! new value under an existing key lands in another slot of the same run.
//! All values of one key can therefore be visited by walking the run
//! forward from the first hit, with no per-key index structure.
//!
//! As an `AbstractSet`, a multimap presents each distinct key exactly
//! once, however many values it carries.

use std::fmt;
use std::sync::Arc;

use crate::abstract_set::{passes_limit, AbstractSet};
use crate::alloc::Allocator;
use crate::collector::Collector;
use crate::config::TableConfig;
use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::table::{InsertOutcome, MultiSlot, RawTable, TableSlot};

/// A hash multimap with a distinguished not-found value.
#[derive(Debug)]
pub struct MultiMap<K: Key, V: Clone + Eq + Default + fmt::Debug> {
    table: RawTable<MultiSlot<K, V>>,
    not_found: V,
}

impl<K: Key, V: Clone + Eq + Default + fmt::Debug> MultiMap<K, V> {
    /// An inert multimap. Call `create` before use.
    pub fn new() -> Self {
        Self {
            table: RawTable::new_inert(),
            not_found: V::default(),
        }
    }

    /// Brings the multimap to life with dynamically managed storage.
    ///
    /// # Arguments
    ///
    /// * `name` - Label for the store, also handed to the allocation port.
    /// * `not_found_value` - Returned by `find` on a miss.
    /// * `config` - Resize tuning; `None` uses the defaults.
    pub fn create(
        &mut self,
        name: &str,
        not_found_value: V,
        config: Option<&TableConfig>,
    ) -> StoreResult<()> {
        self.not_found = not_found_value;
        self.table.create(name, config, None, None)
    }

    /// As `create`, routing storage requests through `alloc`.
    pub fn create_with_allocator(
        &mut self,
        name: &str,
        not_found_value: V,
        config: Option<&TableConfig>,
        alloc: Arc<dyn Allocator>,
    ) -> StoreResult<()> {
        self.not_found = not_found_value;
        self.table.create(name, config, Some(alloc), None)
    }

    /// Brings the multimap to life with a fixed slot count and no
    /// allocation port.
    pub fn create_fixed(
        &mut self,
        name: &str,
        not_found_value: V,
        config: Option<&TableConfig>,
        capacity: usize,
    ) -> StoreResult<()> {
        self.not_found = not_found_value;
        self.table.create(name, config, None, Some(capacity))
    }

    /// Releases all storage and returns to the inert state. Idempotent.
    pub fn destroy(&mut self) {
        self.table.destroy();
    }

    /// Removes every pair and returns to the minimum footprint.
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

    /// Number of key-value pairs in the multimap.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the multimap holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Inserts the pair `(key, value)`. An identical pair is a no-op.
    pub fn insert(&mut self, key: &K, value: &V) -> StoreResult<()> {
        let slot = MultiSlot {
            key: key.clone(),
            value: value.clone(),
        };
        match self.table.insert_slot(slot)? {
            InsertOutcome::Added | InsertOutcome::Matched(_) => Ok(()),
        }
    }

    /// Removes every pair under `key`.
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
        if self.table.remove_where(key, |slot| &slot.key == key) == 0 {
            return Err(StoreError::NotFound);
        }
        self.table.finish_removal();
        Ok(())
    }

    /// Removes the single pair `(key, value)`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the pair is absent, `InvalidArguments` for the
    /// null key.
    pub fn remove_pair(&mut self, key: &K, value: &V) -> StoreResult<()> {
        self.table.guard()?;
        if key.is_null() {
            return Err(StoreError::InvalidArguments);
        }
        let cleared = self
            .table
            .remove_where(key, |slot| &slot.key == key && &slot.value == value);
        if cleared == 0 {
            return Err(StoreError::NotFound);
        }
        self.table.finish_removal();
        Ok(())
    }

    /// One value stored under `key`, or the not-found value. Which value
    /// is returned when the key carries several is unspecified.
    pub fn find(&self, key: &K) -> V {
        match self.table.find_key(key) {
            Some(index) => self.table.slot(index).value.clone(),
            None => self.not_found.clone(),
        }
    }

    /// The not-found value chosen at `create`.
    pub fn not_found_value(&self) -> &V {
        &self.not_found
    }

    /// Whether `key` carries at least one value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.table.find_key(key).is_some()
    }

    /// Whether the exact pair `(key, value)` is stored.
    pub fn contains_pair(&self, key: &K, value: &V) -> bool {
        if self.table.status().is_err() || key.is_null() || self.table.table_count() == 0 {
            return false;
        }
        let probe = MultiSlot {
            key: key.clone(),
            value: value.clone(),
        };
        match self.table.find_empty_or_matching(&probe) {
            Some(index) => !self.table.slot(index).is_vacant(),
            None => false,
        }
    }

    /// Iterates over every value stored under `key`.
    pub fn values_of(&self, key: &K) -> ValuesOf<'_, K, V> {
        ValuesOf {
            map: self,
            key: key.clone(),
            index: self.table.find_key(key),
        }
    }

    /// Iterates over the distinct keys, each exactly once.
    pub fn keys(&self) -> DistinctKeys<'_, K, V> {
        DistinctKeys {
            map: self,
            index: self.first_distinct_index(0),
        }
    }

    /// Whether no slot of the same run before `index` (walking backward
    /// to the nearest vacancy, with wrap) holds an equal key. The first
    /// such slot represents the key in distinct-key iteration.
    fn is_first_in_run(&self, index: usize) -> bool {
        let key = self.table.slot(index).key.clone();
        for i in (0..index).rev() {
            let slot = self.table.slot(i);
            if slot.is_vacant() {
                return true;
            }
            if slot.key == key {
                return false;
            }
        }
        let table_count = self.table.table_count();
        for i in ((index + 1)..table_count).rev() {
            let slot = self.table.slot(i);
            if slot.is_vacant() {
                return true;
            }
            if slot.key == key {
                return false;
            }
        }
        true
    }

    fn first_distinct_index(&self, start: usize) -> Option<usize> {
        let table_count = self.table.table_count();
        if self.table.status().is_err() {
            return None;
        }
        (start..table_count)
            .find(|&i| !self.table.slot(i).is_vacant() && self.is_first_in_run(i))
    }

    /// Next slot after `index` holding `key`, following the run forward
    /// with wrap. Stops at the first vacancy.
    fn next_index_of(&self, key: &K, index: usize) -> Option<usize> {
        let table_count = self.table.table_count();
        for i in (index + 1)..table_count {
            let slot = self.table.slot(i);
            if slot.is_vacant() {
                return None;
            }
            if &slot.key == key {
                return Some(i);
            }
        }
        for i in 0..index {
            let slot = self.table.slot(i);
            if slot.is_vacant() {
                return None;
            }
            if &slot.key == key {
                return Some(i);
            }
        }
        None
    }
}

impl<K: Key, V: Clone + Eq + Default + fmt::Debug> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Clone + Eq + Default + fmt::Debug> AbstractSet<K> for MultiMap<K, V> {
    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        let mut index = self.first_distinct_index(0);
        while let Some(i) = index {
            let key = self.table.slot(i).key.clone();
            if passes_limit(limit, &key) {
                collector.push(key);
            }
            index = self.first_distinct_index(i + 1);
        }
    }

    fn enumeration_cost(&self) -> usize {
        self.table.len()
    }

    fn change_count(&self) -> u64 {
        self.table.change_count()
    }
}

/// Iterator over the values stored under one key.
#[derive(Debug)]
pub struct ValuesOf<'a, K: Key, V: Clone + Eq + Default + fmt::Debug> {
    map: &'a MultiMap<K, V>,
    key: K,
    index: Option<usize>,
}

impl<K: Key, V: Clone + Eq + Default + fmt::Debug> Iterator for ValuesOf<'_, K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        let index = self.index?;
        let value = self.map.table.slot(index).value.clone();
        self.index = self.map.next_index_of(&self.key, index);
        Some(value)
    }
}

/// Iterator over the distinct keys of a `MultiMap`.
#[derive(Debug)]
pub struct DistinctKeys<'a, K: Key, V: Clone + Eq + Default + fmt::Debug> {
    map: &'a MultiMap<K, V>,
    index: Option<usize>,
}

impl<'a, K: Key, V: Clone + Eq + Default + fmt::Debug> Iterator for DistinctKeys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let index = self.index?;
        let key = &self.map.table.slot(index).key;
        self.index = self.map.first_distinct_index(index + 1);
        Some(key)
    }
}
