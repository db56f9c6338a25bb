// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! A single-valued key-to-value hash store.
//!
//! Every key maps to exactly one value; inserting under an existing key
//! overwrites its value in place. Lookups never fail: a miss returns the
//! `not_found_value` chosen at `create`. As an `AbstractSet`, a map
//! presents its key set.

use std::fmt;
use std::sync::Arc;

use crate::abstract_set::{passes_limit, AbstractSet};
use crate::alloc::Allocator;
use crate::collector::Collector;
use crate::config::TableConfig;
use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::table::{InsertOutcome, MapSlot, RawTable};

/// A hash map with a distinguished not-found value.
#[derive(Debug)]
pub struct KeyMap<K: Key, V: Clone + Eq + Default + fmt::Debug> {
    table: RawTable<MapSlot<K, V>>,
    not_found: V,
}

impl<K: Key, V: Clone + Eq + Default + fmt::Debug> KeyMap<K, V> {
    /// An inert map. Call `create` before use.
    pub fn new() -> Self {
        Self {
            table: RawTable::new_inert(),
            not_found: V::default(),
        }
    }

    /// Brings the map to life with dynamically managed storage.
    ///
    /// # Arguments
    ///
    /// * `name` - Label for the map, also handed to the allocation port.
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

    /// Brings the map to life with a fixed slot count and no allocation
    /// port. At full capacity novel keys are refused with `CouldNotAlloc`
    /// while existing keys stay updatable.
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

    /// Removes every entry and returns to the minimum footprint.
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

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Inserts or updates the mapping for `key`.
    pub fn insert(&mut self, key: &K, value: &V) -> StoreResult<()> {
        let slot = MapSlot {
            key: key.clone(),
            value: value.clone(),
        };
        match self.table.insert_slot(slot)? {
            InsertOutcome::Added => Ok(()),
            InsertOutcome::Matched(index) => {
                // Same key: update the mapping. The key set is unchanged,
                // so the change counter stays put.
                self.table.slot_mut(index).value = value.clone();
                Ok(())
            }
        }
    }

    /// Removes the mapping for `key` and returns its value.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key is absent, `InvalidArguments` for the null
    /// key.
    pub fn remove(&mut self, key: &K) -> StoreResult<V> {
        self.table.guard()?;
        if key.is_null() {
            return Err(StoreError::InvalidArguments);
        }
        let value = match self.table.find_key(key) {
            Some(index) => self.table.slot(index).value.clone(),
            None => return Err(StoreError::NotFound),
        };
        self.table.remove_where(key, |slot| &slot.key == key);
        self.table.finish_removal();
        Ok(value)
    }

    /// The value mapped to `key`, or the not-found value.
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

    /// Iterates over `(key, value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: &self.table,
            index: self.table.first_index(),
        }
    }

    /// Iterates over the keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }
}

impl<K: Key, V: Clone + Eq + Default + fmt::Debug> Default for KeyMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Clone + Eq + Default + fmt::Debug> AbstractSet<K> for KeyMap<K, V> {
    fn contains(&self, key: &K) -> bool {
        self.table.find_key(key).is_some()
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        let mut index = self.table.first_index();
        while self.table.is_index_valid(index) {
            let key = self.table.slot(index).key.clone();
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

/// Iterator over the entries of a `KeyMap`.
#[derive(Debug)]
pub struct Iter<'a, K: Key, V: Clone + Eq + Default + fmt::Debug> {
    table: &'a RawTable<MapSlot<K, V>>,
    index: usize,
}

impl<'a, K: Key, V: Clone + Eq + Default + fmt::Debug> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if !self.table.is_index_valid(self.index) {
            return None;
        }
        let slot = self.table.slot(self.index);
        self.index = self.table.next_index(self.index);
        Some((&slot.key, &slot.value))
    }
}
