// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The open-addressed engine shared by `KeySet`, `KeyMap`, and `MultiMap`.
//!
//! Storage is a flat slot array. Only the leading `table_count` slots take
//! part in hashing; the rest are headroom so the hash region can grow in
//! place. A key's home slot is `key_hash % table_count` and collisions
//! probe linearly with wrap-around.
//!
//! The table maintains one structural invariant: starting at any occupied
//! slot's home position and scanning forward (with wrap), no vacant slot
//! appears before that entry. Occupied slots therefore form contiguous
//! runs bounded by vacancies, and a probe can stop at the first vacant
//! slot it meets. Removal repairs the invariant by re-homing the remainder
//! of the run instead of leaving tombstones, so lookups never pay for past
//! deletions.
//!
//! Resizing comes in three disciplines:
//! - reallocate: new buffer, every entry re-inserted against the new
//!   region size, old buffer released through the allocation port;
//! - shrink in place: reduce `table_count`, then re-home every slot of the
//!   old region into the retained prefix;
//! - grow in place: raise `table_count`, re-home the old region, then
//!   re-home the leading entries of the newly exposed region up to its
//!   first vacancy. Those entries were bumped forward by collisions while
//!   the region was still small and may now sit ahead of their run.

pub(crate) mod slot;

use std::sync::Arc;

use crate::key::Key;

use tracing::{debug, trace};

use crate::alloc::{default_allocator, Allocator};
use crate::config::TableConfig;
use crate::error::{StoreError, StoreResult};

pub(crate) use slot::{KeySlot, MapSlot, MultiSlot, TableSlot};

/// What `insert_slot` did with the incoming entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertOutcome {
    /// A vacant slot was claimed; counts were bumped.
    Added,
    /// An existing entry matched at this index. The caller decides whether
    /// that means "no-op" (set, multimap) or "overwrite" (map).
    Matched(usize),
}

/// Resize parameters lifted out of a validated `TableConfig`.
#[derive(Debug, Clone)]
struct ResizeParams {
    alloc_count_min: usize,
    table_count_min: usize,
    grow_threshold: u32,
    shrink_threshold: u32,
    auto_grow: bool,
    auto_shrink: bool,
    dynamic_alloc: bool,
}

impl Default for ResizeParams {
    fn default() -> Self {
        let config = TableConfig::default();
        Self::from_config(&config)
    }
}

impl ResizeParams {
    fn from_config(config: &TableConfig) -> Self {
        Self {
            alloc_count_min: config.alloc_count_min,
            table_count_min: config.table_count_min,
            grow_threshold: config.grow_threshold_percent,
            shrink_threshold: config.shrink_threshold_percent,
            auto_grow: config.auto_grow,
            auto_shrink: config.auto_shrink,
            dynamic_alloc: config.dynamic_alloc,
        }
    }
}

/// The raw open-addressed table.
#[derive(Debug)]
pub(crate) struct RawTable<S: TableSlot> {
    name: String,
    slots: Box<[S]>,
    table_count: usize,
    active_count: usize,
    change_count: u64,
    status: Option<StoreError>,
    alloc: Option<Arc<dyn Allocator>>,
    fixed: bool,
    params: ResizeParams,
}

impl<S: TableSlot> RawTable<S> {
    /// An inert table. Every operation reports `NotInitialized` until
    /// `create` succeeds.
    pub(crate) fn new_inert() -> Self {
        Self {
            name: String::new(),
            slots: Box::default(),
            table_count: 0,
            active_count: 0,
            change_count: 0,
            status: Some(StoreError::NotInitialized),
            alloc: None,
            fixed: false,
            params: ResizeParams::default(),
        }
    }

    /// Brings an inert table to life.
    ///
    /// With `fixed_capacity` the slot array is sized once and the
    /// allocation port is never consulted; a full table then refuses novel
    /// keys with `CouldNotAlloc`. Without it, storage is obtained through
    /// `alloc` (or the default allocator) at the configured minimum
    /// footprint.
    pub(crate) fn create(
        &mut self,
        name: &str,
        config: Option<&TableConfig>,
        alloc: Option<Arc<dyn Allocator>>,
        fixed_capacity: Option<usize>,
    ) -> StoreResult<()> {
        if self.status != Some(StoreError::NotInitialized) {
            self.status = Some(StoreError::DoubleInitialized);
            return Err(StoreError::DoubleInitialized);
        }

        let default_config;
        let config = match config {
            Some(config) => config,
            None => {
                default_config = TableConfig::default();
                &default_config
            }
        };
        if config.validate().is_err() || fixed_capacity == Some(0) {
            self.status = Some(StoreError::InvalidArguments);
            return Err(StoreError::InvalidArguments);
        }

        self.name = name.to_owned();
        self.params = ResizeParams::from_config(config);
        self.active_count = 0;
        self.change_count = 0;

        match fixed_capacity {
            Some(capacity) => {
                self.alloc = None;
                self.fixed = true;
                self.slots = vec![S::default(); capacity].into_boxed_slice();
                self.table_count = self.params.table_count_min.min(capacity);
                self.status = None;
            }
            None => {
                self.alloc = Some(alloc.unwrap_or_else(default_allocator));
                self.fixed = false;
                self.status = None;
                let capacity = self.params.alloc_count_min.max(self.params.table_count_min);
                self.resize(self.params.table_count_min, capacity);
                if self.slots.is_empty() {
                    // The port refused the initial buffer.
                    self.status = Some(StoreError::CouldNotAlloc);
                    return Err(StoreError::CouldNotAlloc);
                }
            }
        }

        debug!(
            name = %self.name,
            capacity = self.slots.len(),
            table_count = self.table_count,
            fixed = self.fixed,
            "created store"
        );
        Ok(())
    }

    /// Releases all storage and returns to the inert state. Safe to call
    /// repeatedly; a destroyed table can be created again.
    pub(crate) fn destroy(&mut self) {
        if !self.slots.is_empty() {
            if let Some(alloc) = &self.alloc {
                alloc.free(Self::byte_size(self.slots.len()), &self.name);
            }
            self.slots = Box::default();
            debug!(name = %self.name, "destroyed store");
        }
        self.table_count = 0;
        self.active_count = 0;
        self.change_count = 0;
        self.alloc = None;
        self.fixed = false;
        self.status = Some(StoreError::NotInitialized);
    }

    /// Clears every entry and returns to the minimum footprint without
    /// deinitialising.
    pub(crate) fn reset(&mut self) {
        if self.status.is_some() {
            return;
        }
        for slot in &mut self.slots[..self.table_count] {
            *slot = S::default();
        }
        self.active_count = 0;
        self.change_count += 1;
        let (table, capacity) = self.minimum_footprint();
        self.resize(table, capacity);
    }

    /// Runs the grow and shrink policies once on demand. This is the only
    /// way a store with `auto_grow`/`auto_shrink` disabled ever resizes
    /// after creation.
    pub(crate) fn update(&mut self) -> StoreResult<()> {
        self.guard()?;
        self.grow();
        self.shrink();
        Ok(())
    }

    /// The stored status. `Ok(())` unless creation failed or never
    /// happened.
    pub(crate) fn status(&self) -> StoreResult<()> {
        self.guard()
    }

    pub(crate) fn guard(&self) -> StoreResult<()> {
        match self.status {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Number of live entries.
    pub(crate) fn len(&self) -> usize {
        self.active_count
    }

    pub(crate) fn change_count(&self) -> u64 {
        self.change_count
    }

    pub(crate) fn table_count(&self) -> usize {
        self.table_count
    }

    pub(crate) fn slot(&self, index: usize) -> &S {
        &self.slots[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut S {
        &mut self.slots[index]
    }

    // ---- probing ------------------------------------------------------

    /// First slot from `probe`'s home position that is vacant or matches
    /// it, scanning forward with wrap. `None` only when the table is full
    /// and holds no match.
    pub(crate) fn find_empty_or_matching(&self, probe: &S) -> Option<usize> {
        debug_assert!(self.table_count > 0);
        let home = probe.key().key_hash() as usize % self.table_count;
        for i in (home..self.table_count).chain(0..home) {
            if self.slots[i].is_vacant() || self.slots[i].matches(probe) {
                return Some(i);
            }
        }
        None
    }

    /// As `find_empty_or_matching`, but any slot holding `key` counts as a
    /// match regardless of the slot's dedup policy.
    pub(crate) fn find_empty_or_matching_key(&self, key: &S::Key) -> Option<usize> {
        debug_assert!(self.table_count > 0);
        let home = key.key_hash() as usize % self.table_count;
        for i in (home..self.table_count).chain(0..home) {
            if self.slots[i].is_vacant() || self.slots[i].key() == key {
                return Some(i);
            }
        }
        None
    }

    /// Index of an occupied slot holding `key`, if any. Returns `None` on
    /// an errored store, for the null key, and on a miss.
    pub(crate) fn find_key(&self, key: &S::Key) -> Option<usize> {
        if self.status.is_some() || key.is_null() || self.table_count == 0 {
            return None;
        }
        match self.find_empty_or_matching_key(key) {
            Some(index) if !self.slots[index].is_vacant() => Some(index),
            _ => None,
        }
    }

    // ---- mutation -----------------------------------------------------

    /// Inserts `slot`, growing first if the policy calls for it.
    ///
    /// A vacant hit claims the slot; a matching hit is reported back so
    /// the container can apply its own overwrite/no-op policy. A full
    /// table without a match refuses with `CouldNotAlloc`, which keeps
    /// existing keys updatable even at full fixed capacity.
    pub(crate) fn insert_slot(&mut self, slot: S) -> StoreResult<InsertOutcome> {
        self.guard()?;
        if slot.key().is_null() {
            return Err(StoreError::InvalidArguments);
        }
        if self.params.auto_grow {
            self.grow();
        }
        match self.find_empty_or_matching(&slot) {
            None => Err(StoreError::CouldNotAlloc),
            Some(index) if self.slots[index].is_vacant() => {
                self.slots[index] = slot;
                self.active_count += 1;
                self.change_count += 1;
                Ok(InsertOutcome::Added)
            }
            Some(index) => Ok(InsertOutcome::Matched(index)),
        }
    }

    /// Clears every slot in `key`'s run selected by `clear`, then repairs
    /// the displacement chain. Returns how many slots were cleared; the
    /// caller turns zero into `NotFound` and otherwise finishes with
    /// `finish_removal`.
    pub(crate) fn remove_where(
        &mut self,
        key: &S::Key,
        clear: impl Fn(&S) -> bool,
    ) -> usize {
        let Some(start) = self.find_empty_or_matching_key(key) else {
            return 0;
        };
        if self.slots[start].is_vacant() {
            return 0;
        }

        let mut cleared = 0;
        let mut run_len = 0;
        let mut i = start;
        while run_len < self.table_count && !self.slots[i].is_vacant() {
            if clear(&self.slots[i]) {
                self.slots[i] = S::default();
                self.active_count -= 1;
                cleared += 1;
            }
            run_len += 1;
            i = (i + 1) % self.table_count;
        }
        if cleared > 0 {
            self.fix_up(start, run_len);
        }
        cleared
    }

    /// Books the change and lets the shrink policy run. Call once per
    /// successful removal, however many slots it cleared.
    pub(crate) fn finish_removal(&mut self) {
        self.change_count += 1;
        if self.params.auto_shrink {
            self.shrink();
        }
    }

    // ---- iteration ----------------------------------------------------

    /// Index of the first occupied slot, or `table_count` when empty.
    pub(crate) fn first_index(&self) -> usize {
        self.next_occupied_from(0)
    }

    /// Index of the next occupied slot after `index`, or `table_count`.
    pub(crate) fn next_index(&self, index: usize) -> usize {
        self.next_occupied_from(index + 1)
    }

    pub(crate) fn is_index_valid(&self, index: usize) -> bool {
        self.status.is_none() && index < self.table_count
    }

    fn next_occupied_from(&self, start: usize) -> usize {
        for i in start..self.table_count {
            if !self.slots[i].is_vacant() {
                return i;
            }
        }
        self.table_count
    }

    // ---- resize machinery ---------------------------------------------

    fn byte_size(count: usize) -> usize {
        count * std::mem::size_of::<S>()
    }

    fn realloc_allowed(&self) -> bool {
        self.params.dynamic_alloc && self.alloc.is_some()
    }

    fn minimum_footprint(&self) -> (usize, usize) {
        if self.fixed {
            let capacity = self.slots.len();
            (self.params.table_count_min.min(capacity), capacity)
        } else {
            (
                self.params.table_count_min,
                self.params.alloc_count_min.max(self.params.table_count_min),
            )
        }
    }

    fn grow(&mut self) {
        if 100 * self.active_count >= self.table_count * self.params.grow_threshold as usize {
            let mut new_table_count = self.table_count * 2;
            let mut new_capacity = self.slots.len().max(new_table_count);
            if !self.realloc_allowed() {
                new_capacity = self.slots.len();
                new_table_count = new_table_count.min(new_capacity);
            }
            self.resize(new_table_count, new_capacity);
        }
    }

    fn shrink(&mut self) {
        if self.table_count > self.params.table_count_min
            && 100 * self.active_count < self.table_count * self.params.shrink_threshold as usize
        {
            let new_table_count = (self.table_count / 2).max(self.params.table_count_min);
            let mut new_capacity = new_table_count.max(self.params.alloc_count_min);
            if !self.realloc_allowed() {
                new_capacity = self.slots.len();
            }
            self.resize(new_table_count, new_capacity);
        }
    }

    fn resize(&mut self, new_table_count: usize, new_capacity: usize) {
        if self.alloc.is_some() && self.slots.len() != new_capacity {
            self.reallocate(new_table_count, new_capacity);
        } else if new_table_count < self.table_count {
            // Shrink the hash region in place. The shrink threshold
            // guarantees the residents fit into the retained prefix.
            debug_assert!(self.active_count <= new_table_count);
            let old_table_count = self.table_count;
            self.table_count = new_table_count;
            trace!(
                name = %self.name,
                old = old_table_count,
                new = new_table_count,
                "shrink in place"
            );
            for i in 0..old_table_count {
                if !self.slots[i].is_vacant() {
                    self.reinsert(i);
                }
            }
        } else if new_table_count > self.table_count {
            // Grow the hash region in place.
            let old_table_count = self.table_count;
            self.table_count = new_table_count;
            trace!(
                name = %self.name,
                old = old_table_count,
                new = new_table_count,
                "grow in place"
            );
            for i in 0..old_table_count {
                if !self.slots[i].is_vacant() {
                    self.reinsert(i);
                }
            }
            // The leading entries of the newly exposed region are keys
            // that collision-bumped past the old boundary. Re-home them
            // up to the first vacancy.
            for i in old_table_count..new_table_count {
                if self.slots[i].is_vacant() {
                    break;
                }
                self.reinsert(i);
            }
        }
    }

    fn reallocate(&mut self, new_table_count: usize, new_capacity: usize) {
        let Some(alloc) = self.alloc.clone() else {
            return;
        };
        if new_capacity > 0 && !alloc.allocate(Self::byte_size(new_capacity), &self.name) {
            // Refused: abandon the resize, keep the current storage.
            trace!(name = %self.name, requested = new_capacity, "allocation refused");
            return;
        }
        trace!(
            name = %self.name,
            old_capacity = self.slots.len(),
            new_capacity,
            new_table_count,
            "reallocate"
        );

        let old_slots = std::mem::replace(
            &mut self.slots,
            vec![S::default(); new_capacity].into_boxed_slice(),
        );
        let old_table_count = self.table_count;
        self.table_count = new_table_count;
        self.active_count = 0;

        if !self.slots.is_empty() {
            for slot in &old_slots[..old_table_count] {
                if !slot.is_vacant() {
                    self.place(slot.clone());
                }
            }
        }
        if !old_slots.is_empty() {
            alloc.free(Self::byte_size(old_slots.len()), &self.name);
        }
    }

    /// Raw insert used while rebuilding into fresh storage. Entries are
    /// distinct by construction, so the probe target is always vacant.
    fn place(&mut self, slot: S) {
        if let Some(index) = self.find_empty_or_matching(&slot) {
            if self.slots[index].is_vacant() {
                self.slots[index] = slot;
                self.active_count += 1;
            }
        }
    }

    /// Moves the entry at `index` to its probe target if displacement put
    /// it elsewhere.
    fn reinsert(&mut self, index: usize) {
        let slot = self.slots[index].clone();
        if let Some(target) = self.find_empty_or_matching(&slot) {
            if target != index {
                self.slots[target] = slot;
                self.slots[index] = S::default();
            }
        }
    }

    /// Re-homes up to `run_len` slots following a removal at `start`. Each
    /// displaced entry moves at most once, toward its home position.
    fn fix_up(&mut self, start: usize, run_len: usize) {
        let budget = run_len.min(self.table_count.saturating_sub(1));
        let mut i = (start + 1) % self.table_count;
        for _ in 0..budget {
            if !self.slots[i].is_vacant() {
                self.reinsert(i);
            }
            i = (i + 1) % self.table_count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Table = RawTable<KeySlot<u32>>;

    fn small_config() -> TableConfig {
        TableConfig::new()
            .with_alloc_count_min(4)
            .with_table_count_min(4)
            .with_grow_threshold_percent(80)
            .with_shrink_threshold_percent(20)
    }

    fn created() -> Table {
        let mut table = Table::new_inert();
        table
            .create("raw", Some(&small_config()), None, None)
            .expect("create");
        table
    }

    #[test]
    fn inert_table_reports_not_initialized() {
        let table = Table::new_inert();
        assert_eq!(table.status(), Err(StoreError::NotInitialized));
    }

    #[test]
    fn create_twice_is_double_initialized() {
        let mut table = created();
        assert_eq!(
            table.create("again", None, None, None),
            Err(StoreError::DoubleInitialized)
        );
        // And the error sticks.
        assert_eq!(table.status(), Err(StoreError::DoubleInitialized));
    }

    #[test]
    fn destroy_then_create_recovers() {
        let mut table = created();
        table.insert_slot(KeySlot(7)).expect("insert");
        table.destroy();
        assert_eq!(table.status(), Err(StoreError::NotInitialized));
        table.destroy(); // idempotent
        table
            .create("reborn", Some(&small_config()), None, None)
            .expect("second create");
        assert_eq!(table.len(), 0);
        assert_eq!(table.change_count(), 0);
    }

    #[test]
    fn displaced_entries_stay_reachable_after_removal() {
        let mut table = created();
        // All four keys share home slot 1 in a table of 4.
        for key in [1u32, 5, 9, 13] {
            table.insert_slot(KeySlot(key)).expect("insert");
        }
        assert_eq!(table.len(), 4);
        assert_eq!(table.table_count(), 4);
        // Load is 100%, past the 80% threshold: the next policy run grows.
        table.update().expect("update");
        assert!(table.table_count() > 4);
        for key in [1u32, 5, 9, 13] {
            assert!(table.find_key(&key).is_some(), "lost key {key}");
        }
        table.remove_where(&5, |slot| slot.0 == 5);
        table.finish_removal();
        for key in [1u32, 9, 13] {
            assert!(table.find_key(&key).is_some(), "lost key {key} after fixup");
        }
        assert!(table.find_key(&5).is_none());
    }
}
