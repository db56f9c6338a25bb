// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! A many-to-one relation between keys, such as child to parent.
//!
//! Each child has at most one parent; a parent may have any number of
//! children. Internally the relation keeps two stores in lockstep: a
//! child-to-parent map and a parent-to-child multimap, so both directions
//! answer in constant expected time. Every mutation updates both sides
//! within the same call, keeping the two views consistent.
//!
//! As an `AbstractSet`, the relation presents its children: a key is a
//! member exactly when it has a parent.

use crate::abstract_set::AbstractSet;
use crate::collector::Collector;
use crate::config::TableConfig;
use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::map::KeyMap;
use crate::multi_map::{MultiMap, ValuesOf};

/// A child-to-parent relation over one key type.
///
/// A missing lookup yields the null key, which is also what terminates
/// ancestor walks in the closure expression nodes.
#[derive(Debug)]
pub struct Relation<K: Key> {
    child_to_parent: KeyMap<K, K>,
    parent_to_child: MultiMap<K, K>,
}

impl<K: Key> Relation<K> {
    /// An inert relation. Call `create` before use.
    pub fn new() -> Self {
        Self {
            child_to_parent: KeyMap::new(),
            parent_to_child: MultiMap::new(),
        }
    }

    /// Brings the relation to life. Both internal stores share `name` and
    /// `config`.
    pub fn create(&mut self, name: &str, config: Option<&TableConfig>) -> StoreResult<()> {
        self.child_to_parent.create(name, K::default(), config)?;
        self.parent_to_child.create(name, K::default(), config)?;
        Ok(())
    }

    /// Releases all storage and returns to the inert state. Idempotent.
    pub fn destroy(&mut self) {
        self.parent_to_child.destroy();
        self.child_to_parent.destroy();
    }

    /// Removes every edge and returns both stores to their minimum
    /// footprint.
    pub fn reset(&mut self) {
        self.parent_to_child.reset();
        self.child_to_parent.reset();
    }

    /// Runs the resize policies of both stores once on demand.
    pub fn update(&mut self) -> StoreResult<()> {
        self.child_to_parent.update()?;
        self.parent_to_child.update()
    }

    /// The combined status of the two stores.
    pub fn status(&self) -> StoreResult<()> {
        self.parent_to_child.status()?;
        self.child_to_parent.status()
    }

    /// The name given at `create`.
    pub fn name(&self) -> &str {
        self.child_to_parent.name()
    }

    /// Number of edges (equivalently, of children).
    pub fn len(&self) -> usize {
        self.child_to_parent.len()
    }

    /// Whether the relation holds no edges.
    pub fn is_empty(&self) -> bool {
        self.child_to_parent.is_empty()
    }

    /// Inserts the edge `child -> parent`, replacing any existing parent
    /// of `child`. A null parent means "detach": the call behaves as
    /// `remove_child(child)`.
    ///
    /// # Errors
    ///
    /// `InvalidArguments` for a null child (unless the parent is also
    /// null, in which case the detach path reports on the child lookup).
    pub fn insert(&mut self, child: &K, parent: &K) -> StoreResult<()> {
        if parent.is_null() {
            return self.remove_child(child);
        }
        if child.is_null() {
            return Err(StoreError::InvalidArguments);
        }
        let _ = self.remove_child(child);
        self.child_to_parent.insert(child, parent)?;
        if let Err(error) = self.parent_to_child.insert(parent, child) {
            // Keep the two sides consistent: back out the half-inserted
            // edge before reporting.
            let _ = self.child_to_parent.remove(child);
            return Err(error);
        }
        Ok(())
    }

    /// Removes the edge from `child` to its parent, if any.
    ///
    /// # Errors
    ///
    /// `NotFound` when the child has no parent, `InvalidArguments` for
    /// the null key.
    pub fn remove_child(&mut self, child: &K) -> StoreResult<()> {
        if child.is_null() {
            return Err(StoreError::InvalidArguments);
        }
        let parent = self.child_to_parent.remove(child)?;
        self.parent_to_child.remove_pair(&parent, child)
    }

    /// Removes every edge whose parent is `parent`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key has no children, `InvalidArguments` for
    /// the null key.
    pub fn remove_parent(&mut self, parent: &K) -> StoreResult<()> {
        if parent.is_null() {
            return Err(StoreError::InvalidArguments);
        }
        for child in self.parent_to_child.values_of(parent) {
            let _ = self.child_to_parent.remove(&child);
        }
        self.parent_to_child.remove(parent)
    }

    /// The parent of `child`, or the null key when it has none.
    pub fn find_parent(&self, child: &K) -> K {
        self.child_to_parent.find(child)
    }

    /// Whether `child` has a parent.
    pub fn contains_child(&self, child: &K) -> bool {
        self.child_to_parent.contains(child)
    }

    /// Whether `parent` has at least one child.
    pub fn contains_parent(&self, parent: &K) -> bool {
        self.parent_to_child.contains_key(parent)
    }

    /// Iterates over the children of `parent`.
    pub fn children_of(&self, parent: &K) -> ValuesOf<'_, K, K> {
        self.parent_to_child.values_of(parent)
    }
}

impl<K: Key> Default for Relation<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> AbstractSet<K> for Relation<K> {
    fn contains(&self, key: &K) -> bool {
        self.child_to_parent.contains(key)
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        self.child_to_parent.enumerate(collector, limit);
    }

    fn enumeration_cost(&self) -> usize {
        self.child_to_parent.enumeration_cost()
    }

    fn change_count(&self) -> u64 {
        self.child_to_parent.change_count()
    }
}
