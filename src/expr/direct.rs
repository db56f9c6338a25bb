// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Direct closure nodes over a relation and an operand set.

use crate::abstract_set::AbstractSet;
use crate::collector::Collector;
use crate::key::Key;
use crate::relation::Relation;

use super::walk::{DownHop, UpHop, UpToRoot};

/// The keys whose parent is in the operand set: one hop down the relation
/// from each operand member, with unmapped members dropped.
#[derive(Clone, Copy)]
pub struct DirectOpen<'a, K: Key> {
    relation: &'a Relation<K>,
    operand: &'a dyn AbstractSet<K>,
}

impl<'a, K: Key> DirectOpen<'a, K> {
    /// Builds the node over `relation` and `operand`.
    pub fn new(relation: &'a Relation<K>, operand: &'a dyn AbstractSet<K>) -> Self {
        Self { relation, operand }
    }
}

impl<K: Key> AbstractSet<K> for DirectOpen<'_, K> {
    fn contains(&self, key: &K) -> bool {
        let parent = self.relation.find_parent(key);
        !parent.is_null() && self.operand.contains(&parent)
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        let mut walker = DownHop {
            inner: collector,
            relation: self.relation,
            limit,
            include_unmapped: false,
        };
        self.operand.enumerate(&mut walker, None);
    }

    fn enumeration_cost(&self) -> usize {
        self.operand.enumeration_cost()
    }

    fn change_count(&self) -> u64 {
        self.operand.change_count() + self.relation.change_count()
    }
}

/// The parents of the operand members, one hop up the relation; a member
/// without a parent represents itself.
#[derive(Clone, Copy)]
pub struct DirectClosedShallow<'a, K: Key> {
    relation: &'a Relation<K>,
    operand: &'a dyn AbstractSet<K>,
}

impl<'a, K: Key> DirectClosedShallow<'a, K> {
    /// Builds the node over `relation` and `operand`.
    pub fn new(relation: &'a Relation<K>, operand: &'a dyn AbstractSet<K>) -> Self {
        Self { relation, operand }
    }
}

impl<K: Key> AbstractSet<K> for DirectClosedShallow<'_, K> {
    fn contains(&self, key: &K) -> bool {
        for child in self.relation.children_of(key) {
            if self.operand.contains(&child) {
                return true;
            }
        }
        !self.relation.contains_child(key) && self.operand.contains(key)
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        let mut walker = UpHop {
            inner: collector,
            relation: self.relation,
            limit,
            include_unmapped: true,
        };
        self.operand.enumerate(&mut walker, None);
    }

    fn enumeration_cost(&self) -> usize {
        self.operand.enumeration_cost()
    }

    fn change_count(&self) -> u64 {
        self.operand.change_count() + self.relation.change_count()
    }
}

/// The topmost ancestor of each operand member; a member without a parent
/// represents itself.
///
/// The relation must be acyclic: the ancestor walk runs until it finds a
/// key with no parent.
#[derive(Clone, Copy)]
pub struct DirectClosedDeep<'a, K: Key> {
    relation: &'a Relation<K>,
    operand: &'a dyn AbstractSet<K>,
}

impl<'a, K: Key> DirectClosedDeep<'a, K> {
    /// Builds the node over `relation` and `operand`.
    pub fn new(relation: &'a Relation<K>, operand: &'a dyn AbstractSet<K>) -> Self {
        Self { relation, operand }
    }

    /// Whether any transitive descendant of `key` is an operand member.
    fn subtree_reaches_operand(&self, key: &K) -> bool {
        for child in self.relation.children_of(key) {
            if self.operand.contains(&child) || self.subtree_reaches_operand(&child) {
                return true;
            }
        }
        false
    }
}

impl<K: Key> AbstractSet<K> for DirectClosedDeep<'_, K> {
    fn contains(&self, key: &K) -> bool {
        if self.relation.contains_child(key) {
            // Anything with a parent is not a topmost ancestor.
            return false;
        }
        self.operand.contains(key) || self.subtree_reaches_operand(key)
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        let mut walker = UpToRoot {
            inner: collector,
            relation: self.relation,
            limit,
        };
        self.operand.enumerate(&mut walker, None);
    }

    fn enumeration_cost(&self) -> usize {
        self.operand.enumeration_cost()
    }

    fn change_count(&self) -> u64 {
        self.operand.change_count() + self.relation.change_count()
    }
}
