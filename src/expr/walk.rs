// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Internal collectors that walk a relation per received key.
//!
//! Every closure node enumerates the same way: it drives its operand set
//! into one of these walkers, which transforms each incoming key through
//! the relation and forwards the results to the outer collector, applying
//! the limit filter on the way out. The operand itself is enumerated
//! without a limit; filtering inputs would drop keys whose *outputs* the
//! limit accepts.

use crate::abstract_set::{passes_limit, AbstractSet};
use crate::collector::Collector;
use crate::key::Key;
use crate::relation::Relation;

/// One hop toward the parent. With `include_unmapped`, a key without a
/// parent passes through unchanged.
pub(super) struct UpHop<'a, K: Key, C: Collector<K> + ?Sized> {
    pub inner: &'a mut C,
    pub relation: &'a Relation<K>,
    pub limit: Option<&'a dyn AbstractSet<K>>,
    pub include_unmapped: bool,
}

impl<K: Key, C: Collector<K> + ?Sized> Collector<K> for UpHop<'_, K, C> {
    fn push(&mut self, key: K) {
        let parent = self.relation.find_parent(&key);
        if !parent.is_null() {
            if passes_limit(self.limit, &parent) {
                self.inner.push(parent);
            }
        } else if self.include_unmapped && passes_limit(self.limit, &key) {
            self.inner.push(key);
        }
    }
}

/// One hop toward the children. With `include_unmapped`, a key without
/// children passes through unchanged.
pub(super) struct DownHop<'a, K: Key, C: Collector<K> + ?Sized> {
    pub inner: &'a mut C,
    pub relation: &'a Relation<K>,
    pub limit: Option<&'a dyn AbstractSet<K>>,
    pub include_unmapped: bool,
}

impl<K: Key, C: Collector<K> + ?Sized> Collector<K> for DownHop<'_, K, C> {
    fn push(&mut self, key: K) {
        if self.relation.contains_parent(&key) {
            let relation = self.relation;
            for child in relation.children_of(&key) {
                if passes_limit(self.limit, &child) {
                    self.inner.push(child);
                }
            }
        } else if self.include_unmapped && passes_limit(self.limit, &key) {
            self.inner.push(key);
        }
    }
}

/// Follows the parent chain to its end and forwards the topmost ancestor.
/// A key without a parent forwards itself.
pub(super) struct UpToRoot<'a, K: Key, C: Collector<K> + ?Sized> {
    pub inner: &'a mut C,
    pub relation: &'a Relation<K>,
    pub limit: Option<&'a dyn AbstractSet<K>>,
}

impl<K: Key, C: Collector<K> + ?Sized> Collector<K> for UpToRoot<'_, K, C> {
    fn push(&mut self, key: K) {
        let mut top = self.relation.find_parent(&key);
        if top.is_null() {
            if passes_limit(self.limit, &key) {
                self.inner.push(key);
            }
            return;
        }
        loop {
            let next = self.relation.find_parent(&top);
            if next.is_null() {
                break;
            }
            top = next;
        }
        if passes_limit(self.limit, &top) {
            self.inner.push(top);
        }
    }
}

/// Forwards every transitive descendant of the received key. A key
/// without children forwards itself. Shared ancestors in the operand
/// produce duplicate pushes.
pub(super) struct DownSubtree<'a, K: Key, C: Collector<K> + ?Sized> {
    pub inner: &'a mut C,
    pub relation: &'a Relation<K>,
    pub limit: Option<&'a dyn AbstractSet<K>>,
}

impl<K: Key, C: Collector<K> + ?Sized> DownSubtree<'_, K, C> {
    fn push_descendants(&mut self, key: &K) {
        let relation = self.relation;
        for child in relation.children_of(key) {
            if passes_limit(self.limit, &child) {
                self.inner.push(child.clone());
            }
            self.push_descendants(&child);
        }
    }
}

impl<K: Key, C: Collector<K> + ?Sized> Collector<K> for DownSubtree<'_, K, C> {
    fn push(&mut self, key: K) {
        if self.relation.contains_parent(&key) {
            self.push_descendants(&key);
        } else if passes_limit(self.limit, &key) {
            self.inner.push(key);
        }
    }
}
