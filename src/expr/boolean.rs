// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Union, intersection, and difference over abstract sets.

use crate::abstract_set::AbstractSet;
use crate::collector::Collector;
use crate::key::Key;

/// Set union over one or more operands.
///
/// Enumeration visits each operand in turn, so a key present in several
/// operands is pushed several times; collect into a `SetCollector` when
/// exact membership is wanted.
#[derive(Clone, Copy)]
pub struct Union<'a, K: Key> {
    operands: &'a [&'a dyn AbstractSet<K>],
}

impl<'a, K: Key> Union<'a, K> {
    /// Builds the union of `operands`. At least one operand is required.
    pub fn new(operands: &'a [&'a dyn AbstractSet<K>]) -> Self {
        debug_assert!(!operands.is_empty(), "a union needs operands");
        Self { operands }
    }
}

impl<K: Key> AbstractSet<K> for Union<'_, K> {
    fn contains(&self, key: &K) -> bool {
        self.operands.iter().any(|operand| operand.contains(key))
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        for operand in self.operands {
            operand.enumerate(collector, limit);
        }
    }

    fn enumeration_cost(&self) -> usize {
        self.operands
            .iter()
            .map(|operand| operand.enumeration_cost())
            .sum()
    }

    fn change_count(&self) -> u64 {
        self.operands
            .iter()
            .map(|operand| operand.change_count())
            .sum()
    }
}

/// Set intersection over one or more operands.
///
/// Enumeration drives the operand reporting the lowest enumeration cost
/// and filters its output through the rest, so intersecting a huge set
/// with a tiny one costs about one pass over the tiny one.
#[derive(Clone, Copy)]
pub struct Intersection<'a, K: Key> {
    operands: &'a [&'a dyn AbstractSet<K>],
}

impl<'a, K: Key> Intersection<'a, K> {
    /// Builds the intersection of `operands`. At least one operand is
    /// required.
    pub fn new(operands: &'a [&'a dyn AbstractSet<K>]) -> Self {
        debug_assert!(!operands.is_empty(), "an intersection needs operands");
        Self { operands }
    }
}

impl<K: Key> AbstractSet<K> for Intersection<'_, K> {
    fn contains(&self, key: &K) -> bool {
        !self.operands.is_empty() && self.operands.iter().all(|operand| operand.contains(key))
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        let driver = self
            .operands
            .iter()
            .enumerate()
            .min_by_key(|(_, operand)| operand.enumeration_cost());
        let Some((skip, driver)) = driver else {
            return;
        };
        let mut filter = RemainderFilter {
            inner: collector,
            operands: self.operands,
            skip,
        };
        driver.enumerate(&mut filter, limit);
    }

    fn enumeration_cost(&self) -> usize {
        self.operands
            .iter()
            .map(|operand| operand.enumeration_cost())
            .min()
            .unwrap_or(0)
    }

    fn change_count(&self) -> u64 {
        self.operands
            .iter()
            .map(|operand| operand.change_count())
            .sum()
    }
}

/// Forwards keys contained in every operand except the driving one.
struct RemainderFilter<'a, K: Key, C: Collector<K> + ?Sized> {
    inner: &'a mut C,
    operands: &'a [&'a dyn AbstractSet<K>],
    skip: usize,
}

impl<K: Key, C: Collector<K> + ?Sized> Collector<K> for RemainderFilter<'_, K, C> {
    fn push(&mut self, key: K) {
        let member_everywhere = self
            .operands
            .iter()
            .enumerate()
            .all(|(i, operand)| i == self.skip || operand.contains(&key));
        if member_everywhere {
            self.inner.push(key);
        }
    }
}

/// Set difference: members of `minuend` not in `subtrahend`.
#[derive(Clone, Copy)]
pub struct Difference<'a, K: Key> {
    minuend: &'a dyn AbstractSet<K>,
    subtrahend: &'a dyn AbstractSet<K>,
}

impl<'a, K: Key> Difference<'a, K> {
    /// Builds `minuend` minus `subtrahend`.
    pub fn new(minuend: &'a dyn AbstractSet<K>, subtrahend: &'a dyn AbstractSet<K>) -> Self {
        Self {
            minuend,
            subtrahend,
        }
    }
}

impl<K: Key> AbstractSet<K> for Difference<'_, K> {
    fn contains(&self, key: &K) -> bool {
        self.minuend.contains(key) && !self.subtrahend.contains(key)
    }

    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>) {
        let mut filter = ExclusionFilter {
            inner: collector,
            excluded: self.subtrahend,
        };
        self.minuend.enumerate(&mut filter, limit);
    }

    fn enumeration_cost(&self) -> usize {
        self.minuend.enumeration_cost()
    }

    fn change_count(&self) -> u64 {
        self.minuend.change_count() + self.subtrahend.change_count()
    }
}

/// Forwards keys the excluded set does not contain.
struct ExclusionFilter<'a, K: Key, C: Collector<K> + ?Sized> {
    inner: &'a mut C,
    excluded: &'a dyn AbstractSet<K>,
}

impl<K: Key, C: Collector<K> + ?Sized> Collector<K> for ExclusionFilter<'_, K, C> {
    fn push(&mut self, key: K) {
        if !self.excluded.contains(&key) {
            self.inner.push(key);
        }
    }
}
