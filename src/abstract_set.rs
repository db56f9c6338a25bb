// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The contract shared by every concrete store and expression node.
//!
//! Anything that can answer membership and enumerate its members is an
//! `AbstractSet`. Concrete stores answer from their slot arrays;
//! expression nodes answer by combining the answers of their operands at
//! call time. Because nodes read through this interface, mutating an
//! underlying store between constructing a node and querying it is fine:
//! the node sees the current contents.

use crate::collector::Collector;
use crate::key::Key;

/// Membership plus on-demand enumeration.
pub trait AbstractSet<K: Key> {
    /// Whether `key` is a member.
    fn contains(&self, key: &K) -> bool;

    /// Pushes every member into `collector`. With a `limit`, only members
    /// the limit also contains are pushed. Some implementations may push
    /// the same key more than once; collect into a deduplicating sink such
    /// as `SetCollector` when that matters.
    fn enumerate(&self, collector: &mut dyn Collector<K>, limit: Option<&dyn AbstractSet<K>>);

    /// Heuristic upper bound on how many keys `enumerate` pushes. Used to
    /// pick the cheapest operand to drive a composite enumeration; it
    /// carries no correctness weight.
    fn enumeration_cost(&self) -> usize;

    /// Monotonically increasing counter covering every underlying store
    /// this set reads from. Two equal readings guarantee the membership
    /// has not changed in between, so callers can cache materialised
    /// results against it.
    fn change_count(&self) -> u64;
}

/// Whether `key` passes an optional limit filter.
pub(crate) fn passes_limit<K: Key>(limit: Option<&dyn AbstractSet<K>>, key: &K) -> bool {
    limit.map_or(true, |limit| limit.contains(key))
}
