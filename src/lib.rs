// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! MojoLib: hash-addressed key containers and a lazy set-expression
//! algebra.
//!
//! The library has three layers:
//!
//! - **Containers**: `KeySet`, `KeyMap`, `MultiMap`, and `Relation`, all
//!   built on one intrusive open-addressed hash table with load-driven
//!   grow/shrink, run-repairing removal (no tombstones), and an optional
//!   fixed-capacity mode that never allocates.
//! - **Expressions**: lazy nodes (`Union`, `Intersection`, `Difference`,
//!   and six relation-closure flavours) composing live containers into
//!   derived sets behind the common `AbstractSet` contract.
//! - **Enumeration**: a push-style `Collector` protocol with an optional
//!   limit filter, used both to materialise results and to let composite
//!   nodes drive iteration from their cheapest operand.
//!
//! Containers are single-threaded and keyed by types implementing `Key`,
//! which supplies a hash and a dedicated null value marking empty slots.
//!
//! # Example
//!
//! ```
//! use mojolib::{AbstractSet, Difference, KeySet, SetCollector};
//!
//! let mut staged = KeySet::<u32>::new();
//! staged.create("staged", None).unwrap();
//! let mut shipped = KeySet::<u32>::new();
//! shipped.create("shipped", None).unwrap();
//!
//! for id in [11u32, 12, 13] {
//!     staged.insert(&id).unwrap();
//! }
//! shipped.insert(&12).unwrap();
//!
//! let pending = Difference::new(&staged, &shipped);
//! assert!(pending.contains(&11));
//! assert!(!pending.contains(&12));
//!
//! let mut snapshot = KeySet::<u32>::new();
//! snapshot.create("snapshot", None).unwrap();
//! pending.enumerate(&mut SetCollector::new(&mut snapshot), None);
//! assert_eq!(snapshot.len(), 2);
//! ```

pub mod abstract_set;
pub mod alloc;
pub mod collector;
pub mod config;
pub mod error;
pub mod expr;
pub mod key;
pub mod map;
pub mod multi_map;
pub mod relation;
pub mod set;

mod table;

#[cfg(test)]
pub(crate) mod tests;

pub use abstract_set::AbstractSet;
pub use alloc::{Allocator, CountingAllocator};
pub use collector::{Collector, VecCollector};
pub use config::TableConfig;
pub use error::{StoreError, StoreResult};
pub use expr::{
    Difference, DirectClosedDeep, DirectClosedShallow, DirectOpen, Intersection,
    InverseClosedDeep, InverseClosedShallow, InverseOpen, Union,
};
pub use key::Key;
pub use map::KeyMap;
pub use multi_map::MultiMap;
pub use relation::Relation;
pub use set::{KeySet, SetCollector};

/// Version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
