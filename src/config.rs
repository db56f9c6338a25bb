// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Resize tuning configuration for the hash stores.
//!
//! A `TableConfig` controls when and how a store resizes its hash region.
//! The same record is shared by sets, maps, multimaps, and relations; pass
//! `None` at `create` time to use the defaults.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Resize tuning knobs for a hash store.
///
/// The grow threshold must exceed twice the shrink threshold, otherwise a
/// store could oscillate between growing and shrinking on alternating
/// insert/remove pairs. `validate` enforces this along with the minimum
/// sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Minimum number of slots kept allocated (> 1).
    pub alloc_count_min: usize,

    /// Minimum size of the active hash region (> 1).
    pub table_count_min: usize,

    /// Upper load threshold in percent (0-100). Once
    /// `100 * active >= table * grow_threshold_percent` the table doubles.
    pub grow_threshold_percent: u32,

    /// Lower load threshold in percent (0-100). Once the load falls below
    /// it the table halves, down to `table_count_min`.
    pub shrink_threshold_percent: u32,

    /// Whether `insert` may grow the table on demand.
    pub auto_grow: bool,

    /// Whether `remove` may shrink the table on demand.
    pub auto_shrink: bool,

    /// Whether the backing storage may be reallocated to a different
    /// capacity. When false, the capacity obtained at `create` is final and
    /// only the hash region moves within it.
    pub dynamic_alloc: bool,
}

impl TableConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum allocated slot count.
    pub fn with_alloc_count_min(mut self, alloc_count_min: usize) -> Self {
        self.alloc_count_min = alloc_count_min;
        self
    }

    /// Sets the minimum hash-region size.
    pub fn with_table_count_min(mut self, table_count_min: usize) -> Self {
        self.table_count_min = table_count_min;
        self
    }

    /// Sets the upper load threshold in percent.
    pub fn with_grow_threshold_percent(mut self, percent: u32) -> Self {
        self.grow_threshold_percent = percent;
        self
    }

    /// Sets the lower load threshold in percent.
    pub fn with_shrink_threshold_percent(mut self, percent: u32) -> Self {
        self.shrink_threshold_percent = percent;
        self
    }

    /// Sets whether `insert` may resize up.
    pub fn with_auto_grow(mut self, auto_grow: bool) -> Self {
        self.auto_grow = auto_grow;
        self
    }

    /// Sets whether `remove` may resize down.
    pub fn with_auto_shrink(mut self, auto_shrink: bool) -> Self {
        self.auto_shrink = auto_shrink;
        self
    }

    /// Sets whether backing storage may be reallocated after `create`.
    pub fn with_dynamic_alloc(mut self, dynamic_alloc: bool) -> Self {
        self.dynamic_alloc = dynamic_alloc;
        self
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidArguments` if a minimum count is not
    /// greater than one, a threshold exceeds 100, or the grow threshold
    /// does not exceed twice the shrink threshold.
    pub fn validate(&self) -> StoreResult<()> {
        if self.alloc_count_min <= 1 || self.table_count_min <= 1 {
            return Err(StoreError::InvalidArguments);
        }
        if self.grow_threshold_percent > 100 || self.shrink_threshold_percent > 100 {
            return Err(StoreError::InvalidArguments);
        }
        if self.grow_threshold_percent <= self.shrink_threshold_percent * 2 {
            return Err(StoreError::InvalidArguments);
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            alloc_count_min: 32,
            table_count_min: 8,
            grow_threshold_percent: 80,
            shrink_threshold_percent: 20,
            auto_grow: true,
            auto_shrink: true,
            dynamic_alloc: true,
        }
    }
}
