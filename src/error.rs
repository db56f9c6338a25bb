// Copyright (c) 2025 MojoLib Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Status codes shared by every container in the library.
//!
//! Errors are returned, never panicked. `Ok(())` plays the role of the
//! "everything fine" status; every other condition is a `StoreError`
//! variant. A store whose creation failed keeps the failing status and
//! short-circuits all later status-returning calls with it, so a single
//! check after a batch of operations is enough to detect a broken store.

/// Error type for all container operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store has not been created yet, or has been destroyed.
    #[error("store has not been created")]
    NotInitialized,

    /// `create` was called on a store that was already created.
    #[error("store was created twice without an intervening destroy")]
    DoubleInitialized,

    /// A configuration value or argument is unusable, including the null
    /// key being passed to a mutating operation.
    #[error("invalid arguments")]
    InvalidArguments,

    /// Backing storage could not be obtained, or a fixed-capacity store
    /// is full.
    #[error("backing storage could not be allocated")]
    CouldNotAlloc,

    /// The requested key (or key-value pair) is not in the store.
    #[error("key not found")]
    NotFound,
}

/// Result type used by all container operations.
pub type StoreResult<T> = Result<T, StoreError>;
