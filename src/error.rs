//! Errors surfaced by `ChainHashMap`.
//!
//! Absent keys are a normal outcome for almost every operation and are
//! reported through `Option` or an end cursor. Only `at` treats a missing
//! key as an error, and only `try_insert` reports allocation failure.

/// Failure kinds for the fallible map operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// `at` was called with a key that is not in the map.
    #[error("key not found")]
    NotFound,

    /// The bucket array for a resize could not be allocated.
    #[error("failed to allocate a bucket array of {buckets} buckets")]
    AllocationFailed { buckets: usize },
}
