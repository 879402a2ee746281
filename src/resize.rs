//! Load-factor policy for growing and shrinking the bucket array.
//!
//! Resizing fires only at two exact crossings, checked against the entry count
//! right after a mutation:
//! - `len * GROW_RATIO == buckets` (table exactly full), and
//! - `len * SHRINK_RATIO == buckets` (load factor fell to 1/4).
//!
//! Either way the new bucket count is `len * SCALE`. Between the crossings the
//! table keeps its size, so the resize timing is fully determined by the
//! sequence of inserts and removes.

/// Entry count per bucket at which the table grows.
pub(crate) const GROW_RATIO: usize = 1;
/// Inverse load factor at which the table shrinks.
pub(crate) const SHRINK_RATIO: usize = 4;
/// New bucket count as a multiple of the entry count.
pub(crate) const SCALE: usize = 2;
/// Bucket count of a fresh or cleared map. Also the floor for every resize.
pub(crate) const MIN_BUCKETS: usize = 1;

/// Returns the bucket count to rehash into, or `None` when `len` entries fit
/// the current `buckets` without a resize.
pub(crate) fn resize_target(len: usize, buckets: usize) -> Option<usize> {
    let full = len.checked_mul(GROW_RATIO) == Some(buckets);
    let sparse = len.checked_mul(SHRINK_RATIO) == Some(buckets);
    if !full && !sparse {
        return None;
    }
    // `len == 0` cannot match a non-empty table, but the floor keeps the
    // modulo in slot lookup well defined whatever the counts are.
    let target = len.checked_mul(SCALE)?.max(MIN_BUCKETS);
    (target != buckets).then_some(target)
}
