//! chain-hashmap: a single-threaded hash map built on separate chaining,
//! with resizing pinned to exact load-factor crossings and cursor-based
//! traversal.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a self-contained associative container whose resize timing is
//!   fully determined by the sequence of inserts and removes, and whose
//!   traversal is an explicit forward cursor over `(bucket, offset)`.
//! - Layers:
//!   - `BucketStore<K, V>`: array of chains; each chain is a `Vec` of
//!     entries in insertion order. Owns all storage.
//!   - `resize`: the policy. Grows when `len == buckets`, shrinks when
//!     `len * 4 == buckets`; either way the new count is `2 * len`.
//!   - `Cursor`/`CursorMut`: positions `Entry { bucket, offset }` or `End`,
//!     always settled past empty buckets. `Iter` is a cursor walk.
//!   - `ChainHashMap<K, V, S>`: public API gluing hashing, lookup, the
//!     policy and the cursors together.
//!
//! Constraints
//! - Single-threaded: the map is `Send` but `!Sync`. Share it across threads
//!   only behind an external lock.
//! - Unique keys; inserting a present key is a no-op that keeps the old
//!   value.
//! - The bucket count never drops below one, so slot lookup is always a
//!   well-defined modulo.
//! - Cursors and iterators borrow the map, so any mutation invalidates them
//!   at compile time.
//!
//! Hasher and rehashing invariants
//! - The `BuildHasher` is injected at construction and stored by value.
//! - Each entry stores its 64-bit hash; rehashing re-slots entries from the
//!   stored hash and never calls `K: Hash` again.
//! - Bucket scans compare stored hashes before running `K: Eq`.
//!
//! Reentrancy policy
//! - Sections that run user code (`Hash`, `Eq`, value constructors) are
//!   wrapped in a debug-only reentrancy guard; nested entry into the same
//!   map panics in debug builds and compiles away in release.
//!
//! Errors
//! - `at` is the only lookup that fails, with `MapError::NotFound`.
//! - `try_insert` reports `MapError::AllocationFailed` and leaves the map
//!   unchanged. The plain `insert` aborts on allocation failure like `Vec`.
//!
//! ```
//! use chain_hashmap::{ChainHashMap, MapError};
//!
//! let mut m = ChainHashMap::from([(1, "a"), (2, "b"), (1, "c")]);
//! assert_eq!(m.len(), 2);
//! assert_eq!(m.at(&1), Ok(&"a"));
//!
//! *m.get_or_insert_default(3) = "z";
//! assert_eq!(m.get(&3), Some(&"z"));
//!
//! m.remove(&2);
//! assert_eq!(m.at(&2), Err(MapError::NotFound));
//!
//! let mut cursor = m.begin();
//! let mut seen = 0;
//! while !cursor.is_end() {
//!     seen += 1;
//!     cursor.move_next();
//! }
//! assert_eq!(seen, m.len());
//! ```

mod bucket;
pub mod chain_hash_map;
mod chain_hash_map_proptest;
pub mod cursor;
pub mod error;
pub mod iter;
mod reentrancy;
mod resize;

// Public surface
pub use chain_hash_map::ChainHashMap;
pub use cursor::{Cursor, CursorMut, Position};
pub use error::MapError;
