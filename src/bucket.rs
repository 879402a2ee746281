//! Bucket store: the array of chains behind `ChainHashMap`.
//!
//! Every entry keeps the 64-bit hash computed when it was inserted. The slot
//! of an entry is `hash % bucket_count`, so moving entries into a store of a
//! different size never calls back into `K: Hash`.

use crate::error::MapError;
use core::borrow::Borrow;

#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

/// One chain. Entries stay in insertion order; removal shifts later entries
/// down instead of swapping.
#[derive(Debug, Clone)]
pub(crate) struct Bucket<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> Bucket<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Offset of the entry whose key equals `q`. The stored hash is compared
    /// first so `Eq` only runs on likely matches.
    pub(crate) fn find<Q>(&self, hash: u64, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries
            .iter()
            .position(|e| e.hash == hash && e.key.borrow() == q)
    }

    #[inline]
    pub(crate) fn get(&self, offset: usize) -> Option<&Entry<K, V>> {
        self.entries.get(offset)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, offset: usize) -> Option<&mut Entry<K, V>> {
        self.entries.get_mut(offset)
    }

    /// Entry at a known-valid offset.
    #[inline]
    pub(crate) fn entry_mut(&mut self, offset: usize) -> &mut Entry<K, V> {
        &mut self.entries[offset]
    }

    /// Appends `entry` and returns its offset.
    pub(crate) fn push(&mut self, entry: Entry<K, V>) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Removes the entry at `offset`, keeping the order of the rest.
    pub(crate) fn remove(&mut self, offset: usize) -> Entry<K, V> {
        self.entries.remove(offset)
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [Entry<K, V>] {
        &mut self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<Entry<K, V>> {
        self.entries
    }
}

/// Maps a stored hash onto one of `buckets` slots.
#[inline]
pub(crate) fn slot_for(hash: u64, buckets: usize) -> usize {
    debug_assert!(buckets > 0, "bucket store must never be empty");
    // The remainder is below `buckets`, which is a usize.
    (hash % buckets as u64) as usize
}

/// Fixed-size array of buckets. Never empty.
#[derive(Debug, Clone)]
pub(crate) struct BucketStore<K, V> {
    buckets: Vec<Bucket<K, V>>,
}

impl<K, V> BucketStore<K, V> {
    /// Allocates `count` empty buckets. Aborts on allocation failure like any
    /// other `Vec` growth.
    pub(crate) fn with_buckets(count: usize) -> Self {
        let count = count.max(1);
        let mut buckets = Vec::with_capacity(count);
        buckets.resize_with(count, Bucket::new);
        Self { buckets }
    }

    /// Like `with_buckets`, but reports allocation failure instead of aborting.
    pub(crate) fn try_with_buckets(count: usize) -> Result<Self, MapError> {
        let count = count.max(1);
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(count)
            .map_err(|_| MapError::AllocationFailed { buckets: count })?;
        buckets.resize_with(count, Bucket::new);
        Ok(Self { buckets })
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn bucket(&self, index: usize) -> &Bucket<K, V> {
        &self.buckets[index]
    }

    #[inline]
    pub(crate) fn bucket_mut(&mut self, index: usize) -> &mut Bucket<K, V> {
        &mut self.buckets[index]
    }

    pub(crate) fn buckets(&self) -> &[Bucket<K, V>] {
        &self.buckets
    }

    pub(crate) fn buckets_mut(&mut self) -> &mut [Bucket<K, V>] {
        &mut self.buckets
    }

    pub(crate) fn into_buckets(self) -> Vec<Bucket<K, V>> {
        self.buckets
    }

    /// Appends `entry` to its slot and returns `(bucket, offset)`.
    pub(crate) fn push(&mut self, entry: Entry<K, V>) -> (usize, usize) {
        let bucket = slot_for(entry.hash, self.bucket_count());
        let offset = self.buckets[bucket].push(entry);
        (bucket, offset)
    }

    /// Moves every entry of `old` into `self`, walking old buckets in order so
    /// entries that share a new slot keep their relative order.
    pub(crate) fn absorb(&mut self, old: Self) {
        for bucket in old.buckets {
            for entry in bucket.into_entries() {
                let _ = self.push(entry);
            }
        }
    }

    /// Total number of entries across all buckets.
    #[cfg(test)]
    pub(crate) fn count_entries(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }
}
