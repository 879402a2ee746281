//! ChainHashMap: separate-chaining map with exact load-factor resizing.
//!
//! Structure
//! - A `BucketStore` of `bucket_count()` chains, never fewer than one.
//! - An entry with hash `h` lives in chain `h % bucket_count()`; `h` is
//!   computed once with the map's `BuildHasher` and stored with the entry.
//! - Keys are unique. Inserting a present key keeps the stored value.
//!
//! Resizing
//! - After each insert or remove that changed the map, the entry count is
//!   checked against the bucket count (see `resize`). On a hit every entry
//!   moves into a freshly allocated store of `2 * len` buckets.
//! - Growth allocates the new store before linking the new entry, so
//!   `try_insert` leaves the map untouched when allocation fails.
//! - A shrink whose allocation fails is skipped; the map stays valid.
//!
//! User code (`K: Hash`, `K: Eq`, value constructors) only runs inside
//! sections covered by the debug reentrancy guard.

use crate::bucket::{slot_for, BucketStore, Entry};
use crate::cursor::{Cursor, CursorMut};
use crate::error::MapError;
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::reentrancy::{Section, Sections};
use crate::resize::{resize_target, MIN_BUCKETS};
use core::borrow::Borrow;
use core::convert::Infallible;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

/// Hash map with separate chaining. `S` builds the hasher; the map keeps it
/// by value for its whole life.
pub struct ChainHashMap<K, V, S = RandomState> {
    hasher: S,
    store: BucketStore<K, V>,
    len: usize,
    sections: Sections,
}

impl<K, V> ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Empty map with a single bucket and the default `RandomState` hasher.
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V, S> Default for ChainHashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// Moves every entry of `store` into `target` and installs `target`.
fn rehash<K, V>(store: &mut BucketStore<K, V>, target: BucketStore<K, V>, len: usize) {
    let from = store.bucket_count();
    let old = mem::replace(store, target);
    store.absorb(old);
    log::debug!(
        "rehashed {} entries: {} -> {} buckets",
        len,
        from,
        store.bucket_count()
    );
}

fn allocate<K, V>(count: usize) -> Result<BucketStore<K, V>, Infallible> {
    Ok(BucketStore::with_buckets(count))
}

fn infallible<T>(r: Result<T, Infallible>) -> T {
    match r {
        Ok(t) => t,
        Err(never) => match never {},
    }
}

impl<K, V, S> ChainHashMap<K, V, S> {
    /// Empty map that hashes keys with `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            store: BucketStore::with_buckets(MIN_BUCKETS),
            len: 0,
            sections: Sections::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of chains currently allocated.
    pub fn bucket_count(&self) -> usize {
        self.store.bucket_count()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// A copy of the hasher the map was built with.
    pub fn hash_function(&self) -> S
    where
        S: Clone,
    {
        self.hasher.clone()
    }

    /// Removes every entry and returns to a single bucket.
    pub fn clear(&mut self) {
        let _g = self.sections.claim(Section::Clear);
        let old = mem::replace(&mut self.store, BucketStore::with_buckets(MIN_BUCKETS));
        let dropped = mem::replace(&mut self.len, 0);
        log::trace!("cleared {} entries from {} buckets", dropped, old.bucket_count());
        // The map is consistent again before any user `Drop` runs.
        drop(old);
    }

    /// Cursor at the first entry, or at the end when the map is empty.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.store.buckets(), 0, 0)
    }

    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::end(self.store.buckets())
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        CursorMut::new(self.store.buckets_mut(), 0, 0)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.begin(), self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.store.buckets_mut(), self.len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<K, V, S> ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Builds a map from `(key, value)` pairs in order. For repeated keys the
    /// first pair wins.
    pub fn from_iter_with_hasher<I>(iter: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hasher(hasher);
        map.extend(iter);
        map
    }

    /// `(bucket, offset)` of the entry for `q`.
    fn locate<Q>(&self, q: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.sections.claim(Section::Lookup);
        let hash = self.hasher.hash_one(q);
        let bucket = slot_for(hash, self.store.bucket_count());
        let offset = self.store.bucket(bucket).find(hash, q)?;
        Some((bucket, offset))
    }

    /// Cursor at the entry for `q`, or the end cursor when absent.
    pub fn find<Q>(&self, q: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.locate(q) {
            Some((bucket, offset)) => Cursor::new(self.store.buckets(), bucket, offset),
            None => self.end(),
        }
    }

    pub fn find_mut<Q>(&mut self, q: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.locate(q) {
            Some((bucket, offset)) => CursorMut::new(self.store.buckets_mut(), bucket, offset),
            None => CursorMut::end(self.store.buckets_mut()),
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (bucket, offset) = self.locate(q)?;
        self.store
            .bucket(bucket)
            .get(offset)
            .map(|e| (&e.key, &e.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (bucket, offset) = self.locate(q)?;
        self.store
            .bucket_mut(bucket)
            .get_mut(offset)
            .map(|e| &mut e.value)
    }

    /// Value for `q`, or `MapError::NotFound`.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(MapError::NotFound)
    }

    /// Inserts `key` with `value` unless the key is already present, in
    /// which case the stored value is kept and `value` is dropped.
    ///
    /// Returns whether an entry was added.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_with(key, || value)
    }

    /// Like `insert`, but `default` only runs when `key` is absent.
    pub fn insert_with<F>(&mut self, key: K, default: F) -> bool
    where
        F: FnOnce() -> V,
    {
        infallible(self.insert_inner(key, default, allocate)).1
    }

    /// Like `insert`, but a growth whose bucket array cannot be allocated
    /// returns `MapError::AllocationFailed` and leaves the map unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<bool, MapError> {
        self.insert_inner(key, || value, BucketStore::try_with_buckets)
            .map(|(_, inserted)| inserted)
    }

    /// Value for `key`, inserting `V::default()` first when absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let ((bucket, offset), _) = infallible(self.insert_inner(key, default, allocate));
        &mut self.store.bucket_mut(bucket).entry_mut(offset).value
    }

    /// Shared insert path. Returns the entry's `(bucket, offset)` and whether
    /// it was added. `allocate` builds the store for a growth.
    fn insert_inner<F, A, E>(
        &mut self,
        key: K,
        default: F,
        allocate: A,
    ) -> Result<((usize, usize), bool), E>
    where
        F: FnOnce() -> V,
        A: FnOnce(usize) -> Result<BucketStore<K, V>, E>,
    {
        let _g = self.sections.claim(Section::Insert);
        let hash = self.hasher.hash_one(&key);
        let bucket = slot_for(hash, self.store.bucket_count());
        if let Some(offset) = self.store.bucket(bucket).find(hash, &key) {
            return Ok(((bucket, offset), false));
        }

        let len = self.len + 1;
        let resized = match resize_target(len, self.store.bucket_count()) {
            Some(count) => Some(allocate(count)?),
            None => None,
        };
        let entry = Entry {
            key,
            value: default(),
            hash,
        };
        let slot = match resized {
            Some(target) => {
                rehash(&mut self.store, target, self.len);
                self.store.push(entry)
            }
            None => (bucket, self.store.bucket_mut(bucket).push(entry)),
        };
        self.len = len;
        Ok((slot, true))
    }

    /// Removes the entry for `q` and returns its value. Absent keys are a
    /// no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_inner(q, BucketStore::try_with_buckets)
    }

    /// Shared remove path. `allocate` builds the store for a shrink; when it
    /// fails the map keeps its current buckets.
    fn remove_inner<Q, A, E>(&mut self, q: &Q, allocate: A) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        A: FnOnce(usize) -> Result<BucketStore<K, V>, E>,
        E: fmt::Display,
    {
        let _g = self.sections.claim(Section::Remove);
        let hash = self.hasher.hash_one(q);
        let bucket = slot_for(hash, self.store.bucket_count());
        let offset = self.store.bucket(bucket).find(hash, q)?;
        let entry = self.store.bucket_mut(bucket).remove(offset);
        self.len -= 1;

        if let Some(count) = resize_target(self.len, self.store.bucket_count()) {
            match allocate(count) {
                Ok(target) => rehash(&mut self.store, target, self.len),
                Err(err) => log::warn!("keeping {} buckets: {}", self.store.bucket_count(), err),
            }
        }
        Some((entry.key, entry.value))
    }

    /// Checks the structural invariants; used by tests after every step.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let buckets = self.store.bucket_count();
        assert!(buckets >= MIN_BUCKETS);
        assert_eq!(self.store.count_entries(), self.len);
        assert!(self.len < buckets, "a full table must have grown");
        let mut seen: Vec<&K> = Vec::with_capacity(self.len);
        for (i, bucket) in self.store.buckets().iter().enumerate() {
            for e in bucket.entries() {
                assert_eq!(slot_for(e.hash, buckets), i, "entry in wrong bucket");
                assert_eq!(e.hash, self.hasher.hash_one(&e.key), "stale stored hash");
                assert!(!seen.contains(&&e.key), "duplicate key");
                seen.push(&e.key);
            }
        }
    }
}

impl<K, V, S> Clone for ChainHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            store: self.store.clone(),
            len: self.len,
            sections: Sections::new(),
        }
    }
}

impl<K, V, S> fmt::Debug for ChainHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equal when both maps hold the same keys with equal values, whatever
/// their bucket layout.
impl<K, V, S> PartialEq for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, S> Eq for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_iter_with_hasher(iter, S::default())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_iter_with_hasher(pairs, RandomState::new())
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ChainHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.store.into_buckets(), self.len)
    }
}
