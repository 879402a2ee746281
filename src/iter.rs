//! Iterators over `ChainHashMap` entries.
//!
//! All of them visit buckets in index order and, within a bucket, entries in
//! insertion order, matching `Cursor` traversal. The order across buckets
//! depends on the hasher and the current bucket count.

use crate::bucket::{Bucket, Entry};
use crate::cursor::Cursor;
use core::iter::FusedIterator;

/// Iterator over `(&K, &V)`, driven by a `Cursor`.
pub struct Iter<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(cursor: Cursor<'a, K, V>, len: usize) -> Self {
        Self {
            cursor,
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.cursor.entry()?;
        self.cursor.move_next();
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(&K, &mut V)`.
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Bucket<K, V>>,
    entries: core::slice::IterMut<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(buckets: &'a mut [Bucket<K, V>], len: usize) -> Self {
        Self {
            buckets: buckets.iter_mut(),
            entries: Default::default(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.entries.next() {
                self.remaining -= 1;
                return Some((&e.key, &mut e.value));
            }
            // Current bucket exhausted: move on, skipping empty ones.
            self.entries = self.buckets.next()?.entries_mut().iter_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(K, V)`.
pub struct IntoIter<K, V> {
    buckets: std::vec::IntoIter<Bucket<K, V>>,
    entries: std::vec::IntoIter<Entry<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(buckets: Vec<Bucket<K, V>>, len: usize) -> Self {
        Self {
            buckets: buckets.into_iter(),
            entries: Vec::new().into_iter(),
            remaining: len,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.entries.next() {
                self.remaining -= 1;
                return Some((e.key, e.value));
            }
            self.entries = self.buckets.next()?.into_entries().into_iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Iterator over keys.
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over values.
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Iterator over mutable values.
pub struct ValuesMut<'a, K, V> {
    pub(crate) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketStore;

    fn store(layout: &[&[u32]]) -> (BucketStore<u32, u32>, usize) {
        let mut s = BucketStore::with_buckets(layout.len());
        let mut len = 0;
        for (i, keys) in layout.iter().enumerate() {
            for &k in keys.iter() {
                s.bucket_mut(i).push(Entry {
                    key: k,
                    value: k * 2,
                    hash: i as u64,
                });
                len += 1;
            }
        }
        (s, len)
    }

    /// Invariant: every flavor yields the same sequence of keys and reports
    /// an exact length throughout.
    #[test]
    fn flavors_agree_on_order() {
        let layout: &[&[u32]] = &[&[], &[4, 1], &[], &[], &[9], &[3, 7, 5]];
        let (mut s, len) = store(layout);
        let expected: Vec<u32> = vec![4, 1, 9, 3, 7, 5];

        let it = Iter::new(Cursor::new(s.buckets(), 0, 0), len);
        assert_eq!(it.len(), 6);
        let keys: Vec<u32> = it.map(|(k, _)| *k).collect();
        assert_eq!(keys, expected);

        let mut it = IterMut::new(s.buckets_mut(), len);
        let mut keys = Vec::new();
        while let Some((k, v)) = it.next() {
            keys.push(*k);
            *v += 1;
            assert_eq!(it.len(), len - keys.len());
        }
        assert_eq!(keys, expected);

        let owned: Vec<(u32, u32)> = IntoIter::new(s.into_buckets(), len).collect();
        let want: Vec<(u32, u32)> = expected.iter().map(|&k| (k, k * 2 + 1)).collect();
        assert_eq!(owned, want);
    }

    #[test]
    fn empty_store_yields_nothing() {
        let layout: &[&[u32]] = &[&[], &[], &[]];
        let (mut s, len) = store(layout);
        assert_eq!(Iter::new(Cursor::new(s.buckets(), 0, 0), len).next(), None);
        assert!(IterMut::new(s.buckets_mut(), len).next().is_none());
        assert!(IntoIter::new(s.into_buckets(), len).next().is_none());
    }

    #[test]
    fn iterators_are_fused() {
        let layout: &[&[u32]] = &[&[1]];
        let (s, len) = store(layout);
        let mut it = Iter::new(Cursor::new(s.buckets(), 0, 0), len);
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert!(it.next().is_none());
        assert_eq!(it.len(), 0);
    }

    #[test]
    fn keys_and_values_project() {
        let layout: &[&[u32]] = &[&[2], &[], &[5, 6]];
        let (mut s, len) = store(layout);
        let keys: Vec<u32> = Keys {
            inner: Iter::new(Cursor::new(s.buckets(), 0, 0), len),
        }
        .copied()
        .collect();
        assert_eq!(keys, vec![2, 5, 6]);

        for v in (ValuesMut {
            inner: IterMut::new(s.buckets_mut(), len),
        }) {
            *v = 0;
        }
        let values: Vec<u32> = Values {
            inner: Iter::new(Cursor::new(s.buckets(), 0, 0), len),
        }
        .copied()
        .collect();
        assert_eq!(values, vec![0, 0, 0]);
    }
}
