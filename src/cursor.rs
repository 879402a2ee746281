//! Cursors: forward positions over the bucket store.
//!
//! A position is either an entry, addressed by `(bucket, offset)`, or the
//! canonical `End`. Every cursor is kept *settled*: it never rests on an
//! exhausted bucket. Settling walks forward from a raw `(bucket, offset)` to
//! the first bucket that still has an entry at or after that point, skipping
//! empty buckets, and falls through to `End` after the last bucket.
//!
//! `Cursor` reads entries; `CursorMut` can also write values. Keys are never
//! writable. Both share `settle`, so they visit entries in the same order.
//! Any mutation of the map invalidates cursors, which the borrow checker
//! enforces.

use crate::bucket::Bucket;

/// Where a cursor points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    /// The entry at `offset` within bucket `bucket`.
    Entry { bucket: usize, offset: usize },
    /// One past the last entry.
    End,
}

/// Normalizes a raw position: returns the first entry at or after
/// `(bucket, offset)` in traversal order, or `End`.
pub(crate) fn settle<K, V>(buckets: &[Bucket<K, V>], bucket: usize, offset: usize) -> Position {
    let mut bucket = bucket;
    let mut offset = offset;
    while let Some(b) = buckets.get(bucket) {
        if offset < b.len() {
            return Position::Entry { bucket, offset };
        }
        bucket += 1;
        offset = 0;
    }
    Position::End
}

/// Position one step after `position`, settled.
fn step<K, V>(buckets: &[Bucket<K, V>], position: Position) -> Position {
    match position {
        Position::Entry { bucket, offset } => settle(buckets, bucket, offset + 1),
        Position::End => Position::End,
    }
}

/// Read-only cursor into a `ChainHashMap`.
///
/// Two cursors are equal when they point at the same position.
pub struct Cursor<'a, K, V> {
    buckets: &'a [Bucket<K, V>],
    position: Position,
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Cursor at the first entry at or after `(bucket, offset)`.
    pub(crate) fn new(buckets: &'a [Bucket<K, V>], bucket: usize, offset: usize) -> Self {
        Self {
            buckets,
            position: settle(buckets, bucket, offset),
        }
    }

    pub(crate) fn end(buckets: &'a [Bucket<K, V>]) -> Self {
        Self {
            buckets,
            position: Position::End,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.position == Position::End
    }

    /// The entry under the cursor, or `None` at the end.
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        match self.position {
            Position::Entry { bucket, offset } => self
                .buckets
                .get(bucket)
                .and_then(|b| b.get(offset))
                .map(|e| (&e.key, &e.value)),
            Position::End => None,
        }
    }

    pub fn key(&self) -> Option<&'a K> {
        self.entry().map(|(k, _)| k)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.entry().map(|(_, v)| v)
    }

    /// Advances to the next entry. Stays put at the end.
    pub fn move_next(&mut self) {
        self.position = step(self.buckets, self.position);
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K, V> core::fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .finish()
    }
}

/// Cursor that can modify the value under it.
pub struct CursorMut<'a, K, V> {
    buckets: &'a mut [Bucket<K, V>],
    position: Position,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(crate) fn new(buckets: &'a mut [Bucket<K, V>], bucket: usize, offset: usize) -> Self {
        let position = settle(buckets, bucket, offset);
        Self { buckets, position }
    }

    pub(crate) fn end(buckets: &'a mut [Bucket<K, V>]) -> Self {
        Self {
            buckets,
            position: Position::End,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.position == Position::End
    }

    pub fn entry(&self) -> Option<(&K, &V)> {
        self.as_cursor().entry()
    }

    /// The entry under the cursor with a writable value.
    pub fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self.position {
            Position::Entry { bucket, offset } => self
                .buckets
                .get_mut(bucket)
                .and_then(|b| b.get_mut(offset))
                .map(|e| (&e.key, &mut e.value)),
            Position::End => None,
        }
    }

    pub fn key(&self) -> Option<&K> {
        self.entry().map(|(k, _)| k)
    }

    pub fn value(&self) -> Option<&V> {
        self.entry().map(|(_, v)| v)
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.entry_mut().map(|(_, v)| v)
    }

    /// Consumes the cursor, keeping the borrow of the value for `'a`.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        let Self { buckets, position } = self;
        match position {
            Position::Entry { bucket, offset } => buckets
                .get_mut(bucket)
                .and_then(|b| b.get_mut(offset))
                .map(|e| &mut e.value),
            Position::End => None,
        }
    }

    pub fn move_next(&mut self) {
        self.position = step(&*self.buckets, self.position);
    }

    /// Read-only view at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor {
            buckets: &*self.buckets,
            position: self.position,
        }
    }
}

impl<K, V> core::fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CursorMut")
            .field("position", &self.position)
            .finish()
    }
}
