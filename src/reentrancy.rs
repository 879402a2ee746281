//! Debug-only detection of calls back into a map from its own user code.
//!
//! `ChainHashMap` runs `K: Hash`, `K: Eq` and value constructors while it is
//! in the middle of a lookup, insert, remove or clear. A key type that reaches
//! back into the same map from there would see a half-finished operation.
//! Each of those operations claims the map's `Sections` tracker for its whole
//! duration; a second claim while one is held panics in debug builds and
//! names both operations. In release builds the tracker is zero-sized and
//! claiming it does nothing.

use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;

/// Map operation that runs user code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Section {
    Lookup,
    Insert,
    Remove,
    Clear,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Lookup => "lookup",
            Section::Insert => "insert",
            Section::Remove => "remove",
            Section::Clear => "clear",
        })
    }
}

/// Records which operation, if any, currently holds the map.
#[derive(Debug)]
pub(crate) struct Sections {
    #[cfg(debug_assertions)]
    held: Cell<Option<Section>>,
    // !Sync in every profile, but still Send so a map can live behind a lock.
    _nosync: PhantomData<Cell<()>>,
}

impl Sections {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            held: Cell::new(None),
            _nosync: PhantomData,
        }
    }

    /// Claims the map for `section` until the returned claim is dropped.
    #[inline]
    pub(crate) fn claim(&self, section: Section) -> Claim<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(held) = self.held.replace(Some(section)) {
                // Leave the outer operation's record in place for its own
                // claim to release while unwinding.
                self.held.set(Some(held));
                panic!("reentrancy detected: {section} called on a ChainHashMap during {held}");
            }
            return Claim { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = section;
            return Claim { _owner: PhantomData };
        }
    }

    /// Operation currently holding the map.
    #[cfg(all(test, debug_assertions))]
    pub(crate) fn held(&self) -> Option<Section> {
        self.held.get()
    }
}

/// Releases the map on drop.
pub(crate) struct Claim<'a> {
    #[cfg(debug_assertions)]
    owner: &'a Sections,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.held.set(None);
    }
}
