//! Versioned cells: the unit of shared mutable state
//!
//! A cell pairs a value (`None` is the absence marker) with a version stamp.
//! The stamp and the commit lock share one atomic word:
//!
//! ```text
//! word = (version << 1) | locked
//! ```
//!
//! Readers never take the lock. They load the word, the value, and the word
//! again, and accept the pair only if both word loads agree and the cell was
//! unlocked. A committer sets the lock bit before swapping the value and
//! clears it by storing the new version, so a reader that observes a new
//! value always observes a changed word and retries.
//!
//! Values are swapped through `crossbeam-epoch`, so a reader that loaded the
//! old value pointer can still clone it after the swap.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_epoch::{self as epoch, Atomic, Owned};
use crossbeam_utils::Backoff;

pub(crate) const LOCK_BIT: u64 = 1;

/// Stable identity of a cell, unique per engine
///
/// Commit acquires locks in ascending `CellId` order.
pub type CellId = u64;

/// A value plus a monotonic version stamp and a transient commit lock
pub struct VersionedCell<V> {
    id: CellId,
    word: AtomicU64,
    value: Atomic<Option<V>>,
}

impl<V> VersionedCell<V> {
    /// Create an empty cell (absent value, version 0)
    pub(crate) fn new(id: CellId) -> Self {
        Self {
            id,
            word: AtomicU64::new(0),
            value: Atomic::new(None),
        }
    }

    /// Identity used for lock ordering
    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Version of the last commit that wrote this cell (0 = never written)
    #[inline]
    pub fn version(&self) -> u64 {
        self.word.load(Ordering::Acquire) >> 1
    }

    /// Whether a committer currently holds this cell's lock
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.word.load(Ordering::Acquire) & LOCK_BIT != 0
    }

    #[inline]
    pub(crate) fn load_word(&self) -> u64 {
        self.word.load(Ordering::Acquire)
    }

    /// Non-blocking lock acquisition
    ///
    /// Returns None if another committer holds the lock.
    pub(crate) fn try_lock(&self) -> Option<CellGuard<'_, V>> {
        let current = self.word.load(Ordering::Acquire);
        if current & LOCK_BIT != 0 {
            return None;
        }
        self.word
            .compare_exchange(current, current | LOCK_BIT, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CellGuard {
                cell: self,
                release_word: current,
            })
    }
}

impl<V: Clone> VersionedCell<V> {
    /// Consistent `(value, version)` pair
    ///
    /// Spins (with backoff) while a committer holds the lock or while the
    /// word changes underneath the value load.
    pub fn read(&self) -> (Option<V>, u64) {
        let backoff = Backoff::new();
        let guard = epoch::pin();
        loop {
            let before = self.word.load(Ordering::Acquire);
            if before & LOCK_BIT == 0 {
                let shared = self.value.load(Ordering::Acquire, &guard);
                // SAFETY: the pointer is never null and replaced slots are
                // only reclaimed after every pinned reader has moved on.
                let value = unsafe { shared.as_ref() }.and_then(|v| v.clone());
                let after = self.word.load(Ordering::Acquire);
                if before == after {
                    return (value, before >> 1);
                }
            }
            backoff.snooze();
        }
    }
}

impl<V> Drop for VersionedCell<V> {
    fn drop(&mut self) {
        // SAFETY: `&mut self` means no reader or committer can reach the cell.
        unsafe {
            let current = self.value.load(Ordering::Relaxed, epoch::unprotected());
            if !current.is_null() {
                drop(current.into_owned());
            }
        }
    }
}

impl<V> std::fmt::Debug for VersionedCell<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = self.word.load(Ordering::Relaxed);
        f.debug_struct("VersionedCell")
            .field("id", &self.id)
            .field("version", &(word >> 1))
            .field("locked", &(word & LOCK_BIT != 0))
            .finish()
    }
}

/// Exclusive commit lock on one cell
///
/// Dropping the guard releases the lock. If [`CellGuard::install`] was
/// called, the release also publishes the new version.
pub(crate) struct CellGuard<'a, V> {
    cell: &'a VersionedCell<V>,
    release_word: u64,
}

impl<'a, V> CellGuard<'a, V> {
    /// Replace the value and stamp `version` on release
    pub(crate) fn install(&mut self, value: Option<V>, version: u64) {
        debug_assert!(version > self.release_word >> 1, "cell versions must increase");
        let guard = epoch::pin();
        let old = self
            .cell
            .value
            .swap(Owned::new(value), Ordering::AcqRel, &guard);
        // SAFETY: `old` is unlinked; readers pinned before the swap keep it alive.
        unsafe {
            guard.defer_destroy(old);
        }
        self.release_word = version << 1;
    }
}

impl<V> Drop for CellGuard<'_, V> {
    fn drop(&mut self) {
        self.cell.word.store(self.release_word, Ordering::Release);
    }
}
