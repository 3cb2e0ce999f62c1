//! Transaction context for the STM engine
//!
//! One `Transaction` exists per attempt. It is never shared across threads
//! and never reused: after commit or abort the engine drops it and starts a
//! fresh one.
//!
//! # Read-Your-Writes Semantics
//!
//! When reading a cell, the transaction checks in order:
//! 1. **write_set**: returns the pending value of this transaction
//! 2. **cell**: returns the committed value, tracks its version in read_set
//!
//! A committed read whose version is newer than `start_version` aborts the
//! attempt immediately: a concurrent commit has already invalidated it.
//!
//! # Commit
//!
//! ```text
//! 1. Empty write-set: validate read-set, done (no locks, clock untouched)
//! 2. try_lock every written cell in ascending CellId order
//!    (any failure: release taken locks, abort)
//! 3. Validate read-set
//! 4. Advance global clock once, install values stamped with that version
//! 5. Release locks in reverse acquisition order
//! ```
//!
//! Lock order is a property of the cells, not of the keys or the order in
//! which this transaction touched them, so two committers with overlapping
//! write-sets can never wait on each other in a cycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cell::{CellGuard, CellId, VersionedCell};
use crate::clock::GlobalClock;
use crate::validation::{validate_read_set, ConflictType};

/// Inline capacity for held commit locks before spilling to the heap
const INLINE_LOCKS: usize = 8;

/// Why an attempt was abandoned
///
/// This is a control signal, not a failure: the engine retries on every
/// `Abort`, and no `Abort` ever reaches a map caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Abort {
    /// A read observed a commit newer than the transaction's start version
    #[error("cell {cell} has version {version}, newer than start version {start_version}")]
    StaleRead {
        /// The cell read
        cell: CellId,
        /// Version found
        version: u64,
        /// Transaction start version
        start_version: u64,
    },

    /// A commit lock was held by another transaction
    #[error("cell {cell} is locked by another committer")]
    LockBusy {
        /// The contended cell
        cell: CellId,
    },

    /// Read-set validation failed
    #[error("validation failed: {0}")]
    Validation(#[from] ConflictType),
}

/// A cell observed by this transaction and the version it carried
pub(crate) struct ReadEntry<V> {
    pub(crate) cell: Arc<VersionedCell<V>>,
    pub(crate) version: u64,
}

/// A buffered write (`None` writes the absence marker)
pub(crate) struct WriteEntry<V> {
    pub(crate) cell: Arc<VersionedCell<V>>,
    pub(crate) value: Option<V>,
}

/// Per-attempt read-set, write-set, and start version
pub struct Transaction<V> {
    /// Clock value observed when the attempt began
    start_version: u64,

    /// First observed version of each committed read
    read_set: FxHashMap<CellId, ReadEntry<V>>,

    /// Pending writes, ordered by cell identity (the lock order)
    write_set: BTreeMap<CellId, WriteEntry<V>>,
}

impl<V: Clone> Transaction<V> {
    pub(crate) fn new(start_version: u64) -> Self {
        Self {
            start_version,
            read_set: FxHashMap::default(),
            write_set: BTreeMap::new(),
        }
    }

    /// Clock value this attempt started from
    pub fn start_version(&self) -> u64 {
        self.start_version
    }

    /// Read a cell through this transaction
    pub fn read(&mut self, cell: &Arc<VersionedCell<V>>) -> Result<Option<V>, Abort> {
        if let Some(pending) = self.write_set.get(&cell.id()) {
            return Ok(pending.value.clone());
        }

        let (value, version) = cell.read();
        if version > self.start_version {
            return Err(Abort::StaleRead {
                cell: cell.id(),
                version,
                start_version: self.start_version,
            });
        }

        self.read_set.entry(cell.id()).or_insert_with(|| ReadEntry {
            cell: Arc::clone(cell),
            version,
        });
        Ok(value)
    }

    /// Buffer a write; invisible to everyone else until commit
    pub fn write(&mut self, cell: &Arc<VersionedCell<V>>, value: Option<V>) {
        self.write_set.insert(
            cell.id(),
            WriteEntry {
                cell: Arc::clone(cell),
                value,
            },
        );
    }

    /// Number of distinct cells read from committed state
    pub fn read_count(&self) -> usize {
        self.read_set.len()
    }

    /// Number of distinct cells with a pending write
    pub fn write_count(&self) -> usize {
        self.write_set.len()
    }

    /// True if nothing has been written
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty()
    }

    /// Attempt to commit
    ///
    /// Returns the commit version, or None for a read-only transaction.
    pub(crate) fn commit(&self, clock: &GlobalClock) -> Result<Option<u64>, Abort> {
        if self.write_set.is_empty() {
            validate_read_set(&self.read_set, &self.write_set)?;
            return Ok(None);
        }

        let mut guards: SmallVec<[CellGuard<'_, V>; INLINE_LOCKS]> =
            SmallVec::with_capacity(self.write_set.len());
        for (id, entry) in &self.write_set {
            match entry.cell.try_lock() {
                Some(guard) => guards.push(guard),
                None => {
                    release_in_reverse(&mut guards);
                    return Err(Abort::LockBusy { cell: *id });
                }
            }
        }

        if let Err(conflict) = validate_read_set(&self.read_set, &self.write_set) {
            release_in_reverse(&mut guards);
            return Err(Abort::Validation(conflict));
        }

        let commit_version = clock.advance();
        for (guard, entry) in guards.iter_mut().zip(self.write_set.values()) {
            guard.install(entry.value.clone(), commit_version);
        }
        release_in_reverse(&mut guards);

        Ok(Some(commit_version))
    }
}

fn release_in_reverse<V>(guards: &mut SmallVec<[CellGuard<'_, V>; INLINE_LOCKS]>) {
    while let Some(guard) = guards.pop() {
        drop(guard);
    }
}

impl<V> std::fmt::Debug for Transaction<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("start_version", &self.start_version)
            .field("reads", &self.read_set.len())
            .field("writes", &self.write_set.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: CellId) -> Arc<VersionedCell<u64>> {
        Arc::new(VersionedCell::new(id))
    }

    fn committed(clock: &GlobalClock, c: &Arc<VersionedCell<u64>>, value: u64) {
        let mut txn = Transaction::new(clock.now());
        txn.write(c, Some(value));
        txn.commit(clock).unwrap();
    }

    #[test]
    fn test_read_your_own_writes() {
        let clock = GlobalClock::new(0);
        let a = cell(1);
        let mut txn = Transaction::new(clock.now());

        assert_eq!(txn.read(&a).unwrap(), None);
        txn.write(&a, Some(5));
        assert_eq!(txn.read(&a).unwrap(), Some(5));
        txn.write(&a, None);
        assert_eq!(txn.read(&a).unwrap(), None);
        // Committed state untouched until commit
        assert_eq!(a.read(), (None, 0));
    }

    #[test]
    fn test_read_only_commit_leaves_clock_alone() {
        let clock = GlobalClock::new(0);
        let a = cell(1);
        let mut txn = Transaction::new(clock.now());
        txn.read(&a).unwrap();
        assert!(txn.is_read_only());
        assert_eq!(txn.commit(&clock), Ok(None));
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn test_write_commit_advances_clock_once() {
        let clock = GlobalClock::new(0);
        let a = cell(1);
        let b = cell(2);
        let mut txn = Transaction::new(clock.now());
        txn.write(&a, Some(1));
        txn.write(&b, Some(2));
        assert_eq!(txn.commit(&clock), Ok(Some(1)));
        assert_eq!(clock.now(), 1);
        assert_eq!(a.read(), (Some(1), 1));
        assert_eq!(b.read(), (Some(2), 1));
    }

    #[test]
    fn test_stale_read_aborts_immediately() {
        let clock = GlobalClock::new(0);
        let a = cell(1);
        let mut txn = Transaction::new(clock.now());
        committed(&clock, &a, 7);

        assert_eq!(
            txn.read(&a),
            Err(Abort::StaleRead {
                cell: 1,
                version: 1,
                start_version: 0,
            })
        );
    }

    #[test]
    fn test_conflicting_commit_fails_validation() {
        let clock = GlobalClock::new(0);
        let a = cell(1);
        let b = cell(2);
        committed(&clock, &a, 1);

        let mut txn = Transaction::new(clock.now());
        let seen = txn.read(&a).unwrap();
        txn.write(&b, seen);

        // Another committer changes `a` after our read
        committed(&clock, &a, 2);

        assert!(matches!(
            txn.commit(&clock),
            Err(Abort::Validation(ConflictType::ReadWriteConflict { .. }))
        ));
        assert_eq!(b.read(), (None, 0), "aborted writes must not be visible");
    }

    #[test]
    fn test_read_modify_write_detects_lost_update() {
        let clock = GlobalClock::new(0);
        let a = cell(1);
        committed(&clock, &a, 10);

        let mut txn = Transaction::new(clock.now());
        let current = txn.read(&a).unwrap().unwrap();
        txn.write(&a, Some(current + 1));

        committed(&clock, &a, 100);

        assert!(txn.commit(&clock).is_err());
        assert_eq!(a.read().0, Some(100));
    }

    #[test]
    fn test_lock_busy_releases_taken_locks() {
        let clock = GlobalClock::new(0);
        let a = cell(1);
        let b = cell(2);

        let mut txn = Transaction::new(clock.now());
        txn.write(&a, Some(1));
        txn.write(&b, Some(2));

        let held = b.try_lock().unwrap();
        assert_eq!(txn.commit(&clock), Err(Abort::LockBusy { cell: 2 }));
        assert!(!a.is_locked(), "lock on cell 1 must be released");
        drop(held);

        assert_eq!(txn.commit(&clock), Ok(Some(1)));
    }

    #[test]
    fn test_first_observation_is_recorded() {
        let clock = GlobalClock::new(0);
        let a = cell(1);
        let mut txn = Transaction::new(clock.now());
        txn.read(&a).unwrap();
        txn.read(&a).unwrap();
        assert_eq!(txn.read_count(), 1);
        assert_eq!(txn.write_count(), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        proptest! {
            #[test]
            fn buffered_writes_match_model(ops in prop::collection::vec((0usize..4, prop::option::of(0u64..100)), 0..40)) {
                let clock = GlobalClock::new(0);
                let cells: Vec<_> = (0..4).map(|i| cell(i as CellId + 1)).collect();
                let mut model: HashMap<usize, Option<u64>> = HashMap::new();
                let mut txn = Transaction::new(clock.now());

                for (idx, value) in &ops {
                    txn.write(&cells[*idx], *value);
                    model.insert(*idx, *value);
                    prop_assert_eq!(txn.read(&cells[*idx]).unwrap(), *value);
                }
                prop_assert_eq!(txn.write_count(), model.len());

                let version = txn.commit(&clock).unwrap();
                prop_assert_eq!(version.is_some(), !model.is_empty());
                for (idx, c) in cells.iter().enumerate() {
                    let expected = model.get(&idx).copied().flatten();
                    prop_assert_eq!(c.read().0, expected);
                }
            }
        }
    }
}
