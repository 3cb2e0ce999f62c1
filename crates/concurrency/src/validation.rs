//! Read-set validation
//!
//! A transaction may commit only if every cell it read still carries the
//! version observed at read time. Cells the transaction also writes are
//! validated too (their lock is held by this transaction at that point), so
//! a read-modify-write can never overwrite a commit it did not observe.
//! Any other cell found locked belongs to a concurrent committer whose
//! outcome is unknown, which also fails validation.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::cell::{CellId, LOCK_BIT};
use crate::transaction::{ReadEntry, WriteEntry};

/// Why validation rejected a transaction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictType {
    /// Cell was read at one version but a later commit changed it
    #[error("read-write conflict on cell {cell}: read version {read_version}, current {current_version}")]
    ReadWriteConflict {
        /// The cell that changed
        cell: CellId,
        /// Version recorded in the read-set
        read_version: u64,
        /// Version found at validation time
        current_version: u64,
    },

    /// Cell is in the middle of another transaction's commit
    #[error("cell {cell} is locked by a concurrent committer")]
    LockedByCommitter {
        /// The locked cell
        cell: CellId,
    },
}

/// Validate the read-set against the cells' current state
///
/// Stops at the first conflict; the attempt is discarded either way.
pub(crate) fn validate_read_set<V>(
    read_set: &FxHashMap<CellId, ReadEntry<V>>,
    write_set: &BTreeMap<CellId, WriteEntry<V>>,
) -> Result<(), ConflictType> {
    for (id, entry) in read_set {
        let word = entry.cell.load_word();
        let held_by_us = write_set.contains_key(id);
        if !held_by_us && word & LOCK_BIT != 0 {
            return Err(ConflictType::LockedByCommitter { cell: *id });
        }
        let current_version = word >> 1;
        if current_version != entry.version {
            return Err(ConflictType::ReadWriteConflict {
                cell: *id,
                read_version: entry.version,
                current_version,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::VersionedCell;
    use std::sync::Arc;

    fn read_set_of(cells: &[(&Arc<VersionedCell<u64>>, u64)]) -> FxHashMap<CellId, ReadEntry<u64>> {
        cells
            .iter()
            .map(|(cell, version)| {
                (
                    cell.id(),
                    ReadEntry {
                        cell: Arc::clone(cell),
                        version: *version,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_unchanged_read_set_validates() {
        let a = Arc::new(VersionedCell::new(1));
        let read_set = read_set_of(&[(&a, 0)]);
        assert_eq!(validate_read_set(&read_set, &BTreeMap::new()), Ok(()));
    }

    #[test]
    fn test_changed_version_conflicts() {
        let a = Arc::new(VersionedCell::new(1));
        let read_set = read_set_of(&[(&a, 0)]);
        a.try_lock().unwrap().install(Some(1), 4);

        assert_eq!(
            validate_read_set(&read_set, &BTreeMap::new()),
            Err(ConflictType::ReadWriteConflict {
                cell: 1,
                read_version: 0,
                current_version: 4,
            })
        );
    }

    #[test]
    fn test_foreign_lock_conflicts() {
        let a = Arc::new(VersionedCell::new(1));
        let read_set = read_set_of(&[(&a, 0)]);
        let _held = a.try_lock().unwrap();
        assert_eq!(
            validate_read_set(&read_set, &BTreeMap::new()),
            Err(ConflictType::LockedByCommitter { cell: 1 })
        );
    }

    #[test]
    fn test_own_lock_is_not_a_conflict() {
        let a = Arc::new(VersionedCell::new(1));
        let read_set = read_set_of(&[(&a, 0)]);
        let mut write_set = BTreeMap::new();
        write_set.insert(
            1,
            WriteEntry {
                cell: Arc::clone(&a),
                value: Some(9),
            },
        );
        let _held = a.try_lock().unwrap();
        assert_eq!(validate_read_set(&read_set, &write_set), Ok(()));
    }

    #[test]
    fn test_written_cell_still_checks_version() {
        let a = Arc::new(VersionedCell::new(1));
        let read_set = read_set_of(&[(&a, 0)]);
        let mut write_set = BTreeMap::new();
        write_set.insert(
            1,
            WriteEntry {
                cell: Arc::clone(&a),
                value: Some(9),
            },
        );
        a.try_lock().unwrap().install(Some(1), 2);
        let _held = a.try_lock().unwrap();
        assert!(matches!(
            validate_read_set(&read_set, &write_set),
            Err(ConflictType::ReadWriteConflict { .. })
        ));
    }
}
