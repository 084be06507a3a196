//! Collections — ordered record sequences and the shared upsert/delete protocol.
//!
//! DESIGN
//! ======
//! A collection is an ordered sequence of records with unique ids. Order is
//! display order: new records are prepended (most-recent-first), updates keep
//! their position. `upsert` and `remove` are pure — they return a new value
//! and never touch the input, because consumers compare snapshots by
//! reference to decide whether derived views need recomputing.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::record::{Record, RecordId};

/// Ordered sequence of same-kind records forming one slice of application state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    #[must_use]
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Build a collection from seed records. Duplicate ids keep the first
    /// occurrence; later ones are dropped with a diagnostic.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut out = Self { records: Vec::with_capacity(records.len()) };
        for record in records {
            if out.contains(&record.id) {
                warn!(id = %record.id, "collection: duplicate seed id dropped");
                continue;
            }
            out.records.push(record);
        }
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.iter().any(|r| &r.id == id)
    }

    /// Display position of a record, if present.
    #[must_use]
    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    #[must_use]
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    // =========================================================================
    // UPSERT / DELETE PROTOCOL
    // =========================================================================

    /// Update-if-present-else-insert, keyed by record id.
    ///
    /// An existing record is replaced in place — its position and every other
    /// record are untouched. A new record is prepended.
    #[must_use]
    pub fn upsert(&self, record: Record) -> Self {
        if self.contains(&record.id) {
            let records = self
                .records
                .iter()
                .map(|r| if r.id == record.id { record.clone() } else { r.clone() })
                .collect();
            return Self { records };
        }

        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.push(record);
        records.extend(self.records.iter().cloned());
        Self { records }
    }

    /// Filter out the record with the given id. Removing a missing id is a
    /// no-op, never an error.
    #[must_use]
    pub fn remove(&self, id: &RecordId) -> Self {
        let records = self.records.iter().filter(|r| &r.id != id).cloned().collect();
        Self { records }
    }
}

impl FromIterator<Record> for Collection {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
#[path = "collection_test.rs"]
mod tests;
