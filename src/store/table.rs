//! Auto-increment table of records keyed by [`RecordId`].

use std::collections::BTreeMap;

use crate::types::RecordId;

/// A row that carries its own id.
pub trait Keyed {
    fn key(&self) -> RecordId;
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(
    bound(deserialize = "T: serde::Deserialize<'de> + Keyed"),
    try_from = "RawTable<T>"
)]
pub struct Table<T> {
    /// Next id to hand out. Ids are never reused, even after deletes.
    next_id: u64,
    rows: BTreeMap<RecordId, T>,
}

/// A table as written to disk, before its keys are checked.
#[derive(serde::Deserialize)]
struct RawTable<T> {
    next_id: u64,
    rows: BTreeMap<RecordId, T>,
}

impl<T: Keyed> TryFrom<RawTable<T>> for Table<T> {
    type Error = String;

    /// Rejects rows stored under another id and moves a lagging sequence
    /// past the highest key.
    fn try_from(raw: RawTable<T>) -> Result<Self, Self::Error> {
        if let Some((key, row)) = raw.rows.iter().find(|(key, row)| row.key() != **key) {
            return Err(format!("row {} is stored under id {}", row.key(), key));
        }
        let after_last = raw.rows.keys().next_back().map_or(1, |id| id.0.saturating_add(1));
        Ok(Table { next_id: raw.next_id.max(after_last), rows: raw.rows })
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table { next_id: 1, rows: BTreeMap::new() }
    }
}

impl<T> Table<T> {
    /// The id the next insert will receive.
    pub fn next_id(&self) -> RecordId {
        RecordId(self.next_id)
    }

    /// Stores `row` under `id`, advancing the id sequence past it.
    pub fn insert(&mut self, id: RecordId, row: T) {
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        self.rows.insert(id, row);
    }

    /// Allocates the next id, builds the row with it and stores it.
    pub fn insert_with(&mut self, build: impl FnOnce(RecordId) -> T) -> RecordId {
        let id = self.next_id();
        self.insert(id, build(id));
        id
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn remove(&mut self, id: RecordId) -> Option<T> {
        self.rows.remove(&id)
    }

    /// Keeps the rows for which `keep` returns true; returns the ids removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> Vec<RecordId> {
        let mut removed = Vec::new();
        self.rows.retain(|id, row| {
            let k = keep(row);
            if !k {
                removed.push(*id);
            }
            k
        });
        removed
    }

    /// Rows in id order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
