//! In-memory record store.
//!
//! Append-only, insertion-ordered. Uses `RwLock` so the reminder scan and
//! read views run concurrently while intake appends take the write lock
//! only for the push itself.

use std::sync::RwLock;

use crate::models::AppointmentRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Internal lock error")]
    LockPoisoned,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<AppointmentRecord>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store already holding `records` (startup hydration).
    pub fn from_records(records: Vec<AppointmentRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Append a record. Returns its position, which never changes.
    pub fn append(&self, record: AppointmentRecord) -> Result<usize, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        records.push(record);
        Ok(records.len() - 1)
    }

    /// Owned snapshot of every record, in insertion order.
    pub fn all(&self) -> Result<Vec<AppointmentRecord>, StoreError> {
        self.with_records(|records| records.to_vec())
    }

    /// Run `f` over the records under the read lock.
    ///
    /// Keep `f` short: intake blocks on the write lock until it returns.
    pub fn with_records<R>(
        &self,
        f: impl FnOnce(&[AppointmentRecord]) -> R,
    ) -> Result<R, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&records))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.with_records(|records| records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.with_records(|records| records.is_empty())
    }
}
