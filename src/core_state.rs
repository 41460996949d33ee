//! Shared application state.
//!
//! `CoreState` owns the record store and the records-file path. It is
//! wrapped in `Arc` at startup and handed to both the HTTP layer and the
//! reminder scheduler.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::db::{self, StorageError};
use crate::models::AppointmentRecord;
use crate::store::{RecordStore, StoreError};

pub struct CoreState {
    store: Arc<RecordStore>,
    records_path: PathBuf,
    /// Sequences intake write units (disk row, then memory push).
    write_gate: Mutex<()>,
}

impl CoreState {
    /// Prepare the records file and hydrate the store from it.
    ///
    /// Any load failure is returned; callers must not continue with an
    /// empty or partial store.
    pub fn open(records_path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let records_path = records_path.into();
        db::initialize(&records_path)?;

        let report = db::load_with_report(&records_path)?;
        if !report.skipped_lines.is_empty() {
            tracing::warn!(
                skipped = report.skipped_lines.len(),
                lines = ?report.skipped_lines,
                "Records file contains malformed rows"
            );
        }
        tracing::info!(
            path = %records_path.display(),
            records = report.records.len(),
            "Appointment records loaded"
        );

        Ok(Self {
            store: Arc::new(RecordStore::from_records(report.records)),
            records_path,
            write_gate: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Store handle for background readers (reminder scheduler).
    pub fn shared_store(&self) -> Arc<RecordStore> {
        self.store.clone()
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    /// Write-through for one new record.
    ///
    /// The row is persisted first and only then pushed into memory, so a
    /// failed disk write leaves both sides untouched. The store lock is
    /// not held during the disk write.
    pub fn record_appointment(&self, record: AppointmentRecord) -> Result<usize, CoreError> {
        let _gate = self.write_gate.lock().map_err(|_| CoreError::LockPoisoned)?;

        db::append(&self.records_path, &record)?;
        let position = self.store.append(record)?;

        tracing::info!(position, "Appointment recorded");
        Ok(position)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LockPoisoned => CoreError::LockPoisoned,
        }
    }
}
