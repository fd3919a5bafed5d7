//! In-memory deleted-record store for tests.

use crate::cleanup::domain::{DeletedRecord, RecordId, RecordStatus};
use crate::cleanup::ports::{
    DeletedRecordStore, DeletedRecordStoreError, DeletedRecordStoreResult,
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory deleted-record store.
///
/// [`Self::insert`] stands in for the capture trigger that normally appends
/// records; the engine itself only loads and retires them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeletedRecordStore {
    records: Arc<RwLock<Vec<DeletedRecord>>>,
}

impl InMemoryDeletedRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured record, standing in for the external trigger.
    ///
    /// # Errors
    ///
    /// Returns [`DeletedRecordStoreError`] when the state lock is poisoned.
    pub fn insert(&self, record: DeletedRecord) -> DeletedRecordStoreResult<()> {
        let mut records = self.write_records()?;
        records.push(record);
        Ok(())
    }

    /// Returns the number of records in the given status.
    #[must_use]
    pub fn count_with_status(&self, status: RecordStatus) -> usize {
        self.records
            .read()
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.status() == status)
                    .count()
            })
            .unwrap_or(0)
    }

    fn write_records(
        &self,
    ) -> DeletedRecordStoreResult<std::sync::RwLockWriteGuard<'_, Vec<DeletedRecord>>> {
        self.records
            .write()
            .map_err(|err| DeletedRecordStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl DeletedRecordStore for InMemoryDeletedRecordStore {
    async fn load_pending_batch(
        &self,
        fully_qualified_table_name: &str,
        limit: usize,
    ) -> DeletedRecordStoreResult<Vec<DeletedRecord>> {
        let records = self.records.read().map_err(|err| {
            DeletedRecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut batch: Vec<DeletedRecord> = records
            .iter()
            .filter(|record| {
                record.is_pending()
                    && record.fully_qualified_table_name() == fully_qualified_table_name
            })
            .cloned()
            .collect();
        batch.sort_by_key(DeletedRecord::id);
        batch.truncate(limit);
        Ok(batch)
    }

    async fn mark_processed(&self, ids: &[RecordId]) -> DeletedRecordStoreResult<u64> {
        let mut records = self.write_records()?;
        let mut updated = 0u64;
        for record in records.iter_mut() {
            if record.is_pending() && ids.contains(&record.id()) {
                record.mark_processed();
                updated += 1;
            }
        }
        Ok(updated)
    }
}
