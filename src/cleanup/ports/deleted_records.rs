//! Port for the persisted deleted-record log.

use crate::cleanup::domain::{DeletedRecord, RecordId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for deleted-record store operations.
pub type DeletedRecordStoreResult<T> = Result<T, DeletedRecordStoreError>;

/// Access to the deleted-record log owned by the capture mechanism.
///
/// The engine never inserts records; it reads pending ones and retires them.
#[async_trait]
pub trait DeletedRecordStore: Send + Sync {
    /// Loads up to `limit` pending records for a schema-qualified parent
    /// table, ordered by record identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DeletedRecordStoreError`] on persistence failure.
    async fn load_pending_batch(
        &self,
        fully_qualified_table_name: &str,
        limit: usize,
    ) -> DeletedRecordStoreResult<Vec<DeletedRecord>>;

    /// Marks the given records processed in a single operation, returning
    /// the number of records updated. Unknown identifiers update nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DeletedRecordStoreError`] on persistence failure.
    async fn mark_processed(&self, ids: &[RecordId]) -> DeletedRecordStoreResult<u64>;
}

/// Errors returned by deleted-record store implementations.
#[derive(Debug, Clone, Error)]
pub enum DeletedRecordStoreError {
    /// Persistence-layer failure.
    #[error("deleted record store failure: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DeletedRecordStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
