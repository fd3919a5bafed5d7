//! Diesel-backed store for the deleted-record log.

use super::executor::CleanupPgPool;
use super::models::{DeletedRecordRow, row_to_record};
use super::schema::loose_foreign_keys_deleted_records::dsl;
use crate::cleanup::domain::{DeletedRecord, RecordId, RecordStatus};
use crate::cleanup::ports::{
    DeletedRecordStore, DeletedRecordStoreError, DeletedRecordStoreResult,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed deleted-record store.
#[derive(Clone)]
pub struct PostgresDeletedRecordStore {
    pool: CleanupPgPool,
}

impl PostgresDeletedRecordStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: CleanupPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DeletedRecordStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DeletedRecordStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DeletedRecordStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DeletedRecordStoreError::persistence)?
    }
}

#[async_trait]
impl DeletedRecordStore for PostgresDeletedRecordStore {
    async fn load_pending_batch(
        &self,
        fully_qualified_table_name: &str,
        limit: usize,
    ) -> DeletedRecordStoreResult<Vec<DeletedRecord>> {
        let table_name = fully_qualified_table_name.to_owned();
        let batch_limit =
            i64::try_from(limit).map_err(DeletedRecordStoreError::persistence)?;
        self.run_blocking(move |connection| {
            let rows = dsl::loose_foreign_keys_deleted_records
                .filter(dsl::fully_qualified_table_name.eq(table_name))
                .filter(dsl::status.eq(RecordStatus::Pending.as_i16()))
                .order(dsl::id.asc())
                .limit(batch_limit)
                .select(DeletedRecordRow::as_select())
                .load::<DeletedRecordRow>(connection)
                .map_err(DeletedRecordStoreError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn mark_processed(&self, ids: &[RecordId]) -> DeletedRecordStoreResult<u64> {
        let id_values: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                dsl::loose_foreign_keys_deleted_records.filter(dsl::id.eq_any(id_values)),
            )
            .set(dsl::status.eq(RecordStatus::Processed.as_i16()))
            .execute(connection)
            .map_err(DeletedRecordStoreError::persistence)?;
            u64::try_from(updated).map_err(DeletedRecordStoreError::persistence)
        })
        .await
    }
}
