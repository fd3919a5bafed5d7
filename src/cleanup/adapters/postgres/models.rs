//! Diesel row models for the deleted-record log.

use super::schema::loose_foreign_keys_deleted_records;
use crate::cleanup::domain::{DeletedRecord, ParentKey, RecordId, RecordStatus};
use crate::cleanup::ports::DeletedRecordStoreError;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for deleted-record events.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loose_foreign_keys_deleted_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeletedRecordRow {
    /// Event identifier.
    pub id: i64,
    /// Schema-qualified parent table name.
    pub fully_qualified_table_name: String,
    /// Primary key payload.
    pub primary_key_value: Value,
    /// Persisted status smallint.
    pub status: i16,
    /// Capture timestamp.
    pub created_at: DateTime<Utc>,
}

/// Converts a persisted row into the domain record.
pub fn row_to_record(row: DeletedRecordRow) -> Result<DeletedRecord, DeletedRecordStoreError> {
    let DeletedRecordRow {
        id,
        fully_qualified_table_name,
        primary_key_value,
        status: persisted_status,
        created_at,
    } = row;

    let primary_key = serde_json::from_value::<ParentKey>(primary_key_value)
        .map_err(DeletedRecordStoreError::persistence)?;
    let status =
        RecordStatus::try_from(persisted_status).map_err(DeletedRecordStoreError::persistence)?;

    Ok(DeletedRecord::new(
        RecordId::new(id),
        fully_qualified_table_name,
        primary_key,
        status,
        created_at,
    ))
}
