//! Parent-table batch orchestration over all registered relationships.

use super::{CleanerError, CleanerService};
use crate::cleanup::{
    domain::{
        CleanupOptions, DeletedRecord, ForeignKeyDefinition, ParentKey, RecordId,
        RelationshipRegistry, bare_table_name,
    },
    ports::{CleanupMetrics, ConnectionResolver, DeletedRecordStore, DeletedRecordStoreError},
};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while processing one parent-table batch.
#[derive(Debug, Error)]
pub enum BatchCleanerError {
    /// A relationship's cleanup failed; the batch was not retired.
    #[error(transparent)]
    Cleaner(#[from] CleanerError),

    /// The deleted-record store failed; the batch was not retired.
    #[error(transparent)]
    Store(#[from] DeletedRecordStoreError),
}

/// Fans one batch of deleted records out to every relationship of a parent
/// table, then retires the batch.
///
/// Relationships are processed sequentially, bounding how many child tables
/// one worker touches at a time. Any failure aborts the run before any
/// record is retired; because cleanup is idempotent (an already-cleaned
/// relationship matches zero rows), the scheduler's next pass simply re-runs
/// the whole batch.
#[derive(Clone)]
pub struct BatchCleanerService<R, S, M>
where
    R: ConnectionResolver,
    S: DeletedRecordStore,
    M: CleanupMetrics,
{
    registry: Arc<RelationshipRegistry>,
    cleaner: CleanerService<R>,
    records: Arc<S>,
    metrics: Arc<M>,
    connection_name: String,
    options: CleanupOptions,
}

impl<R, S, M> BatchCleanerService<R, S, M>
where
    R: ConnectionResolver,
    S: DeletedRecordStore,
    M: CleanupMetrics,
{
    /// Creates an orchestrator over the given registry, resolver, record
    /// store, and metrics sink.
    ///
    /// `connection_name` labels the processed-records counter; it names the
    /// database configuration the deleted-record store lives on, which need
    /// not be the connection any child table resolves to.
    #[must_use]
    pub fn new(
        registry: Arc<RelationshipRegistry>,
        resolver: Arc<R>,
        records: Arc<S>,
        metrics: Arc<M>,
        connection_name: impl Into<String>,
    ) -> Self {
        let cleaner = CleanerService::new(resolver);
        Self {
            registry,
            cleaner,
            records,
            metrics,
            connection_name: connection_name.into(),
            options: CleanupOptions::default(),
        }
    }

    /// Sets the statement generation options for the leading cleanup
    /// passes. The closing pass per relationship always runs without the
    /// skip-locked clause, so contended rows are cleaned before retirement.
    #[must_use]
    pub const fn with_options(mut self, options: CleanupOptions) -> Self {
        self.options = options;
        self
    }

    /// Loads the next pending batch for a schema-qualified parent table and
    /// processes it, returning the number of records in the batch.
    ///
    /// # Errors
    ///
    /// Returns [`BatchCleanerError`] under the same conditions as
    /// [`Self::execute`].
    pub async fn execute_pending(
        &self,
        fully_qualified_table_name: &str,
        limit: usize,
    ) -> Result<usize, BatchCleanerError> {
        let batch = self
            .records
            .load_pending_batch(fully_qualified_table_name, limit)
            .await?;
        if batch.is_empty() {
            return Ok(0);
        }
        self.execute(bare_table_name(fully_qualified_table_name), &batch)
            .await?;
        Ok(batch.len())
    }

    /// Processes one batch of deleted records for a parent table.
    ///
    /// Runs the cleaner for every registered relationship targeting the
    /// parent table, repeating each relationship until it matches no more
    /// child rows, then marks the whole batch processed in a single store
    /// operation. A parent table without dependents still retires its batch:
    /// there is nothing downstream to clean.
    ///
    /// # Errors
    ///
    /// Returns [`BatchCleanerError`] when any relationship's cleanup or the
    /// store fails; in that case no record in the batch is retired.
    pub async fn execute(
        &self,
        parent_table: &str,
        records: &[DeletedRecord],
    ) -> Result<(), BatchCleanerError> {
        if records.is_empty() {
            return Ok(());
        }

        let definitions = self.registry.definitions_for_parent_table(parent_table);
        let parent_keys: Vec<ParentKey> = records
            .iter()
            .map(|record| record.primary_key_value().clone())
            .collect();

        for definition in definitions {
            let mut affected_rows = 0;
            if self.options.skip_locked {
                affected_rows += self
                    .exhaust(definition, &parent_keys, self.options)
                    .await?;
            }
            // The closing pass waits on locks instead of skipping, so rows
            // held by concurrent writers are still cleaned before the batch
            // retires.
            affected_rows += self
                .exhaust(definition, &parent_keys, CleanupOptions::default())
                .await?;
            self.metrics.record_affected_rows(
                definition.child_table(),
                definition.schema_tag(),
                affected_rows,
            );
            tracing::debug!(
                parent_table,
                child_table = definition.child_table(),
                affected_rows,
                "cleaned up relationship"
            );
        }

        let ids: Vec<RecordId> = records.iter().map(DeletedRecord::id).collect();
        let retired = self.records.mark_processed(&ids).await?;
        self.metrics
            .record_processed_records(parent_table, &self.connection_name, retired);
        tracing::info!(
            parent_table,
            relationships = definitions.len(),
            retired,
            "processed deleted record batch"
        );
        Ok(())
    }

    /// Re-runs one relationship until a pass matches no child rows.
    ///
    /// Each statement is bounded by the policy's batch cap, so a parent with
    /// more dependents than the cap is drained in cap-sized slices rather
    /// than truncated at the first pass.
    async fn exhaust(
        &self,
        definition: &ForeignKeyDefinition,
        parent_keys: &[ParentKey],
        options: CleanupOptions,
    ) -> Result<u64, BatchCleanerError> {
        let mut total = 0;
        loop {
            let affected = self
                .cleaner
                .execute(definition, parent_keys, options)
                .await?
                .affected_row_count();
            total += affected;
            if affected == 0 {
                return Ok(total);
            }
        }
    }
}
