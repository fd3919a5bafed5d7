//! Single-relationship cleanup execution.

use crate::cleanup::{
    domain::{CleanupOptions, CleanupStatement, ForeignKeyDefinition, ParentKey, StatementBuildError},
    ports::{ConnectionResolver, ExecutorError, StatementExecutor},
};
use std::sync::Arc;
use thiserror::Error;

/// Outcome of one relationship cleanup pass. Used for metrics and logging
/// only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    definition: ForeignKeyDefinition,
    affected_row_count: u64,
}

impl CleanupOutcome {
    /// Returns the definition that was processed.
    #[must_use]
    pub const fn definition(&self) -> &ForeignKeyDefinition {
        &self.definition
    }

    /// Returns the number of child rows deleted or nullified.
    #[must_use]
    pub const fn affected_row_count(&self) -> u64 {
        self.affected_row_count
    }
}

/// Errors raised while cleaning one relationship.
#[derive(Debug, Error)]
pub enum CleanerError {
    /// The generated statement does not reference every foreign key column.
    ///
    /// This is a programmer-error class: a statement missing its key
    /// predicate would delete or update every row of the child table, so
    /// execution halts before anything touches the database.
    #[error(
        "FATAL: foreign key condition is missing from the generated query: \
         column {column} on {child_table}"
    )]
    ForeignKeyConditionMissing {
        /// Table the statement targets.
        child_table: String,
        /// Foreign key column absent from the predicate.
        column: String,
    },

    /// Statement construction failed.
    #[error(transparent)]
    Build(#[from] StatementBuildError),

    /// Execution-layer failure. Propagated unmodified and never retried
    /// here; the unretired record batch retries on the next scheduled pass.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Cleans up the dependents of one loose foreign key relationship.
#[derive(Clone)]
pub struct CleanerService<R>
where
    R: ConnectionResolver,
{
    resolver: Arc<R>,
}

impl<R> CleanerService<R>
where
    R: ConnectionResolver,
{
    /// Creates a cleaner backed by the given connection resolver.
    #[must_use]
    pub const fn new(resolver: Arc<R>) -> Self {
        Self { resolver }
    }

    /// Builds and executes the bounded cleanup statement for one
    /// relationship against a batch of parent key values.
    ///
    /// An empty batch short-circuits to a zero-row outcome without building
    /// a statement.
    ///
    /// # Errors
    ///
    /// Returns [`CleanerError::ForeignKeyConditionMissing`] when the safety
    /// assertion trips, [`CleanerError::Build`] when the statement cannot be
    /// constructed, or [`CleanerError::Executor`] on execution failure.
    pub async fn execute(
        &self,
        definition: &ForeignKeyDefinition,
        parent_keys: &[ParentKey],
        options: CleanupOptions,
    ) -> Result<CleanupOutcome, CleanerError> {
        if parent_keys.is_empty() {
            return Ok(CleanupOutcome {
                definition: definition.clone(),
                affected_row_count: 0,
            });
        }

        let executor = self.resolver.resolve(definition.child_table())?;
        let primary_key_columns = executor
            .primary_key_columns(definition.child_table())
            .await?;
        let statement =
            CleanupStatement::build(definition, &primary_key_columns, parent_keys, options)?;

        let affected_row_count = self
            .execute_statement(&executor, definition, &statement)
            .await?;
        Ok(CleanupOutcome {
            definition: definition.clone(),
            affected_row_count,
        })
    }

    /// Runs the safety assertion and then the statement.
    ///
    /// Split from [`Self::execute`] so the assertion can be exercised
    /// against an arbitrary statement.
    pub(crate) async fn execute_statement(
        &self,
        executor: &Arc<dyn StatementExecutor>,
        definition: &ForeignKeyDefinition,
        statement: &CleanupStatement,
    ) -> Result<u64, CleanerError> {
        assert_foreign_key_predicate(definition, statement)?;

        tracing::debug!(
            child_table = definition.child_table(),
            policy = definition.delete_policy().as_str(),
            parent_keys = statement.parent_keys().len(),
            skip_locked = statement.skip_locked(),
            "executing cleanup statement"
        );
        let affected = executor.execute(statement).await?;
        Ok(affected)
    }
}

/// Verifies that every foreign key column constrains the statement.
fn assert_foreign_key_predicate(
    definition: &ForeignKeyDefinition,
    statement: &CleanupStatement,
) -> Result<(), CleanerError> {
    for column in definition.foreign_key_columns() {
        if !statement.references_column(column) {
            tracing::error!(
                child_table = definition.child_table(),
                column,
                "generated statement is missing its foreign key condition"
            );
            return Err(CleanerError::ForeignKeyConditionMissing {
                child_table: definition.child_table().to_owned(),
                column: column.clone(),
            });
        }
    }
    Ok(())
}
