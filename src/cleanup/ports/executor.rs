//! Execution ports: statement execution and connection routing.

use crate::cleanup::domain::CleanupStatement;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Statement execution contract for one physical database.
///
/// Each child table is owned by exactly one connection; the engine never
/// routes a statement itself, it asks a [`ConnectionResolver`] instead.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Connection identifier used in metrics and logs.
    fn name(&self) -> &str;

    /// Returns the primary key columns of a table, in index order.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the table cannot be introspected.
    async fn primary_key_columns(&self, table: &str) -> ExecutorResult<Vec<String>>;

    /// Executes a cleanup statement, returning the affected row count.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] on any execution failure (connection loss,
    /// timeout, constraint violation). Failures are not retried here; the
    /// caller leaves the deleted-record batch unretired so the scheduler's
    /// next pass retries naturally.
    async fn execute(&self, statement: &CleanupStatement) -> ExecutorResult<u64>;
}

/// Resolves the executor owning a given table.
///
/// Keeps connection routing out of the cleanup logic: the services never
/// hard-code which physical database a table lives on.
pub trait ConnectionResolver: Send + Sync {
    /// Returns the executor for the database hosting `table`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when no connection covers the table.
    fn resolve(&self, table: &str) -> ExecutorResult<Arc<dyn StatementExecutor>>;
}

/// Errors returned by statement executors and connection resolvers.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// The table does not exist on the resolved connection.
    #[error("table {0} does not exist on connection {1}")]
    MissingTable(String, String),

    /// Execution-layer failure.
    #[error("statement execution failed: {0}")]
    Execution(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExecutorError {
    /// Wraps an execution-layer error.
    pub fn execution(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Execution(Arc::new(err))
    }
}
