//! Diesel-backed statement execution and connection routing.

use crate::cleanup::domain::CleanupStatement;
use crate::cleanup::ports::{
    ConnectionResolver, ExecutorError, ExecutorResult, StatementExecutor,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use std::collections::HashMap;
use std::sync::Arc;

/// `PostgreSQL` connection pool type used by cleanup adapters.
pub type CleanupPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL` statement executor bound to one connection pool.
///
/// Statement timeouts are a pool concern: configure them on the connection
/// (for example through a customizer running `SET statement_timeout`), and a
/// timeout surfaces here as an ordinary execution error.
#[derive(Clone)]
pub struct PostgresStatementExecutor {
    name: String,
    pool: CleanupPgPool,
}

impl PostgresStatementExecutor {
    /// Creates an executor over a named connection pool.
    #[must_use]
    pub fn new(name: impl Into<String>, pool: CleanupPgPool) -> Self {
        Self {
            name: name.into(),
            pool,
        }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ExecutorResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ExecutorResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ExecutorError::execution)?;
            f(&mut connection)
        })
        .await
        .map_err(ExecutorError::execution)?
    }
}

#[derive(QueryableByName)]
struct PrimaryKeyColumnRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    attname: String,
}

#[async_trait]
impl StatementExecutor for PostgresStatementExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn primary_key_columns(&self, table: &str) -> ExecutorResult<Vec<String>> {
        let table_name = table.to_owned();
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(concat!(
                "SELECT a.attname FROM pg_index i ",
                "JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey) ",
                "WHERE i.indrelid = $1::regclass AND i.indisprimary ",
                "ORDER BY array_position(i.indkey, a.attnum)",
            ))
            .bind::<diesel::sql_types::Text, _>(table_name)
            .load::<PrimaryKeyColumnRow>(connection)
            .map_err(ExecutorError::execution)?;
            Ok(rows.into_iter().map(|row| row.attname).collect())
        })
        .await
    }

    async fn execute(&self, statement: &CleanupStatement) -> ExecutorResult<u64> {
        let sql = statement.to_sql();
        self.run_blocking(move |connection| {
            let affected = diesel::sql_query(sql)
                .execute(connection)
                .map_err(ExecutorError::execution)?;
            u64::try_from(affected).map_err(ExecutorError::execution)
        })
        .await
    }
}

/// Routes tables to pooled executors, with a default fallback connection.
///
/// Built once at process start next to the registry; the mapping never
/// changes at runtime.
#[derive(Clone)]
pub struct StaticConnectionResolver {
    default: Arc<dyn StatementExecutor>,
    by_table: HashMap<String, Arc<dyn StatementExecutor>>,
}

impl StaticConnectionResolver {
    /// Creates a resolver that routes every table to `default`.
    #[must_use]
    pub fn new(default: Arc<dyn StatementExecutor>) -> Self {
        Self {
            default,
            by_table: HashMap::new(),
        }
    }

    /// Routes one table to a specific executor.
    #[must_use]
    pub fn with_table(
        mut self,
        table: impl Into<String>,
        executor: Arc<dyn StatementExecutor>,
    ) -> Self {
        self.by_table.insert(table.into(), executor);
        self
    }
}

impl ConnectionResolver for StaticConnectionResolver {
    fn resolve(&self, table: &str) -> ExecutorResult<Arc<dyn StatementExecutor>> {
        Ok(self
            .by_table
            .get(table)
            .map_or_else(|| Arc::clone(&self.default), Arc::clone))
    }
}
