//! In-memory database interpreting cleanup statements for tests.

use crate::cleanup::domain::{CleanupStatement, DeletePolicy};
use crate::cleanup::ports::{
    ConnectionResolver, ExecutorError, ExecutorResult, StatementExecutor,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Column name to nullable value mapping for one row.
pub type RowValues = BTreeMap<String, Option<i64>>;

#[derive(Debug, Clone, Default)]
struct MemoryRow {
    values: RowValues,
    locked: bool,
}

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    primary_key: Vec<String>,
    rows: Vec<MemoryRow>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, MemoryTable>,
    executed: Vec<String>,
}

/// Thread-safe in-memory database implementing the executor port.
///
/// Interprets the structured statement directly instead of parsing SQL.
/// Matching mirrors the rendered statement: `NULL` column values never
/// match, the limit caps touched rows, and locked rows are skipped when the
/// statement runs in skip-locked mode. Every executed statement's rendered
/// SQL is recorded so tests can assert on the exact text.
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    name: String,
    state: Arc<RwLock<MemoryState>>,
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDatabase {
    /// Creates an empty database named `main`.
    #[must_use]
    pub fn new() -> Self {
        Self::named("main")
    }

    /// Creates an empty database with the given connection name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(MemoryState::default())),
        }
    }

    /// Registers a table with its primary key columns.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Execution`] when the state lock is poisoned.
    pub fn create_table(&self, table: &str, primary_key: &[&str]) -> ExecutorResult<()> {
        let mut state = self.write_state()?;
        state.tables.insert(
            table.to_owned(),
            MemoryTable {
                primary_key: primary_key.iter().map(|&c| c.to_owned()).collect(),
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    /// Inserts a row, standing in for the external application traffic that
    /// normally populates child tables.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::MissingTable`] when the table is not
    /// registered.
    pub fn insert(&self, table: &str, values: &[(&str, i64)]) -> ExecutorResult<()> {
        let mut state = self.write_state()?;
        let connection = self.name.clone();
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| ExecutorError::MissingTable(table.to_owned(), connection))?;
        stored.rows.push(MemoryRow {
            values: values
                .iter()
                .map(|&(column, value)| (column.to_owned(), Some(value)))
                .collect(),
            locked: false,
        });
        Ok(())
    }

    /// Marks every row whose column equals `value` as locked by a concurrent
    /// writer, for exercising skip-locked mode.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::MissingTable`] when the table is not
    /// registered.
    pub fn lock_rows(&self, table: &str, column: &str, value: i64) -> ExecutorResult<()> {
        let mut state = self.write_state()?;
        let connection = self.name.clone();
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| ExecutorError::MissingTable(table.to_owned(), connection))?;
        for row in &mut stored.rows {
            if row.values.get(column).copied().flatten() == Some(value) {
                row.locked = true;
            }
        }
        Ok(())
    }

    /// Returns the number of rows in a table; zero for unknown tables.
    #[must_use]
    pub fn count_rows(&self, table: &str) -> usize {
        self.state
            .read()
            .map(|state| state.tables.get(table).map_or(0, |t| t.rows.len()))
            .unwrap_or(0)
    }

    /// Returns the number of rows whose column equals `value` (`None`
    /// matches SQL `NULL`); zero for unknown tables.
    #[must_use]
    pub fn count_rows_where(&self, table: &str, column: &str, value: Option<i64>) -> usize {
        self.state
            .read()
            .map(|state| {
                state.tables.get(table).map_or(0, |stored| {
                    stored
                        .rows
                        .iter()
                        .filter(|row| row.values.get(column).copied().flatten() == value)
                        .count()
                })
            })
            .unwrap_or(0)
    }

    /// Returns every row of a table as column maps, for assertions.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<RowValues> {
        self.state
            .read()
            .map(|state| {
                state.tables.get(table).map_or_else(Vec::new, |stored| {
                    stored.rows.iter().map(|row| row.values.clone()).collect()
                })
            })
            .unwrap_or_default()
    }

    /// Returns the rendered SQL of every executed statement, in order.
    #[must_use]
    pub fn executed_statements(&self) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.executed.clone())
            .unwrap_or_default()
    }

    fn write_state(&self) -> ExecutorResult<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|err| ExecutorError::execution(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl StatementExecutor for InMemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn primary_key_columns(&self, table: &str) -> ExecutorResult<Vec<String>> {
        let state = self
            .state
            .read()
            .map_err(|err| ExecutorError::execution(std::io::Error::other(err.to_string())))?;
        state
            .tables
            .get(table)
            .map(|stored| stored.primary_key.clone())
            .ok_or_else(|| ExecutorError::MissingTable(table.to_owned(), self.name.clone()))
    }

    async fn execute(&self, statement: &CleanupStatement) -> ExecutorResult<u64> {
        let mut state = self.write_state()?;
        state.executed.push(statement.to_sql());

        let connection = self.name.clone();
        let table = state
            .tables
            .get_mut(statement.child_table())
            .ok_or_else(|| {
                ExecutorError::MissingTable(statement.child_table().to_owned(), connection)
            })?;

        let selected: Vec<usize> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, statement))
            .map(|(index, _)| index)
            .take(statement.limit())
            .collect();

        match statement.policy() {
            DeletePolicy::AsyncDelete => {
                let mut index = 0usize;
                table.rows.retain(|_| {
                    let keep = !selected.contains(&index);
                    index += 1;
                    keep
                });
            }
            DeletePolicy::AsyncNullify => {
                for &index in &selected {
                    if let Some(row) = table.rows.get_mut(index) {
                        for column in statement.foreign_key_columns() {
                            row.values.insert(column.clone(), None);
                        }
                    }
                }
            }
        }

        u64::try_from(selected.len()).map_err(ExecutorError::execution)
    }
}

/// One shared in-memory database hosts every table, so resolving always
/// returns a handle to the same state.
impl ConnectionResolver for InMemoryDatabase {
    fn resolve(&self, _table: &str) -> ExecutorResult<Arc<dyn StatementExecutor>> {
        Ok(Arc::new(self.clone()))
    }
}

/// Applies the inner-selector semantics to one row.
fn row_matches(row: &MemoryRow, statement: &CleanupStatement) -> bool {
    if statement.skip_locked() && row.locked {
        return false;
    }
    let mut tuple = Vec::with_capacity(statement.foreign_key_columns().len());
    for column in statement.foreign_key_columns() {
        match row.values.get(column).copied().flatten() {
            Some(value) => tuple.push(value),
            None => return false,
        }
    }
    statement
        .parent_keys()
        .iter()
        .any(|key| key.values() == tuple.as_slice())
}
