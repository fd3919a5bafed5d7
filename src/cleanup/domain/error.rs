//! Error types for cleanup domain validation and parsing.

use thiserror::Error;

/// Errors returned while validating loose foreign key definitions.
///
/// Any of these at registry load time means the configuration is
/// inconsistent; the process must not start.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The child table name is empty after trimming.
    #[error("child table name must not be empty")]
    EmptyChildTable,

    /// The parent table name is empty after trimming.
    #[error("parent table name must not be empty")]
    EmptyParentTable,

    /// The definition lists no foreign key columns.
    #[error("definition {child_table} -> {parent_table} has no foreign key columns")]
    NoForeignKeyColumns {
        /// Table holding the dependent rows.
        child_table: String,
        /// Table whose deletions trigger cleanup.
        parent_table: String,
    },

    /// A foreign key column name is empty after trimming.
    #[error("definition for {child_table} has an empty foreign key column name")]
    EmptyForeignKeyColumn {
        /// Table holding the dependent rows.
        child_table: String,
    },
}

/// Errors returned while building a cleanup statement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatementBuildError {
    /// No parent key values were supplied. An empty batch must never reach
    /// the builder; without a key predicate the statement would match every
    /// row of the child table.
    #[error("no parent key values supplied for {child_table}")]
    EmptyParentKeyBatch {
        /// Table the statement would have targeted.
        child_table: String,
    },

    /// The child table reports no primary key columns.
    #[error("child table {child_table} has no primary key columns")]
    MissingPrimaryKey {
        /// Table the statement would have targeted.
        child_table: String,
    },

    /// A parent key's arity does not match the definition's column count.
    #[error(
        "parent key arity {actual} does not match {expected} foreign key column(s) on {child_table}"
    )]
    KeyArityMismatch {
        /// Table the statement would have targeted.
        child_table: String,
        /// Number of foreign key columns in the definition.
        expected: usize,
        /// Arity of the offending parent key value.
        actual: usize,
    },
}

/// Error returned while parsing delete policies from configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid on_delete argument: {0}")]
pub struct ParseDeletePolicyError(pub String);

/// Error returned while parsing deleted-record statuses from persistence.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("unknown deleted record status: {0}")]
pub struct ParseRecordStatusError(pub i16);
