//! Structured cleanup statements and their SQL rendering.
//!
//! A statement is built from one relationship definition plus a batch of
//! parent key values, and stays structured until an adapter renders or
//! interprets it. The structure carries everything the runtime safety
//! assertion needs, so the check never depends on SQL text formatting.

use super::{DeletePolicy, ForeignKeyDefinition, ParentKey, StatementBuildError};
use std::collections::BTreeSet;

/// Options controlling statement generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Append `FOR UPDATE SKIP LOCKED` to the inner selector so rows locked
    /// by concurrent writers are skipped instead of awaited. Skipped rows
    /// are picked up by a later blocking pass before their deleted-record
    /// events are retired.
    pub skip_locked: bool,
}

impl CleanupOptions {
    /// Options with the skip-locked clause enabled.
    #[must_use]
    pub const fn skipping_locked_rows() -> Self {
        Self { skip_locked: true }
    }
}

/// A bounded `DELETE`/`UPDATE` statement targeting one child table.
///
/// The inner selector picks at most [`DeletePolicy::batch_cap`] child rows
/// whose foreign key column(s) match the batch of parent keys; the outer
/// statement deletes or nullifies exactly those rows by primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupStatement {
    child_table: String,
    policy: DeletePolicy,
    primary_key_columns: Vec<String>,
    foreign_key_columns: Vec<String>,
    parent_keys: Vec<ParentKey>,
    limit: usize,
    skip_locked: bool,
}

impl CleanupStatement {
    /// Builds a statement for one relationship and a batch of parent keys.
    ///
    /// Parent keys are deduplicated and ordered deterministically, keeping
    /// the generated `IN` list compact.
    ///
    /// # Errors
    ///
    /// Returns [`StatementBuildError`] when the batch is empty, the child
    /// table reports no primary key, or a key's arity does not match the
    /// definition's foreign key columns.
    pub fn build(
        definition: &ForeignKeyDefinition,
        primary_key_columns: &[String],
        parent_keys: &[ParentKey],
        options: CleanupOptions,
    ) -> Result<Self, StatementBuildError> {
        if parent_keys.is_empty() {
            return Err(StatementBuildError::EmptyParentKeyBatch {
                child_table: definition.child_table().to_owned(),
            });
        }
        if primary_key_columns.is_empty() {
            return Err(StatementBuildError::MissingPrimaryKey {
                child_table: definition.child_table().to_owned(),
            });
        }

        let expected = definition.foreign_key_columns().len();
        if let Some(mismatch) = parent_keys.iter().find(|key| key.arity() != expected) {
            return Err(StatementBuildError::KeyArityMismatch {
                child_table: definition.child_table().to_owned(),
                expected,
                actual: mismatch.arity(),
            });
        }

        let deduplicated: BTreeSet<ParentKey> = parent_keys.iter().cloned().collect();

        Ok(Self {
            child_table: definition.child_table().to_owned(),
            policy: definition.delete_policy(),
            primary_key_columns: primary_key_columns.to_vec(),
            foreign_key_columns: definition.foreign_key_columns().to_vec(),
            parent_keys: deduplicated.into_iter().collect(),
            limit: definition.delete_policy().batch_cap(),
            skip_locked: options.skip_locked,
        })
    }

    /// Returns the table the statement targets.
    #[must_use]
    pub fn child_table(&self) -> &str {
        &self.child_table
    }

    /// Returns the deletion policy the statement applies.
    #[must_use]
    pub const fn policy(&self) -> DeletePolicy {
        self.policy
    }

    /// Returns the child primary key columns driving the outer statement.
    #[must_use]
    pub fn primary_key_columns(&self) -> &[String] {
        &self.primary_key_columns
    }

    /// Returns the foreign key columns in the inner predicate.
    #[must_use]
    pub fn foreign_key_columns(&self) -> &[String] {
        &self.foreign_key_columns
    }

    /// Returns the deduplicated parent key values.
    #[must_use]
    pub fn parent_keys(&self) -> &[ParentKey] {
        &self.parent_keys
    }

    /// Returns the row cap on the inner selector.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Returns whether the inner selector skips locked rows.
    #[must_use]
    pub const fn skip_locked(&self) -> bool {
        self.skip_locked
    }

    /// Returns true when the inner predicate references the given column.
    ///
    /// The safety assertion in the cleaner uses this to verify that every
    /// foreign key column actually constrains the statement.
    #[must_use]
    pub fn references_column(&self, column: &str) -> bool {
        self.foreign_key_columns.iter().any(|c| c == column)
    }

    /// Renders the statement as `PostgreSQL` text.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let inner = self.inner_selector();
        let target = self.qualified_tuple(&self.primary_key_columns);
        match self.policy {
            DeletePolicy::AsyncDelete => {
                format!(
                    r#"DELETE FROM "{}" WHERE {target} IN ({inner})"#,
                    self.child_table
                )
            }
            DeletePolicy::AsyncNullify => {
                let assignments = self
                    .foreign_key_columns
                    .iter()
                    .map(|column| format!(r#""{column}" = NULL"#))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    r#"UPDATE "{}" SET {assignments} WHERE {target} IN ({inner})"#,
                    self.child_table
                )
            }
        }
    }

    /// Builds the inner selector bounding the statement.
    fn inner_selector(&self) -> String {
        let columns = self.qualified_list(&self.primary_key_columns);
        let locking = if self.skip_locked {
            " FOR UPDATE SKIP LOCKED"
        } else {
            ""
        };
        format!(
            r#"SELECT {columns} FROM "{table}" WHERE {predicate} LIMIT {limit}{locking}"#,
            table = self.child_table,
            predicate = self.foreign_key_predicate(),
            limit = self.limit,
        )
    }

    /// Builds the `IN` predicate matching the parent key batch.
    fn foreign_key_predicate(&self) -> String {
        let values = self
            .parent_keys
            .iter()
            .map(render_key)
            .collect::<Vec<_>>()
            .join(", ");
        // A single-column key compares the bare column; a multi-column key
        // compares the full tuple so row identity is preserved.
        let lhs = if self.foreign_key_columns.len() == 1 {
            self.qualified_list(&self.foreign_key_columns)
        } else {
            format!("({})", self.qualified_list(&self.foreign_key_columns))
        };
        format!("{lhs} IN ({values})")
    }

    /// Renders columns as a comma-separated qualified list.
    fn qualified_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| format!(r#""{}"."{column}""#, self.child_table))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders columns as a qualified tuple. Parenthesised even for a single
    /// column, matching the driving-set comparison shape.
    fn qualified_tuple(&self, columns: &[String]) -> String {
        format!("({})", self.qualified_list(columns))
    }

    /// Replaces the predicate columns. Test seam for exercising the safety
    /// assertion against a deliberately broken statement.
    #[cfg(test)]
    pub(crate) fn with_foreign_key_columns(mut self, columns: Vec<String>) -> Self {
        self.foreign_key_columns = columns;
        self
    }
}

/// Renders one parent key value for the `IN` list.
fn render_key(key: &ParentKey) -> String {
    match key {
        ParentKey::Scalar(value) => value.to_string(),
        ParentKey::Composite(values) => {
            let joined = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("({joined})")
        }
    }
}
