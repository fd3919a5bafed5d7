//! Loose foreign key definitions and their deletion policies.

use super::DefinitionError;
use super::error::ParseDeletePolicyError;
use serde::{Deserialize, Serialize};

/// Action applied to dependent rows once their parent row has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Remove the dependent rows entirely.
    AsyncDelete,
    /// Keep the dependent rows, setting the referencing column(s) to `NULL`.
    AsyncNullify,
}

impl DeletePolicy {
    /// Upper bound on child rows touched by one generated statement.
    ///
    /// `UPDATE` holds row locks longer than `DELETE` under concurrent
    /// traffic, so nullification runs with the smaller cap.
    #[must_use]
    pub const fn batch_cap(self) -> usize {
        match self {
            Self::AsyncDelete => 1000,
            Self::AsyncNullify => 500,
        }
    }

    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AsyncDelete => "async_delete",
            Self::AsyncNullify => "async_nullify",
        }
    }
}

impl TryFrom<&str> for DeletePolicy {
    type Error = ParseDeletePolicyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "async_delete" => Ok(Self::AsyncDelete),
            "async_nullify" => Ok(Self::AsyncNullify),
            _ => Err(ParseDeletePolicyError(value.to_owned())),
        }
    }
}

/// One loose foreign key relationship between a child and a parent table.
///
/// Definitions are supplied pre-parsed by the configuration loader and are
/// immutable once constructed; the registry only ever replaces the full set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDefinition {
    child_table: String,
    parent_table: String,
    foreign_key_columns: Vec<String>,
    delete_policy: DeletePolicy,
    schema_tag: String,
}

impl ForeignKeyDefinition {
    /// Creates a validated definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when a table name or column list is
    /// empty. Malformed definitions are a fatal configuration error.
    pub fn new(
        child_table: impl Into<String>,
        parent_table: impl Into<String>,
        foreign_key_columns: Vec<String>,
        delete_policy: DeletePolicy,
        schema_tag: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        let definition = Self {
            child_table: child_table.into(),
            parent_table: parent_table.into(),
            foreign_key_columns,
            delete_policy,
            schema_tag: schema_tag.into(),
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Validates table names and the column list.
    ///
    /// Deserialised definitions bypass [`Self::new`], so the registry calls
    /// this again at load time.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when a table name or column list is empty.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.child_table.trim().is_empty() {
            return Err(DefinitionError::EmptyChildTable);
        }
        if self.parent_table.trim().is_empty() {
            return Err(DefinitionError::EmptyParentTable);
        }
        if self.foreign_key_columns.is_empty() {
            return Err(DefinitionError::NoForeignKeyColumns {
                child_table: self.child_table.clone(),
                parent_table: self.parent_table.clone(),
            });
        }
        if self.foreign_key_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(DefinitionError::EmptyForeignKeyColumn {
                child_table: self.child_table.clone(),
            });
        }
        Ok(())
    }

    /// Returns the table holding the dependent rows.
    #[must_use]
    pub fn child_table(&self) -> &str {
        &self.child_table
    }

    /// Returns the table whose deletions trigger cleanup.
    #[must_use]
    pub fn parent_table(&self) -> &str {
        &self.parent_table
    }

    /// Returns the child columns referencing the parent's primary key, in
    /// the order the parent key values map onto them.
    #[must_use]
    pub fn foreign_key_columns(&self) -> &[String] {
        &self.foreign_key_columns
    }

    /// Returns the deletion policy for dependent rows.
    #[must_use]
    pub const fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Returns the logical schema the child table belongs to.
    ///
    /// Used for observability only; connection routing is the resolver's
    /// responsibility.
    #[must_use]
    pub fn schema_tag(&self) -> &str {
        &self.schema_tag
    }
}
