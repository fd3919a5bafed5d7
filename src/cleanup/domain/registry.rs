//! Registry of loose foreign key definitions, grouped by parent table.

use super::{DefinitionError, ForeignKeyDefinition};
use std::collections::HashMap;

/// Strips any schema qualifier from a table name.
///
/// `public.projects` and `projects` both resolve to `projects`.
#[must_use]
pub fn bare_table_name(table_name: &str) -> &str {
    table_name.rsplit('.').next().unwrap_or(table_name)
}

/// Immutable lookup of loose foreign key definitions by parent table.
///
/// Built once from the pre-parsed configuration at process start and shared
/// read-only for the process lifetime; replacing the definition set means
/// replacing the registry.
#[derive(Debug, Clone, Default)]
pub struct RelationshipRegistry {
    by_parent_table: HashMap<String, Vec<ForeignKeyDefinition>>,
}

impl RelationshipRegistry {
    /// Builds a registry from pre-parsed definitions, preserving load order
    /// within each parent table.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when any definition is malformed. This is
    /// fatal: the process must not start with an inconsistent registry.
    pub fn new(definitions: Vec<ForeignKeyDefinition>) -> Result<Self, DefinitionError> {
        let mut by_parent_table: HashMap<String, Vec<ForeignKeyDefinition>> = HashMap::new();
        for definition in definitions {
            definition.validate()?;
            by_parent_table
                .entry(bare_table_name(definition.parent_table()).to_owned())
                .or_default()
                .push(definition);
        }
        Ok(Self { by_parent_table })
    }

    /// Returns the definitions whose parent table matches, in load order.
    ///
    /// Accepts schema-qualified or bare names; returns an empty slice when
    /// the table has no dependents. Never fails after a successful load.
    #[must_use]
    pub fn definitions_for_parent_table(&self, table_name: &str) -> &[ForeignKeyDefinition] {
        self.by_parent_table
            .get(bare_table_name(table_name))
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the parent tables that have registered dependents.
    pub fn parent_tables(&self) -> impl Iterator<Item = &str> {
        self.by_parent_table.keys().map(String::as_str)
    }

    /// Returns the total number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_parent_table.values().map(Vec::len).sum()
    }

    /// Returns true when no definitions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_parent_table.is_empty()
    }
}
