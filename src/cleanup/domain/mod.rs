//! Domain model for loose foreign key cleanup.
//!
//! The cleanup domain models relationship definitions, captured parent-row
//! deletions, and bounded statement generation while keeping all
//! infrastructure concerns outside of the domain boundary.

mod definition;
mod error;
mod record;
mod registry;
mod statement;

pub use definition::{DeletePolicy, ForeignKeyDefinition};
pub use error::{
    DefinitionError, ParseDeletePolicyError, ParseRecordStatusError, StatementBuildError,
};
pub use record::{DeletedRecord, ParentKey, RecordId, RecordStatus};
pub use registry::{RelationshipRegistry, bare_table_name};
pub use statement::{CleanupOptions, CleanupStatement};
