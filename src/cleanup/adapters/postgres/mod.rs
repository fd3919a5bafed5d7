//! `PostgreSQL` adapters for cleanup execution and the deleted-record log.

mod deleted_records;
mod executor;
mod models;
mod schema;

pub use deleted_records::PostgresDeletedRecordStore;
pub use executor::{CleanupPgPool, PostgresStatementExecutor, StaticConnectionResolver};
