//! Port contracts for loose foreign key cleanup.
//!
//! Ports define infrastructure-agnostic interfaces used by cleanup services.

pub mod deleted_records;
pub mod executor;
pub mod metrics;

pub use deleted_records::{DeletedRecordStore, DeletedRecordStoreError, DeletedRecordStoreResult};
pub use executor::{ConnectionResolver, ExecutorError, ExecutorResult, StatementExecutor};
pub use metrics::{CleanupMetrics, NoopMetrics};
