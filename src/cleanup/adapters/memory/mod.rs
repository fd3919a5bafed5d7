//! In-memory adapters for exercising the cleanup engine in tests.

mod database;
mod deleted_records;
mod metrics;

pub use database::InMemoryDatabase;
pub use deleted_records::InMemoryDeletedRecordStore;
pub use metrics::RecordingMetrics;
