//! Narrow counter port for cleanup observability.

/// Counter sink incremented by the batch orchestrator.
///
/// Implementations map these onto whatever metrics backend the host process
/// runs; the engine only ever increments.
pub trait CleanupMetrics: Send + Sync {
    /// Counts deleted-record events retired for a parent table.
    fn record_processed_records(&self, parent_table: &str, connection_name: &str, count: u64);

    /// Counts child rows deleted or nullified for one relationship.
    fn record_affected_rows(&self, child_table: &str, schema_tag: &str, count: u64);
}

/// Metrics sink that discards every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl CleanupMetrics for NoopMetrics {
    fn record_processed_records(&self, _parent_table: &str, _connection_name: &str, _count: u64) {}

    fn record_affected_rows(&self, _child_table: &str, _schema_tag: &str, _count: u64) {}
}
