//! Recording metrics sink for tests.

use crate::cleanup::ports::CleanupMetrics;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Counters {
    processed_records: HashMap<(String, String), u64>,
    affected_rows: HashMap<(String, String), u64>,
}

/// Metrics sink that accumulates counters for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingMetrics {
    counters: Arc<RwLock<Counters>>,
}

impl RecordingMetrics {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the retired-record count for a parent table and connection.
    #[must_use]
    pub fn processed_records(&self, parent_table: &str, connection_name: &str) -> u64 {
        self.counters
            .read()
            .map(|counters| {
                counters
                    .processed_records
                    .get(&(parent_table.to_owned(), connection_name.to_owned()))
                    .copied()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// Returns the affected-row count for a child table and schema tag.
    #[must_use]
    pub fn affected_rows(&self, child_table: &str, schema_tag: &str) -> u64 {
        self.counters
            .read()
            .map(|counters| {
                counters
                    .affected_rows
                    .get(&(child_table.to_owned(), schema_tag.to_owned()))
                    .copied()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }
}

impl CleanupMetrics for RecordingMetrics {
    fn record_processed_records(&self, parent_table: &str, connection_name: &str, count: u64) {
        let Ok(mut counters) = self.counters.write() else {
            return;
        };
        *counters
            .processed_records
            .entry((parent_table.to_owned(), connection_name.to_owned()))
            .or_insert(0) += count;
    }

    fn record_affected_rows(&self, child_table: &str, schema_tag: &str, count: u64) {
        let Ok(mut counters) = self.counters.write() else {
            return;
        };
        *counters
            .affected_rows
            .entry((child_table.to_owned(), schema_tag.to_owned()))
            .or_insert(0) += count;
    }
}
