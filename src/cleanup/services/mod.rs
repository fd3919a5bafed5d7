//! Application services for loose foreign key cleanup.

mod batch;
mod cleaner;

pub use batch::{BatchCleanerError, BatchCleanerService};
pub use cleaner::{CleanerError, CleanerService, CleanupOutcome};
