//! Loose foreign key cleanup for partitioned multi-database schemas.
//!
//! A loose foreign key is a relationship enforced by application logic
//! instead of a database constraint. When a parent row is deleted, a capture
//! mechanism (a trigger, outside this crate) records a deleted-record event;
//! an external scheduler then hands batches of those events to this module,
//! which deletes or nullifies the dependent child rows and retires the
//! processed events. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
