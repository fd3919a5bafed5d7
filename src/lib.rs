//! Keyrake: asynchronous cleanup engine for loose foreign keys.
//!
//! Multi-database deployments cannot use native foreign key constraints
//! between tables hosted on different physical databases, because a
//! constraint cannot span connections. Keyrake is the replacement mechanism:
//! parent-row deletions are captured out of band as deleted-record events,
//! and this engine propagates each batch of events to the dependent tables,
//! emulating `ON DELETE CASCADE` and `ON DELETE SET NULL` with bounded,
//! idempotent statements.
//!
//! # Architecture
//!
//! Keyrake follows hexagonal architecture principles:
//!
//! - **Domain**: Pure cleanup logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`cleanup`]: relationship registry, statement generation, and batch
//!   orchestration for loose foreign key cleanup

pub mod cleanup;
