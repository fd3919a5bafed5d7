//! Adapter implementations of the cleanup ports.

pub mod memory;
pub mod postgres;
