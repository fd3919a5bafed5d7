//! Unit tests for the cleanup module.
//!
//! Tests are organised by component and driven through the in-memory
//! adapters, covering happy paths, error cases, and edge cases for all
//! public APIs.

mod cleaner_tests;
mod domain_tests;
