//! Integration test suite for the sermon template engine
//!
//! These tests exercise the public API end to end: templates stored in an
//! options store, rendered through the engine with the built-in
//! collaborators, migrated, and driven through the command line.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **rendering**: full templates against the sample fixtures
//! - **engine**: caching across renders and stores
//! - **migration**: migrate / restore workflows
//! - **cli**: the `sermon-templates` binary

mod cli;
mod engine;
mod migration;
mod rendering;
