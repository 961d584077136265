//! Test utilities for the sermon template engine
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests:
//! - [`init_test_logging`] installs a test-friendly tracing subscriber once
//! - [`fixtures`] builds representative sermons and render data
//! - [`FailingOptionsStore`] simulates an options store that rejects writes
//!
//! # Example
//!
//! ```rust,no_run
//! use sermon_templates::test_utils::{fixtures, init_test_logging};
//!
//! init_test_logging(None);
//! let data = fixtures::search_page();
//! assert_eq!(data.sermons.len(), 2);
//! ```

pub mod fixtures;
mod store;

pub use store::FailingOptionsStore;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays
/// off. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=sermon_templates=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
