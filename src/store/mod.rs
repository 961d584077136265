//! Persisted options and ephemeral cache stores.
//!
//! The engine treats both stores as black boxes with plain get/set/delete
//! semantics. No transactions are required: the render cache is content
//! addressed, so concurrent writers for the same key always write equal
//! values, and option writes happen only from the single-writer template
//! editing and migration workflows.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: in-process store backed by `DashMap`, shared across
//!   threads without locking. Implements both traits.
//! - [`FileStore`]: a [`MemoryStore`] that loads from and saves to a JSON state
//!   file. Used by the command line so cache entries and templates survive
//!   between invocations.

mod file;
mod memory;

pub use file::{FileStore, StoreSnapshot};
pub use memory::{CacheEntry, MemoryStore};

use std::time::Duration;

use crate::core::TemplateError;

/// Persisted key/value configuration (template text, backups, version stamps).
pub trait OptionsStore: Send + Sync {
    /// Read an option; `None` when it was never set.
    fn get_option(&self, name: &str) -> Option<String>;

    /// Write an option, replacing any previous value.
    fn set_option(&self, name: &str, value: &str) -> Result<(), TemplateError>;

    /// Delete an option, returning whether it existed.
    fn delete_option(&self, name: &str) -> Result<bool, TemplateError>;
}

/// Ephemeral string cache with per-entry time-to-live.
pub trait CacheStore: Send + Sync {
    /// Read a live entry. Expired entries are reported as missing.
    fn get(&self, key: &str) -> Option<String>;

    /// Write an entry that expires after `ttl`.
    fn set(&self, key: &str, value: &str, ttl: Duration);

    /// Delete an entry, returning whether it existed.
    fn delete(&self, key: &str) -> bool;

    /// Keys of all entries starting with `prefix`, live or not yet evicted.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}
