use std::collections::HashSet;

use crate::core::TemplateError;
use crate::store::{MemoryStore, OptionsStore};

/// Options store that rejects writes or deletes of chosen option names.
///
/// Reads and all other writes go to an inner [`MemoryStore`], which tests can
/// inspect afterwards to verify what happened before the failure.
#[derive(Debug, Default)]
pub struct FailingOptionsStore {
    pub inner: MemoryStore,
    fail_writes: HashSet<String>,
    fail_deletes: HashSet<String>,
}

impl FailingOptionsStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fail_write(mut self, name: impl Into<String>) -> Self {
        self.fail_writes.insert(name.into());
        self
    }

    #[must_use]
    pub fn fail_delete(mut self, name: impl Into<String>) -> Self {
        self.fail_deletes.insert(name.into());
        self
    }
}

impl OptionsStore for FailingOptionsStore {
    fn get_option(&self, name: &str) -> Option<String> {
        self.inner.get_option(name)
    }

    fn set_option(&self, name: &str, value: &str) -> Result<(), TemplateError> {
        if self.fail_writes.contains(name) {
            return Err(TemplateError::store_write(name, "simulated write failure"));
        }
        self.inner.set_option(name, value)
    }

    fn delete_option(&self, name: &str) -> Result<bool, TemplateError> {
        if self.fail_deletes.contains(name) {
            return Err(TemplateError::store_delete(name, "simulated delete failure"));
        }
        self.inner.delete_option(name)
    }
}
