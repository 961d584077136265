//! Core types and error handling shared by every other module.
//!
//! - [`TemplateError`] - typed failures surfaced to callers
//! - [`ErrorContext`] / [`user_friendly_error`] - terminal-friendly reporting

pub mod error;

pub use error::{ErrorContext, TemplateError, user_friendly_error};
