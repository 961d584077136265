//! Error handling for the sermon template engine
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`TemplateError`]) for the few conditions that
//!    callers must be able to match on
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for the command line
//!
//! Rendering itself almost never fails: missing data renders as empty text and
//! unknown tags pass through untouched. What remains is programmer error (an
//! unrecognized template type) and store failures during migration or when a
//! template is saved.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sermon_templates::core::{TemplateError, user_friendly_error};
//!
//! let err = TemplateError::InvalidTemplateType {
//!     value: "archive".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for template engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A template type other than `search` or `single` was requested.
    #[error("Invalid template type: '{value}' (expected 'search' or 'single')")]
    InvalidTemplateType {
        /// The rejected value
        value: String,
    },

    /// The options store refused a write or delete.
    #[error("Store {operation} failed for '{key}': {reason}")]
    Store {
        /// `write` or `delete`
        operation: String,
        /// Option name involved
        key: String,
        /// Backend-specific reason
        reason: String,
    },

    /// No migration backup exists to restore from.
    #[error("No template backup found for '{template_type}'")]
    BackupMissing {
        /// Template type, or `any` when both slots are empty
        template_type: String,
    },

    /// Configuration could not be used.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl TemplateError {
    /// Build a [`TemplateError::Store`] for a failed write.
    pub fn store_write(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Store {
            operation: "write".to_string(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`TemplateError::Store`] for a failed delete.
    pub fn store_delete(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Store {
            operation: "delete".to_string(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Error wrapper carrying a suggestion and extra details for terminal output.
#[derive(Debug)]
pub struct ErrorContext {
    /// Human-readable headline
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with only a headline.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(template_error) = error.downcast_ref::<TemplateError>() {
        return context_for(template_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(format!("{error:#}"))
                    .with_suggestion("Check the ownership and permissions of the state file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(format!("{error:#}"))
                    .with_suggestion("Check that the file exists and the path is correct");
            }
            _ => {}
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(format!("{error:#}"))
            .with_suggestion("Check the TOML syntax of the configuration file")
            .with_details("Parsing errors are usually missing quotes or mismatched brackets");
    }

    if error.downcast_ref::<serde_json::Error>().is_some() {
        return ErrorContext::new(format!("{error:#}"))
            .with_suggestion("Check that the render data or state file is valid JSON");
    }

    ErrorContext::new(format!("{error:#}"))
}

fn context_for(error: &TemplateError) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());
    match error {
        TemplateError::InvalidTemplateType { .. } => {
            ctx.with_suggestion("Use one of the two template slots: 'search' or 'single'")
        }
        TemplateError::Store { .. } => ctx
            .with_suggestion("Check that the state file is writable")
            .with_details("Template backups are written before anything is deleted"),
        TemplateError::BackupMissing { .. } => {
            ctx.with_suggestion("Run 'sermon-templates migrate' to create backups first")
        }
        TemplateError::Config { .. } => ctx.with_suggestion(
            "Check the configuration file, or set SERMON_TEMPLATES_CONFIG to another path",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_type_message() {
        let err = TemplateError::InvalidTemplateType {
            value: "archive".to_string(),
        };
        assert!(err.to_string().contains("'archive'"));
    }

    #[test]
    fn test_user_friendly_error_for_template_error() {
        let err = anyhow::Error::from(TemplateError::store_write(
            "search_template_backup",
            "disk full",
        ));
        let ctx = user_friendly_error(err);
        assert!(ctx.message.contains("search_template_backup"));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new("boom").with_details("why").with_suggestion("fix it");
        assert_eq!(ctx.to_string(), "boom\nDetails: why\nSuggestion: fix it");
    }

    #[test]
    fn test_user_friendly_error_falls_back_to_message() {
        let ctx = user_friendly_error(anyhow::anyhow!("something odd"));
        assert_eq!(ctx.message, "something odd");
        assert!(ctx.suggestion.is_none());
    }
}
