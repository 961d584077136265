//! Sermon Templates - a tag template engine for sermon pages
//!
//! Renders church sermon records into publish-ready HTML using
//! author-editable templates made of bracket tags (`[sermon_title]`) and
//! repeating sections (`[sermons_loop]...[/sermons_loop]`).
//!
//! # Architecture Overview
//!
//! The engine consumes plain data and hands back one HTML string. Everything
//! else (where sermons are stored, how templates are edited, how the HTML is
//! served) belongs to the caller and is reached through small traits.
//!
//! ```text
//! TemplateEngine ──> TagParser ──> TagRenderer ──> Collaborators
//!      │                                            (URLs, passages,
//!      ├── OptionsStore (templates, backups)         shortcodes, widgets)
//!      └── CacheStore   (rendered HTML, 1h TTL)
//!
//! TemplateMigrator ──> OptionsStore (backup, audit, cleanup)
//! ```
//!
//! # Core Modules
//!
//! - [`templating`] - tag catalogue, parser, engine and render cache keys
//! - [`upgrade`] - one-time migration of legacy templates with backups
//! - [`models`] - sermon records and per-request [`RenderData`](models::RenderData)
//! - [`store`] - options and cache store traits with memory and file backends
//!
//! ## Supporting Modules
//! - [`core`] - error types and user-facing error formatting
//! - [`config`] - site configuration for the command line
//! - [`cli`] - the `sermon-templates` command line
//! - [`constants`] - option names, cache prefix and loop sentinels
//!
//! # Rendering Rules
//!
//! - Unknown bracket tokens are copied to the output unchanged.
//! - Missing data (no sermon, empty lists, no template) renders as empty text.
//! - A loop over an empty collection removes the whole section.
//! - Only an unrecognized template type is an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sermon_templates::models::{RenderData, Sermon, TemplateType};
//! use sermon_templates::store::MemoryStore;
//! use sermon_templates::templating::{TagParser, TemplateEngine};
//!
//! # fn main() -> Result<(), sermon_templates::core::TemplateError> {
//! let store = Arc::new(MemoryStore::new());
//! let engine = TemplateEngine::new(TagParser::default(), store.clone(), store);
//! engine.save_template(TemplateType::Search, "<ul>[sermons_loop]<li>[sermon_title]</li>[/sermons_loop]</ul>")?;
//!
//! let data = RenderData::search(vec![Sermon::new(1, "A"), Sermon::new(2, "B")]);
//! let html = engine.render("search", &data, false)?;
//! # Ok(())
//! # }
//! ```

// Template engine
pub mod templating;
pub mod upgrade;

// Data and storage
pub mod models;
pub mod store;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
