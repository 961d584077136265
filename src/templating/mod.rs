//! Sermon template tag engine.
//!
//! Templates are author-editable HTML containing bracket tags such as
//! `[sermon_title]` and loop sections such as
//! `[sermons_loop]...[/sermons_loop]`. This module turns a stored template and
//! per-request [`RenderData`](crate::models::RenderData) into HTML.
//!
//! # Components
//!
//! - [`TagRenderer`] ([`tags`]): maps one tag name to a string. Loop markers
//!   render to reserved sentinels.
//! - [`TagParser`] ([`parser`]): resolves loop sections per item, then
//!   substitutes the remaining tags.
//! - [`TemplateEngine`] ([`engine`]): loads the stored template, caches the
//!   result under a content-addressed key ([`cache`]).
//! - [`collaborators`]: URL building, passage formatting, shortcodes and
//!   presentation widgets the tags delegate to.
//! - [`filters`]: escaping helpers for sermon-authored text.
//!
//! # Template Syntax
//!
//! There is no expression language: no conditionals, no arithmetic, no
//! variables. A template is literal text plus:
//!
//! - **Tags**: `[name]` where `name` is in [`TagRenderer::available_tags`].
//!   Any other bracket token is left exactly as written, so templates may
//!   contain unrelated square-bracket markup.
//! - **Loops**: `[kind_loop]...[/kind_loop]` for `sermons`, `files`, `embed`
//!   and `passages`. The body is rendered once per item; an empty collection
//!   removes the section.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sermon_templates::models::{RenderData, Sermon, TemplateType};
//! use sermon_templates::templating::TagParser;
//!
//! let data = RenderData::search(vec![Sermon::new(1, "A"), Sermon::new(2, "B")]);
//! let html = TagParser::default().parse(
//!     "<ul>[sermons_loop]<li>[sermon_title]</li>[/sermons_loop]</ul>",
//!     &data,
//!     TemplateType::Single,
//! );
//! assert_eq!(html, "<ul><li>A</li><li>B</li></ul>");
//! ```

pub mod cache;
pub mod collaborators;
pub mod engine;
pub mod filters;
pub mod parser;
pub mod tags;

pub use cache::{RenderCacheKey, RenderStats};
pub use collaborators::{Collaborators, SiteUrls};
pub use engine::TemplateEngine;
pub use parser::TagParser;
pub use tags::{LoopKind, TagRenderer, TagScope};
