//! Global constants used throughout the template engine.
//!
//! Option names, cache key prefixes and the loop sentinel strings live here so
//! that the engine, the migrator and the command line agree on them.

use std::time::Duration;

/// Prefix shared by every rendered-template cache entry.
///
/// Keys have the form `sb_template_{type}_{digest}`. [`clear_cache`] relies on
/// this prefix to find the entries it owns.
///
/// [`clear_cache`]: crate::templating::TemplateEngine::clear_cache
pub const CACHE_KEY_PREFIX: &str = "sb_template_";

/// Lifetime of a rendered-template cache entry (one hour).
pub const TEMPLATE_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Suffix of the option holding a template's text (`search_template`, `single_template`).
pub const TEMPLATE_OPTION_SUFFIX: &str = "_template";

/// Suffix of the option holding a migration backup (`search_template_backup`).
pub const BACKUP_OPTION_SUFFIX: &str = "_template_backup";

/// Suffix of the legacy pre-rendered output option (`search_output`).
pub const LEGACY_OUTPUT_SUFFIX: &str = "_output";

/// Option stamped with the crate version once migration has run.
pub const ENGINE_VERSION_OPTION: &str = "template_engine_version";

/// Sentinel emitted by `[sermons_loop]`.
pub const SERMONS_LOOP_START: &str = "{{SERMONS_LOOP_START}}";
/// Sentinel emitted by `[/sermons_loop]`.
pub const SERMONS_LOOP_END: &str = "{{SERMONS_LOOP_END}}";
/// Sentinel emitted by `[files_loop]`.
pub const FILES_LOOP_START: &str = "{{FILES_LOOP_START}}";
/// Sentinel emitted by `[/files_loop]`.
pub const FILES_LOOP_END: &str = "{{FILES_LOOP_END}}";
/// Sentinel emitted by `[embed_loop]`.
pub const EMBED_LOOP_START: &str = "{{EMBED_LOOP_START}}";
/// Sentinel emitted by `[/embed_loop]`.
pub const EMBED_LOOP_END: &str = "{{EMBED_LOOP_END}}";
/// Sentinel emitted by `[passages_loop]`.
pub const PASSAGES_LOOP_START: &str = "{{PASSAGES_LOOP_START}}";
/// Sentinel emitted by `[/passages_loop]`.
pub const PASSAGES_LOOP_END: &str = "{{PASSAGES_LOOP_END}}";

/// Default number of sermons shown per listing page.
pub const DEFAULT_SERMONS_PER_PAGE: u32 = 10;

/// Default `chrono` format for the `[date]` tag.
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "SERMON_TEMPLATES_CONFIG";
