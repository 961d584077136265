//! One-time migration of stored templates to the current tag catalogue.
//!
//! Templates written for an older version of the engine may use tags that no
//! longer exist, and the old engine kept pre-rendered HTML in `{type}_output`
//! options that the current renderer never reads. [`TemplateMigrator`]
//! prepares a site for the current engine:
//!
//! ```text
//! 1. Backup
//!    └── Copy search_template / single_template to *_template_backup
//!        (only when no backup exists yet)
//!
//! 2. Audit
//!    └── Collect bracket tokens not in the tag catalogue (warnings only)
//!
//! 3. Cleanup
//!    ├── Delete search_output / single_output
//!    └── Clear cached renders
//!
//! 4. Stamp
//!    └── Record the engine version in template_engine_version
//! ```
//!
//! The backups are written before anything is deleted. If any later step
//! fails, the original templates can be put back with
//! [`TemplateMigrator::restore_backups`].
//!
//! Migration never rewrites template text. Unknown tags keep rendering as
//! their literal bracket text; the [`MigrationResult`] lists them for review.

pub mod backup;

use colored::Colorize;
use std::fmt;

use crate::constants::ENGINE_VERSION_OPTION;
use crate::core::TemplateError;
use crate::models::TemplateType;
use crate::templating::TemplateEngine;
use crate::templating::tags::TAG_PATTERN;
use backup::TemplateBackup;

/// Engine version recorded after a migration.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of a migration or a dry-run scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationResult {
    unknown_tags: Vec<String>,
    backed_up: Vec<TemplateType>,
    removed_outputs: usize,
    dry_run: bool,
}

impl MigrationResult {
    /// Tokens not in the tag catalogue, de-duplicated, in first-seen order.
    #[must_use]
    pub fn unknown_tags(&self) -> &[String] {
        &self.unknown_tags
    }

    /// Template types backed up by this run; existing backups are kept as is.
    #[must_use]
    pub fn backed_up(&self) -> &[TemplateType] {
        &self.backed_up
    }

    /// Number of legacy output options that were deleted.
    #[must_use]
    pub const fn removed_outputs(&self) -> usize {
        self.removed_outputs
    }

    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// `true` when every tag in the stored templates is known.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.unknown_tags.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.is_success()
    }

    /// Human-readable summary.
    #[must_use]
    pub fn message(&self) -> String {
        let action = if self.dry_run { "Template scan" } else { "Template migration" };
        if self.is_success() {
            format!("{action} completed successfully. All template tags are recognized.")
        } else {
            format!(
                "{action} completed with warnings. Unknown tags found: {}. \
                 These tags will be output as plain text; review your templates.",
                self.unknown_tags.join(", ")
            )
        }
    }
}

impl fmt::Display for MigrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            write!(f, "{} {}", "✓".green(), self.message())
        } else {
            write!(f, "{} {}", "⚠".yellow(), self.message().yellow())
        }
    }
}

/// Audits and prepares the stored templates of one engine.
pub struct TemplateMigrator<'a> {
    engine: &'a TemplateEngine,
}

impl<'a> TemplateMigrator<'a> {
    #[must_use]
    pub const fn new(engine: &'a TemplateEngine) -> Self {
        Self { engine }
    }

    /// Run the migration.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Store`] if a backup cannot be written (nothing
    /// has been deleted at that point) or if a later delete or write fails
    /// (backups are in place at that point).
    pub fn migrate(&self) -> Result<MigrationResult, TemplateError> {
        tracing::info!("Starting template migration to engine {}", ENGINE_VERSION);
        let options = self.engine.options();

        let mut backed_up = Vec::with_capacity(TemplateType::ALL.len());
        for template_type in TemplateType::ALL {
            let backup = TemplateBackup::new(options.clone(), template_type);
            if backup.create_backup()? {
                backed_up.push(template_type);
            }
        }

        let unknown_tags = self.unknown_tags(&self.stored_texts());

        let mut removed_outputs = 0;
        for template_type in TemplateType::ALL {
            let legacy = template_type.legacy_output_option();
            if options.delete_option(&legacy)? {
                tracing::debug!("Deleted legacy output option {}", legacy);
                removed_outputs += 1;
            }
        }
        self.engine.clear_cache();

        options.set_option(ENGINE_VERSION_OPTION, ENGINE_VERSION)?;

        let result = MigrationResult {
            unknown_tags,
            backed_up,
            removed_outputs,
            dry_run: false,
        };
        if result.has_warnings() {
            tracing::warn!("{}", result.message());
        } else {
            tracing::info!("{}", result.message());
        }
        Ok(result)
    }

    /// Classify the stored templates' tags without writing anything.
    #[must_use]
    pub fn scan(&self) -> MigrationResult {
        MigrationResult {
            unknown_tags: self.unknown_tags(&self.stored_texts()),
            dry_run: true,
            ..MigrationResult::default()
        }
    }

    /// Put every existing backup back in place and clear cached renders.
    ///
    /// Returns the template types that were restored.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::BackupMissing`] when no backup exists at all,
    /// or [`TemplateError::Store`] if a template cannot be written.
    pub fn restore_backups(&self) -> Result<Vec<TemplateType>, TemplateError> {
        let options = self.engine.options();
        let mut restored = Vec::new();
        for template_type in TemplateType::ALL {
            let backup = TemplateBackup::new(options.clone(), template_type);
            if backup.backup_exists() {
                backup.restore_backup()?;
                restored.push(template_type);
            }
        }

        if restored.is_empty() {
            return Err(TemplateError::BackupMissing {
                template_type: "any".to_string(),
            });
        }
        self.engine.clear_cache();
        Ok(restored)
    }

    /// Whether the stored version stamp differs from this engine's version.
    #[must_use]
    pub fn needs_migration(&self) -> bool {
        self.engine.options().get_option(ENGINE_VERSION_OPTION).as_deref() != Some(ENGINE_VERSION)
    }

    fn stored_texts(&self) -> Vec<String> {
        TemplateType::ALL.into_iter().map(|t| self.engine.template(t)).collect()
    }

    fn unknown_tags(&self, texts: &[String]) -> Vec<String> {
        let renderer = self.engine.parser().renderer();
        let mut unknown: Vec<String> = Vec::new();
        for text in texts {
            for caps in TAG_PATTERN.captures_iter(text) {
                let name = &caps[1];
                if !renderer.is_known(name) && !unknown.iter().any(|u| u == name) {
                    unknown.push(name.to_string());
                }
            }
        }
        unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CacheStore, MemoryStore, OptionsStore};
    use crate::templating::TagParser;
    use crate::test_utils::FailingOptionsStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn engine(store: Arc<MemoryStore>) -> TemplateEngine {
        TemplateEngine::new(TagParser::default(), store.clone(), store)
    }

    fn legacy_store(search: &str, single: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.set_option("search_template", search).unwrap();
        store.set_option("single_template", single).unwrap();
        store.set_option("search_output", "<old/>").unwrap();
        store.set_option("single_output", "<old/>").unwrap();
        store
    }

    #[test]
    fn test_unknown_tags_are_reported() {
        let store = legacy_store("[sermon_title] [legacy_tag]", "");
        let engine = engine(store);
        let result = TemplateMigrator::new(&engine).migrate().unwrap();

        assert!(!result.is_success());
        assert!(result.has_warnings());
        assert_eq!(result.unknown_tags(), ["legacy_tag".to_string()]);
        assert!(result.message().contains("legacy_tag"));
    }

    #[test]
    fn test_clean_templates_succeed() {
        let store = legacy_store(
            "[sermons_loop][sermon_title][/sermons_loop]",
            "[files_loop][file][/files_loop][passages_loop][passage][/passages_loop]",
        );
        let engine = engine(store);
        let result = TemplateMigrator::new(&engine).migrate().unwrap();

        assert!(result.is_success());
        assert!(result.message().contains("successfully"));
        assert_eq!(result.backed_up(), [TemplateType::Search, TemplateType::Single]);
    }

    #[test]
    fn test_migration_is_idempotent() {
        let store = legacy_store("[a] [b] [a] [sermon_title]", "[b] [/c]");
        let engine = engine(store);
        let migrator = TemplateMigrator::new(&engine);

        let first = migrator.migrate().unwrap();
        let second = migrator.migrate().unwrap();
        assert_eq!(first.unknown_tags(), ["a", "b", "/c"]);
        assert_eq!(first.unknown_tags(), second.unknown_tags());
        assert_eq!(first.removed_outputs(), 2);
        assert_eq!(second.removed_outputs(), 0);
    }

    #[test]
    fn test_rerun_keeps_original_backup() {
        let store = legacy_store("original", "");
        let engine = engine(store);
        let migrator = TemplateMigrator::new(&engine);

        migrator.migrate().unwrap();
        engine.save_template(TemplateType::Search, "edited [legacy_tag]").unwrap();
        let second = migrator.migrate().unwrap();

        assert!(second.backed_up().is_empty());
        assert_eq!(second.unknown_tags(), ["legacy_tag"]);

        migrator.restore_backups().unwrap();
        assert_eq!(engine.template(TemplateType::Search), "original");
    }

    #[test]
    fn test_backups_and_cleanup() {
        let store = legacy_store("search text", "single text");
        store.set("sb_template_search_abc", "cached", Duration::from_secs(60));
        let engine = engine(store.clone());
        let migrator = TemplateMigrator::new(&engine);
        assert!(migrator.needs_migration());

        migrator.migrate().unwrap();

        assert_eq!(store.get_option("search_template_backup").as_deref(), Some("search text"));
        assert_eq!(store.get_option("single_template_backup").as_deref(), Some("single text"));
        assert_eq!(store.get_option("search_output"), None);
        assert_eq!(store.get_option("single_output"), None);
        assert_eq!(store.get("sb_template_search_abc"), None);
        assert_eq!(store.get_option("template_engine_version").as_deref(), Some(ENGINE_VERSION));
        assert!(!migrator.needs_migration());
        // templates themselves are untouched
        assert_eq!(store.get_option("search_template").as_deref(), Some("search text"));
    }

    #[test]
    fn test_missing_templates_are_treated_as_empty() {
        let engine = engine(Arc::new(MemoryStore::new()));
        let result = TemplateMigrator::new(&engine).migrate().unwrap();
        assert!(result.is_success());
        assert_eq!(result.removed_outputs(), 0);
    }

    #[test]
    fn test_failed_backup_deletes_nothing() {
        let failing = FailingOptionsStore::new().fail_write("single_template_backup");
        failing.inner.set_option("single_template", "[sermon_title]").unwrap();
        failing.inner.set_option("single_output", "<old/>").unwrap();
        let options = Arc::new(failing);
        let engine = TemplateEngine::new(
            TagParser::default(),
            options.clone(),
            Arc::new(MemoryStore::new()),
        );

        let err = TemplateMigrator::new(&engine).migrate().unwrap_err();
        assert!(matches!(err, TemplateError::Store { .. }));
        assert_eq!(options.get_option("single_output").as_deref(), Some("<old/>"));
    }

    #[test]
    fn test_failed_cleanup_leaves_backups_in_place() {
        let failing = FailingOptionsStore::new().fail_delete("search_output");
        failing.inner.set_option("search_template", "original").unwrap();
        failing.inner.set_option("search_output", "<old/>").unwrap();
        let options = Arc::new(failing);
        let engine = TemplateEngine::new(
            TagParser::default(),
            options.clone(),
            Arc::new(MemoryStore::new()),
        );
        let migrator = TemplateMigrator::new(&engine);

        assert!(migrator.migrate().is_err());
        assert_eq!(options.get_option("search_template_backup").as_deref(), Some("original"));
        assert!(migrator.needs_migration());
    }

    #[test]
    fn test_scan_writes_nothing() {
        let store = legacy_store("[legacy_tag]", "");
        let engine = engine(store.clone());
        let result = TemplateMigrator::new(&engine).scan();

        assert!(result.is_dry_run());
        assert_eq!(result.unknown_tags(), ["legacy_tag"]);
        assert!(result.message().starts_with("Template scan"));
        assert_eq!(store.get_option("search_template_backup"), None);
        assert_eq!(store.get_option("search_output").as_deref(), Some("<old/>"));
    }

    #[test]
    fn test_restore_backups() {
        let store = legacy_store("original search", "original single");
        let engine = engine(store.clone());
        let migrator = TemplateMigrator::new(&engine);

        assert!(matches!(
            migrator.restore_backups(),
            Err(TemplateError::BackupMissing { .. })
        ));

        migrator.migrate().unwrap();
        engine.save_template(TemplateType::Search, "edited").unwrap();

        let restored = migrator.restore_backups().unwrap();
        assert_eq!(restored, vec![TemplateType::Search, TemplateType::Single]);
        assert_eq!(engine.template(TemplateType::Search), "original search");
    }
}
