//! Migrate and restore workflows.

use std::sync::Arc;

use sermon_templates::models::{RenderData, Sermon, TemplateType};
use sermon_templates::store::{MemoryStore, OptionsStore};
use sermon_templates::templating::{TagParser, TemplateEngine};
use sermon_templates::upgrade::TemplateMigrator;

fn legacy_site(search: &str, single: &str) -> (TemplateEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.set_option("search_template", search).unwrap();
    store.set_option("single_template", single).unwrap();
    store.set_option("search_output", "<?php echo 'old'; ?>").unwrap();
    store.set_option("single_output", "<?php echo 'old'; ?>").unwrap();
    let engine = TemplateEngine::new(TagParser::default(), store.clone(), store.clone());
    (engine, store)
}

#[test]
fn test_legacy_tag_is_reported() {
    let (engine, _) = legacy_site("[sermon_title] [legacy_tag]", "");
    let result = TemplateMigrator::new(&engine).migrate().unwrap();

    assert!(!result.is_success());
    assert_eq!(result.unknown_tags(), ["legacy_tag"]);
}

#[test]
fn test_loop_markers_are_never_unknown() {
    let template = "[sermons_loop][files_loop][/files_loop][embed_loop][/embed_loop]\
                    [passages_loop][/passages_loop][/sermons_loop]";
    let (engine, _) = legacy_site(template, template);
    let migrator = TemplateMigrator::new(&engine);

    let first = migrator.migrate().unwrap();
    let second = migrator.migrate().unwrap();
    assert!(first.is_success());
    assert_eq!(first.unknown_tags(), second.unknown_tags());
}

#[test]
fn test_templates_still_render_after_migration() {
    let (engine, store) = legacy_site("", "<h1>[sermon_title]</h1>[legacy_tag]");
    TemplateMigrator::new(&engine).migrate().unwrap();

    assert_eq!(store.get_option("single_output"), None);
    let html = engine
        .render("single", &RenderData::single(Sermon::new(1, "Grace")), false)
        .unwrap();
    assert_eq!(html, "<h1>Grace</h1>[legacy_tag]");
}

#[test]
fn test_restore_after_bad_edit() {
    let (engine, _) = legacy_site("original", "<h1>[sermon_title]</h1>");
    let migrator = TemplateMigrator::new(&engine);
    migrator.migrate().unwrap();

    engine.save_template(TemplateType::Single, "broken").unwrap();
    migrator.restore_backups().unwrap();

    assert_eq!(engine.template(TemplateType::Single), "<h1>[sermon_title]</h1>");
    assert_eq!(engine.template(TemplateType::Search), "original");
}
