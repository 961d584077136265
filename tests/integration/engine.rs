//! Engine caching across renders.

use std::sync::Arc;
use std::thread;

use sermon_templates::models::TemplateType;
use sermon_templates::store::{CacheStore, MemoryStore};
use sermon_templates::templating::{RenderStats, TagParser, TemplateEngine};
use sermon_templates::test_utils::fixtures;

fn engine() -> (Arc<TemplateEngine>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = TemplateEngine::new(TagParser::default(), store.clone(), store.clone());
    engine
        .save_template(TemplateType::Search, "[sermons_loop]<p>[sermon_title]</p>[/sermons_loop]")
        .unwrap();
    engine.save_template(TemplateType::Single, "<h1>[sermon_title]</h1>").unwrap();
    (Arc::new(engine), store)
}

#[test]
fn test_repeated_requests_share_one_render() {
    let (engine, store) = engine();
    let data = fixtures::search_page();

    let first = engine.render("search", &data, false).unwrap();
    let second = engine.render("search", &data, false).unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.stats(), RenderStats { hits: 1, misses: 1 });
    assert_eq!(store.keys_with_prefix("sb_template_search_").len(), 1);
}

#[test]
fn test_concurrent_renders_agree() {
    let (engine, store) = engine();
    let data = Arc::new(fixtures::single_page());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let data = Arc::clone(&data);
            thread::spawn(move || engine.render("single", &data, false).unwrap())
        })
        .collect();
    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(outputs.iter().all(|html| html == "<h1>Amazing Grace</h1>"));
    assert_eq!(engine.stats().total(), 8);
    assert_eq!(store.keys_with_prefix("sb_template_single_").len(), 1);
}

#[test]
fn test_editing_a_template_is_visible_immediately() {
    let (engine, _) = engine();
    let data = fixtures::single_page();
    assert_eq!(engine.render("single", &data, false).unwrap(), "<h1>Amazing Grace</h1>");

    engine.save_template(TemplateType::Single, "<h2>[sermon_title]</h2>").unwrap();
    assert_eq!(engine.render("single", &data, false).unwrap(), "<h2>Amazing Grace</h2>");
}
