//! Full-template rendering against the sample fixtures.

use sermon_templates::models::{Attachment, FilterAttributes, RenderData, Sermon, TemplateType};
use sermon_templates::templating::TagParser;
use sermon_templates::test_utils::{fixtures, init_test_logging};

const SEARCH_TEMPLATE: &str = r#"<div class="sermons">
<p>[sermons_count] sermons</p>
[sermons_loop]<div class="sermon">
<h3>[sermon_title]</h3>
<p>[preacher_link] [series_link] [biblepassage]</p>
</div>
[/sermons_loop]
<div class="nav">[previous_page][next_page]</div>
</div>"#;

const SINGLE_TEMPLATE: &str = r#"<h2>[sermon_title]</h2>
<p class="meta">[date] - [preacher_link] - [series_link] - [service_link]</p>
<ul>[files_loop]<li>[file_with_download]</li>[/files_loop]</ul>
[embed_loop]<div class="embed">[embed]</div>[/embed_loop]
<p>[tags]</p>
[next_sermon]"#;

#[test]
fn test_search_page() {
    init_test_logging(None);
    let html = TagParser::default().parse(SEARCH_TEMPLATE, &fixtures::search_page(), TemplateType::Search);

    assert!(html.contains("<p>2 sermons</p>"));
    assert!(html.contains(r#"<h3><a href="http://localhost/sermons/?sermon_id=1">Amazing Grace</a></h3>"#));
    assert!(html.contains(r#"<h3><a href="http://localhost/sermons/?sermon_id=2">Living Hope</a></h3>"#));
    assert!(html.contains(r#"<a href="http://localhost/sermons/?preacher=7">Ann Lee</a>"#));
    assert!(html.contains("Ephesians 2:1-10"));
    assert!(html.contains("1 Peter 1:3-9"));
    assert_eq!(html.matches(r#"<div class="sermon">"#).count(), 2);
    // two sermons on one page of ten: no pagination
    assert!(html.contains(r#"<div class="nav"></div>"#));
}

#[test]
fn test_single_page() {
    init_test_logging(None);
    let html = TagParser::default().parse(SINGLE_TEMPLATE, &fixtures::single_page(), TemplateType::Single);

    assert!(html.starts_with("<h2>Amazing Grace</h2>"));
    assert!(html.contains("March 10, 2024 - Ann Lee - Ephesians - Morning"));
    assert!(html.contains(r#"<li><a href="http://localhost/sermons/files/2024/grace.mp3">grace.mp3</a> "#));
    assert!(html.contains(
        r#"<li><a href="https://cdn.example/grace-notes.pdf">https://cdn.example/grace-notes.pdf</a> "#
    ));
    assert_eq!(html.matches("<li>").count(), 2);
    assert!(html.contains(r#"<div class="embed"><iframe src="https://video.example/1"></iframe></div>"#));
    assert!(html.contains(r#"<a href="http://localhost/sermons/?stag=grace">grace</a>"#));
    assert!(html.ends_with(r#"<a href="http://localhost/sermons/?sermon_id=2">Living Hope &raquo;</a>"#));
}

#[test]
fn test_single_page_without_sermon_degrades_gracefully() {
    let html = TagParser::default().parse(SINGLE_TEMPLATE, &RenderData::default(), TemplateType::Single);
    assert!(html.starts_with("<h2></h2>"));
    assert!(html.contains("<ul></ul>"));
    assert!(!html.contains("[files_loop]"));
}

#[test]
fn test_authored_brackets_survive() {
    let data = RenderData::single(Sermon::new(1, "Grace"));
    let html = TagParser::default().parse(
        "[caption id=\"1\"]Photo[/caption] [sermon_title] [unknown]",
        &data,
        TemplateType::Single,
    );
    assert_eq!(html, "[caption id=\"1\"]Photo[/caption] Grace [unknown]");
}

#[test]
fn test_media_overrides_sermon_attachments() {
    let mut data = fixtures::single_page();
    data.media = vec![Attachment::file("override.mp3")];
    let html = TagParser::default().parse("[files_loop][file][/files_loop]", &data, TemplateType::Single);
    assert_eq!(html, r#"<a href="http://localhost/sermons/files/override.mp3">override.mp3</a>"#);
}

#[test]
fn test_sermon_text_is_escaped() {
    let data = RenderData::single(Sermon::new(1, r#"<script>alert("x")</script> Faith \& Works"#));
    let html = TagParser::default().parse("[sermon_title]", &data, TemplateType::Single);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("Faith &amp; Works"));
}

#[test]
fn test_out_of_range_page_renders_without_next_link() {
    let data = RenderData {
        total: Some(u64::MAX),
        filter: FilterAttributes {
            page: u32::MAX,
            ..FilterAttributes::default()
        },
        ..RenderData::default()
    };
    let html = TagParser::default().parse("<nav>[next_page]</nav>", &data, TemplateType::Search);
    assert_eq!(html, "<nav></nav>");
}
