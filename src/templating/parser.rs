//! Template parsing: loop resolution followed by tag substitution.
//!
//! A template is processed in three stages:
//!
//! 1. Loop marker tags (`[sermons_loop]`, `[/files_loop]`, ...) are rendered to
//!    their sentinels and the text is split into segments at each sentinel.
//! 2. For each [`LoopKind`] in turn, start and end markers of that kind are
//!    paired and every section is replaced by the concatenated output of its
//!    body, rendered once per collection item in an item-scoped [`TagScope`].
//! 3. The remaining template text has its bracket tags substituted against the
//!    top-level scope.
//!
//! Output produced by stage 2 or 3 is never scanned again, so sermon text that
//! contains bracket tags is emitted as written.
//!
//! # Nesting
//!
//! Loops of different kinds nest naturally: a `files_loop` inside a
//! `sermons_loop` iterates the attachments of each sermon. Loops of the same
//! kind are paired innermost-first; each end marker closes the nearest open
//! start marker. The inner section is rendered in the enclosing scope before
//! the outer section repeats it.
//!
//! Markers that cannot be paired are emitted as their literal bracket text and
//! logged at `warn` level.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::tags::{LoopKind, TAG_PATTERN, TagRenderer, TagScope};
use crate::models::{RenderContext, RenderData};

static SENTINEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{[A-Z]+_LOOP_(?:START|END)\}\}").expect("sentinel pattern is valid")
});

#[derive(Debug, Clone)]
enum Segment {
    /// Template text that still needs tag substitution
    Text(String),
    /// A loop boundary
    Marker { kind: LoopKind, end: bool },
    /// Final output, never rescanned
    Rendered(String),
}

/// Literal bracket text of a loop marker.
fn marker_text(kind: LoopKind, end: bool) -> String {
    let name = if end { kind.end_tag() } else { kind.start_tag() };
    format!("[{name}]")
}

/// Expands a template against [`RenderData`].
#[derive(Debug, Default)]
pub struct TagParser {
    renderer: TagRenderer,
}

impl TagParser {
    #[must_use]
    pub const fn new(renderer: TagRenderer) -> Self {
        Self { renderer }
    }

    /// The tag renderer, and with it the tag catalogue.
    #[must_use]
    pub const fn renderer(&self) -> &TagRenderer {
        &self.renderer
    }

    /// Render `template` for `data` in the given context.
    ///
    /// Never fails: unknown tags are kept verbatim and missing data renders as
    /// empty text.
    #[must_use]
    pub fn parse(&self, template: &str, data: &RenderData, context: RenderContext) -> String {
        if template.is_empty() {
            return String::new();
        }

        let scope = TagScope::top_level(data);
        let segments = self.tokenize(template, &scope, context);
        let output = self.render_segments(segments, &scope, context);

        tracing::debug!(
            "Parsed {} template: {} bytes in, {} bytes out",
            context,
            template.len(),
            output.len()
        );
        output
    }

    /// Replace loop marker tags by sentinels and split the result at each sentinel.
    fn tokenize(&self, template: &str, scope: &TagScope<'_>, context: RenderContext) -> Vec<Segment> {
        let marked = TAG_PATTERN.replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            LoopKind::from_marker(name)
                .and_then(|_| self.renderer.render(name, scope, context))
                .unwrap_or_else(|| caps[0].to_string())
        });

        let mut segments = Vec::new();
        let mut last = 0;
        for found in SENTINEL_PATTERN.find_iter(&marked) {
            let Some((kind, end)) = LoopKind::from_sentinel(found.as_str()) else {
                continue;
            };
            if found.start() > last {
                segments.push(Segment::Text(marked[last..found.start()].to_string()));
            }
            segments.push(Segment::Marker { kind, end });
            last = found.end();
        }
        if last < marked.len() {
            segments.push(Segment::Text(marked[last..].to_string()));
        }
        segments
    }

    /// Resolve every loop kind, then substitute the remaining tags.
    fn render_segments(
        &self,
        mut segments: Vec<Segment>,
        scope: &TagScope<'_>,
        context: RenderContext,
    ) -> String {
        for kind in LoopKind::ALL {
            segments = self.resolve_loops(kind, segments, scope, context);
        }
        self.substitute(segments, scope, context)
    }

    /// Pair the markers of one kind and replace each section by its rendered output.
    fn resolve_loops(
        &self,
        kind: LoopKind,
        segments: Vec<Segment>,
        scope: &TagScope<'_>,
        context: RenderContext,
    ) -> Vec<Segment> {
        let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
        let mut open: Vec<usize> = Vec::new();
        let mut sections = 0usize;

        for segment in segments {
            match segment {
                Segment::Marker { kind: k, end: false } if k == kind => {
                    open.push(out.len());
                    out.push(segment);
                }
                Segment::Marker { kind: k, end: true } if k == kind => match open.pop() {
                    Some(start) => {
                        let body = out.split_off(start + 1);
                        out.pop();
                        out.push(Segment::Rendered(self.render_loop(kind, &body, scope, context)));
                        sections += 1;
                    }
                    None => {
                        tracing::warn!(
                            "Unpaired [{}] marker kept as literal text",
                            kind.end_tag()
                        );
                        out.push(Segment::Rendered(marker_text(kind, true)));
                    }
                },
                other => out.push(other),
            }
        }

        for index in open {
            tracing::warn!("Unclosed [{}] marker kept as literal text", kind.start_tag());
            out[index] = Segment::Rendered(marker_text(kind, false));
        }

        if sections > 0 {
            tracing::debug!("Resolved {} [{}] section(s)", sections, kind.start_tag());
        }
        out
    }

    /// Render one loop section once per item of its collection.
    fn render_loop(
        &self,
        kind: LoopKind,
        body: &[Segment],
        scope: &TagScope<'_>,
        context: RenderContext,
    ) -> String {
        match kind {
            LoopKind::Sermons => {
                let sermons = &scope.data.sermons;
                tracing::debug!("Rendering sermons loop over {} sermon(s)", sermons.len());
                sermons
                    .iter()
                    .map(|sermon| self.render_item(body, &scope.with_sermon(sermon), context))
                    .collect()
            }
            LoopKind::Files => scope
                .attachments
                .iter()
                .filter(|attachment| !attachment.is_embed())
                .map(|attachment| self.render_item(body, &scope.with_attachment(attachment), context))
                .collect(),
            LoopKind::Embed => scope
                .attachments
                .iter()
                .filter(|attachment| attachment.is_embed())
                .map(|attachment| self.render_item(body, &scope.with_attachment(attachment), context))
                .collect(),
            LoopKind::Passages => scope
                .passages()
                .iter()
                .map(|passage| self.render_item(body, &scope.with_passage(passage), context))
                .collect(),
        }
    }

    fn render_item(&self, body: &[Segment], scope: &TagScope<'_>, context: RenderContext) -> String {
        self.render_segments(body.to_vec(), scope, context)
    }

    /// Substitute catalogue tags in template text and join all segments.
    fn substitute(&self, segments: Vec<Segment>, scope: &TagScope<'_>, context: RenderContext) -> String {
        let mut output = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) => {
                    let rendered = TAG_PATTERN.replace_all(&text, |caps: &Captures<'_>| {
                        self.renderer
                            .render(&caps[1], scope, context)
                            .unwrap_or_else(|| caps[0].to_string())
                    });
                    output.push_str(&rendered);
                }
                Segment::Rendered(text) => output.push_str(&text),
                Segment::Marker { kind, end } => output.push_str(&marker_text(kind, end)),
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attachment, BiblePassage, PassageRange, Sermon, TemplateType};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    fn sermons(titles: &[&str]) -> Vec<Sermon> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| Sermon::new(i as u64 + 1, *title))
            .collect()
    }

    fn parse(template: &str, data: &RenderData, context: RenderContext) -> String {
        TagParser::default().parse(template, data, context)
    }

    #[test]
    fn test_single_title_is_plain_text() {
        let data = RenderData::single(Sermon::new(1, "Grace"));
        assert_eq!(parse("<h1>[sermon_title]</h1>", &data, TemplateType::Single), "<h1>Grace</h1>");
    }

    #[test]
    fn test_search_title_is_a_link() {
        let data = RenderData::single(Sermon::new(1, "Grace"));
        assert_eq!(
            parse("<h1>[sermon_title]</h1>", &data, TemplateType::Search),
            r#"<h1><a href="http://localhost/sermons/?sermon_id=1">Grace</a></h1>"#
        );
    }

    #[test]
    fn test_sermons_loop_repeats_body() {
        let data = RenderData::search(sermons(&["A", "B"]));
        assert_eq!(
            parse(
                "<ul>[sermons_loop]<li>[sermon_title]</li>[/sermons_loop]</ul>",
                &data,
                TemplateType::Single
            ),
            "<ul><li>A</li><li>B</li></ul>"
        );
    }

    #[test]
    fn test_empty_loop_vanishes() {
        let data = RenderData::search(Vec::new());
        assert_eq!(
            parse(
                "<ul>[sermons_loop]<li>[sermon_title]</li>[/sermons_loop]</ul>",
                &data,
                TemplateType::Search
            ),
            "<ul></ul>"
        );
        assert_eq!(
            parse(" before [files_loop][file][/files_loop] after ", &RenderData::default(), TemplateType::Single),
            " before  after "
        );
    }

    #[test]
    fn test_unknown_tags_pass_through() {
        let data = RenderData::single(Sermon::new(1, "Grace"));
        assert_eq!(
            parse("[legacy_tag] [sermon_title] [b]bold[/b] [ not a tag ]", &data, TemplateType::Single),
            "[legacy_tag] Grace [b]bold[/b] [ not a tag ]"
        );
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(parse("", &RenderData::default(), TemplateType::Search), "");
    }

    #[test]
    fn test_missing_sermon_renders_empty_tags() {
        assert_eq!(
            parse("<h1>[sermon_title]</h1>[preacher_link]", &RenderData::default(), TemplateType::Single),
            "<h1></h1>"
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let data = RenderData::search(sermons(&["A", "B", "C"]));
        let template = "[sermons_count]: [sermons_loop]([sermon_title])[/sermons_loop]";
        let first = parse(template, &data, TemplateType::Search);
        assert_eq!(first, parse(template, &data, TemplateType::Search));
        assert!(first.starts_with("3: "));
    }

    #[test]
    fn test_files_loop_nested_in_sermons_loop_uses_item_attachments() {
        let mut list = sermons(&["A", "B"]);
        list[0].attachments = vec![Attachment::file("a1.mp3"), Attachment::file("a2.mp3")];
        list[1].attachments = vec![Attachment::code(STANDARD.encode("<video/>"))];
        let data = RenderData::search(list);

        let out = parse(
            "[sermons_loop]<div>[sermon_title]:[files_loop]<f>[file]</f>[/files_loop][embed_loop][embed][/embed_loop]</div>[/sermons_loop]",
            &data,
            TemplateType::Single,
        );
        assert_eq!(
            out,
            concat!(
                r#"<div>A:<f><a href="http://localhost/sermons/files/a1.mp3">a1.mp3</a></f>"#,
                r#"<f><a href="http://localhost/sermons/files/a2.mp3">a2.mp3</a></f></div>"#,
                "<div>B:<video/></div>"
            )
        );
    }

    #[test]
    fn test_passages_loop() {
        let mut sermon = Sermon::new(1, "Grace");
        sermon.passages = vec![
            PassageRange::new(BiblePassage::new("John", 3, 16), BiblePassage::new("John", 3, 21)),
            PassageRange::new(BiblePassage::new("Romans", 8, 1), BiblePassage::new("Romans", 8, 1)),
        ];
        let data = RenderData::single(sermon);
        assert_eq!(
            parse("[passages_loop]<p>[passage]</p>[/passages_loop]", &data, TemplateType::Single),
            "<p>John 3:16-21</p><p>Romans 8:1</p>"
        );
    }

    #[test]
    fn test_loops_of_different_kinds_in_any_order() {
        let mut sermon = Sermon::new(1, "Grace");
        sermon.attachments = vec![Attachment::file("g.mp3")];
        sermon.passages = vec![PassageRange::new(
            BiblePassage::new("John", 1, 1),
            BiblePassage::new("John", 1, 1),
        )];
        let data = RenderData::single(sermon);
        let out = parse(
            "[passages_loop]P[/passages_loop]|[files_loop]F[/files_loop]|[passages_loop]Q[/passages_loop]",
            &data,
            TemplateType::Single,
        );
        assert_eq!(out, "P|F|Q");
    }

    #[test]
    fn test_rendered_text_is_not_rescanned() {
        let data = RenderData::search(vec![Sermon::new(1, "[sermons_count] [/sermons_loop]")]);
        assert_eq!(
            parse("[sermons_loop][sermon_title][/sermons_loop]", &data, TemplateType::Single),
            "[sermons_count] [/sermons_loop]"
        );
    }

    #[test]
    fn test_same_kind_nesting_resolves_innermost_first() {
        let data = RenderData::search(sermons(&["A", "B"]));
        assert_eq!(
            parse(
                "[sermons_loop]<[sermons_loop][sermon_title][/sermons_loop]>[/sermons_loop]",
                &data,
                TemplateType::Single
            ),
            "<AB><AB>"
        );
    }

    #[test]
    fn test_unpaired_markers_are_literal() {
        let data = RenderData::search(sermons(&["A"]));
        assert_eq!(
            parse("x [/sermons_loop] y", &data, TemplateType::Single),
            "x [/sermons_loop] y"
        );
        assert_eq!(
            parse("[sermons_loop][sermon_title]", &data, TemplateType::Single),
            "[sermons_loop]"
        );
        assert_eq!(
            parse("[files_loop][sermons_loop]-[/sermons_loop]", &data, TemplateType::Single),
            "[files_loop]-"
        );
    }

    #[test]
    fn test_loop_item_tags_outside_loops_are_empty() {
        let mut sermon = Sermon::new(1, "Grace");
        sermon.attachments = vec![Attachment::file("g.mp3")];
        let data = RenderData::single(sermon);
        assert_eq!(parse("[file][passage][embed]", &data, TemplateType::Single), "");
    }
}
