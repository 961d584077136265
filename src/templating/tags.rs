//! Tag catalogue and per-tag rendering.
//!
//! [`TagRenderer`] maps a tag name plus a [`TagScope`] to a string. It knows
//! nothing about template structure: loop markers render to fixed sentinel
//! strings and the [`TagParser`](super::TagParser) does the iterating.
//!
//! # Rules
//!
//! - In the `search` context, tags that name a related entity
//!   (`sermon_title`, `preacher_link`, `series_link`, `service_link`) render as
//!   links; in `single` they render as plain text.
//! - Sermon-authored text is passed through [`safe_text`] (backslash escaping
//!   removed, then HTML-escaped).
//! - Missing data renders as empty text, never as an error.
//! - `[embed]` decodes a Base64 payload that was sanitized before it was
//!   stored; it is not sanitized again here.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::sync::LazyLock;

use super::collaborators::{Collaborators, PageDirection};
use super::filters::{safe_attr, safe_multiline, safe_text};
use crate::constants::{
    DEFAULT_DATE_FORMAT, EMBED_LOOP_END, EMBED_LOOP_START, FILES_LOOP_END, FILES_LOOP_START,
    PASSAGES_LOOP_END, PASSAGES_LOOP_START, SERMONS_LOOP_END, SERMONS_LOOP_START,
};
use crate::models::{
    Attachment, AttachmentKind, EntityRef, PassageRange, RenderContext, RenderData, Sermon,
    SermonLink,
};

/// Matches one bracket token such as `[sermon_title]` or `[/files_loop]`.
pub static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(/?[A-Za-z0-9_]+)\]").expect("tag pattern is valid"));

/// Bible versions with a `[{version}text]` tag.
pub const BIBLE_VERSIONS: [&str; 8] = ["esv", "net", "kjv", "asv", "ylt", "web", "hnv", "lbrv"];

/// The four repeating section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    Sermons,
    Files,
    Embed,
    Passages,
}

impl LoopKind {
    /// All kinds, in resolution order. `Sermons` comes first so that file,
    /// embed and passage loops inside it are resolved per sermon.
    pub const ALL: [Self; 4] = [Self::Sermons, Self::Files, Self::Embed, Self::Passages];

    /// Opening tag name, e.g. `sermons_loop`.
    #[must_use]
    pub const fn start_tag(self) -> &'static str {
        match self {
            Self::Sermons => "sermons_loop",
            Self::Files => "files_loop",
            Self::Embed => "embed_loop",
            Self::Passages => "passages_loop",
        }
    }

    /// Closing tag name, e.g. `/sermons_loop`.
    #[must_use]
    pub const fn end_tag(self) -> &'static str {
        match self {
            Self::Sermons => "/sermons_loop",
            Self::Files => "/files_loop",
            Self::Embed => "/embed_loop",
            Self::Passages => "/passages_loop",
        }
    }

    #[must_use]
    pub const fn start_sentinel(self) -> &'static str {
        match self {
            Self::Sermons => SERMONS_LOOP_START,
            Self::Files => FILES_LOOP_START,
            Self::Embed => EMBED_LOOP_START,
            Self::Passages => PASSAGES_LOOP_START,
        }
    }

    #[must_use]
    pub const fn end_sentinel(self) -> &'static str {
        match self {
            Self::Sermons => SERMONS_LOOP_END,
            Self::Files => FILES_LOOP_END,
            Self::Embed => EMBED_LOOP_END,
            Self::Passages => PASSAGES_LOOP_END,
        }
    }

    /// Identify a loop sentinel; the flag is `true` for end sentinels.
    #[must_use]
    pub fn from_sentinel(sentinel: &str) -> Option<(Self, bool)> {
        Self::ALL.into_iter().find_map(|kind| {
            if sentinel == kind.start_sentinel() {
                Some((kind, false))
            } else if sentinel == kind.end_sentinel() {
                Some((kind, true))
            } else {
                None
            }
        })
    }

    /// Identify a loop marker tag name; the flag is `true` for closing markers.
    #[must_use]
    pub fn from_marker(name: &str) -> Option<(Self, bool)> {
        Self::ALL.into_iter().find_map(|kind| {
            if name == kind.start_tag() {
                Some((kind, false))
            } else if name == kind.end_tag() {
                Some((kind, true))
            } else {
                None
            }
        })
    }
}

/// What a tag can see: the request data plus the current loop item, if any.
#[derive(Debug, Clone, Copy)]
pub struct TagScope<'a> {
    pub data: &'a RenderData,
    /// Current sermon: the page's sermon at top level, the item inside `sermons_loop`
    pub sermon: Option<&'a Sermon>,
    /// Attachments that `files_loop` / `embed_loop` iterate in this scope
    pub attachments: &'a [Attachment],
    /// Current item inside `files_loop` / `embed_loop`
    pub attachment: Option<&'a Attachment>,
    /// Current item inside `passages_loop`
    pub passage: Option<&'a PassageRange>,
}

impl<'a> TagScope<'a> {
    /// Scope for top-level tags.
    #[must_use]
    pub fn top_level(data: &'a RenderData) -> Self {
        Self {
            data,
            sermon: data.sermon.as_ref(),
            attachments: data.attachments(),
            attachment: None,
            passage: None,
        }
    }

    /// Scope of one `sermons_loop` iteration.
    #[must_use]
    pub fn with_sermon(self, sermon: &'a Sermon) -> Self {
        Self {
            sermon: Some(sermon),
            attachments: &sermon.attachments,
            attachment: None,
            passage: None,
            ..self
        }
    }

    /// Scope of one `files_loop` / `embed_loop` iteration.
    #[must_use]
    pub fn with_attachment(self, attachment: &'a Attachment) -> Self {
        Self {
            attachment: Some(attachment),
            ..self
        }
    }

    /// Scope of one `passages_loop` iteration.
    #[must_use]
    pub fn with_passage(self, passage: &'a PassageRange) -> Self {
        Self {
            passage: Some(passage),
            ..self
        }
    }

    /// Passages of the current sermon.
    #[must_use]
    pub fn passages(&self) -> &'a [PassageRange] {
        self.sermon.map_or(&[], |sermon| sermon.passages.as_slice())
    }
}

type SimpleHandler = fn(&TagRenderer, &TagScope<'_>, RenderContext) -> String;

#[derive(Clone, Copy)]
enum Handler {
    Simple(SimpleHandler),
    BibleText(&'static str),
    LoopStart(LoopKind),
    LoopEnd(LoopKind),
}

/// Renders individual tags.
///
/// Build it once and share it: the dispatch table is constructed in
/// [`TagRenderer::new`].
pub struct TagRenderer {
    collaborators: Collaborators,
    date_format: String,
    handlers: HashMap<&'static str, Handler>,
}

impl std::fmt::Debug for TagRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRenderer")
            .field("date_format", &self.date_format)
            .field("tags", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl Default for TagRenderer {
    fn default() -> Self {
        Self::new(Collaborators::default())
    }
}

impl TagRenderer {
    /// Create a renderer using the default date format.
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_date_format(collaborators, DEFAULT_DATE_FORMAT)
    }

    /// Create a renderer with a `chrono` strftime format for `[date]`.
    #[must_use]
    pub fn with_date_format(collaborators: Collaborators, date_format: impl Into<String>) -> Self {
        let simple: [(&'static str, SimpleHandler); 32] = [
            ("sermon_title", Self::render_sermon_title),
            ("sermon_description", Self::render_sermon_description),
            ("preacher_link", Self::render_preacher_link),
            ("preacher_description", Self::render_preacher_description),
            ("preacher_image", Self::render_preacher_image),
            ("series_link", Self::render_series_link),
            ("service_link", Self::render_service_link),
            ("date", Self::render_date),
            ("first_passage", Self::render_first_passage),
            ("biblepassage", Self::render_bible_passage),
            ("passage", Self::render_passage),
            ("tags", Self::render_tags),
            ("editlink", Self::render_edit_link),
            ("next_sermon", Self::render_next_sermon),
            ("prev_sermon", Self::render_prev_sermon),
            ("sameday_sermon", Self::render_sameday_sermon),
            ("file", Self::render_file),
            ("file_with_download", Self::render_file_with_download),
            ("embed", Self::render_embed),
            ("sermons_count", Self::render_sermons_count),
            ("next_page", Self::render_next_page),
            ("previous_page", Self::render_previous_page),
            ("filters_form", Self::render_filters_form),
            ("most_popular", Self::render_most_popular),
            ("tag_cloud", Self::render_tag_cloud),
            ("creditlink", Self::render_credit_link),
            ("podcast", Self::render_podcast),
            ("podcast_for_search", Self::render_podcast_for_search),
            ("itunes_podcast", Self::render_itunes_podcast),
            ("itunes_podcast_for_search", Self::render_itunes_podcast_for_search),
            ("podcasticon", Self::render_podcast_icon),
            ("podcasticon_for_search", Self::render_podcast_icon_for_search),
        ];

        let mut handlers: HashMap<&'static str, Handler> = simple
            .into_iter()
            .map(|(name, handler)| (name, Handler::Simple(handler)))
            .collect();

        for (name, version) in [
            ("esvtext", "esv"),
            ("nettext", "net"),
            ("kjvtext", "kjv"),
            ("asvtext", "asv"),
            ("ylttext", "ylt"),
            ("webtext", "web"),
            ("hnvtext", "hnv"),
            ("lbrvtext", "lbrv"),
        ] {
            handlers.insert(name, Handler::BibleText(version));
        }

        for kind in LoopKind::ALL {
            handlers.insert(kind.start_tag(), Handler::LoopStart(kind));
            handlers.insert(kind.end_tag(), Handler::LoopEnd(kind));
        }

        Self {
            collaborators,
            date_format: date_format.into(),
            handlers,
        }
    }

    /// Every tag name this renderer resolves, loop markers included.
    #[must_use]
    pub fn available_tags(&self) -> BTreeSet<&'static str> {
        self.handlers.keys().copied().collect()
    }

    /// Whether `name` (without brackets) is in the catalogue.
    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Render one tag, or `None` when the name is not in the catalogue.
    #[must_use]
    pub fn render(&self, name: &str, scope: &TagScope<'_>, context: RenderContext) -> Option<String> {
        let handler = self.handlers.get(name)?;
        Some(match *handler {
            Handler::Simple(render) => render(self, scope, context),
            Handler::BibleText(version) => self.render_bible_text(version, scope),
            Handler::LoopStart(kind) => Self::render_loop_start(kind),
            Handler::LoopEnd(kind) => Self::render_loop_end(kind),
        })
    }

    #[must_use]
    pub fn render_loop_start(kind: LoopKind) -> String {
        kind.start_sentinel().to_string()
    }

    #[must_use]
    pub fn render_loop_end(kind: LoopKind) -> String {
        kind.end_sentinel().to_string()
    }

    fn entity_link(
        &self,
        entity: Option<&EntityRef>,
        filter: &'static str,
        context: RenderContext,
    ) -> String {
        let Some(entity) = entity else {
            return String::new();
        };
        let name = safe_text(&entity.name);
        match context {
            RenderContext::Search => format!(
                r#"<a href="{}">{name}</a>"#,
                safe_attr(&self.collaborators.urls.filter_url(&[(filter, entity.id.to_string())]))
            ),
            RenderContext::Single => name,
        }
    }

    fn sermon_link(&self, link: &SermonLink, label: String) -> String {
        format!(
            r#"<a href="{}">{label}</a>"#,
            safe_attr(&self.collaborators.urls.sermon_url(link.id))
        )
    }

    fn format_passage(&self, passage: &PassageRange) -> String {
        safe_text(&self.collaborators.passages.format(&passage.start, &passage.end))
    }

    pub fn render_sermon_title(&self, scope: &TagScope<'_>, context: RenderContext) -> String {
        let Some(sermon) = scope.sermon else {
            return String::new();
        };
        let title = safe_text(&sermon.title);
        match context {
            RenderContext::Search => format!(
                r#"<a href="{}">{title}</a>"#,
                safe_attr(&self.collaborators.urls.sermon_url(sermon.id))
            ),
            RenderContext::Single => title,
        }
    }

    pub fn render_sermon_description(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        scope.sermon.map(|s| safe_multiline(&s.description)).unwrap_or_default()
    }

    pub fn render_preacher_link(&self, scope: &TagScope<'_>, context: RenderContext) -> String {
        let preacher = scope
            .sermon
            .and_then(|s| s.preacher.as_ref())
            .map(|p| EntityRef::new(p.id, p.name.clone()));
        self.entity_link(preacher.as_ref(), "preacher", context)
    }

    pub fn render_preacher_description(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        scope
            .sermon
            .and_then(|s| s.preacher.as_ref())
            .map(|p| safe_multiline(&p.description))
            .unwrap_or_default()
    }

    pub fn render_preacher_image(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        let Some(preacher) = scope.sermon.and_then(|s| s.preacher.as_ref()) else {
            return String::new();
        };
        match preacher.image.as_deref().filter(|image| !image.is_empty()) {
            Some(image) => format!(
                r#"<img alt="{}" class="preacher" src="{}" />"#,
                safe_attr(&preacher.name),
                safe_attr(&self.collaborators.urls.preacher_image_url(image))
            ),
            None => String::new(),
        }
    }

    pub fn render_series_link(&self, scope: &TagScope<'_>, context: RenderContext) -> String {
        self.entity_link(scope.sermon.and_then(|s| s.series.as_ref()), "series", context)
    }

    pub fn render_service_link(&self, scope: &TagScope<'_>, context: RenderContext) -> String {
        self.entity_link(scope.sermon.and_then(|s| s.service.as_ref()), "service", context)
    }

    pub fn render_date(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        let Some(date) = scope.sermon.and_then(|s| s.date) else {
            return String::new();
        };
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.date_format)).is_err() {
            tracing::warn!("Invalid date format '{}', rendering empty date", self.date_format);
            return String::new();
        }
        safe_text(&out)
    }

    pub fn render_first_passage(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        scope.passages().first().map(|p| self.format_passage(p)).unwrap_or_default()
    }

    pub fn render_bible_passage(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        scope
            .passages()
            .iter()
            .map(|p| self.format_passage(p))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn render_passage(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        scope.passage.map(|p| self.format_passage(p)).unwrap_or_default()
    }

    pub fn render_tags(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        let Some(sermon) = scope.sermon else {
            return String::new();
        };
        sermon
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(|tag| {
                format!(
                    r#"<a href="{}">{}</a>"#,
                    safe_attr(&self.collaborators.urls.filter_url(&[("stag", tag.to_string())])),
                    safe_text(tag)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn render_edit_link(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        match scope.sermon {
            Some(sermon) if scope.data.can_edit => format!(
                r#"<div class="sb_edit_link"><a href="{}">Edit Sermon</a></div>"#,
                safe_attr(&self.collaborators.urls.edit_url(sermon.id))
            ),
            _ => String::new(),
        }
    }

    pub fn render_next_sermon(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        scope
            .data
            .navigation
            .next
            .as_ref()
            .map(|link| self.sermon_link(link, format!("{} &raquo;", safe_text(&link.title))))
            .unwrap_or_default()
    }

    pub fn render_prev_sermon(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        scope
            .data
            .navigation
            .previous
            .as_ref()
            .map(|link| self.sermon_link(link, format!("&laquo; {}", safe_text(&link.title))))
            .unwrap_or_default()
    }

    pub fn render_sameday_sermon(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        let same_day = &scope.data.navigation.same_day;
        if same_day.is_empty() {
            return String::new();
        }
        let links = same_day
            .iter()
            .map(|link| self.sermon_link(link, safe_text(&link.title)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Same day: {links}")
    }

    pub fn render_file(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        let Some(attachment) = scope.attachment.filter(|a| !a.is_embed()) else {
            return String::new();
        };
        let label = match attachment.kind {
            AttachmentKind::File => attachment.name.rsplit('/').next().unwrap_or(&attachment.name),
            AttachmentKind::Url | AttachmentKind::Code => attachment.name.as_str(),
        };
        format!(
            r#"<a href="{}">{}</a>"#,
            safe_attr(&self.collaborators.urls.file_url(attachment)),
            safe_text(label)
        )
    }

    pub fn render_file_with_download(&self, scope: &TagScope<'_>, context: RenderContext) -> String {
        let file = self.render_file(scope, context);
        let Some(attachment) = scope.attachment.filter(|_| !file.is_empty()) else {
            return String::new();
        };
        format!(
            r#"{file} <a href="{}" class="sermon-download">Download</a>"#,
            safe_attr(&self.collaborators.urls.download_url(attachment))
        )
    }

    pub fn render_embed(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        let Some(attachment) = scope.attachment.filter(|a| a.is_embed()) else {
            return String::new();
        };
        let decoded = match BASE64_STANDARD.decode(attachment.name.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping embed with invalid Base64 payload: {}", e);
                return String::new();
            }
        };
        match String::from_utf8(decoded) {
            Ok(markup) => self.collaborators.shortcodes.process(&markup),
            Err(e) => {
                tracing::warn!("Skipping embed that is not valid UTF-8: {}", e);
                String::new()
            }
        }
    }

    pub fn render_sermons_count(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        scope.data.total.unwrap_or(scope.data.sermons.len() as u64).to_string()
    }

    pub fn render_next_page(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        self.collaborators.presentation.pagination_link(PageDirection::Next, scope.data)
    }

    pub fn render_previous_page(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        self.collaborators.presentation.pagination_link(PageDirection::Previous, scope.data)
    }

    pub fn render_filters_form(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        self.collaborators.presentation.filters_form(scope.data)
    }

    pub fn render_most_popular(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        self.collaborators.presentation.most_popular(scope.data)
    }

    pub fn render_tag_cloud(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        self.collaborators.presentation.tag_cloud(scope.data)
    }

    pub fn render_credit_link(&self, _: &TagScope<'_>, _: RenderContext) -> String {
        self.collaborators.presentation.credit_link()
    }

    pub fn render_podcast(&self, _: &TagScope<'_>, _: RenderContext) -> String {
        safe_attr(&self.collaborators.urls.podcast_url())
    }

    pub fn render_podcast_for_search(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        safe_attr(&self.collaborators.urls.search_podcast_url(&scope.data.filter))
    }

    pub fn render_itunes_podcast(&self, _: &TagScope<'_>, _: RenderContext) -> String {
        safe_attr(&itunes_url(&self.collaborators.urls.podcast_url()))
    }

    pub fn render_itunes_podcast_for_search(&self, scope: &TagScope<'_>, _: RenderContext) -> String {
        let url = self.collaborators.urls.search_podcast_url(&scope.data.filter);
        safe_attr(&itunes_url(&url))
    }

    pub fn render_podcast_icon(&self, _: &TagScope<'_>, _: RenderContext) -> String {
        format!(
            r#"<img alt="Subscribe to full podcast" title="Subscribe to full podcast" class="podcasticon" src="{}" />"#,
            safe_attr(&self.collaborators.urls.podcast_icon_url())
        )
    }

    pub fn render_podcast_icon_for_search(&self, _: &TagScope<'_>, _: RenderContext) -> String {
        format!(
            r#"<img alt="Subscribe to custom podcast" title="Subscribe to custom podcast" class="podcasticon" src="{}" />"#,
            safe_attr(&self.collaborators.urls.search_podcast_icon_url())
        )
    }

    /// Bible text blocks for every passage of the current sermon.
    pub fn render_bible_text(&self, version: &str, scope: &TagScope<'_>) -> String {
        scope
            .passages()
            .iter()
            .map(|passage| self.collaborators.presentation.bible_text(version, passage))
            .collect()
    }
}

/// Rewrite an `http(s)` feed URL to the `itpc` scheme podcast clients register.
fn itunes_url(url: &str) -> String {
    ["https://", "http://"]
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .map_or_else(|| url.to_string(), |rest| format!("itpc://{rest}"))
}
