//! Data models consumed by the template engine.
//!
//! Everything here is plain data supplied by the caller for a single request:
//! the engine never fetches sermons, attachments or passages itself. All types
//! derive `Serialize` so that [`RenderData`] has a canonical JSON form for the
//! content-addressed render cache, and `Deserialize` so the command line can
//! read render data from a file.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{BACKUP_OPTION_SUFFIX, LEGACY_OUTPUT_SUFFIX, TEMPLATE_OPTION_SUFFIX};
use crate::core::TemplateError;

/// The two template slots, which double as the render context.
///
/// `Search` renders a listing of many sermons; `Single` renders one sermon's
/// detail page. Several tags format differently depending on the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    /// Sermon listing
    Search,
    /// Sermon detail page
    Single,
}

/// Render context alias: the template type decides how context-sensitive tags render.
pub type RenderContext = TemplateType;

impl TemplateType {
    /// Both template types, in migration order.
    pub const ALL: [Self; 2] = [Self::Search, Self::Single];

    /// Lowercase name used in option names and cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Single => "single",
        }
    }

    /// Option holding the template text, e.g. `search_template`.
    #[must_use]
    pub fn template_option(self) -> String {
        format!("{}{TEMPLATE_OPTION_SUFFIX}", self.as_str())
    }

    /// Option holding the migration backup, e.g. `search_template_backup`.
    #[must_use]
    pub fn backup_option(self) -> String {
        format!("{}{BACKUP_OPTION_SUFFIX}", self.as_str())
    }

    /// Legacy pre-rendered output option, e.g. `search_output`.
    #[must_use]
    pub fn legacy_output_option(self) -> String {
        format!("{}{LEGACY_OUTPUT_SUFFIX}", self.as_str())
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "single" => Ok(Self::Single),
            other => Err(TemplateError::InvalidTemplateType {
                value: other.to_string(),
            }),
        }
    }
}

/// A related entity referenced by id and display name (series, service).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: u64,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The preacher of a sermon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preacher {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Image file name, resolved through the URL builder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One end of a passage reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiblePassage {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl BiblePassage {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
        }
    }
}

/// A `(start, end)` passage pair such as John 3:16 – John 3:21.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageRange {
    pub start: BiblePassage,
    pub end: BiblePassage,
}

impl PassageRange {
    pub const fn new(start: BiblePassage, end: BiblePassage) -> Self {
        Self { start, end }
    }
}

/// How an attachment is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// An uploaded file, named relative to the upload directory
    #[default]
    File,
    /// An external URL
    Url,
    /// A Base64-encoded, already sanitized embed code
    Code,
}

/// A media item attached to a sermon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub kind: AttachmentKind,
    /// File name, URL, or Base64 embed payload depending on `kind`
    pub name: String,
}

impl Attachment {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::File,
            name: name.into(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Url,
            name: url.into(),
        }
    }

    pub fn code(encoded: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Code,
            name: encoded.into(),
        }
    }

    /// Whether this attachment belongs to `embed_loop` rather than `files_loop`.
    #[must_use]
    pub const fn is_embed(&self) -> bool {
        matches!(self.kind, AttachmentKind::Code)
    }
}

/// A sermon record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sermon {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preacher: Option<Preacher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passages: Vec<PassageRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Sermon {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A lightweight link target for navigation and "most popular" lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SermonLink {
    pub id: u64,
    pub title: String,
}

/// Neighbouring sermons shown on a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SermonNavigation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<SermonLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<SermonLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub same_day: Vec<SermonLink>,
}

impl SermonNavigation {
    fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none() && self.same_day.is_empty()
    }
}

/// The listing filter the caller applied when building a search page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preacher: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 1-based page number; 0 is treated as the first page
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page: u32,
}

impl FilterAttributes {
    /// Whether no filter at all was applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// The active filter as ordered `(name, value)` query pairs, page excluded.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.preacher {
            pairs.push(("preacher", id.to_string()));
        }
        if let Some(id) = self.series {
            pairs.push(("series", id.to_string()));
        }
        if let Some(id) = self.service {
            pairs.push(("service", id.to_string()));
        }
        if let Some(book) = &self.book {
            pairs.push(("book", book.clone()));
        }
        if let Some(tag) = &self.tag {
            pairs.push(("stag", tag.clone()));
        }
        if let Some(title) = &self.title {
            pairs.push(("title", title.clone()));
        }
        pairs
    }

    /// Current page, never less than 1.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.page.max(1)
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Everything a single render needs, computed by the caller.
///
/// Which fields are meaningful depends on the context: `sermons`, `total`,
/// `filter`, `tags` and `popular` belong to search pages; `sermon`, `media`
/// and `navigation` to detail pages. Absent values are normal and render as
/// empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sermon: Option<Sermon>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sermons: Vec<Sermon>,
    /// Attachments for the current sermon; overrides `sermon.attachments` when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Attachment>,
    /// Tag names across the listing, used by the tag cloud
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "FilterAttributes::is_empty_with_page")]
    pub filter: FilterAttributes,
    #[serde(default, skip_serializing_if = "SermonNavigation::is_empty")]
    pub navigation: SermonNavigation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub popular: Vec<SermonLink>,
    /// Whether the viewer may edit sermons (controls `[editlink]`)
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_edit: bool,
}

impl FilterAttributes {
    fn is_empty_with_page(&self) -> bool {
        self.is_empty() && self.page == 0
    }
}

impl RenderData {
    /// Data for a sermon detail page.
    #[must_use]
    pub fn single(sermon: Sermon) -> Self {
        Self {
            sermon: Some(sermon),
            ..Self::default()
        }
    }

    /// Data for a listing page; `total` defaults to the number of sermons supplied.
    #[must_use]
    pub fn search(sermons: Vec<Sermon>) -> Self {
        let total = Some(sermons.len() as u64);
        Self {
            sermons,
            total,
            ..Self::default()
        }
    }

    /// Attachments of the current sermon at the top level.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        if !self.media.is_empty() {
            return &self.media;
        }
        self.sermon.as_ref().map_or(&[], |sermon| sermon.attachments.as_slice())
    }
}
