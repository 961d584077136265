//! External collaborators used by the tag renderer.
//!
//! Tags that need site knowledge (URLs), presentation widgets (pagination,
//! tag cloud, filter form), passage formatting or shortcode expansion delegate
//! to the traits in this module. Every method returns a `String`: a
//! collaborator that talks to a remote service must turn its own failures into
//! an empty or placeholder string so that rendering always produces HTML.
//!
//! [`Collaborators::default`] wires the built-in implementations:
//! - [`SiteUrls`] - query-string URLs under a configurable site root
//! - [`StandardPassageFormatter`] - `John 3:16-21` style references
//! - [`PassthroughShortcodes`] - returns embed markup unchanged
//! - [`DefaultPresentation`] - plain HTML widgets
//!
//! Writer-style renderers can be adapted with [`capture`], which collects
//! everything written into a string instead of emitting it directly.

mod passages;
mod presentation;
mod urls;

pub use passages::StandardPassageFormatter;
pub use presentation::DefaultPresentation;
pub use urls::SiteUrls;

use std::fmt;
use std::sync::Arc;

use crate::constants::DEFAULT_SERMONS_PER_PAGE;
use crate::models::{Attachment, BiblePassage, FilterAttributes, PassageRange, RenderData};

/// Builds every URL the tags emit.
pub trait UrlBuilder: Send + Sync {
    /// Detail page of one sermon.
    fn sermon_url(&self, sermon_id: u64) -> String;

    /// Listing filtered by the given `(name, value)` pairs.
    fn filter_url(&self, pairs: &[(&str, String)]) -> String;

    /// Listing page `page` under the currently applied filter.
    fn page_url(&self, filter: &FilterAttributes, page: u32) -> String;

    /// Playable or linkable URL of a file or external-URL attachment.
    fn file_url(&self, attachment: &Attachment) -> String;

    /// URL that forces a download of the attachment.
    fn download_url(&self, attachment: &Attachment) -> String;

    /// URL of a preacher's image file.
    fn preacher_image_url(&self, image: &str) -> String;

    /// Admin edit screen of one sermon.
    fn edit_url(&self, sermon_id: u64) -> String;

    /// Feed of all sermons.
    fn podcast_url(&self) -> String;

    /// Feed restricted to the current filter.
    fn search_podcast_url(&self, filter: &FilterAttributes) -> String;

    /// Icon shown next to the main podcast link.
    fn podcast_icon_url(&self) -> String;

    /// Icon shown next to the filtered podcast link.
    fn search_podcast_icon_url(&self) -> String;
}

/// Turns a passage pair into a human-readable reference.
pub trait PassageFormatter: Send + Sync {
    fn format(&self, start: &BiblePassage, end: &BiblePassage) -> String;
}

/// Expands host shortcodes inside decoded embed markup.
pub trait ShortcodeProcessor: Send + Sync {
    fn process(&self, content: &str) -> String;
}

/// Direction of a pagination link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

/// Presentation widgets that are not simple field substitutions.
pub trait PresentationProvider: Send + Sync {
    /// Listing filter form.
    fn filters_form(&self, data: &RenderData) -> String;

    /// List of the most popular sermons.
    fn most_popular(&self, data: &RenderData) -> String;

    /// Weighted tag cloud.
    fn tag_cloud(&self, data: &RenderData) -> String;

    /// "Powered by" credit block.
    fn credit_link(&self) -> String;

    /// Bible text block for one passage in the given version (`esv`, `kjv`, ...).
    fn bible_text(&self, version: &str, passage: &PassageRange) -> String;

    /// Previous/next page link, or empty text when there is no such page.
    fn pagination_link(&self, direction: PageDirection, data: &RenderData) -> String;
}

/// Returns embed markup unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughShortcodes;

impl ShortcodeProcessor for PassthroughShortcodes {
    fn process(&self, content: &str) -> String {
        content.to_string()
    }
}

/// The collaborator set handed to the tag renderer.
#[derive(Clone)]
pub struct Collaborators {
    pub urls: Arc<dyn UrlBuilder>,
    pub passages: Arc<dyn PassageFormatter>,
    pub shortcodes: Arc<dyn ShortcodeProcessor>,
    pub presentation: Arc<dyn PresentationProvider>,
}

impl Collaborators {
    /// Built-in collaborators rooted at `urls`.
    #[must_use]
    pub fn from_site(urls: SiteUrls, sermons_per_page: u32) -> Self {
        let urls: Arc<dyn UrlBuilder> = Arc::new(urls);
        let passages: Arc<dyn PassageFormatter> = Arc::new(StandardPassageFormatter);
        let presentation = Arc::new(DefaultPresentation::new(
            Arc::clone(&urls),
            Arc::clone(&passages),
            sermons_per_page,
        ));
        Self {
            urls,
            passages,
            shortcodes: Arc::new(PassthroughShortcodes),
            presentation,
        }
    }

    #[must_use]
    pub fn with_shortcodes(mut self, shortcodes: Arc<dyn ShortcodeProcessor>) -> Self {
        self.shortcodes = shortcodes;
        self
    }

    #[must_use]
    pub fn with_presentation(mut self, presentation: Arc<dyn PresentationProvider>) -> Self {
        self.presentation = presentation;
        self
    }

    #[must_use]
    pub fn with_passages(mut self, passages: Arc<dyn PassageFormatter>) -> Self {
        self.passages = passages;
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::from_site(SiteUrls::default(), DEFAULT_SERMONS_PER_PAGE)
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Run a writer-style renderer and return what it wrote.
///
/// A renderer that fails midway still yields the text written so far; the
/// failure is logged rather than propagated.
pub fn capture<F>(render: F) -> String
where
    F: FnOnce(&mut dyn fmt::Write) -> fmt::Result,
{
    let mut buffer = String::new();
    if render(&mut buffer).is_err() {
        tracing::warn!("Output renderer failed after {} bytes", buffer.len());
    }
    buffer
}
