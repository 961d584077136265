//! Built-in presentation widgets.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use super::{PageDirection, PassageFormatter, PresentationProvider, UrlBuilder, capture};
use crate::models::{PassageRange, RenderData};
use crate::templating::filters::{safe_attr, safe_text};

/// Smallest and largest tag cloud font sizes, in percent.
const TAG_CLOUD_MIN_PERCENT: u64 = 80;
const TAG_CLOUD_MAX_PERCENT: u64 = 200;

/// Plain-HTML widgets built from the render data and the URL builder.
///
/// Bible text is not fetched; the block links to an online reader instead.
pub struct DefaultPresentation {
    urls: Arc<dyn UrlBuilder>,
    passages: Arc<dyn PassageFormatter>,
    sermons_per_page: u32,
}

impl DefaultPresentation {
    pub fn new(
        urls: Arc<dyn UrlBuilder>,
        passages: Arc<dyn PassageFormatter>,
        sermons_per_page: u32,
    ) -> Self {
        Self {
            urls,
            passages,
            sermons_per_page: sermons_per_page.max(1),
        }
    }
}

impl PresentationProvider for DefaultPresentation {
    fn filters_form(&self, data: &RenderData) -> String {
        let action = self.urls.filter_url(&[]);
        let title = data.filter.title.clone().unwrap_or_default();
        capture(|out| {
            write!(out, r#"<form method="get" action="{}" class="sermon-filter">"#, safe_attr(&action))?;
            for (name, value) in data.filter.query_pairs() {
                if name == "title" {
                    continue;
                }
                write!(out, r#"<input type="hidden" name="{name}" value="{}" />"#, safe_attr(&value))?;
            }
            write!(out, r#"<input type="text" name="title" value="{}" />"#, safe_attr(&title))?;
            write!(out, r#"<input type="submit" value="Filter" /></form>"#)
        })
    }

    fn most_popular(&self, data: &RenderData) -> String {
        if data.popular.is_empty() {
            return String::new();
        }
        capture(|out| {
            write!(out, r#"<ul class="popular-sermons">"#)?;
            for link in &data.popular {
                write!(
                    out,
                    r#"<li><a href="{}">{}</a></li>"#,
                    safe_attr(&self.urls.sermon_url(link.id)),
                    safe_text(&link.title)
                )?;
            }
            write!(out, "</ul>")
        })
    }

    fn tag_cloud(&self, data: &RenderData) -> String {
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for tag in data.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            *counts.entry(tag).or_default() += 1;
        }
        let Some(max) = counts.values().copied().max() else {
            return String::new();
        };
        let min = counts.values().copied().min().unwrap_or(max);
        let spread = (max - min).max(1);

        capture(|out| {
            write!(out, r#"<div class="tag-cloud">"#)?;
            for (i, (tag, count)) in counts.iter().enumerate() {
                let size = TAG_CLOUD_MIN_PERCENT
                    + (count - min) * (TAG_CLOUD_MAX_PERCENT - TAG_CLOUD_MIN_PERCENT) / spread;
                if i > 0 {
                    out.write_char(' ')?;
                }
                write!(
                    out,
                    r#"<a style="font-size:{size}%" href="{}">{}</a>"#,
                    safe_attr(&self.urls.filter_url(&[("stag", (*tag).to_string())])),
                    safe_text(tag)
                )?;
            }
            write!(out, "</div>")
        })
    }

    fn credit_link(&self) -> String {
        r#"<div class="sermon-browser-credit">Powered by <a href="https://www.sermonbrowser.com/">Sermon Browser</a></div>"#
            .to_string()
    }

    fn bible_text(&self, version: &str, passage: &PassageRange) -> String {
        let reference = self.passages.format(&passage.start, &passage.end);
        if reference.is_empty() {
            return String::new();
        }
        let reader_url = format!(
            "https://www.biblegateway.com/passage/?search={}&version={}",
            urlencoding::encode(&reference),
            version.to_uppercase()
        );
        format!(
            r#"<div class="{version}"><h2>{}</h2><p><a href="{}">Read {} ({})</a></p></div>"#,
            safe_text(&reference),
            safe_attr(&reader_url),
            safe_text(&reference),
            version.to_uppercase()
        )
    }

    fn pagination_link(&self, direction: PageDirection, data: &RenderData) -> String {
        let page = data.filter.current_page();
        let total = data.total.unwrap_or(data.sermons.len() as u64);
        let per_page = u64::from(self.sermons_per_page);

        let target = match direction {
            PageDirection::Next if u64::from(page) * per_page < total => page.checked_add(1),
            PageDirection::Previous => page.checked_sub(1).filter(|&p| p >= 1),
            PageDirection::Next => None,
        };
        let Some(target) = target else {
            return String::new();
        };

        let href = safe_attr(&self.urls.page_url(&data.filter, target));
        match direction {
            PageDirection::Next => format!(r#"<a href="{href}">Next page &raquo;</a>"#),
            PageDirection::Previous => format!(r#"<a href="{href}">&laquo; Previous page</a>"#),
        }
    }
}
