//! Query-string URL builder for a sermons page.

use serde::{Deserialize, Serialize};

use super::UrlBuilder;
use crate::models::{Attachment, AttachmentKind, FilterAttributes};

/// Site locations the default URL builder works from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteUrls {
    /// Public sermons page, e.g. `https://church.example/sermons/`
    pub site_url: String,
    /// Directory URL under which uploaded sermon files are served
    pub upload_url: String,
    /// Public podcast feed; empty means `{site_url}?podcast`
    #[serde(default)]
    pub podcast_url: String,
    /// Admin root for edit links
    pub admin_url: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            site_url: "http://localhost/sermons/".to_string(),
            upload_url: "http://localhost/sermons/files/".to_string(),
            podcast_url: String::new(),
            admin_url: "http://localhost/wp-admin/admin.php".to_string(),
        }
    }
}

impl SiteUrls {
    pub fn new(site_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            upload_url: upload_url.into(),
            ..Self::default()
        }
    }
}

/// Append encoded query pairs to `base`, respecting an existing query string.
fn with_query(base: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return base.to_string();
    }
    let query = pairs
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                (*name).to_string()
            } else {
                format!("{}={}", name, urlencoding::encode(value))
            }
        })
        .collect::<Vec<_>>()
        .join("&");
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

fn join_path(base: &str, name: &str) -> String {
    let encoded = name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if base.ends_with('/') {
        format!("{base}{encoded}")
    } else {
        format!("{base}/{encoded}")
    }
}

impl UrlBuilder for SiteUrls {
    fn sermon_url(&self, sermon_id: u64) -> String {
        with_query(&self.site_url, &[("sermon_id", sermon_id.to_string())])
    }

    fn filter_url(&self, pairs: &[(&str, String)]) -> String {
        with_query(&self.site_url, pairs)
    }

    fn page_url(&self, filter: &FilterAttributes, page: u32) -> String {
        let mut pairs = filter.query_pairs();
        pairs.push(("page", page.to_string()));
        with_query(&self.site_url, &pairs)
    }

    fn file_url(&self, attachment: &Attachment) -> String {
        match attachment.kind {
            AttachmentKind::Url => attachment.name.clone(),
            AttachmentKind::File | AttachmentKind::Code => {
                join_path(&self.upload_url, &attachment.name)
            }
        }
    }

    fn download_url(&self, attachment: &Attachment) -> String {
        let target = match attachment.kind {
            AttachmentKind::Url => ("url", attachment.name.clone()),
            AttachmentKind::File | AttachmentKind::Code => ("file_name", attachment.name.clone()),
        };
        with_query(&self.site_url, &[("download", String::new()), target])
    }

    fn preacher_image_url(&self, image: &str) -> String {
        join_path(&self.upload_url, &format!("images/{image}"))
    }

    fn edit_url(&self, sermon_id: u64) -> String {
        with_query(
            &self.admin_url,
            &[("page", "sermon-browser/new_sermon.php".to_string()), ("mid", sermon_id.to_string())],
        )
    }

    fn podcast_url(&self) -> String {
        if self.podcast_url.is_empty() {
            with_query(&self.site_url, &[("podcast", String::new())])
        } else {
            self.podcast_url.clone()
        }
    }

    fn search_podcast_url(&self, filter: &FilterAttributes) -> String {
        let mut pairs = vec![("podcast", String::new())];
        pairs.extend(filter.query_pairs());
        with_query(&self.site_url, &pairs)
    }

    fn podcast_icon_url(&self) -> String {
        join_path(&self.upload_url, "images/podcast.png")
    }

    fn search_podcast_icon_url(&self) -> String {
        join_path(&self.upload_url, "images/podcast_custom.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> SiteUrls {
        SiteUrls::new("https://church.example/sermons/", "https://church.example/files")
    }

    #[test]
    fn test_sermon_url() {
        assert_eq!(urls().sermon_url(7), "https://church.example/sermons/?sermon_id=7");
    }

    #[test]
    fn test_filter_url_encodes_values() {
        let url = urls().filter_url(&[("stag", "end times".to_string())]);
        assert_eq!(url, "https://church.example/sermons/?stag=end%20times");
    }

    #[test]
    fn test_existing_query_string_is_extended() {
        let site = SiteUrls::new("https://church.example/?page_id=4", "https://f/");
        assert_eq!(site.sermon_url(1), "https://church.example/?page_id=4&sermon_id=1");
    }

    #[test]
    fn test_file_urls() {
        assert_eq!(
            urls().file_url(&Attachment::file("2024/grace notes.mp3")),
            "https://church.example/files/2024/grace%20notes.mp3"
        );
        assert_eq!(
            urls().file_url(&Attachment::url("https://cdn.example/a.mp3")),
            "https://cdn.example/a.mp3"
        );
        assert_eq!(
            urls().download_url(&Attachment::file("a.mp3")),
            "https://church.example/sermons/?download&file_name=a.mp3"
        );
    }

    #[test]
    fn test_page_url_keeps_filter() {
        let filter = FilterAttributes {
            preacher: Some(3),
            page: 1,
            ..FilterAttributes::default()
        };
        assert_eq!(
            urls().page_url(&filter, 2),
            "https://church.example/sermons/?preacher=3&page=2"
        );
    }

    #[test]
    fn test_podcast_urls() {
        assert_eq!(urls().podcast_url(), "https://church.example/sermons/?podcast");
        let mut site = urls();
        site.podcast_url = "https://feeds.example/sermons".to_string();
        assert_eq!(site.podcast_url(), "https://feeds.example/sermons");

        let filter = FilterAttributes {
            series: Some(9),
            ..FilterAttributes::default()
        };
        assert_eq!(
            urls().search_podcast_url(&filter),
            "https://church.example/sermons/?podcast&series=9"
        );
    }
}
