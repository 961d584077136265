//! Site configuration for the command line.
//!
//! The library itself takes its collaborators and stores as arguments; this
//! module is how the `sermon-templates` binary decides what to pass.
//!
//! # Location
//!
//! 1. `--config PATH` on the command line
//! 2. `SERMON_TEMPLATES_CONFIG` environment variable
//! 3. `~/.sermon-templates/config.toml` (`%LOCALAPPDATA%\sermon-templates\config.toml` on Windows)
//!
//! A missing file is not an error; every field has a default.
//!
//! # Format
//!
//! ```toml
//! site_url = "https://church.example/sermons/"
//! upload_url = "https://church.example/wp-content/uploads/sermons/"
//! podcast_url = "https://church.example/sermons/feed/"
//! admin_url = "https://church.example/wp-admin/admin.php"
//! date_format = "%d %B %Y"
//! cache_ttl_secs = 3600
//! sermons_per_page = 10
//! state_path = "/var/lib/sermon-templates/state.json"
//! ```

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_DATE_FORMAT, DEFAULT_SERMONS_PER_PAGE, TEMPLATE_CACHE_TTL,
};
use crate::core::TemplateError;
use crate::templating::{Collaborators, SiteUrls, TagParser, TagRenderer};

const CONFIG_DIR_NAME: &str = ".sermon-templates";
const STATE_FILE_NAME: &str = "state.json";

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Public sermons page
    pub site_url: String,
    /// Base URL of uploaded sermon files
    pub upload_url: String,
    /// Podcast feed URL; empty means `{site_url}?podcast`
    pub podcast_url: String,
    /// Admin page used by `[editlink]`
    pub admin_url: String,
    /// `chrono` strftime format for `[date]`
    pub date_format: String,
    /// Lifetime of cached renders in seconds
    pub cache_ttl_secs: u64,
    /// JSON file holding templates and cached renders; defaults next to the config file
    pub state_path: Option<PathBuf>,
    /// Page size used by pagination links
    pub sermons_per_page: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let urls = SiteUrls::default();
        Self {
            site_url: urls.site_url,
            upload_url: urls.upload_url,
            podcast_url: urls.podcast_url,
            admin_url: urls.admin_url,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            cache_ttl_secs: TEMPLATE_CACHE_TTL.as_secs(),
            state_path: None,
            sermons_per_page: DEFAULT_SERMONS_PER_PAGE,
        }
    }
}

impl SiteConfig {
    /// Load from `path`, or from [`default_path`](Self::default_path) when `None`.
    ///
    /// Returns the default configuration if the file does not exist.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Reject values the renderer cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Config`] for a zero page size or a date
    /// format `chrono` cannot parse.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.sermons_per_page == 0 {
            return Err(TemplateError::Config {
                message: "sermons_per_page must be at least 1".to_string(),
            });
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(TemplateError::Config {
                message: format!("date_format '{}' is not a valid strftime format", self.date_format),
            });
        }
        Ok(())
    }

    /// `SERMON_TEMPLATES_CONFIG` if set, otherwise the per-user config file.
    pub fn default_path() -> Result<PathBuf> {
        Self::resolve_default_path(std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
    }

    fn resolve_default_path(from_env: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = from_env.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(path);
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn config_dir() -> Result<PathBuf> {
        let dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("sermon-templates")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(CONFIG_DIR_NAME)
        };
        Ok(dir)
    }

    /// State file location: `state_path`, or `state.json` beside `config_path`.
    #[must_use]
    pub fn state_path(&self, config_path: &Path) -> PathBuf {
        self.state_path.clone().unwrap_or_else(|| {
            config_path
                .parent()
                .map_or_else(|| PathBuf::from(STATE_FILE_NAME), |dir| dir.join(STATE_FILE_NAME))
        })
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    #[must_use]
    pub fn site_urls(&self) -> SiteUrls {
        SiteUrls {
            site_url: self.site_url.clone(),
            upload_url: self.upload_url.clone(),
            podcast_url: self.podcast_url.clone(),
            admin_url: self.admin_url.clone(),
        }
    }

    /// Built-in collaborators for this site.
    #[must_use]
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::from_site(self.site_urls(), self.sermons_per_page)
    }

    /// A parser wired with this site's collaborators and date format.
    #[must_use]
    pub fn parser(&self) -> TagParser {
        TagParser::new(TagRenderer::with_date_format(self.collaborators(), &self.date_format))
    }
}
