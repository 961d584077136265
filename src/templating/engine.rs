//! Template rendering with a content-addressed result cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::cache::{RenderCacheKey, RenderStats};
use super::parser::TagParser;
use crate::constants::{CACHE_KEY_PREFIX, TEMPLATE_CACHE_TTL};
use crate::core::TemplateError;
use crate::models::{RenderData, TemplateType};
use crate::store::{CacheStore, OptionsStore};

/// Loads stored templates, renders them through a [`TagParser`] and caches
/// the HTML.
///
/// The engine is `Send + Sync`; concurrent renders of the same inputs may both
/// miss and both write the cache, which is harmless because they write equal
/// values.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use sermon_templates::models::{RenderData, Sermon};
/// use sermon_templates::store::MemoryStore;
/// use sermon_templates::templating::{TagParser, TemplateEngine};
///
/// # fn example() -> Result<(), sermon_templates::core::TemplateError> {
/// let store = Arc::new(MemoryStore::new());
/// let engine = TemplateEngine::new(TagParser::default(), store.clone(), store);
/// let html = engine.render("single", &RenderData::single(Sermon::new(1, "Grace")), false)?;
/// # Ok(())
/// # }
/// ```
pub struct TemplateEngine {
    parser: TagParser,
    options: Arc<dyn OptionsStore>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("parser", &self.parser)
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Create an engine with the default one-hour cache lifetime.
    pub fn new(
        parser: TagParser,
        options: Arc<dyn OptionsStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            parser,
            options,
            cache,
            ttl: TEMPLATE_CACHE_TTL,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Override the cache entry lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub const fn parser(&self) -> &TagParser {
        &self.parser
    }

    /// The persisted options store holding templates and backups.
    #[must_use]
    pub fn options(&self) -> Arc<dyn OptionsStore> {
        Arc::clone(&self.options)
    }

    /// Stored template text for `template_type`; missing templates are empty.
    #[must_use]
    pub fn template(&self, template_type: TemplateType) -> String {
        self.options.get_option(&template_type.template_option()).unwrap_or_default()
    }

    /// Render the stored template named by `template_type` (`search` or `single`).
    ///
    /// With `bypass_cache` the parser always runs; the fresh result still
    /// replaces the cached entry.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidTemplateType`] for any other type name.
    /// Missing templates and missing data are not errors.
    pub fn render(
        &self,
        template_type: &str,
        data: &RenderData,
        bypass_cache: bool,
    ) -> Result<String, TemplateError> {
        let template_type: TemplateType = template_type.parse()?;
        Ok(self.render_type(template_type, data, bypass_cache))
    }

    /// Render with an already validated template type.
    pub fn render_type(
        &self,
        template_type: TemplateType,
        data: &RenderData,
        bypass_cache: bool,
    ) -> String {
        let template = self.template(template_type);

        let key = match RenderCacheKey::new(template_type, &template, data) {
            Ok(key) => Some(key.to_string()),
            Err(e) => {
                tracing::warn!("Render data not serializable, skipping cache: {}", e);
                None
            }
        };

        if !bypass_cache {
            if let Some(cached) = key.as_deref().and_then(|k| self.cache.get(k)) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache hit for {} template", template_type);
                return cached;
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            "Rendering {} template ({})",
            template_type,
            if bypass_cache { "cache bypassed" } else { "cache miss" }
        );

        let html = self.parser.parse(&template, data, template_type);
        if let Some(key) = key {
            self.cache.set(&key, &html, self.ttl);
        }
        html
    }

    /// Delete every cache entry this engine owns, returning how many were removed.
    pub fn clear_cache(&self) -> usize {
        let removed = self
            .cache
            .keys_with_prefix(CACHE_KEY_PREFIX)
            .iter()
            .filter(|key| self.cache.delete(key))
            .count();
        tracing::info!("Cleared {} cached template render(s)", removed);
        removed
    }

    /// Store new template text and drop all cached renders.
    ///
    /// Returns the number of cache entries cleared.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Store`] if the options store rejects the write;
    /// the cache is left untouched in that case.
    pub fn save_template(
        &self,
        template_type: TemplateType,
        text: &str,
    ) -> Result<usize, TemplateError> {
        self.options.set_option(&template_type.template_option(), text)?;
        tracing::info!("Saved {} template ({} bytes)", template_type, text.len());
        Ok(self.clear_cache())
    }

    /// Cache hits and parser runs since the engine was created.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        RenderStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
