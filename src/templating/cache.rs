//! Content-addressed keys and statistics for the rendered-template cache.
//!
//! Rendered HTML is a pure function of the template type, the template text
//! and the render data, so the cache key is derived from exactly those three
//! inputs. Identical requests share an entry; a change to any input produces a
//! different key. No invalidation protocol is needed beyond
//! [`TemplateEngine::clear_cache`](super::TemplateEngine::clear_cache) after a
//! template edit.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::constants::CACHE_KEY_PREFIX;
use crate::models::{RenderData, TemplateType};

/// Cache key of one rendered template.
///
/// Displays as `sb_template_{type}_{sha256}` where the digest covers the
/// template text and the canonical JSON form of the render data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderCacheKey {
    template_type: TemplateType,
    digest: String,
}

impl RenderCacheKey {
    /// Derive the key for rendering `template` with `data`.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if `data` cannot be encoded as JSON.
    pub fn new(
        template_type: TemplateType,
        template: &str,
        data: &RenderData,
    ) -> Result<Self, serde_json::Error> {
        let canonical = serde_json::to_vec(data)?;

        let mut hasher = Sha256::new();
        hasher.update(template.as_bytes());
        // separates the template from the data so the two cannot run together
        hasher.update([0u8]);
        hasher.update(&canonical);

        Ok(Self {
            template_type,
            digest: hex::encode(hasher.finalize()),
        })
    }

    /// Prefix shared by every key of one template type.
    #[must_use]
    pub fn type_prefix(template_type: TemplateType) -> String {
        format!("{CACHE_KEY_PREFIX}{template_type}_")
    }

    #[must_use]
    pub const fn template_type(&self) -> TemplateType {
        self.template_type
    }

    /// Hex-encoded SHA-256 digest of the rendering inputs.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for RenderCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::type_prefix(self.template_type), self.digest)
    }
}

/// Cache hit and miss counts of a [`TemplateEngine`](super::TemplateEngine).
///
/// A miss is counted each time the parser runs, including bypassed renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub hits: u64,
    pub misses: u64,
}

impl RenderStats {
    /// Total number of renders.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Calculate hit rate as a percentage
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
