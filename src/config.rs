/// Runtime configuration for koru-lens pipelines.
///
/// Everything has a sensible default, so most callers never touch this.
/// The CLI can load overrides from a JSON file:
///
/// ```json
/// {"default_page_size": 20, "max_page_size": 50, "missing_aggregate": "last"}
/// ```
use crate::error::LensResult;
use crate::group::MissingAggregate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Records per page when a request does not say.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound on requested page sizes.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Page size used when a search does not request one (default: 10).
    pub default_page_size: usize,
    /// Requested page sizes above this are clamped (default: 100).
    pub max_page_size: usize,
    /// How `null` aggregates order when groups are sorted (default: as zero).
    pub missing_aggregate: MissingAggregate,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            missing_aggregate: MissingAggregate::AsZero,
        }
    }
}

impl LensConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default page size.
    pub fn default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Set the maximum page size.
    pub fn max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = size;
        self
    }

    /// Set how `null` aggregates are ordered.
    pub fn missing_aggregate(mut self, missing: MissingAggregate) -> Self {
        self.missing_aggregate = missing;
        self
    }

    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> LensResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Effective page size for a request.
    ///
    /// `None` falls back to the default; anything larger than the maximum
    /// is clamped. Zero is passed through so pagination can reject it.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}
