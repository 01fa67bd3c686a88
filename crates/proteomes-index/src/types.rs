//! Index configuration.
//!
//! These types are always available regardless of feature flags.

use std::path::Path;

use proteomes_core::{Error, PageRequest, Result};
use serde::{Deserialize, Serialize};

/// Search index configuration.
///
/// Loadable from TOML; every field has a default.
///
/// ```toml
/// backend = "tantivy"
/// index_path = "/var/lib/proteomes/index"
/// facet_value_limit = 10000000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Backend type. Only "tantivy" is built in.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Path to the index directory. In-memory index when unset.
    #[serde(default)]
    pub index_path: Option<String>,

    /// Memory budget for the index writer, in bytes.
    #[serde(default = "default_writer_buffer_size")]
    pub writer_buffer_size: usize,

    /// Upper bound on facet values fetched when counting distinct values.
    #[serde(default = "default_facet_value_limit")]
    pub facet_value_limit: usize,

    /// Limit for taxonomy facets.
    #[serde(default = "default_taxid_facet_limit")]
    pub taxid_facet_limit: usize,

    /// Default page size.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

fn default_backend() -> String {
    "tantivy".to_string()
}

fn default_writer_buffer_size() -> usize {
    50_000_000
}

fn default_facet_value_limit() -> usize {
    10_000_000
}

fn default_taxid_facet_limit() -> usize {
    100
}

fn default_page_size() -> usize {
    10
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            index_path: None,
            writer_buffer_size: default_writer_buffer_size(),
            facet_value_limit: default_facet_value_limit(),
            taxid_facet_limit: default_taxid_facet_limit(),
            default_page_size: default_page_size(),
        }
    }
}

impl IndexConfig {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the TOML is invalid or a limit is zero.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: IndexConfig =
            toml::from_str(s).map_err(|e| Error::config(format!("invalid index config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the file does not exist, `Io` when it cannot
    /// be read, and `Config` when its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::not_found(path.display().to_string(), "index config")
            }
            _ => Error::io_with_path(e, path),
        })?;
        log::debug!("Loading index config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// The first page at the configured default size.
    pub fn first_page(&self) -> Result<PageRequest> {
        PageRequest::first(self.default_page_size)
    }

    fn validate(&self) -> Result<()> {
        if self.facet_value_limit == 0 {
            return Err(Error::config("facet_value_limit must be at least 1"));
        }
        if self.taxid_facet_limit == 0 {
            return Err(Error::config("taxid_facet_limit must be at least 1"));
        }
        if self.default_page_size == 0 {
            return Err(Error::config("default_page_size must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
