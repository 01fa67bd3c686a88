//! Search index trait and factory.
//!
//! This module defines the `SearchIndex` trait the services are written
//! against, the backend-neutral `IndexQuery` it executes, and the facet
//! primitive types.
//!
//! # Backends
//!
//! - `TantivyIndex`: Tantivy-backed index (requires `fts-tantivy` feature)
//!
//! # Facet statistics
//!
//! The facet primitive returns one page of `(value, count)` entries plus
//! `total_documents`, the number of *documents* matching the facet base
//! query. That statistic is not the number of distinct facet values; the
//! facet service reconciles the two (see [`crate::facets`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use proteomes_index::{create_search_index, IndexConfig, IndexQuery};
//! use proteomes_core::PageRequest;
//!
//! let index = create_search_index(&IndexConfig::default()).await?;
//! let page = index.query(&IndexQuery::All, PageRequest::first(20)?).await?;
//! println!("{} peptiforms indexed", page.total_elements());
//! ```

use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use proteomes_core::{Page, PageRequest, Result};
use serde::{Deserialize, Serialize};

use crate::document::{fields, PeptiForm};
use crate::types::IndexConfig;

/// Queryable document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexField {
    /// Composite id.
    Id,
    /// Uppercase sequence.
    Sequence,
    /// Taxonomy id.
    Taxid,
    /// Tokenized species.
    Species,
    /// Aggregate text.
    Text,
    /// Protein count.
    NumProteins,
    /// Protein accessions.
    Proteins,
    /// Modification names.
    Mods,
    /// Protein-group count.
    NumUpGroups,
    /// Protein-group ids.
    UpGroups,
    /// Gene-group count.
    NumGeneGroups,
    /// Gene-group ids.
    GeneGroups,
    /// Group descriptions.
    GroupDescs,
}

impl IndexField {
    /// Field name in the index schema.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => fields::ID,
            Self::Sequence => fields::SEQUENCE,
            Self::Taxid => fields::TAXID,
            Self::Species => fields::SPECIES,
            Self::Text => fields::TEXT,
            Self::NumProteins => fields::NUM_PROTEINS,
            Self::Proteins => fields::PROTEINS,
            Self::Mods => fields::MODS,
            Self::NumUpGroups => fields::NUM_UP_GROUPS,
            Self::UpGroups => fields::UP_GROUPS,
            Self::NumGeneGroups => fields::NUM_GENE_GROUPS,
            Self::GeneGroups => fields::GENE_GROUPS,
            Self::GroupDescs => fields::GROUP_DESCS,
        }
    }
}

/// A backend-neutral index query.
///
/// `Text` holds tokens already lowercased by the query builder; any token
/// may carry `*` or `?` wildcards and the tokens are OR-combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexQuery {
    /// Every document.
    All,
    /// No document.
    Nothing,
    /// Exact token on a string field.
    Term {
        /// Target field.
        field: IndexField,
        /// Token to match verbatim.
        value: String,
    },
    /// Exact value on an integer field.
    IntTerm {
        /// Target field.
        field: IndexField,
        /// Value to match.
        value: u64,
    },
    /// Tokenized match, any token suffices.
    Text {
        /// Target field.
        field: IndexField,
        /// Lowercased tokens, possibly with wildcards.
        tokens: Vec<String>,
    },
    /// Integer range.
    Range {
        /// Target field.
        field: IndexField,
        /// Lower bound.
        lower: Bound<u64>,
        /// Upper bound.
        upper: Bound<u64>,
    },
    /// Documents not matching the inner query.
    Not(Box<IndexQuery>),
    /// Documents matching every clause.
    And(Vec<IndexQuery>),
    /// Documents matching any clause.
    Or(Vec<IndexQuery>),
}

impl IndexQuery {
    /// Exact-token query.
    pub fn term(field: IndexField, value: impl Into<String>) -> Self {
        Self::Term {
            field,
            value: value.into(),
        }
    }

    /// Negate a query.
    pub fn negate(query: IndexQuery) -> Self {
        Self::Not(Box::new(query))
    }
}

/// Fields that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetField {
    /// Protein accessions.
    Protein,
    /// Protein-group ids.
    UpGroup,
    /// Gene-group ids.
    GeneGroup,
    /// Taxonomy ids.
    Taxid,
}

impl FacetField {
    /// The document field holding the facet values.
    pub fn source_field(&self) -> IndexField {
        match self {
            Self::Protein => IndexField::Proteins,
            Self::UpGroup => IndexField::UpGroups,
            Self::GeneGroup => IndexField::GeneGroups,
            Self::Taxid => IndexField::Taxid,
        }
    }
}

/// Ordering of facet entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetSort {
    /// Descending count, ties broken by ascending value.
    #[default]
    Count,
    /// Ascending lexical value.
    Index,
}

/// Request for one page of facet values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRequest {
    /// Field to aggregate.
    pub field: FacetField,
    /// Base query selecting the documents to aggregate over.
    pub query: IndexQuery,
    /// Number of facet values to skip.
    pub offset: usize,
    /// Maximum number of facet values to return.
    pub limit: usize,
    /// Entry ordering.
    pub sort: FacetSort,
}

/// One distinct facet value and the number of documents carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacetEntry {
    /// Facet value.
    pub value: String,
    /// Matching document count.
    pub count: u64,
}

impl FacetEntry {
    /// Create a facet entry.
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Output of the facet primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetPage {
    /// The requested window of entries.
    pub entries: Vec<FacetEntry>,
    /// Number of documents matching the base query (not distinct values).
    pub total_documents: u64,
}

/// Sort entries in place and cut the requested window.
pub(crate) fn window_entries(
    mut entries: Vec<FacetEntry>,
    sort: FacetSort,
    offset: usize,
    limit: usize,
) -> Vec<FacetEntry> {
    match sort {
        FacetSort::Count => {
            entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)))
        }
        FacetSort::Index => entries.sort_by(|a, b| a.value.cmp(&b.value)),
    }
    entries.into_iter().skip(offset).take(limit).collect()
}

/// Abstract peptiform index.
///
/// All reads are side-effect free. Writes replace documents by id.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Run a query, returning one page of documents plus the total match count.
    async fn query(&self, query: &IndexQuery, page: PageRequest) -> Result<Page<PeptiForm>>;

    /// Aggregate a facet field over the documents matching `request.query`.
    async fn facet_query(&self, request: &FacetRequest) -> Result<FacetPage>;

    /// Insert or replace a document.
    async fn insert(&self, form: &PeptiForm) -> Result<()>;

    /// Insert or replace several documents with a single commit.
    async fn insert_batch(&self, forms: &[PeptiForm]) -> Result<()>;

    /// Delete the document with the given id, if present.
    async fn delete_by_id(&self, id: &str) -> Result<()>;

    /// Delete every document.
    async fn delete_all(&self) -> Result<()>;

    /// Get the backend name for diagnostics.
    fn name(&self) -> &str;

    /// Check if the index is ready to handle queries.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Create a search index based on configuration.
///
/// The `"tantivy"` backend opens (or creates) an on-disk index when
/// `index_path` is set, and an in-memory index otherwise.
///
/// # Errors
///
/// Returns `Config` for an unknown backend name, or the backend's error if
/// it cannot be initialized.
pub async fn create_search_index(config: &IndexConfig) -> Result<Arc<dyn SearchIndex>> {
    match config.backend.as_str() {
        #[cfg(feature = "fts-tantivy")]
        "tantivy" => {
            let index = match config.index_path {
                Some(ref path) => crate::tantivy_index::TantivyIndex::open_or_create(
                    std::path::Path::new(path),
                    config,
                )?,
                None => {
                    log::info!("No index_path configured, using an in-memory index");
                    crate::tantivy_index::TantivyIndex::in_memory_with_config(config)?
                }
            };
            Ok(Arc::new(index))
        }
        other => Err(proteomes_core::Error::config(format!(
            "unknown search index backend '{other}'"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================
