//! Facet aggregation.
//!
//! The index's facet primitive returns one page of `(value, count)` entries
//! together with the number of *documents* matching the base query. Callers
//! need the number of distinct facet values instead, so every aggregation
//! issues two facet queries over the same base query:
//!
//! - query A: the caller's page window and sort, which supplies the content;
//! - query B: offset 0 with a very large limit, whose entry count is the
//!   number of distinct values.
//!
//! Both run concurrently and either failing fails the call. Values beyond
//! the configured limit are not counted, so totals above it are
//! under-reported.

use std::collections::BTreeMap;
use std::sync::Arc;

use proteomes_core::{Page, PageRequest, Result};

use crate::backend::{FacetEntry, FacetField, FacetRequest, FacetSort, IndexQuery, SearchIndex};
use crate::query::{QueryBuilder, SearchRequest};
use crate::types::IndexConfig;

/// Default upper bound on facet values fetched when counting distinct values.
pub const DEFAULT_FACET_VALUE_LIMIT: usize = 10_000_000;

/// Default number of taxonomy ids returned by taxonomy facets.
pub const DEFAULT_TAXID_FACET_LIMIT: usize = 100;

/// Facet counts over a peptiform index.
#[derive(Clone)]
pub struct FacetService {
    index: Arc<dyn SearchIndex>,
    builder: QueryBuilder,
    value_limit: usize,
    taxid_limit: usize,
}

impl FacetService {
    /// Create a facet service over `index` with default limits.
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self {
            index,
            builder: QueryBuilder::new(),
            value_limit: DEFAULT_FACET_VALUE_LIMIT,
            taxid_limit: DEFAULT_TAXID_FACET_LIMIT,
        }
    }

    /// Create a facet service using the limits from `config`.
    pub fn from_config(index: Arc<dyn SearchIndex>, config: &IndexConfig) -> Self {
        Self::new(index)
            .with_value_limit(config.facet_value_limit)
            .with_taxid_limit(config.taxid_facet_limit)
    }

    /// Set the distinct-value limit (at least 1).
    pub fn with_value_limit(mut self, limit: usize) -> Self {
        self.value_limit = limit.max(1);
        self
    }

    /// Set the taxonomy facet limit (at least 1).
    pub fn with_taxid_limit(mut self, limit: usize) -> Self {
        self.taxid_limit = limit.max(1);
        self
    }

    /// The distinct-value limit.
    pub fn value_limit(&self) -> usize {
        self.value_limit
    }

    /// One page of `(value, count)` entries for `field` over all documents.
    ///
    /// `total_elements` of the result is the number of distinct values.
    pub async fn get_counts(
        &self,
        field: FacetField,
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        let base = self.builder.facet_base_query(&[])?;
        self.reconcile(field, base, page, sort).await
    }

    /// Like [`get_counts`](Self::get_counts), restricted to the given taxonomy ids.
    ///
    /// An empty id list applies no restriction.
    pub async fn get_counts_by_species(
        &self,
        field: FacetField,
        taxids: &[u32],
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        let base = self.builder.facet_base_query(taxids)?;
        self.reconcile(field, base, page, sort).await
    }

    async fn reconcile(
        &self,
        field: FacetField,
        base: IndexQuery,
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        let window = FacetRequest {
            field,
            query: base.clone(),
            offset: page.offset(),
            limit: page.size(),
            sort,
        };
        let distinct = FacetRequest {
            field,
            query: base,
            offset: 0,
            limit: self.value_limit,
            sort: FacetSort::default(),
        };

        let (window, distinct) = tokio::join!(
            self.index.facet_query(&window),
            self.index.facet_query(&distinct)
        );
        let (window, distinct) = (window?, distinct?);

        let total = distinct.entries.len() as u64;
        if distinct.entries.len() >= self.value_limit {
            log::warn!(
                "Facet {field:?} reached the value limit of {}; \
                 distinct total may be under-reported",
                self.value_limit
            );
        }
        log::debug!(
            "Facet {field:?}: {} entries on page {}, {total} distinct values over {} documents",
            window.entries.len(),
            page.page(),
            distinct.total_documents
        );

        Ok(Page::new(window.entries, page, total))
    }

    // ------------------------------------------------------------------------
    // Named facets
    // ------------------------------------------------------------------------

    /// Protein accession counts.
    pub async fn protein_counts(
        &self,
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        self.get_counts(FacetField::Protein, page, sort).await
    }

    /// Protein accession counts within the given taxonomy ids.
    pub async fn protein_counts_by_species(
        &self,
        taxids: &[u32],
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        self.get_counts_by_species(FacetField::Protein, taxids, page, sort)
            .await
    }

    /// Protein-group counts.
    pub async fn up_group_counts(
        &self,
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        self.get_counts(FacetField::UpGroup, page, sort).await
    }

    /// Protein-group counts within the given taxonomy ids.
    pub async fn up_group_counts_by_species(
        &self,
        taxids: &[u32],
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        self.get_counts_by_species(FacetField::UpGroup, taxids, page, sort)
            .await
    }

    /// Gene-group counts.
    pub async fn gene_group_counts(
        &self,
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        self.get_counts(FacetField::GeneGroup, page, sort).await
    }

    /// Gene-group counts within the given taxonomy ids.
    pub async fn gene_group_counts_by_species(
        &self,
        taxids: &[u32],
        page: PageRequest,
        sort: FacetSort,
    ) -> Result<Page<FacetEntry>> {
        self.get_counts_by_species(FacetField::GeneGroup, taxids, page, sort)
            .await
    }

    // ------------------------------------------------------------------------
    // Taxonomy facets
    // ------------------------------------------------------------------------

    /// Document count per taxonomy id over all documents.
    pub async fn taxid_counts(&self) -> Result<BTreeMap<u32, u64>> {
        self.taxid_counts_by_query(None).await
    }

    /// Document count per taxonomy id over the documents matching a
    /// free-text search. A blank term covers all documents.
    pub async fn taxid_counts_by_query(&self, term: Option<&str>) -> Result<BTreeMap<u32, u64>> {
        let query = self.builder.build(&SearchRequest::general(term))?;
        let request = FacetRequest {
            field: FacetField::Taxid,
            query,
            offset: 0,
            limit: self.taxid_limit,
            sort: FacetSort::Count,
        };
        let facets = self.index.facet_query(&request).await?;

        let mut counts = BTreeMap::new();
        for entry in facets.entries {
            match entry.value.parse::<u32>() {
                Ok(taxid) => {
                    counts.insert(taxid, entry.count);
                }
                Err(_) => log::warn!("Skipping non-numeric taxid facet value '{}'", entry.value),
            }
        }
        Ok(counts)
    }
}

impl std::fmt::Debug for FacetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetService")
            .field("index", &self.index.name())
            .field("value_limit", &self.value_limit)
            .field("taxid_limit", &self.taxid_limit)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
