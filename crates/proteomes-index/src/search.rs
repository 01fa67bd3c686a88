//! Paginated peptiform search.
//!
//! `SearchService` exposes one `find_*` / `count_*` pair per searchable
//! field. Every `count_*` issues the same query as its `find_*` with a
//! single-result page and returns the reported total, so the two always
//! agree. `find_all_by_*` operations count first and then fetch one page
//! sized to the total.

use std::sync::Arc;

use proteomes_core::{Page, PageRequest, Result};

use crate::backend::SearchIndex;
use crate::document::PeptiForm;
use crate::query::{ExactField, NumericBound, QueryBuilder, SearchRequest};

/// Read-only search operations over a peptiform index.
#[derive(Clone)]
pub struct SearchService {
    index: Arc<dyn SearchIndex>,
    builder: QueryBuilder,
}

impl SearchService {
    /// Create a search service over `index`.
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self {
            index,
            builder: QueryBuilder::new(),
        }
    }

    /// Run a typed request and return one page.
    pub async fn search(
        &self,
        request: &SearchRequest,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        let query = self.builder.build(request)?;
        self.index.query(&query, page).await
    }

    /// Count the documents matching a typed request.
    pub async fn count(&self, request: &SearchRequest) -> Result<u64> {
        Ok(self
            .search(request, PageRequest::single())
            .await?
            .total_elements())
    }

    /// Fetch every document matching a typed request.
    pub async fn find_all_matching(&self, request: &SearchRequest) -> Result<Vec<PeptiForm>> {
        let total = self.count(request).await?;
        let size = usize::try_from(total).unwrap_or(usize::MAX).max(1);
        let page = PageRequest::first(size)?;
        Ok(self.search(request, page).await?.into_content())
    }

    // ------------------------------------------------------------------------
    // All documents
    // ------------------------------------------------------------------------

    /// One page of all documents.
    pub async fn find_all(&self, page: PageRequest) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::All, page).await
    }

    /// Number of documents in the index.
    pub async fn count_all(&self) -> Result<u64> {
        self.count(&SearchRequest::All).await
    }

    // ------------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------------

    /// Look up a document by id.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<PeptiForm>> {
        let request = SearchRequest::exact(ExactField::Id, id);
        let page = self.search(&request, PageRequest::single()).await?;
        Ok(page.into_content().into_iter().next())
    }

    /// Documents with the given sequence (case-insensitive).
    pub async fn find_by_sequence(
        &self,
        sequence: &str,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::exact(ExactField::Sequence, sequence), page)
            .await
    }

    /// Number of documents with the given sequence.
    pub async fn count_by_sequence(&self, sequence: &str) -> Result<u64> {
        self.count(&SearchRequest::exact(ExactField::Sequence, sequence))
            .await
    }

    /// Documents of the given taxonomy id.
    pub async fn find_by_taxid(&self, taxid: u32, page: PageRequest) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::Taxid(taxid), page).await
    }

    /// Number of documents of the given taxonomy id.
    pub async fn count_by_taxid(&self, taxid: u32) -> Result<u64> {
        self.count(&SearchRequest::Taxid(taxid)).await
    }

    /// Documents whose species matches any token of `species`.
    ///
    /// Tokens may carry `*` and `?` wildcards; matching is case-insensitive.
    pub async fn find_by_species(
        &self,
        species: &str,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::Species(species.to_string()), page)
            .await
    }

    /// Number of documents whose species matches any token of `species`.
    pub async fn count_by_species(&self, species: &str) -> Result<u64> {
        self.count(&SearchRequest::Species(species.to_string()))
            .await
    }

    // ------------------------------------------------------------------------
    // Proteins, modifications and groups
    // ------------------------------------------------------------------------

    /// Documents mapping to the given protein accession.
    pub async fn find_by_protein(
        &self,
        accession: &str,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::exact(ExactField::Protein, accession), page)
            .await
    }

    /// Every document mapping to the given protein accession.
    pub async fn find_all_by_protein(&self, accession: &str) -> Result<Vec<PeptiForm>> {
        self.find_all_matching(&SearchRequest::exact(ExactField::Protein, accession))
            .await
    }

    /// Number of documents mapping to the given protein accession.
    pub async fn count_by_protein(&self, accession: &str) -> Result<u64> {
        self.count(&SearchRequest::exact(ExactField::Protein, accession))
            .await
    }

    /// Documents carrying the given modification name.
    pub async fn find_by_mod(&self, name: &str, page: PageRequest) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::exact(ExactField::Mod, name), page)
            .await
    }

    /// Number of documents carrying the given modification name.
    pub async fn count_by_mod(&self, name: &str) -> Result<u64> {
        self.count(&SearchRequest::exact(ExactField::Mod, name))
            .await
    }

    /// Documents in the given protein group.
    pub async fn find_by_up_group(
        &self,
        group: &str,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::exact(ExactField::UpGroup, group), page)
            .await
    }

    /// Every document in the given protein group.
    pub async fn find_all_by_up_group(&self, group: &str) -> Result<Vec<PeptiForm>> {
        self.find_all_matching(&SearchRequest::exact(ExactField::UpGroup, group))
            .await
    }

    /// Number of documents in the given protein group.
    pub async fn count_by_up_group(&self, group: &str) -> Result<u64> {
        self.count(&SearchRequest::exact(ExactField::UpGroup, group))
            .await
    }

    /// Documents in the given gene group.
    pub async fn find_by_gene_group(
        &self,
        group: &str,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::exact(ExactField::GeneGroup, group), page)
            .await
    }

    /// Every document in the given gene group.
    pub async fn find_all_by_gene_group(&self, group: &str) -> Result<Vec<PeptiForm>> {
        self.find_all_matching(&SearchRequest::exact(ExactField::GeneGroup, group))
            .await
    }

    /// Number of documents in the given gene group.
    pub async fn count_by_gene_group(&self, group: &str) -> Result<u64> {
        self.count(&SearchRequest::exact(ExactField::GeneGroup, group))
            .await
    }

    // ------------------------------------------------------------------------
    // Protein counts
    // ------------------------------------------------------------------------

    /// Documents mapping to more than `n` proteins.
    pub async fn find_by_num_proteins_greater_than(
        &self,
        n: i64,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::NumProteins(NumericBound::GreaterThan(n)), page)
            .await
    }

    /// Number of documents mapping to more than `n` proteins.
    pub async fn count_by_num_proteins_greater_than(&self, n: i64) -> Result<u64> {
        self.count(&SearchRequest::NumProteins(NumericBound::GreaterThan(n)))
            .await
    }

    /// Documents mapping to fewer than `n` proteins.
    pub async fn find_by_num_proteins_less_than(
        &self,
        n: i64,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::NumProteins(NumericBound::LessThan(n)), page)
            .await
    }

    /// Number of documents mapping to fewer than `n` proteins.
    pub async fn count_by_num_proteins_less_than(&self, n: i64) -> Result<u64> {
        self.count(&SearchRequest::NumProteins(NumericBound::LessThan(n)))
            .await
    }

    // ------------------------------------------------------------------------
    // Free text
    // ------------------------------------------------------------------------

    /// Free-text search; a blank term or `*` matches everything.
    pub async fn find_by_query(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::general(term), page).await
    }

    /// Number of documents matching a free-text search.
    pub async fn count_by_query(&self, term: Option<&str>) -> Result<u64> {
        self.count(&SearchRequest::general(term)).await
    }

    /// Documents not matching a free-text search; a blank term matches nothing.
    pub async fn find_by_query_not(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        self.search(&SearchRequest::Negated(term.map(str::to_string)), page)
            .await
    }

    /// Number of documents not matching a free-text search.
    pub async fn count_by_query_not(&self, term: Option<&str>) -> Result<u64> {
        self.count(&SearchRequest::Negated(term.map(str::to_string)))
            .await
    }

    /// Free-text search restricted to the given taxonomy ids.
    ///
    /// An empty id list applies no restriction.
    pub async fn find_by_query_and_filter_taxid(
        &self,
        term: Option<&str>,
        taxids: &[u32],
        page: PageRequest,
    ) -> Result<Page<PeptiForm>> {
        let request = SearchRequest::Filtered {
            term: term.map(str::to_string),
            taxids: taxids.to_vec(),
        };
        self.search(&request, page).await
    }

    /// Number of documents matching a taxonomy-filtered free-text search.
    pub async fn count_by_query_and_filter_taxid(
        &self,
        term: Option<&str>,
        taxids: &[u32],
    ) -> Result<u64> {
        let request = SearchRequest::Filtered {
            term: term.map(str::to_string),
            taxids: taxids.to_vec(),
        };
        self.count(&request).await
    }
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("index", &self.index.name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
