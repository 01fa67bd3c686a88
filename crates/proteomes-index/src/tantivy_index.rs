//! Tantivy search index implementation.
//!
//! Provides `TantivyIndex`, the `SearchIndex` backed by Tantivy. This module
//! is only available with the `fts-tantivy` feature.
//!
//! Writes go through a single [`Indexer`] behind an async mutex and run on
//! the blocking thread pool. Every write commits and then reloads the
//! reader, so a completed write is visible to the next query. Reads never
//! take the lock.
//!
//! Query results are paged in index order (segment, then document), so a
//! page sequence over an unchanged index is stable.

use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use proteomes_core::{Error, Page, PageRequest, Result};
use tantivy::collector::{Count, DocSetCollector, FacetCollector};
use tantivy::query::{
    AllQuery, BooleanQuery, EmptyQuery, Occur, Query, RangeQuery, RegexQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::{DocAddress, IndexReader, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::Mutex;

use crate::backend::{
    window_entries, FacetEntry, FacetPage, FacetRequest, IndexQuery, SearchIndex,
};
use crate::document::PeptiForm;
use crate::indexer::{from_tantivy_doc, Indexer};
use crate::query::is_wildcard;
use crate::schema::PeptiformSchema;
use crate::types::IndexConfig;

/// Tantivy-based peptiform index.
pub struct TantivyIndex {
    schema: PeptiformSchema,
    reader: IndexReader,
    indexer: Arc<Mutex<Indexer>>,
    location: Option<PathBuf>,
}

impl TantivyIndex {
    /// Create an empty in-memory index.
    pub fn in_memory() -> Result<Self> {
        Self::in_memory_with_config(&IndexConfig::default())
    }

    /// Create an empty in-memory index using the configured writer budget.
    pub fn in_memory_with_config(config: &IndexConfig) -> Result<Self> {
        let schema = PeptiformSchema::build();
        let indexer = Indexer::in_memory_with_buffer_size(&schema, config.writer_buffer_size)?;
        Self::from_indexer(indexer, None)
    }

    /// Open the index at `path`, creating it if missing.
    pub fn open_or_create(path: &Path, config: &IndexConfig) -> Result<Self> {
        let schema = PeptiformSchema::build();
        let indexer = Indexer::with_buffer_size(path, &schema, config.writer_buffer_size)?;
        Self::from_indexer(indexer, Some(path.to_path_buf()))
    }

    /// Check if an index exists at the given path.
    pub fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    fn from_indexer(indexer: Indexer, location: Option<PathBuf>) -> Result<Self> {
        let reader: IndexReader = indexer
            .index()
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::index_unavailable_with_source("failed to create index reader", e))?;

        Ok(Self {
            schema: indexer.schema().clone(),
            reader,
            indexer: Arc::new(Mutex::new(indexer)),
            location,
        })
    }

    /// Number of live documents.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Directory of an on-disk index.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    fn reload(&self) -> Result<()> {
        self.reader
            .reload()
            .map_err(|e| Error::index_unavailable_with_source("failed to reload index reader", e))
    }

    /// Run a writer operation on the blocking pool, then reload the reader.
    ///
    /// The writer lock is held until the operation finishes, so writes are
    /// applied one at a time.
    async fn write<F, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Indexer) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut indexer = Arc::clone(&self.indexer).lock_owned().await;
        let result = tokio::task::spawn_blocking(move || op(&mut *indexer))
            .await
            .map_err(|e| Error::index_unavailable_with_source("index writer task failed", e))??;
        self.reload()?;
        Ok(result)
    }

    /// Compile a backend-neutral query into a Tantivy query.
    fn compile(&self, query: &IndexQuery) -> Result<Box<dyn Query>> {
        let compiled: Box<dyn Query> = match query {
            IndexQuery::All => Box::new(AllQuery),
            IndexQuery::Nothing => Box::new(EmptyQuery),
            IndexQuery::Term { field, value } => Box::new(TermQuery::new(
                Term::from_field_text(self.schema.field(*field), value),
                IndexRecordOption::Basic,
            )),
            IndexQuery::IntTerm { field, value } => Box::new(TermQuery::new(
                Term::from_field_u64(self.schema.field(*field), *value),
                IndexRecordOption::Basic,
            )),
            IndexQuery::Text { field, tokens } => {
                let field = self.schema.field(*field);
                let clauses = tokens
                    .iter()
                    .map(|token| Ok((Occur::Should, token_query(field, token)?)))
                    .collect::<Result<Vec<_>>>()?;
                Box::new(BooleanQuery::new(clauses))
            }
            IndexQuery::Range { field, lower, upper } => {
                if matches!((lower, upper), (Bound::Unbounded, Bound::Unbounded)) {
                    Box::new(AllQuery)
                } else {
                    let field = self.schema.field(*field);
                    let to_term = |v: &u64| Term::from_field_u64(field, *v);
                    Box::new(RangeQuery::new(
                        lower.as_ref().map(to_term),
                        upper.as_ref().map(to_term),
                    ))
                }
            }
            IndexQuery::Not(inner) => Box::new(BooleanQuery::new(vec![
                (Occur::Must, Box::new(AllQuery) as Box<dyn Query>),
                (Occur::MustNot, self.compile(inner)?),
            ])),
            IndexQuery::And(clauses) if clauses.is_empty() => Box::new(AllQuery),
            IndexQuery::And(clauses) => {
                Box::new(BooleanQuery::new(self.compile_all(Occur::Must, clauses)?))
            }
            IndexQuery::Or(clauses) if clauses.is_empty() => Box::new(EmptyQuery),
            IndexQuery::Or(clauses) => {
                Box::new(BooleanQuery::new(self.compile_all(Occur::Should, clauses)?))
            }
        };
        Ok(compiled)
    }

    fn compile_all(
        &self,
        occur: Occur,
        clauses: &[IndexQuery],
    ) -> Result<Vec<(Occur, Box<dyn Query>)>> {
        clauses
            .iter()
            .map(|clause| Ok((occur, self.compile(clause)?)))
            .collect()
    }
}

/// Query for one lowercased text token, honoring `*` and `?` wildcards.
fn token_query(field: Field, token: &str) -> Result<Box<dyn Query>> {
    if is_wildcard(token) {
        let pattern = wildcard_pattern(token);
        let query = RegexQuery::from_pattern(&pattern, field).map_err(|e| {
            Error::invalid_field("query", format!("invalid wildcard '{token}': {e}"))
        })?;
        Ok(Box::new(query))
    } else {
        Ok(Box::new(TermQuery::new(
            Term::from_field_text(field, token),
            IndexRecordOption::Basic,
        )))
    }
}

/// Translate a wildcard token into an anchored term regex.
fn wildcard_pattern(token: &str) -> String {
    let mut pattern = String::with_capacity(token.len() * 2);
    for c in token.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern
}

#[async_trait]
impl SearchIndex for TantivyIndex {
    async fn query(&self, query: &IndexQuery, page: PageRequest) -> Result<Page<PeptiForm>> {
        log::debug!("TantivyIndex: query={query:?}, page={page:?}");
        let compiled = self.compile(query)?;
        let searcher = self.reader.searcher();
        let search_failed =
            |e: tantivy::TantivyError| Error::index_unavailable_with_source("search failed", e);

        let mut addresses: Vec<DocAddress> = searcher
            .search(compiled.as_ref(), &DocSetCollector)
            .map_err(search_failed)?
            .into_iter()
            .collect();
        addresses.sort_unstable_by_key(|address| (address.segment_ord, address.doc_id));
        let total = addresses.len();

        let mut content = Vec::with_capacity(page.size().min(total));
        for address in addresses.into_iter().skip(page.offset()).take(page.size()) {
            let doc: TantivyDocument = searcher.doc(address).map_err(|e| {
                Error::index_unavailable_with_source("failed to load stored document", e)
            })?;
            content.push(from_tantivy_doc(&self.schema, &doc)?);
        }

        Ok(Page::new(content, page, total as u64))
    }

    async fn facet_query(&self, request: &FacetRequest) -> Result<FacetPage> {
        log::debug!(
            "TantivyIndex: facet field={:?}, offset={}, limit={}, sort={:?}",
            request.field,
            request.offset,
            request.limit,
            request.sort
        );
        let compiled = self.compile(&request.query)?;
        let searcher = self.reader.searcher();

        let mut collector = FacetCollector::for_field(self.schema.facet_field_name(request.field));
        collector.add_facet("/");
        let (total_documents, facet_counts) = searcher
            .search(compiled.as_ref(), &(Count, collector))
            .map_err(|e| Error::index_unavailable_with_source("facet search failed", e))?;

        let entries: Vec<FacetEntry> = facet_counts
            .get("/")
            .filter_map(|(facet, count)| {
                facet
                    .to_path()
                    .last()
                    .map(|value| FacetEntry::new(*value, count))
            })
            .collect();

        Ok(FacetPage {
            entries: window_entries(entries, request.sort, request.offset, request.limit),
            total_documents: total_documents as u64,
        })
    }

    async fn insert(&self, form: &PeptiForm) -> Result<()> {
        self.insert_batch(std::slice::from_ref(form)).await
    }

    async fn insert_batch(&self, forms: &[PeptiForm]) -> Result<()> {
        let forms = forms.to_vec();
        let count = self
            .write(move |indexer| {
                for form in &forms {
                    if let Err(e) = indexer.add_document(form) {
                        log::warn!("Rolling back batch of {} documents: {e}", forms.len());
                        indexer.rollback()?;
                        return Err(e);
                    }
                }
                indexer.commit()?;
                Ok(forms.len())
            })
            .await?;

        log::info!("Indexed {count} peptiforms");
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let owned = id.to_string();
        self.write(move |indexer| {
            indexer.delete_document(&owned);
            indexer.commit()
        })
        .await?;

        log::info!("Deleted peptiform {id}");
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.write(Indexer::clear).await?;
        log::info!("Deleted all peptiforms");
        Ok(())
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

impl std::fmt::Debug for TantivyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyIndex")
            .field("location", &self.location)
            .field("num_docs", &self.num_docs())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
