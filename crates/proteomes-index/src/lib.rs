//! Faceted peptiform search and aggregation.
//!
//! This crate indexes peptide forms (a sequence, an organism and a set of
//! modification sites) and answers paginated field searches, free-text
//! searches and facet counts over them. The index is reached through the
//! [`SearchIndex`] trait; a Tantivy implementation is feature-gated.
//!
//! # Features
//!
//! - `fts-tantivy` (default): Tantivy-backed `TantivyIndex`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     proteomes-index                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchService   FacetService   IndexService                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  QueryBuilder (SearchRequest → IndexQuery)                  │
//! │  PeptiForm (document model, builder, invariants)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchIndex trait                                          │
//! │  └── TantivyIndex (PeptiformSchema, Indexer)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Facet Totals
//!
//! The facet primitive reports how many documents matched, not how many
//! distinct values exist. `FacetService` issues a second, unbounded facet
//! query and reports its entry count as the page total.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use proteomes_core::PageRequest;
//! use proteomes_index::{create_search_index, FacetService, FacetSort, IndexConfig, SearchService};
//!
//! let index = create_search_index(&IndexConfig::default()).await?;
//! let search = SearchService::new(Arc::clone(&index));
//! let facets = FacetService::new(index);
//!
//! let human = search.find_by_species("human", PageRequest::first(20)?).await?;
//! let proteins = facets.protein_counts(PageRequest::first(10)?, FacetSort::Count).await?;
//! println!("{} forms, {} distinct proteins", human.total_elements(), proteins.total_elements());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

// Core modules (always available)
pub mod backend;
pub mod document;
pub mod facets;
pub mod index_service;
pub mod query;
pub mod search;
pub mod types;

// Feature-gated Tantivy modules
#[cfg(feature = "fts-tantivy")]
pub mod schema;

#[cfg(feature = "fts-tantivy")]
pub mod indexer;

#[cfg(feature = "fts-tantivy")]
pub mod tantivy_index;

// Re-exports
pub use backend::{
    create_search_index, FacetEntry, FacetField, FacetPage, FacetRequest, FacetSort, IndexField,
    IndexQuery, SearchIndex,
};
pub use document::{PeptiForm, PeptiFormBuilder};
pub use facets::FacetService;
pub use index_service::IndexService;
pub use query::{ExactField, NumericBound, QueryBuilder, SearchRequest};
pub use search::SearchService;
pub use types::IndexConfig;

// Error types re-exported from the core crate
pub use proteomes_core::{Error, Page, PageRequest, Result};

#[cfg(feature = "fts-tantivy")]
pub use schema::PeptiformSchema;

#[cfg(feature = "fts-tantivy")]
pub use indexer::Indexer;

#[cfg(feature = "fts-tantivy")]
pub use tantivy_index::TantivyIndex;
