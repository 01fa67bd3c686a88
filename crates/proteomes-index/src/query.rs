//! Query building.
//!
//! Translates a typed [`SearchRequest`] into a backend-neutral
//! [`IndexQuery`]. Validation of caller input happens here, so every backend
//! sees the same rules:
//!
//! | Request | Query |
//! |---------|-------|
//! | `All` | every document |
//! | `Exact` | one exact token (sequence upper-cased first) |
//! | `Taxid` | one taxonomy id |
//! | `Species` | OR over species tokens, `*`/`?` wildcards per token |
//! | `NumProteins` | strict numeric inequality |
//! | `General` | OR over `text` tokens; blank or `*` matches everything |
//! | `Negated` | complement of `General`; blank matches nothing |
//! | `Filtered` | `General` AND taxid membership |

use std::ops::Bound;

use proteomes_core::{normalize_sequence, Error, Result};
use serde::{Deserialize, Serialize};

use crate::backend::{IndexField, IndexQuery};

/// Fields addressable by exact-token lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactField {
    /// Composite id.
    Id,
    /// Sequence (case-insensitive at query time).
    Sequence,
    /// Protein accession.
    Protein,
    /// Protein-group id.
    UpGroup,
    /// Gene-group id.
    GeneGroup,
    /// Modification name.
    Mod,
}

impl ExactField {
    fn index_field(&self) -> IndexField {
        match self {
            Self::Id => IndexField::Id,
            Self::Sequence => IndexField::Sequence,
            Self::Protein => IndexField::Proteins,
            Self::UpGroup => IndexField::UpGroups,
            Self::GeneGroup => IndexField::GeneGroups,
            Self::Mod => IndexField::Mods,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Sequence => "sequence",
            Self::Protein => "protein",
            Self::UpGroup => "up_group",
            Self::GeneGroup => "gene_group",
            Self::Mod => "mod",
        }
    }
}

/// Strict inequality on the protein count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericBound {
    /// `num_proteins > n`.
    GreaterThan(i64),
    /// `num_proteins < n`.
    LessThan(i64),
}

/// A typed search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchRequest {
    /// Every document.
    All,
    /// Exact match on one field.
    Exact {
        /// Field to match.
        field: ExactField,
        /// Token to match.
        term: String,
    },
    /// Exact taxonomy id.
    Taxid(u32),
    /// Tokenized species search.
    Species(String),
    /// Protein-count inequality.
    NumProteins(NumericBound),
    /// Free-text search over the aggregate text.
    General(Option<String>),
    /// Complement of a free-text search.
    Negated(Option<String>),
    /// Free-text search restricted to a set of taxonomy ids.
    Filtered {
        /// Free-text term.
        term: Option<String>,
        /// Allowed taxonomy ids; empty means no restriction.
        taxids: Vec<u32>,
    },
}

impl SearchRequest {
    /// Exact-match request.
    pub fn exact(field: ExactField, term: impl Into<String>) -> Self {
        Self::Exact {
            field,
            term: term.into(),
        }
    }

    /// Free-text request.
    pub fn general(term: Option<&str>) -> Self {
        Self::General(term.map(str::to_string))
    }
}

/// Builds index queries from search requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    /// Create a new query builder.
    pub fn new() -> Self {
        Self
    }

    /// Build the index query for a request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank exact or species term, or a
    /// taxonomy id of zero.
    pub fn build(&self, request: &SearchRequest) -> Result<IndexQuery> {
        let query = match request {
            SearchRequest::All => IndexQuery::All,
            SearchRequest::Exact { field, term } => {
                let term = require_term(field.label(), term)?;
                let value = match field {
                    ExactField::Sequence => normalize_sequence(term),
                    _ => term.to_string(),
                };
                IndexQuery::term(field.index_field(), value)
            }
            SearchRequest::Taxid(taxid) => taxid_term(*taxid)?,
            SearchRequest::Species(term) => {
                let term = require_term("species", term)?;
                text_query(IndexField::Species, term)
            }
            SearchRequest::NumProteins(bound) => num_proteins_query(*bound),
            SearchRequest::General(term) => general_query(term.as_deref()),
            SearchRequest::Negated(term) => match non_blank(term.as_deref()) {
                Some(term) => IndexQuery::negate(general_query(Some(term))),
                None => IndexQuery::Nothing,
            },
            SearchRequest::Filtered { term, taxids } => {
                if taxids.is_empty() {
                    general_query(term.as_deref())
                } else {
                    IndexQuery::And(vec![general_query(term.as_deref()), taxid_membership(taxids)?])
                }
            }
        };
        log::debug!("Built query {query:?} for {request:?}");
        Ok(query)
    }

    /// Build the base query for facet aggregation.
    ///
    /// Matches every document, restricted to `taxids` when non-empty.
    pub fn facet_base_query(&self, taxids: &[u32]) -> Result<IndexQuery> {
        if taxids.is_empty() {
            Ok(IndexQuery::All)
        } else {
            taxid_membership(taxids)
        }
    }
}

/// Split free text into lowercased query tokens.
///
/// Tokens break on every character that is not alphanumeric, `*` or `?`,
/// matching the index-side analyzer apart from the wildcard characters.
///
/// ```
/// use proteomes_index::query::tokenize_query;
///
/// assert_eq!(tokenize_query("Homo sapiens (human)"), vec!["homo", "sapiens", "human"]);
/// assert_eq!(tokenize_query("*ouse"), vec!["*ouse"]);
/// ```
pub fn tokenize_query(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for raw in text.split(|c: char| !(c.is_alphanumeric() || c == '*' || c == '?')) {
        if raw.is_empty() {
            continue;
        }
        let token = raw.to_lowercase();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Returns `true` if the token carries a wildcard.
pub fn is_wildcard(token: &str) -> bool {
    token.contains(['*', '?'])
}

fn non_blank(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

fn require_term<'a>(field: &str, term: &'a str) -> Result<&'a str> {
    non_blank(Some(term))
        .ok_or_else(|| Error::invalid_field(field, format!("{field} must not be blank")))
}

fn text_query(field: IndexField, text: &str) -> IndexQuery {
    let tokens = tokenize_query(text);
    if tokens.is_empty() {
        IndexQuery::Nothing
    } else {
        IndexQuery::Text { field, tokens }
    }
}

fn general_query(term: Option<&str>) -> IndexQuery {
    match non_blank(term) {
        None | Some("*") => IndexQuery::All,
        Some(term) => text_query(IndexField::Text, term),
    }
}

fn taxid_term(taxid: u32) -> Result<IndexQuery> {
    if taxid == 0 {
        return Err(Error::invalid_field("taxid", "taxid must be at least 1"));
    }
    Ok(IndexQuery::IntTerm {
        field: IndexField::Taxid,
        value: u64::from(taxid),
    })
}

fn taxid_membership(taxids: &[u32]) -> Result<IndexQuery> {
    let mut clauses = Vec::with_capacity(taxids.len());
    for taxid in taxids {
        let clause = taxid_term(*taxid)?;
        if !clauses.contains(&clause) {
            clauses.push(clause);
        }
    }
    Ok(IndexQuery::Or(clauses))
}

fn num_proteins_query(bound: NumericBound) -> IndexQuery {
    let field = IndexField::NumProteins;
    match bound {
        NumericBound::GreaterThan(n) if n < 0 => IndexQuery::Range {
            field,
            lower: Bound::Included(0),
            upper: Bound::Unbounded,
        },
        NumericBound::GreaterThan(n) => IndexQuery::Range {
            field,
            lower: Bound::Excluded(n as u64),
            upper: Bound::Unbounded,
        },
        NumericBound::LessThan(n) if n <= 0 => IndexQuery::Nothing,
        NumericBound::LessThan(n) => IndexQuery::Range {
            field,
            lower: Bound::Included(0),
            upper: Bound::Excluded(n as u64),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
