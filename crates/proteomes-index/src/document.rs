//! Peptiform document representation.
//!
//! This module defines `PeptiForm`, the record stored in the index. Field
//! names used by the index schema are collected in [`fields`].
//!
//! # Creating Documents
//!
//! Documents are created with the builder, which canonicalizes the record:
//!
//! ```rust
//! use proteomes_index::PeptiForm;
//! use proteomes_core::ModificationSite;
//!
//! let form = PeptiForm::builder()
//!     .sequence("hdcvmpdr")
//!     .taxid(9606)
//!     .species("Homo sapiens (human)")
//!     .site(ModificationSite::new(5, 15))
//!     .protein("P12345")
//!     .build();
//!
//! assert_eq!(form.id, "[HDCVMPDR|9606|(5,15)]");
//! assert_eq!(form.sequence, "HDCVMPDR");
//! assert_eq!(form.num_proteins, 1);
//! ```
//!
//! # Invariants
//!
//! `num_proteins`, `num_up_groups` and `num_gene_groups` must equal the size
//! of the corresponding set, and `id` must be the canonical encoding of
//! `sequence` and `taxid`. The builder derives them; `validate()` checks
//! them for documents assembled any other way. Only writers validate.

use proteomes_core::{
    encode_peptiform_id, normalize_sequence, parse_peptiform_id, Error, ModificationSite, Result,
};
use serde::{Deserialize, Serialize};

/// Index field names.
pub mod fields {
    /// Composite peptiform id.
    pub const ID: &str = "id";
    /// Uppercase peptide sequence.
    pub const SEQUENCE: &str = "peptiform_sequence";
    /// Organism taxonomy id.
    pub const TAXID: &str = "peptiform_taxid";
    /// Tokenized species name.
    pub const SPECIES: &str = "peptiform_species";
    /// Aggregate free-text field.
    pub const TEXT: &str = "text";
    /// Cached protein count.
    pub const NUM_PROTEINS: &str = "num_proteins";
    /// Protein accessions.
    pub const PROTEINS: &str = "proteins";
    /// Modification names.
    pub const MODS: &str = "mods";
    /// Cached protein-group count.
    pub const NUM_UP_GROUPS: &str = "num_up_groups";
    /// Protein-group ids.
    pub const UP_GROUPS: &str = "up_groups";
    /// Cached gene-group count.
    pub const NUM_GENE_GROUPS: &str = "num_gene_groups";
    /// Gene-group ids.
    pub const GENE_GROUPS: &str = "gene_groups";
    /// Group description text.
    pub const GROUP_DESCS: &str = "group_descs";
}

/// A peptide form: one sequence, organism and modification set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeptiForm {
    // Identity
    /// Composite id `[SEQUENCE|TAXID|(pos,mod)...]` (required).
    pub id: String,
    /// Uppercase amino acid sequence (required).
    pub sequence: String,
    /// Organism taxonomy id, at least 1 (required).
    pub taxid: u32,
    /// Species name, tokenized for search.
    #[serde(default)]
    pub species: String,

    // Proteins
    /// Number of entries in `proteins`.
    #[serde(default)]
    pub num_proteins: usize,
    /// Protein accessions this form maps to.
    #[serde(default)]
    pub proteins: Vec<String>,

    // Modifications
    /// Modification display names (e.g. "Oxidation").
    #[serde(default)]
    pub mods: Vec<String>,

    // Groups
    /// Number of entries in `up_groups`.
    #[serde(default)]
    pub num_up_groups: usize,
    /// Protein-level group ids.
    #[serde(default)]
    pub up_groups: Vec<String>,
    /// Number of entries in `gene_groups`.
    #[serde(default)]
    pub num_gene_groups: usize,
    /// Gene-level group ids.
    #[serde(default)]
    pub gene_groups: Vec<String>,
    /// Free-text description of the groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_descriptions: Option<String>,
}

impl PeptiForm {
    /// Create a new document builder.
    pub fn builder() -> PeptiFormBuilder {
        PeptiFormBuilder::default()
    }

    /// Check the document invariants.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentDocument` naming the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        let id = self.id.as_str();
        if id.trim().is_empty() {
            return Err(Error::inconsistent(id, "id must not be blank"));
        }
        if self.sequence.trim().is_empty() {
            return Err(Error::inconsistent(id, "sequence must not be blank"));
        }
        if self.sequence != normalize_sequence(&self.sequence) {
            return Err(Error::inconsistent(
                id,
                format!("sequence '{}' is not canonical (uppercase)", self.sequence),
            ));
        }
        if self.taxid == 0 {
            return Err(Error::inconsistent(id, "taxid must be positive"));
        }
        check_identity(id, &self.sequence, self.taxid)?;
        check_count(id, "num_proteins", self.num_proteins, &self.proteins)?;
        check_count(id, "num_up_groups", self.num_up_groups, &self.up_groups)?;
        check_count(id, "num_gene_groups", self.num_gene_groups, &self.gene_groups)?;
        Ok(())
    }

    /// Values that feed the aggregate `text` field.
    pub fn searchable_text(&self) -> Vec<String> {
        let mut values = vec![
            self.id.clone(),
            self.sequence.clone(),
            self.taxid.to_string(),
            self.species.clone(),
        ];
        values.extend(self.proteins.iter().cloned());
        values.extend(self.mods.iter().cloned());
        values.extend(self.up_groups.iter().cloned());
        values.extend(self.gene_groups.iter().cloned());
        if let Some(ref descs) = self.group_descriptions {
            values.push(descs.clone());
        }
        values.retain(|v| !v.trim().is_empty());
        values
    }
}

fn check_identity(id: &str, sequence: &str, taxid: u32) -> Result<()> {
    let key = parse_peptiform_id(id)
        .map_err(|e| Error::inconsistent(id, format!("id is not a peptiform id: {e}")))?;
    if key.sequence != sequence || key.taxid != taxid {
        return Err(Error::inconsistent(
            id,
            format!(
                "id encodes {}|{} but the document holds {sequence}|{taxid}",
                key.sequence, key.taxid
            ),
        ));
    }
    if key.to_id() != id {
        return Err(Error::inconsistent(
            id,
            format!("id is not canonical, expected '{}'", key.to_id()),
        ));
    }
    Ok(())
}

fn check_count(id: &str, name: &str, cached: usize, values: &[String]) -> Result<()> {
    if cached != values.len() {
        return Err(Error::inconsistent(
            id,
            format!("{name} is {cached} but {} values are listed", values.len()),
        ));
    }
    Ok(())
}

/// Builder for PeptiForm.
///
/// `build()` uppercases the sequence, drops duplicate set entries, derives
/// the cached counts, and encodes the id unless one was given explicitly.
/// An explicit id is kept as given; writers reject it unless it is the
/// canonical encoding of the document's sequence and taxid.
#[derive(Debug, Default)]
pub struct PeptiFormBuilder {
    id: Option<String>,
    sequence: String,
    taxid: u32,
    species: String,
    sites: Vec<ModificationSite>,
    proteins: Vec<String>,
    mods: Vec<String>,
    up_groups: Vec<String>,
    gene_groups: Vec<String>,
    group_descriptions: Option<String>,
}

impl PeptiFormBuilder {
    /// Set an explicit id instead of encoding one.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the sequence.
    pub fn sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = sequence.into();
        self
    }

    /// Set the taxonomy id.
    pub fn taxid(mut self, taxid: u32) -> Self {
        self.taxid = taxid;
        self
    }

    /// Set the species name.
    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = species.into();
        self
    }

    /// Add a modification site (encoded into the id).
    pub fn site(mut self, site: ModificationSite) -> Self {
        self.sites.push(site);
        self
    }

    /// Set the modification sites.
    pub fn sites(mut self, sites: Vec<ModificationSite>) -> Self {
        self.sites = sites;
        self
    }

    /// Add a protein accession.
    pub fn protein(mut self, accession: impl Into<String>) -> Self {
        self.proteins.push(accession.into());
        self
    }

    /// Set the protein accessions.
    pub fn proteins<I, S>(mut self, accessions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.proteins = accessions.into_iter().map(Into::into).collect();
        self
    }

    /// Add a modification name.
    pub fn modification(mut self, name: impl Into<String>) -> Self {
        self.mods.push(name.into());
        self
    }

    /// Set the protein-group ids.
    pub fn up_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.up_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set the gene-group ids.
    pub fn gene_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gene_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set the group descriptions.
    pub fn group_descriptions(mut self, descriptions: impl Into<String>) -> Self {
        self.group_descriptions = Some(descriptions.into());
        self
    }

    /// Build the document.
    pub fn build(self) -> PeptiForm {
        let sequence = normalize_sequence(&self.sequence);
        let id = self
            .id
            .unwrap_or_else(|| encode_peptiform_id(&sequence, self.taxid, &self.sites));
        let proteins = dedup(self.proteins);
        let up_groups = dedup(self.up_groups);
        let gene_groups = dedup(self.gene_groups);

        PeptiForm {
            id,
            sequence,
            taxid: self.taxid,
            species: self.species,
            num_proteins: proteins.len(),
            proteins,
            mods: dedup(self.mods),
            num_up_groups: up_groups.len(),
            up_groups,
            num_gene_groups: gene_groups.len(),
            gene_groups,
            group_descriptions: self.group_descriptions,
        }
    }
}

/// Drop blank and repeated values, keeping first-seen order.
fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !value.trim().is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
