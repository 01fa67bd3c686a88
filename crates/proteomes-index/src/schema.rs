//! Tantivy schema for peptiform documents.
//!
//! # Schema Fields
//!
//! ## Exact-token fields (STRING | STORED)
//! - `id`, `peptiform_sequence`, `proteins`, `mods`, `up_groups`, `gene_groups`
//!
//! ## Tokenized fields (`peptiform_text` analyzer)
//! - `peptiform_species`, `group_descs` (stored)
//! - `text` (aggregate, not stored)
//!
//! ## Integer fields (INDEXED | STORED | FAST)
//! - `peptiform_taxid`, `num_proteins`, `num_up_groups`, `num_gene_groups`
//!
//! ## Facet fields
//! - `proteins_facet`, `up_groups_facet`, `gene_groups_facet`, `taxid_facet`
//!
//! # Tokenizer
//!
//! `peptiform_text` is SimpleTokenizer → LowerCaser, with no stemming, so a
//! wildcard query token is matched against the same tokens that were stored.

use tantivy::schema::{
    FacetOptions, Field, IndexRecordOption, NumericOptions, Schema, SchemaBuilder,
    TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

use crate::backend::{FacetField, IndexField};
use crate::document::fields;

/// Schema version.
///
/// Increment this when schema fields change to force index rebuilds.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the analyzer used by tokenized fields.
pub const TEXT_TOKENIZER: &str = "peptiform_text";

/// Peptiform schema holding field references and the Tantivy schema.
#[derive(Clone)]
pub struct PeptiformSchema {
    schema: Schema,

    // Identity fields
    /// Composite id.
    pub id: Field,
    /// Uppercase sequence.
    pub sequence: Field,
    /// Taxonomy id.
    pub taxid: Field,
    /// Tokenized species.
    pub species: Field,

    // Free text
    /// Aggregate searchable text.
    pub text: Field,
    /// Group descriptions.
    pub group_descs: Field,

    // Sets and cached counts
    /// Protein count.
    pub num_proteins: Field,
    /// Protein accessions.
    pub proteins: Field,
    /// Modification names.
    pub mods: Field,
    /// Protein-group count.
    pub num_up_groups: Field,
    /// Protein-group ids.
    pub up_groups: Field,
    /// Gene-group count.
    pub num_gene_groups: Field,
    /// Gene-group ids.
    pub gene_groups: Field,

    // Facets
    /// Protein accession facet.
    pub proteins_facet: Field,
    /// Protein-group facet.
    pub up_groups_facet: Field,
    /// Gene-group facet.
    pub gene_groups_facet: Field,
    /// Taxonomy id facet.
    pub taxid_facet: Field,
}

impl PeptiformSchema {
    /// Build the peptiform schema.
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();

        let tokenized = TextFieldIndexing::default()
            .set_tokenizer(TEXT_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqs);
        let stored_text = TextOptions::default()
            .set_indexing_options(tokenized.clone())
            .set_stored();
        let unstored_text = TextOptions::default().set_indexing_options(tokenized);
        let int_options = NumericOptions::default()
            .set_indexed()
            .set_stored()
            .set_fast();

        let id = builder.add_text_field(fields::ID, STRING | STORED);
        let sequence = builder.add_text_field(fields::SEQUENCE, STRING | STORED);
        let taxid = builder.add_u64_field(fields::TAXID, int_options.clone());
        let species = builder.add_text_field(fields::SPECIES, stored_text.clone());

        let text = builder.add_text_field(fields::TEXT, unstored_text);
        let group_descs = builder.add_text_field(fields::GROUP_DESCS, stored_text);

        let num_proteins = builder.add_u64_field(fields::NUM_PROTEINS, int_options.clone());
        let proteins = builder.add_text_field(fields::PROTEINS, STRING | STORED);
        let mods = builder.add_text_field(fields::MODS, STRING | STORED);
        let num_up_groups = builder.add_u64_field(fields::NUM_UP_GROUPS, int_options.clone());
        let up_groups = builder.add_text_field(fields::UP_GROUPS, STRING | STORED);
        let num_gene_groups = builder.add_u64_field(fields::NUM_GENE_GROUPS, int_options);
        let gene_groups = builder.add_text_field(fields::GENE_GROUPS, STRING | STORED);

        let proteins_facet = builder.add_facet_field("proteins_facet", FacetOptions::default());
        let up_groups_facet = builder.add_facet_field("up_groups_facet", FacetOptions::default());
        let gene_groups_facet =
            builder.add_facet_field("gene_groups_facet", FacetOptions::default());
        let taxid_facet = builder.add_facet_field("taxid_facet", FacetOptions::default());

        Self {
            schema: builder.build(),
            id,
            sequence,
            taxid,
            species,
            text,
            group_descs,
            num_proteins,
            proteins,
            mods,
            num_up_groups,
            up_groups,
            num_gene_groups,
            gene_groups,
            proteins_facet,
            up_groups_facet,
            gene_groups_facet,
            taxid_facet,
        }
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Register the `peptiform_text` analyzer with a Tantivy index.
    ///
    /// Must be called after creating or opening an index.
    pub fn register_tokenizers(index: &Index) {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .build();
        index.tokenizers().register(TEXT_TOKENIZER, analyzer);
    }

    /// Resolve a document field.
    pub fn field(&self, field: IndexField) -> Field {
        match field {
            IndexField::Id => self.id,
            IndexField::Sequence => self.sequence,
            IndexField::Taxid => self.taxid,
            IndexField::Species => self.species,
            IndexField::Text => self.text,
            IndexField::NumProteins => self.num_proteins,
            IndexField::Proteins => self.proteins,
            IndexField::Mods => self.mods,
            IndexField::NumUpGroups => self.num_up_groups,
            IndexField::UpGroups => self.up_groups,
            IndexField::NumGeneGroups => self.num_gene_groups,
            IndexField::GeneGroups => self.gene_groups,
            IndexField::GroupDescs => self.group_descs,
        }
    }

    /// Resolve the facet field backing a facet.
    pub fn facet_field(&self, facet: FacetField) -> Field {
        match facet {
            FacetField::Protein => self.proteins_facet,
            FacetField::UpGroup => self.up_groups_facet,
            FacetField::GeneGroup => self.gene_groups_facet,
            FacetField::Taxid => self.taxid_facet,
        }
    }

    /// Name of the facet field backing a facet.
    pub fn facet_field_name(&self, facet: FacetField) -> &str {
        self.schema.get_field_name(self.facet_field(facet))
    }
}

impl std::fmt::Debug for PeptiformSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeptiformSchema")
            .field("field_count", &self.schema.fields().count())
            .field("schema_version", &SCHEMA_VERSION)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
