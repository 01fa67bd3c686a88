//! Tantivy index writer wrapper.
//!
//! This module provides `Indexer`, a wrapper around Tantivy's `IndexWriter`
//! that converts `PeptiForm` documents and replaces them by id.
//!
//! # Usage
//!
//! ```rust,ignore
//! use proteomes_index::{Indexer, PeptiForm, PeptiformSchema};
//!
//! let schema = PeptiformSchema::build();
//! let mut indexer = Indexer::new_in_memory(&schema)?;
//!
//! let form = PeptiForm::builder()
//!     .sequence("HDCVMPDR")
//!     .taxid(9606)
//!     .protein("P12345")
//!     .build();
//!
//! indexer.add_document(&form)?;
//! indexer.commit()?;
//! ```

use std::path::Path;

use proteomes_core::{Error, Result};
use tantivy::directory::MmapDirectory;
use tantivy::schema::{Facet, Field, Value};
use tantivy::{Index, IndexWriter, TantivyDocument, Term};

use crate::document::PeptiForm;
use crate::schema::PeptiformSchema;

/// Default index writer buffer size (50MB).
pub const WRITER_BUFFER_SIZE: usize = 50_000_000;

/// Tantivy index writer wrapper.
pub struct Indexer {
    index: Index,
    writer: IndexWriter,
    schema: PeptiformSchema,
}

impl Indexer {
    /// Create or open a Tantivy index at the given path.
    pub fn new(index_path: &Path, schema: &PeptiformSchema) -> Result<Self> {
        Self::with_buffer_size(index_path, schema, WRITER_BUFFER_SIZE)
    }

    /// Create or open an on-disk index with an explicit writer buffer size.
    pub fn with_buffer_size(
        index_path: &Path,
        schema: &PeptiformSchema,
        buffer_size: usize,
    ) -> Result<Self> {
        if !index_path.exists() {
            std::fs::create_dir_all(index_path).map_err(|e| Error::io_with_path(e, index_path))?;
        }

        let directory = MmapDirectory::open(index_path).map_err(|e| {
            Error::index_unavailable_with_source(
                format!("failed to open index directory {}", index_path.display()),
                e,
            )
        })?;
        let index = Index::open_or_create(directory, schema.schema().clone())
            .map_err(|e| Error::index_unavailable_with_source("failed to open index", e))?;

        log::info!("Opened peptiform index at {}", index_path.display());
        Self::from_index(index, schema, buffer_size)
    }

    /// Create an in-memory index.
    pub fn new_in_memory(schema: &PeptiformSchema) -> Result<Self> {
        Self::in_memory_with_buffer_size(schema, WRITER_BUFFER_SIZE)
    }

    /// Create an in-memory index with an explicit writer buffer size.
    pub fn in_memory_with_buffer_size(
        schema: &PeptiformSchema,
        buffer_size: usize,
    ) -> Result<Self> {
        let index = Index::create_in_ram(schema.schema().clone());
        Self::from_index(index, schema, buffer_size)
    }

    fn from_index(index: Index, schema: &PeptiformSchema, buffer_size: usize) -> Result<Self> {
        PeptiformSchema::register_tokenizers(&index);

        let writer = index
            .writer(buffer_size)
            .map_err(|e| Error::index_unavailable_with_source("failed to create index writer", e))?;

        Ok(Self {
            index,
            writer,
            schema: schema.clone(),
        })
    }

    /// Stage a document, replacing any document with the same id.
    ///
    /// The document is not searchable until `commit()` is called.
    pub fn add_document(&mut self, form: &PeptiForm) -> Result<()> {
        self.writer
            .delete_term(Term::from_field_text(self.schema.id, &form.id));
        let doc = to_tantivy_doc(&self.schema, form);
        self.writer.add_document(doc).map_err(|e| {
            Error::index_unavailable_with_source(format!("failed to add document {}", form.id), e)
        })?;
        Ok(())
    }

    /// Stage the deletion of the document with the given id.
    pub fn delete_document(&mut self, id: &str) {
        self.writer
            .delete_term(Term::from_field_text(self.schema.id, id));
    }

    /// Commit staged changes to make them searchable.
    pub fn commit(&mut self) -> Result<()> {
        self.writer
            .commit()
            .map_err(|e| Error::index_unavailable_with_source("failed to commit index", e))?;
        Ok(())
    }

    /// Discard staged changes.
    pub fn rollback(&mut self) -> Result<()> {
        self.writer
            .rollback()
            .map_err(|e| Error::index_unavailable_with_source("failed to roll back index", e))?;
        Ok(())
    }

    /// Clear all documents from the index.
    pub fn clear(&mut self) -> Result<()> {
        self.writer
            .delete_all_documents()
            .map_err(|e| Error::index_unavailable_with_source("failed to clear index", e))?;
        self.commit()
    }

    /// Get reference to the underlying Tantivy index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Get the schema.
    pub fn schema(&self) -> &PeptiformSchema {
        &self.schema
    }
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Convert a PeptiForm into a Tantivy document.
pub fn to_tantivy_doc(schema: &PeptiformSchema, form: &PeptiForm) -> TantivyDocument {
    let s = schema;
    let mut doc = TantivyDocument::new();

    doc.add_text(s.id, &form.id);
    doc.add_text(s.sequence, &form.sequence);
    doc.add_u64(s.taxid, u64::from(form.taxid));
    doc.add_facet(s.taxid_facet, Facet::from_path([form.taxid.to_string()]));
    if !form.species.is_empty() {
        doc.add_text(s.species, &form.species);
    }

    doc.add_u64(s.num_proteins, form.num_proteins as u64);
    for protein in &form.proteins {
        doc.add_text(s.proteins, protein);
        doc.add_facet(s.proteins_facet, Facet::from_path([protein.as_str()]));
    }
    for name in &form.mods {
        doc.add_text(s.mods, name);
    }

    doc.add_u64(s.num_up_groups, form.num_up_groups as u64);
    for group in &form.up_groups {
        doc.add_text(s.up_groups, group);
        doc.add_facet(s.up_groups_facet, Facet::from_path([group.as_str()]));
    }
    doc.add_u64(s.num_gene_groups, form.num_gene_groups as u64);
    for group in &form.gene_groups {
        doc.add_text(s.gene_groups, group);
        doc.add_facet(s.gene_groups_facet, Facet::from_path([group.as_str()]));
    }
    if let Some(ref descs) = form.group_descriptions {
        doc.add_text(s.group_descs, descs);
    }

    for value in form.searchable_text() {
        doc.add_text(s.text, &value);
    }

    doc
}

/// Rebuild a PeptiForm from a stored Tantivy document.
pub fn from_tantivy_doc(schema: &PeptiformSchema, doc: &TantivyDocument) -> Result<PeptiForm> {
    let s = schema;
    let id = first_str(doc, s.id).unwrap_or_default();
    let taxid = first_u64(doc, s.taxid).unwrap_or_default();
    let taxid = u32::try_from(taxid)
        .map_err(|_| Error::inconsistent(&id, format!("stored taxid {taxid} is out of range")))?;

    Ok(PeptiForm {
        sequence: first_str(doc, s.sequence).unwrap_or_default(),
        taxid,
        species: first_str(doc, s.species).unwrap_or_default(),
        num_proteins: first_u64(doc, s.num_proteins).unwrap_or_default() as usize,
        proteins: all_str(doc, s.proteins),
        mods: all_str(doc, s.mods),
        num_up_groups: first_u64(doc, s.num_up_groups).unwrap_or_default() as usize,
        up_groups: all_str(doc, s.up_groups),
        num_gene_groups: first_u64(doc, s.num_gene_groups).unwrap_or_default() as usize,
        gene_groups: all_str(doc, s.gene_groups),
        group_descriptions: first_str(doc, s.group_descs),
        id,
    })
}

fn first_str(doc: &TantivyDocument, field: Field) -> Option<String> {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .map(String::from)
}

fn first_u64(doc: &TantivyDocument, field: Field) -> Option<u64> {
    doc.get_first(field).and_then(|v| v.as_u64())
}

fn all_str(doc: &TantivyDocument, field: Field) -> Vec<String> {
    doc.get_all(field)
        .filter_map(|v| v.as_str())
        .map(String::from)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
