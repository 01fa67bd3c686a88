//! Validated writes to a peptiform index.

use std::sync::Arc;

use proteomes_core::{Error, Result};

use crate::backend::SearchIndex;
use crate::document::PeptiForm;

/// Write operations over a peptiform index.
///
/// Documents are validated before anything is written. Batch writes are not
/// transactional: a backend failure part way through may leave earlier
/// documents written.
#[derive(Clone)]
pub struct IndexService {
    index: Arc<dyn SearchIndex>,
}

impl IndexService {
    /// Create an index service over `index`.
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }

    /// Insert or replace one document.
    pub async fn save(&self, form: &PeptiForm) -> Result<()> {
        form.validate()?;
        self.index.insert(form).await
    }

    /// Insert or replace several documents.
    ///
    /// Every document is validated before any is written.
    pub async fn save_all(&self, forms: &[PeptiForm]) -> Result<()> {
        if forms.is_empty() {
            return Ok(());
        }
        for form in forms {
            form.validate()?;
        }
        self.index.insert_batch(forms).await
    }

    /// Delete a document by id. Deleting a missing id is not an error.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(Error::invalid_field("id", "id must not be blank"));
        }
        self.index.delete_by_id(id).await
    }

    /// Delete every document.
    pub async fn delete_all(&self) -> Result<()> {
        log::warn!("Deleting all documents from the {} index", self.index.name());
        self.index.delete_all().await
    }
}

impl std::fmt::Debug for IndexService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexService")
            .field("index", &self.index.name())
            .finish()
    }
}
