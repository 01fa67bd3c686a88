//! Pagination types shared by search and facet results.
//!
//! [`PageRequest`] selects a window (zero-based page number and page size);
//! [`Page`] carries that window's content together with the total number of
//! elements the full result set holds.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A request for one page of results.
///
/// Deserialization goes through [`PageRequest::new`], so a zero size is
/// rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: usize,
    size: usize,
}

#[derive(Deserialize)]
struct RawPageRequest {
    page: usize,
    size: usize,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = Error;

    fn try_from(raw: RawPageRequest) -> Result<Self> {
        Self::new(raw.page, raw.size)
    }
}

impl PageRequest {
    /// Create a page request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `size` is zero.
    pub fn new(page: usize, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_field("size", "page size must be at least 1"));
        }
        Ok(Self { page, size })
    }

    /// The first page of the given size.
    pub fn first(size: usize) -> Result<Self> {
        Self::new(0, size)
    }

    /// A single-result page, used when only the total count is of interest.
    pub const fn single() -> Self {
        Self { page: 0, size: 1 }
    }

    /// Zero-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Page size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the first element on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// The request for the following page.
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}

/// One page of results plus the total size of the full result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    content: Vec<T>,
    page: usize,
    size: usize,
    total_elements: u64,
}

impl<T> Page<T> {
    /// Create a page for `request` holding `content` out of `total_elements`.
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    /// An empty page with a total of zero.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Elements on this page.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Consume the page, returning its elements.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Zero-based page number.
    pub fn number(&self) -> usize {
        self.page
    }

    /// Requested page size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The request this page answers.
    pub fn request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            size: self.size,
        }
    }

    /// Total number of elements across all pages.
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Number of elements on this page.
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    /// Total number of pages at the requested size.
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    /// Returns `true` if this page holds no elements.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Transform the page content, keeping window and total.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }

    /// Iterate over the page content.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
