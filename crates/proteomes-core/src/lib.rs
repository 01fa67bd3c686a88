//! Proteomes Core: shared types, errors, and utilities.
//!
//! This crate provides the foundational types used by the proteomes index
//! crates. It has no internal dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`page`]: Page requests and result pages
//! - [`util`]: Peptiform id and sequence utilities

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod page;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use page::{Page, PageRequest};

// Convenience re-exports from util
pub use util::ids::{
    encode_peptiform_id, normalize_sequence, parse_peptiform_id, ModificationSite, PeptiformKey,
};
