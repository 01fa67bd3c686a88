//! Utility modules.
//!
//! # Modules
//!
//! - [`ids`]: Peptiform id encoding/decoding and sequence canonicalization

pub mod ids;
