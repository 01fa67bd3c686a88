//! Peptiform identifier utilities.
//!
//! A peptiform id is a single composite token of the form
//! `[SEQUENCE|TAXID|(position,modId)(position,modId)...]`, for example
//! `[HDCVMPDR|9606|(5,15)]`. An unmodified form has an empty modification
//! segment: `[HDCVMPDR|9606|]`.
//!
//! Modification sites are a set, so encoding sorts them by
//! `(position, mod_id)` to give every set exactly one id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A modification at a residue position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModificationSite {
    /// 1-based residue position within the sequence.
    pub position: u32,
    /// Modification type identifier.
    pub mod_id: u32,
}

impl ModificationSite {
    /// Create a new modification site.
    pub fn new(position: u32, mod_id: u32) -> Self {
        Self { position, mod_id }
    }
}

impl fmt::Display for ModificationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.position, self.mod_id)
    }
}

/// The decoded parts of a peptiform id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeptiformKey {
    /// Uppercase amino acid sequence.
    pub sequence: String,
    /// Organism taxonomy id.
    pub taxid: u32,
    /// Modification sites, sorted.
    pub sites: Vec<ModificationSite>,
}

impl PeptiformKey {
    /// Encode this key as a peptiform id.
    pub fn to_id(&self) -> String {
        encode_peptiform_id(&self.sequence, self.taxid, &self.sites)
    }
}

/// Canonicalize a peptide sequence: trim surrounding whitespace and uppercase.
///
/// # Examples
///
/// ```
/// use proteomes_core::util::ids::normalize_sequence;
///
/// assert_eq!(normalize_sequence(" hdcvmpdr "), "HDCVMPDR");
/// ```
pub fn normalize_sequence(sequence: &str) -> String {
    sequence.trim().to_uppercase()
}

/// Encode a peptiform id from its parts.
///
/// # Examples
///
/// ```
/// use proteomes_core::util::ids::{encode_peptiform_id, ModificationSite};
///
/// assert_eq!(encode_peptiform_id("hdcvmpdr", 9606, &[]), "[HDCVMPDR|9606|]");
/// assert_eq!(
///     encode_peptiform_id(
///         "EDAANNYAR",
///         9606,
///         &[ModificationSite::new(9, 20), ModificationSite::new(1, 20)],
///     ),
///     "[EDAANNYAR|9606|(1,20)(9,20)]"
/// );
/// ```
pub fn encode_peptiform_id(sequence: &str, taxid: u32, sites: &[ModificationSite]) -> String {
    let mut sorted = sites.to_vec();
    sorted.sort();
    sorted.dedup();

    let mods: String = sorted.iter().map(ModificationSite::to_string).collect();
    format!("[{}|{}|{}]", normalize_sequence(sequence), taxid, mods)
}

/// Decode a peptiform id into its parts.
///
/// # Errors
///
/// Returns `InvalidArgument` when the id is not of the form
/// `[SEQUENCE|TAXID|(pos,mod)...]`.
pub fn parse_peptiform_id(id: &str) -> Result<PeptiformKey> {
    let malformed = |reason: &str| {
        Error::invalid_field("id", format!("malformed peptiform id '{id}': {reason}"))
    };

    let inner = id
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| malformed("expected surrounding brackets"))?;

    let mut parts = inner.splitn(3, '|');
    let sequence = parts.next().unwrap_or_default();
    let taxid = parts.next().ok_or_else(|| malformed("missing taxid"))?;
    let mods = parts.next().ok_or_else(|| malformed("missing modification segment"))?;

    if sequence.trim().is_empty() {
        return Err(malformed("empty sequence"));
    }
    let taxid: u32 = taxid
        .parse()
        .map_err(|_| malformed("taxid is not a number"))?;
    if taxid == 0 {
        return Err(malformed("taxid must be positive"));
    }

    let mut sites = Vec::new();
    let mut rest = mods;
    while !rest.is_empty() {
        let body = rest
            .strip_prefix('(')
            .ok_or_else(|| malformed("expected '(' at modification"))?;
        let end = body
            .find(')')
            .ok_or_else(|| malformed("unterminated modification"))?;
        let (position, mod_id) = body[..end]
            .split_once(',')
            .ok_or_else(|| malformed("modification needs 'position,modId'"))?;
        let position = position
            .trim()
            .parse()
            .map_err(|_| malformed("modification position is not a number"))?;
        let mod_id = mod_id
            .trim()
            .parse()
            .map_err(|_| malformed("modification id is not a number"))?;
        sites.push(ModificationSite::new(position, mod_id));
        rest = &body[end + 1..];
    }
    sites.sort();

    Ok(PeptiformKey {
        sequence: normalize_sequence(sequence),
        taxid,
        sites,
    })
}
