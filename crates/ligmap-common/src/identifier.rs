//! PDB identifier normalisation.
//!
//! Spreadsheet cells holding PDB codes are rarely clean: non-breaking spaces,
//! stray padding and prefixes such as `"PDB: 1eve"` all show up. The
//! normaliser strips whitespace and keeps the trailing four alphanumeric
//! characters, upper-cased.
//!
//! # Example
//! ```
//! use ligmap_common::identifier::PdbCode;
//!
//! let code = PdbCode::normalize("\u{a0} 1eve ").unwrap();
//! assert_eq!(code.as_str(), "1EVE");
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LigmapError, Result};

lazy_static! {
    static ref TRAILING_CODE: Regex = Regex::new(r"([A-Za-z0-9]{4})$").unwrap();
}

/// A normalised 4-character structural code, always upper-case ASCII alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PdbCode(String);

impl PdbCode {
    /// Normalise a raw identifier cell.
    ///
    /// Fails with [`LigmapError::InvalidIdentifier`] when the cleaned string
    /// does not end in four alphanumeric characters.
    pub fn normalize(raw: &str) -> Result<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|c| *c != '\u{a0}' && !c.is_whitespace())
            .collect();

        TRAILING_CODE
            .captures(&cleaned)
            .and_then(|caps| caps.get(1))
            .map(|m| PdbCode(m.as_str().to_ascii_uppercase()))
            .ok_or_else(|| LigmapError::InvalidIdentifier(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PdbCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PdbCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clean_code() {
        assert_eq!(PdbCode::normalize("4EY7").unwrap().as_str(), "4EY7");
    }

    #[test]
    fn test_normalize_strips_padding_and_nbsp() {
        assert_eq!(PdbCode::normalize("  1eve\t").unwrap().as_str(), "1EVE");
        assert_eq!(PdbCode::normalize("\u{a0}5nau\u{a0}").unwrap().as_str(), "5NAU");
        assert_eq!(PdbCode::normalize("1 e v e").unwrap().as_str(), "1EVE");
    }

    #[test]
    fn test_normalize_keeps_trailing_token_after_prefix() {
        assert_eq!(PdbCode::normalize("PDB: 6ce6").unwrap().as_str(), "6CE6");
        assert_eq!(PdbCode::normalize("AChE_12 4EY7").unwrap().as_str(), "4EY7");
    }

    #[test]
    fn test_normalize_rejects_short_or_dirty_suffix() {
        for raw in ["", "   ", "1EV", "1EV_", "4EY7)", "\u{a0}", "nan?"] {
            match PdbCode::normalize(raw) {
                Err(LigmapError::InvalidIdentifier(r)) => assert_eq!(r, raw),
                other => panic!("expected InvalidIdentifier for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_display_matches_as_str() {
        let code = PdbCode::normalize("7rui").unwrap();
        assert_eq!(code.to_string(), "7RUI");
    }
}
