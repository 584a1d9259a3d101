/// Shared record types passed between ingestion, extraction and output.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::PdbCode;

/// Label written in place of a primary ligand when a structure has no candidates.
pub const NO_LIGAND: &str = "None";

// ---------------------------------------------------------------------------
// Input record
// ---------------------------------------------------------------------------

/// One structural model to process, as read from an input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRecord {
    /// 1-based data row in the input table.
    pub row: usize,
    pub unique_id: String,
    /// Identifier exactly as it appeared in the table (may be padded or dirty).
    pub raw_id: String,
}

impl StructureRecord {
    pub fn new(row: usize, unique_id: impl Into<String>, raw_id: impl Into<String>) -> Self {
        Self {
            row,
            unique_id: unique_id.into(),
            raw_id: raw_id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ligand summary
// ---------------------------------------------------------------------------

/// Classification of every residue in one structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LigandSummary {
    /// Most frequent candidate, `None` when the structure has no candidates.
    pub primary: Option<String>,
    pub candidates: BTreeSet<String>,
    /// Every residue name seen, polymer, solvent and ligand alike.
    pub residues: BTreeSet<String>,
    /// Residue-occurrence count per candidate name.
    pub counts: BTreeMap<String, usize>,
}

impl LigandSummary {
    pub fn primary_label(&self) -> &str {
        self.primary.as_deref().unwrap_or(NO_LIGAND)
    }
}

// ---------------------------------------------------------------------------
// Per-record failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidIdentifier,
    FetchError,
    ParseError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidIdentifier => "InvalidIdentifier",
            ErrorKind::FetchError => "FetchError",
            ErrorKind::ParseError => "ParseError",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RecordError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

// ---------------------------------------------------------------------------
// Extraction result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Extracted(LigandSummary),
    Failed(RecordError),
}

/// Output of processing one [`StructureRecord`]. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub row: usize,
    pub unique_id: String,
    pub raw_id: String,
    /// Absent when the raw identifier could not be normalised.
    pub code: Option<PdbCode>,
    pub outcome: Outcome,
}

impl ExtractionResult {
    pub fn extracted(record: &StructureRecord, code: PdbCode, summary: LigandSummary) -> Self {
        Self {
            row: record.row,
            unique_id: record.unique_id.clone(),
            raw_id: record.raw_id.clone(),
            code: Some(code),
            outcome: Outcome::Extracted(summary),
        }
    }

    pub fn failed(record: &StructureRecord, code: Option<PdbCode>, error: RecordError) -> Self {
        Self {
            row: record.row,
            unique_id: record.unique_id.clone(),
            raw_id: record.raw_id.clone(),
            code,
            outcome: Outcome::Failed(error),
        }
    }

    pub fn summary(&self) -> Option<&LigandSummary> {
        match &self.outcome {
            Outcome::Extracted(s) => Some(s),
            Outcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RecordError> {
        match &self.outcome {
            Outcome::Extracted(_) => None,
            Outcome::Failed(e) => Some(e),
        }
    }

    /// True when a primary ligand was identified.
    pub fn is_resolved(&self) -> bool {
        self.summary().is_some_and(|s| s.primary.is_some())
    }
}
