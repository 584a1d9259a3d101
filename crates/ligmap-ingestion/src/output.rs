//! Ligand mapping CSV.

use std::collections::BTreeSet;
use std::path::Path;

use ligmap_common::{ExtractionResult, Outcome, Result, NO_LIGAND};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::strip_bom;
use crate::validate::drop_reason;

/// Placeholder for the set columns of a failed row.
pub const NOT_AVAILABLE: &str = "N/A";

/// Mapping file header, also written when there are no rows.
pub const HEADER: [&str; 6] = [
    "UniqueID",
    "PDB ID",
    "PDB_ID",
    "Ligand(s)",
    "All Ligand Candidates",
    "All Residues",
];

/// One row of the mapping file, in output column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRow {
    #[serde(rename = "UniqueID")]
    pub unique_id: String,

    /// Identifier as given in the input table.
    #[serde(rename = "PDB ID")]
    pub raw_id: String,

    /// Normalised code; empty when normalisation failed.
    #[serde(rename = "PDB_ID")]
    pub pdb_id: String,

    #[serde(rename = "Ligand(s)")]
    pub ligand: String,

    #[serde(rename = "All Ligand Candidates")]
    pub candidates: String,

    #[serde(rename = "All Residues")]
    pub residues: String,
}

/// Sorted names joined with `", "`, or `None` for an empty set.
pub fn join_names(names: &BTreeSet<String>) -> String {
    if names.is_empty() {
        NO_LIGAND.to_string()
    } else {
        names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl From<&ExtractionResult> for MappingRow {
    fn from(result: &ExtractionResult) -> Self {
        let (ligand, candidates, residues) = match &result.outcome {
            Outcome::Extracted(summary) => (
                summary.primary_label().to_string(),
                join_names(&summary.candidates),
                join_names(&summary.residues),
            ),
            Outcome::Failed(error) => (
                format!("Error: {}", error),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
            ),
        };

        Self {
            unique_id: result.unique_id.clone(),
            raw_id: result.raw_id.clone(),
            pdb_id: result.code.as_ref().map(|c| c.to_string()).unwrap_or_default(),
            ligand,
            candidates,
            residues,
        }
    }
}

impl MappingRow {
    /// Mapped ligand name, if the row names one.
    pub fn resolved_ligand(&self) -> Option<&str> {
        match drop_reason(self) {
            Some(_) => None,
            None => Some(self.ligand.trim()),
        }
    }
}

/// Render rows as CSV text with the fixed header.
pub fn render_rows(rows: &[MappingRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

/// Write rows with the fixed header, creating the parent directory if needed.
pub async fn write_rows(path: &Path, rows: &[MappingRow]) -> Result<()> {
    let bytes = render_rows(rows)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, bytes).await?;
    Ok(())
}

/// Write a batch's mapping file. Returns the number of rows written.
///
/// With `drop_unresolved`, rows without a primary ligand and failed rows are
/// left out.
pub async fn write_mapping(path: &Path, results: &[ExtractionResult], drop_unresolved: bool) -> Result<usize> {
    let rows: Vec<MappingRow> = results
        .iter()
        .filter(|r| !drop_unresolved || r.is_resolved())
        .map(MappingRow::from)
        .collect();

    write_rows(path, &rows).await?;
    info!("Wrote {} of {} rows to {}", rows.len(), results.len(), path.display());
    Ok(rows.len())
}

/// Read a mapping file written by [`write_mapping`].
pub async fn read_mapping(path: &Path) -> Result<Vec<MappingRow>> {
    let content = fs::read_to_string(path).await?;
    let mut reader = csv::Reader::from_reader(strip_bom(&content).as_bytes());
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
