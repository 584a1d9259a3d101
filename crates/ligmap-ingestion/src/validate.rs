//! Mapping clean-up before ligand export.
//!
//! Rows are dropped when they carry no usable ligand: an error marker,
//! `None`, `N/A`, a blank cell, or no normalised code. Ligand names that do
//! not look like a chemical component id are kept but reported.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use lazy_static::lazy_static;
use ligmap_common::{Result, NO_LIGAND};
use regex::Regex;
use tracing::{info, warn};

use crate::output::{read_mapping, write_rows, MappingRow, NOT_AVAILABLE};

lazy_static! {
    static ref COMPONENT_ID: Regex = Regex::new(r"^[A-Z0-9]{2,4}$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    ErrorMarker,
    NoLigand,
    MissingCode,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::ErrorMarker => write!(f, "error marker"),
            DropReason::NoLigand => write!(f, "no ligand"),
            DropReason::MissingCode => write!(f, "missing PDB_ID"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub kept: Vec<MappingRow>,
    pub dropped: Vec<(MappingRow, DropReason)>,
    /// Kept ligand names outside `^[A-Z0-9]{2,4}$`.
    pub suspicious: BTreeSet<String>,
}

/// Why a row would be dropped, if at all.
pub fn drop_reason(row: &MappingRow) -> Option<DropReason> {
    let ligand = row.ligand.trim();
    if ligand.contains("Error") {
        Some(DropReason::ErrorMarker)
    } else if ligand.is_empty()
        || ligand.eq_ignore_ascii_case(NO_LIGAND)
        || ligand.eq_ignore_ascii_case(NOT_AVAILABLE)
    {
        Some(DropReason::NoLigand)
    } else if row.pdb_id.trim().is_empty() {
        Some(DropReason::MissingCode)
    } else {
        None
    }
}

pub fn is_component_id(name: &str) -> bool {
    COMPONENT_ID.is_match(name)
}

pub fn validate_rows(rows: Vec<MappingRow>) -> ValidationReport {
    let mut report = ValidationReport::default();
    for row in rows {
        match drop_reason(&row) {
            Some(reason) => report.dropped.push((row, reason)),
            None => {
                let ligand = row.ligand.trim();
                if !is_component_id(ligand) {
                    report.suspicious.insert(ligand.to_string());
                }
                report.kept.push(row);
            }
        }
    }
    report
}

/// Validate `input` and write the kept rows to `output` under the same header.
pub async fn validate_file(input: &Path, output: &Path) -> Result<ValidationReport> {
    let report = validate_rows(read_mapping(input).await?);
    write_rows(output, &report.kept).await?;

    info!(
        "Validated {}: kept {}, dropped {}",
        input.display(),
        report.kept.len(),
        report.dropped.len()
    );
    for name in &report.suspicious {
        warn!("Suspicious ligand name: {}", name);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(id: &str, pdb_id: &str, ligand: &str) -> MappingRow {
        MappingRow {
            unique_id: id.to_string(),
            raw_id: pdb_id.to_lowercase(),
            pdb_id: pdb_id.to_string(),
            ligand: ligand.to_string(),
            candidates: ligand.to_string(),
            residues: format!("ALA, {}", ligand),
        }
    }

    #[test]
    fn test_drop_rules() {
        assert_eq!(drop_reason(&row("1", "1EVE", "E20")), None);
        assert_eq!(
            drop_reason(&row("2", "", "Error: InvalidIdentifier: x")),
            Some(DropReason::ErrorMarker)
        );
        assert_eq!(drop_reason(&row("3", "2BBB", "None")), Some(DropReason::NoLigand));
        assert_eq!(drop_reason(&row("4", "2BBB", "none")), Some(DropReason::NoLigand));
        assert_eq!(drop_reason(&row("5", "2BBB", "n/a")), Some(DropReason::NoLigand));
        assert_eq!(drop_reason(&row("6", "2BBB", "  ")), Some(DropReason::NoLigand));
        assert_eq!(drop_reason(&row("7", " ", "7QZ")), Some(DropReason::MissingCode));
    }

    #[test]
    fn test_component_id_pattern() {
        for ok in ["7QZ", "E20", "CL", "A1AB"] {
            assert!(is_component_id(ok), "{ok}");
        }
        for bad in ["X", "jq1", "LONG5", "7-QZ"] {
            assert!(!is_component_id(bad), "{bad}");
        }
    }

    #[test]
    fn test_suspicious_names_kept() {
        let report = validate_rows(vec![
            row("1", "1EVE", "E20"),
            row("2", "4EY7", "e20"),
            row("3", "6CE6", "None"),
        ]);
        assert_eq!(report.kept.len(), 2);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.suspicious.into_iter().collect::<Vec<_>>(), vec!["e20"]);
    }

    #[tokio::test]
    async fn test_validate_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("mapping.csv");
        let output = dir.path().join("validated.csv");
        write_rows(
            &input,
            &[
                row("1", "1EVE", "E20"),
                row("2", "", "Error: FetchError: HTTP 404"),
                row("3", "7RUI", "7QZ"),
            ],
        )
        .await
        .unwrap();

        let report = validate_file(&input, &output).await.unwrap();
        assert_eq!(report.kept.len(), 2);

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("UniqueID,PDB ID,PDB_ID,Ligand(s),All Ligand Candidates,All Residues"));
        let back = read_mapping(&output).await.unwrap();
        let ids: Vec<&str> = back.iter().map(|r| r.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
