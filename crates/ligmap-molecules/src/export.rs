//! Ligand-only coordinate export.
//!
//! Writes the `HETATM` records of the mapped ligand into its own PDB file,
//! one folder per mapping row:
//! `<ligands_dir>/<prefix>_<UniqueID>_<CODE>/<prefix>_<UniqueID>_<CODE>.pdb`.

use std::path::{Path, PathBuf};

use ligmap_common::{PdbCode, Result};
use tokio::fs;
use tracing::{info, warn};

use crate::pdb::{StructureFetcher, StructureSource};
use crate::residue::{record_kind, residue_name, ResidueKind};

const WATER: [&str; 2] = ["HOH", "WAT"];

/// One ligand to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub unique_id: String,
    pub code: PdbCode,
    pub ligand: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    /// Rows whose structure has no atoms for the mapped ligand.
    pub empty: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// `<prefix>_<unique_id>_<code>`, with path separators in the id replaced.
pub fn folder_name(prefix: &str, unique_id: &str, code: &PdbCode) -> String {
    let id: String = unique_id
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ' ') { '_' } else { c })
        .collect();
    format!("{}_{}_{}", prefix, id, code)
}

/// Every HETATM line of `ligand`, terminated by `END`. `None` when nothing matches.
pub fn ligand_only_pdb(text: &str, ligand: &str) -> Option<String> {
    if WATER.iter().any(|w| *w == ligand) {
        return None;
    }

    let mut out = String::new();
    for line in text.lines() {
        if record_kind(line) == Some(ResidueKind::Hetero) && residue_name(line) == ligand {
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    if out.is_empty() {
        None
    } else {
        out.push_str("END\n");
        Some(out)
    }
}

/// Export every request, continuing past failures.
pub async fn export_ligands<S: StructureSource>(
    fetcher: &StructureFetcher<S>,
    requests: &[ExportRequest],
    ligands_dir: &Path,
    prefix: &str,
) -> ExportReport {
    let mut report = ExportReport::default();

    for request in requests {
        let name = folder_name(prefix, &request.unique_id, &request.code);
        match export_one(fetcher, request, ligands_dir, &name).await {
            Ok(Some(path)) => {
                info!("Exported {} ({}) to {}", request.code, request.ligand, path.display());
                report.written.push(path);
            }
            Ok(None) => {
                warn!("No {} atoms in {}, skipping", request.ligand, request.code);
                report.empty.push(name);
            }
            Err(e) => {
                warn!("Export of {} failed: {}", name, e);
                report.failed.push((name, e.to_string()));
            }
        }
    }

    report
}

async fn export_one<S: StructureSource>(
    fetcher: &StructureFetcher<S>,
    request: &ExportRequest,
    ligands_dir: &Path,
    name: &str,
) -> Result<Option<PathBuf>> {
    let text = fetcher.fetch(&request.code).await?;
    let Some(ligand_pdb) = ligand_only_pdb(&text, &request.ligand) else {
        return Ok(None);
    };

    let folder = ligands_dir.join(name);
    fs::create_dir_all(&folder).await?;
    let path = folder.join(format!("{}.pdb", name));
    fs::write(&path, ligand_pdb).await?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::MINI_COMPLEX;
    use async_trait::async_trait;
    use ligmap_common::LigmapError;
    use tempfile::tempdir;

    struct OneFile;

    #[async_trait]
    impl StructureSource for OneFile {
        async fn download(&self, code: &PdbCode) -> Result<String> {
            if code.as_str() == "9ZZZ" {
                Ok(MINI_COMPLEX.to_string())
            } else {
                Err(LigmapError::Fetch(format!("{} returned HTTP 404 Not Found", code)))
            }
        }
    }

    fn request(id: &str, code: &str, ligand: &str) -> ExportRequest {
        ExportRequest {
            unique_id: id.to_string(),
            code: PdbCode::normalize(code).unwrap(),
            ligand: ligand.to_string(),
        }
    }

    #[test]
    fn test_folder_name() {
        let code = PdbCode::normalize("7rui").unwrap();
        assert_eq!(folder_name("BRD4-BD1", "1", &code), "BRD4-BD1_1_7RUI");
        assert_eq!(folder_name("AChE", "a/b c", &code), "AChE_a_b_c_7RUI");
    }

    #[test]
    fn test_ligand_only_pdb_selects_all_copies() {
        let out = ligand_only_pdb(MINI_COMPLEX, "7QZ").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 11);
        assert!(lines[..10].iter().all(|l| l.starts_with("HETATM") && &l[17..20] == "7QZ"));
        assert_eq!(lines[10], "END");
    }

    #[test]
    fn test_ligand_only_pdb_no_match_or_water() {
        assert!(ligand_only_pdb(MINI_COMPLEX, "JQ1").is_none());
        assert!(ligand_only_pdb(MINI_COMPLEX, "HOH").is_none());
        // ATOM records never selected even with a matching name
        assert!(ligand_only_pdb(MINI_COMPLEX, "ALA").is_none());
    }

    #[tokio::test]
    async fn test_export_ligands_report() {
        let dir = tempdir().unwrap();
        let fetcher = StructureFetcher::new(OneFile);
        let requests = vec![
            request("1", "9ZZZ", "EDO"),
            request("2", "9ZZZ", "JQ1"),
            request("3", "1XXX", "7QZ"),
        ];

        let report = export_ligands(&fetcher, &requests, dir.path(), "AChE").await;

        assert_eq!(report.written.len(), 1);
        let expected = dir.path().join("AChE_1_9ZZZ").join("AChE_1_9ZZZ.pdb");
        assert_eq!(report.written[0], expected);
        let content = std::fs::read_to_string(&expected).unwrap();
        assert_eq!(content.lines().filter(|l| l.starts_with("HETATM")).count(), 8);

        assert_eq!(report.empty, vec!["AChE_2_9ZZZ".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "AChE_3_1XXX");
        assert!(!dir.path().join("AChE_2_9ZZZ").exists());
    }
}
