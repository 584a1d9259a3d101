//! Input table loading.
//!
//! Accepts the CSV exports of the structure spreadsheets. Column names vary
//! between sheets (`PDB ID`, `PBD ID`, `PDB_ID`, ...) so headers are matched
//! after lower-casing and dropping spaces and underscores.

use std::path::Path;

use ligmap_common::{LigmapError, Result, StructureRecord};
use tracing::{debug, info};

use crate::strip_bom;

const UNIQUE_ID_ALIASES: &[&str] = &["uniqueid"];
const RAW_ID_ALIASES: &[&str] = &["pdbid", "pbdid", "pdb"];

/// `UniqueID` / `Unique_ID` / `unique id` all become `uniqueid`.
pub fn normalise_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Column positions of the two fields a record needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub unique_id: Option<usize>,
    pub raw_id: usize,
}

impl ColumnMap {
    pub fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let normalised: Vec<String> = headers.iter().map(normalise_header).collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| normalised.iter().position(|h| h == alias))
        };

        let raw_id = find(RAW_ID_ALIASES).ok_or_else(|| {
            LigmapError::Input(format!(
                "no PDB identifier column among headers: {}",
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })?;

        Ok(Self {
            unique_id: find(UNIQUE_ID_ALIASES),
            raw_id,
        })
    }
}

/// Parse table text into records, one per data row, in file order.
///
/// Rows are numbered from 1. A missing or blank unique id falls back to the
/// row number; a blank identifier is kept and fails later at normalisation.
pub fn parse_table(content: &str) -> Result<Vec<StructureRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(strip_bom(content).as_bytes());

    let columns = ColumnMap::from_headers(reader.headers()?)?;
    debug!("Table columns: {:?}", columns);

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let row = idx + 1;

        let unique_id = columns
            .unique_id
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| row.to_string());
        let raw_id = record.get(columns.raw_id).unwrap_or("");

        records.push(StructureRecord::new(row, unique_id, raw_id));
    }

    Ok(records)
}

/// Read and parse a structure table from disk.
pub async fn load_table(path: &Path) -> Result<Vec<StructureRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LigmapError::Input(format!("cannot read {}: {}", path.display(), e)))?;
    let records = parse_table(&content)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
