//! Residue parsing from PDB-format text.
//!
//! Reads fixed-column `ATOM`/`HETATM` records and groups their atoms into
//! residues per model, chain, sequence number, insertion code, record kind
//! and residue name. Alternate groups sharing one residue id (for example
//! two ligands modelled as altlocs at the same site) stay separate. Every other record type (`HEADER`, `REMARK`, `TER`, `CONECT`, ...)
//! is ignored apart from `MODEL`, which starts a new model.

use std::collections::HashSet;

use ligmap_common::{LigmapError, Result};

/// Record kind of a residue's atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    /// Standard polymer residue (`ATOM` records).
    Polymer,
    /// Heteroatom group (`HETATM` records): ligands, ions, solvent, cofactors.
    Hetero,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub name: String,
    pub kind: ResidueKind,
    pub model: usize,
    pub chain: String,
    pub seq: i32,
    pub icode: String,
}

impl Residue {
    pub fn is_hetero(&self) -> bool {
        self.kind == ResidueKind::Hetero
    }
}

/// Substring of fixed-width PDB columns (1-indexed, inclusive), trimmed.
pub(crate) fn column(line: &str, start: usize, end: usize) -> &str {
    let len = line.len();
    let start_idx = start.saturating_sub(1);
    if start_idx >= len {
        return "";
    }
    line.get(start_idx..end.min(len)).unwrap_or("").trim()
}

/// Record kind of a coordinate line, `None` for every other record.
pub(crate) fn record_kind(line: &str) -> Option<ResidueKind> {
    match column(line, 1, 6) {
        "ATOM" => Some(ResidueKind::Polymer),
        "HETATM" => Some(ResidueKind::Hetero),
        _ => None,
    }
}

/// Residue name of a coordinate line (columns 18-21, so 4-character names survive).
pub(crate) fn residue_name(line: &str) -> &str {
    column(line, 18, 21)
}

/// Parse every residue in a PDB file, in file order.
///
/// Fails when the text is blank, holds no coordinate records, or holds a
/// coordinate record with no residue name or a non-numeric sequence number.
pub fn parse_residues(text: &str) -> Result<Vec<Residue>> {
    if text.trim().is_empty() {
        return Err(LigmapError::Parse("empty structure file".to_string()));
    }

    let mut residues = Vec::new();
    let mut seen: HashSet<(usize, String, i32, String, ResidueKind, String)> = HashSet::new();
    let mut model = 0usize;
    let mut atoms = 0usize;

    for (idx, line) in text.lines().enumerate() {
        if column(line, 1, 6) == "MODEL" {
            model += 1;
            continue;
        }
        let Some(kind) = record_kind(line) else {
            continue;
        };
        atoms += 1;

        let name = residue_name(line);
        if name.is_empty() {
            return Err(LigmapError::Parse(format!(
                "line {}: coordinate record without a residue name",
                idx + 1
            )));
        }

        let seq_field = column(line, 23, 26);
        let seq: i32 = seq_field.parse().map_err(|_| {
            LigmapError::Parse(format!(
                "line {}: invalid residue sequence number {:?}",
                idx + 1,
                seq_field
            ))
        })?;

        let chain = column(line, 22, 22).to_string();
        let icode = column(line, 27, 27).to_string();

        if seen.insert((model, chain.clone(), seq, icode.clone(), kind, name.to_string())) {
            residues.push(Residue {
                name: name.to_string(),
                kind,
                model,
                chain,
                seq,
                icode,
            });
        }
    }

    if atoms == 0 {
        return Err(LigmapError::Parse("no ATOM/HETATM records".to_string()));
    }

    Ok(residues)
}
