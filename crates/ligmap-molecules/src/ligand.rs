//! Ligand identification.
//!
//! A residue is a ligand candidate when it comes from `HETATM` records and
//! its name is not in the exclusion set (water, counter-ions, buffer
//! components). The primary ligand is the candidate name seen on the most
//! residues; atoms within a residue do not add weight. Ties go to the
//! alphabetically first name.

use std::collections::{BTreeMap, BTreeSet};

use ligmap_common::config::default_exclusions;
use ligmap_common::{ExtractionConfig, LigandSummary, Result};
use tracing::debug;

use crate::residue::{parse_residues, Residue};

/// Classifies residues and picks the primary ligand.
#[derive(Debug, Clone)]
pub struct LigandSelector {
    exclusions: BTreeSet<String>,
}

impl Default for LigandSelector {
    fn default() -> Self {
        Self {
            exclusions: default_exclusions(),
        }
    }
}

impl LigandSelector {
    pub fn new<I, S>(exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclusions: exclusions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.exclusions.iter().cloned())
    }

    pub fn exclusions(&self) -> &BTreeSet<String> {
        &self.exclusions
    }

    pub fn is_candidate(&self, residue: &Residue) -> bool {
        residue.is_hetero() && !self.exclusions.contains(&residue.name)
    }

    /// Classify already-parsed residues.
    pub fn summarize<'a, I>(&self, residues: I) -> LigandSummary
    where
        I: IntoIterator<Item = &'a Residue>,
    {
        let mut summary = LigandSummary::default();

        for residue in residues {
            summary.residues.insert(residue.name.clone());
            if self.is_candidate(residue) {
                summary.candidates.insert(residue.name.clone());
                *summary.counts.entry(residue.name.clone()).or_insert(0) += 1;
            }
        }

        summary.primary = select_primary(&summary.counts);
        debug!(
            primary = summary.primary_label(),
            candidates = summary.candidates.len(),
            residues = summary.residues.len(),
            "Classified residues"
        );
        summary
    }

    /// Parse structure text and classify its residues.
    pub fn extract(&self, text: &str) -> Result<LigandSummary> {
        let residues = parse_residues(text)?;
        Ok(self.summarize(&residues))
    }
}

/// Name with the highest count; among equal counts the smallest name wins.
pub fn select_primary(counts: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    // BTreeMap iterates names in ascending order, so a strict `>` keeps the first of a tie.
    for (name, &count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.clone())
}
