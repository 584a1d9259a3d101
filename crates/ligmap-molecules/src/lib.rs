//! Ligmap Molecules - structure retrieval and ligand identification.
//!
//! 1. Fetching PDB entries through an on-disk cache (`pdb`)
//! 2. Parsing residues from coordinate records (`residue`)
//! 3. Picking the primary ligand of a structure (`ligand`)
//! 4. Running whole tables of identifiers (`pipeline`)
//! 5. Writing ligand-only coordinate files (`export`)
//! 6. Converting those files with Open Babel (`convert`)
//! 7. Creating and tidying the working folders (`folders`)

pub mod convert;
pub mod export;
pub mod folders;
pub mod ligand;
pub mod pdb;
pub mod pipeline;
pub mod residue;

#[cfg(test)]
mod fixtures;

pub use ligand::LigandSelector;
pub use pdb::{RcsbSource, StructureFetcher, StructureSource};
pub use pipeline::{BatchSummary, LigandPipeline};
