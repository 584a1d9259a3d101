//! ligmap-common: shared types, errors and configuration used across all ligmap crates.

pub mod config;
pub mod entities;
pub mod error;
pub mod http;
pub mod identifier;

// Re-export commonly used types
pub use config::{Config, ExtractionConfig, TargetConfig};
pub use entities::{ErrorKind, ExtractionResult, LigandSummary, Outcome, RecordError, StructureRecord, NO_LIGAND};
pub use error::{LigmapError, Result};
pub use identifier::PdbCode;
