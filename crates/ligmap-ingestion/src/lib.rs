//! ligmap-ingestion: tabular input and output around an extraction batch.
//! - Structure tables with loosely named identifier columns
//! - Ligand mapping CSV writing and reading
//! - Mapping validation and clean-up

pub mod output;
pub mod table;
pub mod validate;

pub use output::{read_mapping, write_mapping, MappingRow};
pub use table::load_table;
pub use validate::{validate_file, validate_rows, ValidationReport};

/// Strip a UTF-8 byte-order mark left by spreadsheet exports.
pub(crate) fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}
