//! `ligmap`: map structural models to their bound ligands.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ligmap_common::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ligmap", version, about = "Ligand mapping for PDB structure tables")]
pub struct Cli {
    /// Config file (default: $LIGMAP_CONFIG, then ./ligmap.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for ligmap crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the working folder layout
    Init,

    /// Map every row of one or more structure tables to its primary ligand
    Extract {
        /// Only run the named target
        #[arg(long, conflicts_with = "input")]
        target: Option<String>,

        /// Ad-hoc input table instead of the configured targets
        #[arg(long, requires = "output")]
        input: Option<PathBuf>,

        /// Mapping file for --input
        #[arg(long, requires = "input")]
        output: Option<PathBuf>,

        /// Leave rows without a ligand out of the --output file
        #[arg(long, requires = "input")]
        drop_unresolved: bool,
    },

    /// Drop unusable rows from a mapping file
    Validate {
        #[arg(long)]
        input: PathBuf,

        /// Defaults to `<input stem>_validated.csv` next to the input
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write ligand-only PDB files for mapped rows
    Export {
        #[arg(long, conflicts_with = "input")]
        target: Option<String>,

        /// Mapping file to export from instead of the configured targets
        #[arg(long, requires = "prefix")]
        input: Option<PathBuf>,

        /// Folder prefix for --input
        #[arg(long, requires = "input")]
        prefix: Option<String>,
    },

    /// Convert exported ligands with Open Babel
    Convert {
        /// Override the configured output formats
        #[arg(long, value_delimiter = ',')]
        formats: Vec<String>,
    },

    /// Move exported ligand folders into per-target folders
    Organise,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "ligmap=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("ligmap {}", env!("CARGO_PKG_VERSION"));
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Init => commands::init(&config).await,
        Command::Extract {
            target,
            input,
            output,
            drop_unresolved,
        } => match (input, output) {
            (Some(input), Some(output)) => {
                commands::extract_table(&config, &input, &output, drop_unresolved).await
            }
            _ => commands::extract_targets(&config, target.as_deref()).await,
        },
        Command::Validate { input, output } => commands::validate(&input, output.as_deref()).await,
        Command::Export {
            target,
            input,
            prefix,
        } => match (input, prefix) {
            (Some(input), Some(prefix)) => commands::export_file(&config, &input, &prefix).await,
            _ => commands::export_targets(&config, target.as_deref()).await,
        },
        Command::Convert { formats } => {
            if !formats.is_empty() {
                config.conversion.formats = formats;
            }
            commands::convert(&config).await
        }
        Command::Organise => commands::organise(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_ad_hoc_needs_both_paths() {
        assert!(Cli::try_parse_from(["ligmap", "extract", "--input", "a.csv"]).is_err());
        let cli = Cli::try_parse_from([
            "ligmap", "extract", "--input", "a.csv", "--output", "b.csv", "--drop-unresolved",
        ])
        .unwrap();
        match cli.command {
            Command::Extract { input, drop_unresolved, .. } => {
                assert_eq!(input, Some(PathBuf::from("a.csv")));
                assert!(drop_unresolved);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_target_and_input_conflict() {
        assert!(Cli::try_parse_from([
            "ligmap", "extract", "--target", "AChE", "--input", "a.csv", "--output", "b.csv",
        ])
        .is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ligmap", "convert", "--formats", "sdf,mol2", "-v", "--config", "x.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Command::Convert { formats } => assert_eq!(formats, vec!["sdf", "mol2"]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
