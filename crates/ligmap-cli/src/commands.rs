//! Command implementations. Each returns after logging its own summary.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use ligmap_common::{Config, PdbCode, TargetConfig};
use ligmap_ingestion::{load_table, read_mapping, validate_file, write_mapping, MappingRow};
use ligmap_molecules::convert::{find_ligand_files, output_dirs, ObabelRunner};
use ligmap_molecules::export::{export_ligands, ExportRequest};
use ligmap_molecules::{folders, BatchSummary, LigandPipeline, StructureFetcher};
use tracing::{debug, error, info, warn};

pub async fn init(config: &Config) -> anyhow::Result<()> {
    let dirs = folders::init_layout(config).await?;
    info!("Created or found {} folders", dirs.len());
    Ok(())
}

// ── Extraction ───────────────────────────────────────────────────────────────

/// Targets named on the command line, or every configured target.
fn selected_targets<'a>(config: &'a Config, name: Option<&str>) -> anyhow::Result<Vec<&'a TargetConfig>> {
    match name {
        Some(name) => match config.target(name) {
            Some(target) => Ok(vec![target]),
            None => bail!("no target named {:?} in the configuration", name),
        },
        None if config.targets.is_empty() => {
            bail!("no [[targets]] configured; pass --input and --output for a single table")
        }
        None => Ok(config.targets.iter().collect()),
    }
}

async fn run_table(
    pipeline: &LigandPipeline,
    input: &Path,
    output: &Path,
    drop_unresolved: bool,
) -> anyhow::Result<BatchSummary> {
    let records = load_table(input)
        .await
        .with_context(|| format!("loading {}", input.display()))?;
    let results = pipeline.run(&records).await;
    write_mapping(output, &results, drop_unresolved)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(BatchSummary::from_results(&results))
}

pub async fn extract_table(
    config: &Config,
    input: &Path,
    output: &Path,
    drop_unresolved: bool,
) -> anyhow::Result<()> {
    let pipeline = LigandPipeline::from_config(config)?;
    let summary = run_table(&pipeline, input, output, drop_unresolved).await?;
    info!(
        "{}: {} resolved, {} without ligand, {} failed",
        input.display(),
        summary.resolved,
        summary.no_ligand,
        summary.failed
    );
    Ok(())
}

pub async fn extract_targets(config: &Config, name: Option<&str>) -> anyhow::Result<()> {
    let targets = selected_targets(config, name)?;
    let pipeline = LigandPipeline::from_config(config)?;

    let mut failed = 0;
    for target in targets {
        let input = config.resolve(&target.input);
        let output = config.resolve(&target.output);
        info!("Extracting {} from {}", target.name, input.display());

        match run_table(&pipeline, &input, &output, target.drop_unresolved).await {
            Ok(summary) => info!(
                "{}: {} rows, {} resolved, {} without ligand, {} failed",
                target.name, summary.total, summary.resolved, summary.no_ligand, summary.failed
            ),
            Err(e) => {
                error!("Target {} aborted: {:#}", target.name, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} target(s) failed", failed);
    }
    Ok(())
}

// ── Validation ───────────────────────────────────────────────────────────────

/// `<dir>/<stem>_validated.csv` for `<dir>/<stem>.csv`.
pub fn default_validated_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mapping".to_string());
    input.with_file_name(format!("{}_validated.csv", stem))
}

pub async fn validate(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_validated_path(input));
    let report = validate_file(input, &output)
        .await
        .with_context(|| format!("validating {}", input.display()))?;

    for (row, reason) in &report.dropped {
        debug!("Dropped {} ({}): {}", row.unique_id, row.pdb_id, reason);
    }
    info!(
        "Kept {} rows, dropped {}, {} suspicious ligand names; written to {}",
        report.kept.len(),
        report.dropped.len(),
        report.suspicious.len(),
        output.display()
    );
    Ok(())
}

// ── Export ───────────────────────────────────────────────────────────────────

/// Export requests for every mapping row with a resolved ligand.
pub fn export_requests(rows: &[MappingRow]) -> Vec<ExportRequest> {
    rows.iter()
        .filter_map(|row| {
            let ligand = row.resolved_ligand()?;
            match PdbCode::normalize(&row.pdb_id) {
                Ok(code) => Some(ExportRequest {
                    unique_id: row.unique_id.clone(),
                    code,
                    ligand: ligand.to_string(),
                }),
                Err(e) => {
                    warn!("Skipping {}: {}", row.unique_id, e);
                    None
                }
            }
        })
        .collect()
}

pub async fn export_file(config: &Config, input: &Path, prefix: &str) -> anyhow::Result<()> {
    let rows = read_mapping(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let requests = export_requests(&rows);
    info!("{} of {} rows have a ligand to export", requests.len(), rows.len());

    let fetcher = StructureFetcher::from_config(&config.extraction, &config.cache_dir())?;
    let report = export_ligands(&fetcher, &requests, &config.ligands_dir(), prefix).await;
    info!(
        "Exported {}, {} without matching atoms, {} failed",
        report.written.len(),
        report.empty.len(),
        report.failed.len()
    );
    Ok(())
}

pub async fn export_targets(config: &Config, name: Option<&str>) -> anyhow::Result<()> {
    let mut failed = 0;
    for target in selected_targets(config, name)? {
        let mapping = config.resolve(&target.output);
        if let Err(e) = export_file(config, &mapping, target.prefix()).await {
            error!("Export for {} aborted: {:#}", target.name, e);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} target(s) failed", failed);
    }
    Ok(())
}

// ── Conversion and folders ───────────────────────────────────────────────────

pub async fn convert(config: &Config) -> anyhow::Result<()> {
    let ligands = config.ligands_dir();
    let files = find_ligand_files(&ligands, &config.conversion.skip_marker)
        .await
        .with_context(|| format!("scanning {}", ligands.display()))?;
    info!("Found {} ligand files to convert", files.len());

    let runner = ObabelRunner::new(&config.conversion.obabel);
    let report = runner.convert_all(&files, &output_dirs(config)).await;
    info!(
        "Converted {} files, {} failures",
        report.converted.len(),
        report.failed.len()
    );
    Ok(())
}

pub async fn organise(config: &Config) -> anyhow::Result<()> {
    if config.targets.is_empty() {
        bail!("no [[targets]] configured, nothing to organise by");
    }

    let report = folders::organise(config).await?;
    info!(
        "Moved {} folders, {} unknown, {} already in place",
        report.moved.len(),
        report.unknown.len(),
        report.conflicts.len()
    );
    Ok(())
}
