//! Batch driver: normalise → fetch → classify, one result per input row.

use futures_util::stream::{self, StreamExt};
use ligmap_common::{
    Config, ErrorKind, ExtractionResult, LigmapError, Outcome, PdbCode, RecordError, Result,
    StructureRecord,
};
use tracing::{info, instrument, warn};

use crate::ligand::LigandSelector;
use crate::pdb::{RcsbSource, StructureFetcher, StructureSource};

/// Counts over one finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub resolved: usize,
    pub no_ligand: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match &result.outcome {
                Outcome::Extracted(s) if s.primary.is_some() => summary.resolved += 1,
                Outcome::Extracted(_) => summary.no_ligand += 1,
                Outcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

pub struct LigandPipeline<S = RcsbSource> {
    fetcher: StructureFetcher<S>,
    selector: LigandSelector,
    workers: usize,
}

impl LigandPipeline<RcsbSource> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = StructureFetcher::from_config(&config.extraction, &config.cache_dir())?;
        Ok(Self::new(fetcher, LigandSelector::from_config(&config.extraction))
            .with_workers(config.extraction.workers))
    }
}

impl<S: StructureSource> LigandPipeline<S> {
    pub fn new(fetcher: StructureFetcher<S>, selector: LigandSelector) -> Self {
        Self {
            fetcher,
            selector,
            workers: 1,
        }
    }

    /// Records in flight at once. Output order is unaffected.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn fetcher(&self) -> &StructureFetcher<S> {
        &self.fetcher
    }

    /// Process one record. Every failure ends up in the result, never as an `Err`.
    #[instrument(skip(self, record), fields(row = record.row, unique_id = %record.unique_id))]
    pub async fn process(&self, record: &StructureRecord) -> ExtractionResult {
        let code = match PdbCode::normalize(&record.raw_id) {
            Ok(code) => code,
            Err(e) => {
                warn!("Skipping row {}: {}", record.row, e);
                return ExtractionResult::failed(record, None, record_error(&e));
            }
        };

        let summary = match self.fetcher.fetch(&code).await {
            Ok(text) => self.selector.extract(&text),
            Err(e) => Err(e),
        };

        match summary {
            Ok(summary) => {
                info!("{} → {}", code, summary.primary_label());
                ExtractionResult::extracted(record, code, summary)
            }
            Err(e) => {
                warn!("Error processing {}: {}", code, e);
                ExtractionResult::failed(record, Some(code), record_error(&e))
            }
        }
    }

    /// Process a whole table in input order.
    pub async fn run(&self, records: &[StructureRecord]) -> Vec<ExtractionResult> {
        let results: Vec<ExtractionResult> = stream::iter(records)
            .map(|record| self.process(record))
            .buffered(self.workers)
            .collect()
            .await;

        let summary = BatchSummary::from_results(&results);
        info!(
            "Batch finished: {} rows, {} resolved, {} without ligand, {} failed",
            summary.total, summary.resolved, summary.no_ligand, summary.failed
        );
        results
    }
}

/// Per-row error marker for a library error.
pub fn record_error(e: &LigmapError) -> RecordError {
    match e {
        LigmapError::InvalidIdentifier(raw) => RecordError::new(
            ErrorKind::InvalidIdentifier,
            format!("no 4-character alphanumeric PDB code in {:?}", raw),
        ),
        LigmapError::Parse(msg) => RecordError::new(ErrorKind::ParseError, msg.clone()),
        LigmapError::Fetch(msg) => RecordError::new(ErrorKind::FetchError, msg.clone()),
        other => RecordError::new(ErrorKind::FetchError, other.to_string()),
    }
}
