//! Test extraction against a pre-populated structure cache.
//!
//! Run with: cargo test --package ligmap-molecules --test test_cached_extraction

use ligmap_common::{Config, ErrorKind, StructureRecord};
use ligmap_molecules::export::{export_ligands, ExportRequest};
use ligmap_molecules::LigandPipeline;
use tempfile::tempdir;

const MINI_COMPLEX: &str = include_str!("data/mini_complex.pdb");

fn config_for(root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.layout.root = root.to_path_buf();
    // Unroutable endpoint: any cache miss must fail instead of reaching RCSB
    config.extraction.endpoint = "http://127.0.0.1:9/{CODE}.pdb".to_string();
    config.extraction.timeout_secs = Some(2);
    config
}

#[tokio::test]
async fn test_batch_over_warm_cache() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());
    std::fs::create_dir_all(config.cache_dir()).unwrap();
    std::fs::write(config.cache_dir().join("9ZZZ.pdb"), MINI_COMPLEX).unwrap();

    let pipeline = LigandPipeline::from_config(&config).unwrap();
    let records = vec![
        StructureRecord::new(1, "AChE_1", "pdb 9zzz"),
        StructureRecord::new(2, "AChE_2", "??"),
    ];
    let results = pipeline.run(&records).await;

    let summary = results[0].summary().unwrap();
    assert_eq!(summary.primary.as_deref(), Some("7QZ"));
    assert_eq!(summary.candidates.iter().cloned().collect::<Vec<_>>(), vec!["7QZ", "EDO"]);
    assert!(summary.residues.contains("HOH"));
    assert!(!summary.candidates.contains("SO4"));

    assert_eq!(results[1].error().unwrap().kind, ErrorKind::InvalidIdentifier);
}

#[tokio::test]
async fn test_cache_miss_against_dead_endpoint_is_row_error() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());

    let pipeline = LigandPipeline::from_config(&config).unwrap();
    let results = pipeline.run(&[StructureRecord::new(1, "X", "1EVE")]).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].error().unwrap().kind, ErrorKind::FetchError);
    assert!(!config.cache_dir().join("1EVE.pdb").exists());
}

#[tokio::test]
async fn test_export_from_cache() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());
    std::fs::create_dir_all(config.cache_dir()).unwrap();
    std::fs::write(config.cache_dir().join("9ZZZ.pdb"), MINI_COMPLEX).unwrap();

    let pipeline = LigandPipeline::from_config(&config).unwrap();
    let requests = vec![ExportRequest {
        unique_id: "1".to_string(),
        code: ligmap_common::PdbCode::normalize("9ZZZ").unwrap(),
        ligand: "7QZ".to_string(),
    }];
    let report = export_ligands(pipeline.fetcher(), &requests, &config.ligands_dir(), "AChE").await;

    assert_eq!(report.written.len(), 1);
    let text = std::fs::read_to_string(&report.written[0]).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("HETATM")).count(), 10);
    assert!(text.ends_with("END\n"));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_extract_known_complexes_from_rcsb() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.layout.root = dir.path().to_path_buf();

    let pipeline = LigandPipeline::from_config(&config).unwrap();
    let results = pipeline
        .run(&[
            StructureRecord::new(1, "AChE_1", "1EVE"),
            StructureRecord::new(2, "Crambin", "1CRN"),
        ])
        .await;

    for r in &results {
        println!("{} {:?}", r.unique_id, r.outcome);
    }
    // Aricept (E20) bound to Torpedo AChE
    assert_eq!(results[0].summary().unwrap().primary.as_deref(), Some("E20"));
    assert!(results[1].summary().unwrap().primary.is_none());
}
