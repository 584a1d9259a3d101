//! Ligand format conversion using Open Babel.

use std::path::{Path, PathBuf};

use ligmap_common::{Config, LigmapError, Result};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Wrapper for `obabel` execution.
pub struct ObabelRunner {
    executable_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub skipped: usize,
}

impl ObabelRunner {
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
        }
    }

    /// Convert one file; the output format follows the output extension.
    pub async fn convert(&self, input: &Path, output: &Path) -> Result<PathBuf> {
        debug!("Running obabel on {:?} -> {:?}", input, output);

        let result = Command::new(&self.executable_path)
            .arg(input)
            .arg("-O")
            .arg(output)
            .output()
            .await
            .map_err(|e| {
                LigmapError::Tool(format!("could not run {:?}: {}", self.executable_path, e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(LigmapError::Tool(format!("obabel failed on {:?}: {}", input, stderr.trim())));
        }

        if !output.exists() {
            return Err(LigmapError::Tool(format!("obabel produced no output file: {:?}", output)));
        }

        Ok(output.to_path_buf())
    }

    /// Convert each file into every `(format, directory)` pair, flat by file stem.
    pub async fn convert_all(&self, files: &[PathBuf], outputs: &[(String, PathBuf)]) -> ConversionReport {
        let mut report = ConversionReport::default();

        for (_, dir) in outputs {
            if let Err(e) = fs::create_dir_all(dir).await {
                warn!("Could not create {:?}: {}", dir, e);
            }
        }

        for file in files {
            let Some(stem) = file.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                report.skipped += 1;
                continue;
            };

            for (format, dir) in outputs {
                let target = dir.join(format!("{}.{}", stem, format));
                info!("Converting to .{}: {}", format, stem);
                match self.convert(file, &target).await {
                    Ok(path) => report.converted.push(path),
                    Err(e) => {
                        warn!("{}", e);
                        report.failed.push((file.clone(), e.to_string()));
                    }
                }
            }
        }

        report
    }
}

/// Output directory for each configured format: `sdf` and `pdbqt` have their
/// own layout entries, anything else lands in `<ligands_dir>/<fmt>`.
pub fn output_dirs(config: &Config) -> Vec<(String, PathBuf)> {
    config
        .conversion
        .formats
        .iter()
        .map(|format| {
            let format = format.trim_start_matches('.').to_lowercase();
            let dir = match format.as_str() {
                "sdf" => config.resolve(&config.layout.sdf_dir),
                "pdbqt" => config.resolve(&config.layout.pdbqt_dir),
                other => config.ligands_dir().join(other),
            };
            (format, dir)
        })
        .collect()
}

/// All `.pdb` files under `root`, sorted, leaving out any whose path below
/// `root` contains `skip_marker`.
pub async fn find_ligand_files(root: &Path, skip_marker: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(&path);
            if !skip_marker.is_empty() && relative.to_string_lossy().contains(skip_marker) {
                continue;
            }

            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdb")) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}
