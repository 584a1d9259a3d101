//! Configuration for ligand-mapping runs.
//!
//! Read from `ligmap.toml`. Every section and field has a default, so an
//! empty file (or no file at all) yields a working configuration that talks
//! to RCSB and caches under `data/pdb_files`.
//!
//! One `[[targets]]` entry per structure class replaces the per-sheet copies
//! of the extraction script: each names its own input table, output mapping
//! and folder prefix while sharing the extraction settings.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LigmapError, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LIGMAP_CONFIG";

/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "ligmap.toml";

/// Placeholder substituted with the upper-case code in the endpoint template.
pub const CODE_PLACEHOLDER: &str = "{CODE}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

// ── Extraction ───────────────────────────────────────────────────────────────

/// Settings shared by every extraction batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Download URL template; `{CODE}` is replaced by the normalised code.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Directory holding one `{CODE}.pdb` file per downloaded structure.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Disable to always hit the network and never write the cache.
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Residue names never counted as ligand candidates.
    #[serde(default = "default_exclusions")]
    pub exclusions: BTreeSet<String>,

    /// Records in flight at once. 1 keeps the batch strictly sequential.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Extra attempts after a failed download.
    #[serde(default)]
    pub max_retries: u32,

    /// Delay before retry `n` is `n * retry_backoff_ms`.
    #[serde(default = "default_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Request timeout. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String { "https://files.rcsb.org/download/{CODE}.pdb".to_string() }
fn default_cache_dir() -> PathBuf { PathBuf::from("data/pdb_files") }
fn default_true() -> bool { true }
fn default_workers() -> usize { 1 }
fn default_backoff_ms() -> u64 { 500 }

/// Water, common counter-ions and crystallisation buffer components.
pub fn default_exclusions() -> BTreeSet<String> {
    ["HOH", "WAT", "SO4", "PO4", "CL", "NA", "MG", "ZN", "K", "CA"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            cache_dir: default_cache_dir(),
            use_cache: true,
            exclusions: default_exclusions(),
            workers: default_workers(),
            max_retries: 0,
            retry_backoff_ms: default_backoff_ms(),
            timeout_secs: None,
        }
    }
}

impl ExtractionConfig {
    /// Download URL for one code.
    pub fn url_for(&self, code: &str) -> String {
        self.endpoint.replace(CODE_PLACEHOLDER, code)
    }
}

// ── Folder layout ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Base directory all relative paths in the config are resolved against.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// One sub-folder per exported ligand.
    #[serde(default = "default_ligands_dir")]
    pub ligands_dir: PathBuf,

    #[serde(default = "default_sdf_dir")]
    pub sdf_dir: PathBuf,

    #[serde(default = "default_pdbqt_dir")]
    pub pdbqt_dir: PathBuf,

    /// Additional folders created by `ligmap init`.
    #[serde(default = "default_extra_dirs")]
    pub extra_dirs: Vec<PathBuf>,
}

fn default_root() -> PathBuf { PathBuf::from(".") }
fn default_ligands_dir() -> PathBuf { PathBuf::from("data/ligands") }
fn default_sdf_dir() -> PathBuf { PathBuf::from("data/ligands_sdf") }
fn default_pdbqt_dir() -> PathBuf { PathBuf::from("data/ligands_pdbqt") }
fn default_extra_dirs() -> Vec<PathBuf> {
    ["data/receptors", "docking/inputs", "docking/outputs", "logs"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            ligands_dir: default_ligands_dir(),
            sdf_dir: default_sdf_dir(),
            pdbqt_dir: default_pdbqt_dir(),
            extra_dirs: default_extra_dirs(),
        }
    }
}

// ── Format conversion ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Open Babel executable.
    #[serde(default = "default_obabel")]
    pub obabel: PathBuf,

    /// Output formats, as Open Babel file extensions.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Files whose path contains this marker are not converted.
    #[serde(default = "default_skip_marker")]
    pub skip_marker: String,
}

fn default_obabel() -> PathBuf { PathBuf::from("obabel") }
fn default_formats() -> Vec<String> { vec!["sdf".to_string(), "pdbqt".to_string()] }
fn default_skip_marker() -> String { "TEST".to_string() }

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            obabel: default_obabel(),
            formats: default_formats(),
            skip_marker: default_skip_marker(),
        }
    }
}

// ── Targets ──────────────────────────────────────────────────────────────────

/// One structure class processed as its own batch (e.g. AChE, BD2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,

    /// CSV table with a unique-id column and a PDB identifier column.
    pub input: PathBuf,

    /// Mapping CSV written by `ligmap extract`.
    pub output: PathBuf,

    /// Folder-name prefix for exported ligands. Defaults to `name`.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Leave unresolved and failed rows out of the written mapping.
    #[serde(default)]
    pub drop_unresolved: bool,
}

impl TargetConfig {
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(&self.name)
    }

    /// Sub-folder of the ligands directory this target's folders are moved into.
    pub fn folder_name(&self) -> String {
        self.name.to_lowercase()
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl Config {
    /// Load configuration.
    ///
    /// Lookup order: `explicit`, then `$LIGMAP_CONFIG`, then `./ligmap.toml`.
    /// A file named explicitly or through the environment must exist; a
    /// missing default file yields the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let path = match named {
            Some(path) => {
                if !path.exists() {
                    return Err(LigmapError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                path
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                path
            }
        };

        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.extraction.endpoint.contains(CODE_PLACEHOLDER) {
            return Err(LigmapError::Config(format!(
                "extraction.endpoint must contain {}: {}",
                CODE_PLACEHOLDER, self.extraction.endpoint
            )));
        }
        if self.extraction.workers == 0 {
            return Err(LigmapError::Config("extraction.workers must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(LigmapError::Config("target name must not be empty".to_string()));
            }
            if !seen.insert(target.name.to_lowercase()) {
                return Err(LigmapError::Config(format!("duplicate target: {}", target.name)));
            }
        }
        Ok(())
    }

    /// Resolve a configured path against `layout.root`. Absolute paths are kept.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.layout.root.join(path)
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.resolve(&self.extraction.cache_dir)
    }

    pub fn ligands_dir(&self) -> PathBuf {
        self.resolve(&self.layout.ligands_dir)
    }

    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
