//! Working-directory layout: creation and sorting of exported ligand folders.

use std::path::PathBuf;

use ligmap_common::{Config, Result, TargetConfig};
use tokio::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganiseReport {
    /// `(from, to)` for every folder moved.
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Folder names matching no target prefix; left in place.
    pub unknown: Vec<String>,
    /// Destinations that already existed; the source is left in place.
    pub conflicts: Vec<PathBuf>,
}

/// Every directory `ligmap init` creates, resolved against `layout.root`.
pub fn layout_dirs(config: &Config) -> Vec<PathBuf> {
    let layout = &config.layout;
    let ligands = config.ligands_dir();

    let mut dirs = vec![
        config.cache_dir(),
        ligands.clone(),
        config.resolve(&layout.sdf_dir),
        config.resolve(&layout.pdbqt_dir),
    ];
    dirs.extend(layout.extra_dirs.iter().map(|d| config.resolve(d)));
    dirs.extend(config.targets.iter().map(|t| ligands.join(t.folder_name())));
    dirs
}

/// Create the directory layout. Existing directories are left alone.
pub async fn init_layout(config: &Config) -> Result<Vec<PathBuf>> {
    let dirs = layout_dirs(config);
    for dir in &dirs {
        fs::create_dir_all(dir).await?;
        debug!("Ensured {}", dir.display());
    }
    info!("Layout ready under {}", config.layout.root.display());
    Ok(dirs)
}

/// Move `<prefix>_*` folders under the ligands directory into their target's
/// sub-folder.
pub async fn organise(config: &Config) -> Result<OrganiseReport> {
    let ligands = config.ligands_dir();
    let mut report = OrganiseReport::default();

    // Longest prefix first so `BRD4_BD2` is not claimed by `BRD4`.
    let mut targets: Vec<&TargetConfig> = config.targets.iter().collect();
    targets.sort_by_key(|t| std::cmp::Reverse(t.prefix().len()));

    let target_folders: Vec<String> = config.targets.iter().map(|t| t.folder_name()).collect();

    let mut names = Vec::new();
    let mut entries = fs::read_dir(&ligands).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    for name in names {
        if target_folders.contains(&name) {
            continue;
        }

        let Some(target) = targets.iter().find(|t| name.starts_with(&format!("{}_", t.prefix())))
        else {
            warn!("No target for folder {}, leaving it in place", name);
            report.unknown.push(name);
            continue;
        };

        let from = ligands.join(&name);
        let dest_dir = ligands.join(target.folder_name());
        let to = dest_dir.join(&name);

        if to.exists() {
            warn!("{} already exists, not moving {}", to.display(), name);
            report.conflicts.push(to);
            continue;
        }

        fs::create_dir_all(&dest_dir).await?;
        fs::rename(&from, &to).await?;
        info!("Moved {} → {}", name, dest_dir.display());
        report.moved.push((from, to));
    }

    Ok(report)
}
