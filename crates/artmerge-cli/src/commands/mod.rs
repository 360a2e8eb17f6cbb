//! Subcommand handlers

pub mod csv;
pub mod info;
pub mod merge;
pub mod remove;
pub mod rewrite;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use artmerge_storage::{AssetSet, DatasetConfig};

/// Parse a tile id written in decimal or with a `0x` prefix
pub fn parse_id(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid id '{s}': {e}"))
}

/// Dataset file names from `--config`, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<DatasetConfig> {
    match path {
        Some(path) => DatasetConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(DatasetConfig::default()),
    }
}

/// Open a dataset, attaching the directory to any error
pub fn open_dataset(dir: &Path, config: DatasetConfig) -> Result<AssetSet> {
    AssetSet::load_with_config(dir, config)
        .with_context(|| format!("Failed to open dataset {}", dir.display()))
}

/// Save a dataset into `out`, or back into its own directory
pub fn save_dataset(set: &mut AssetSet, out: Option<PathBuf>) -> Result<()> {
    let out = out.unwrap_or_else(|| set.root().to_path_buf());
    let summary = set
        .save(&out)
        .with_context(|| format!("Failed to save dataset to {}", out.display()))?;
    println!(
        "Saved {} slots to {}: {} encoded, {} deduplicated, {} empty, {} data bytes",
        summary.slots,
        out.display(),
        summary.encoded,
        summary.deduplicated,
        summary.sentinels,
        summary.data_bytes
    );
    Ok(())
}
