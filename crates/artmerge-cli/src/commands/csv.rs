use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use artmerge_storage::{DatasetConfig, TileKind};
use tracing::warn;

use super::{open_dataset, save_dataset};

pub fn handle_export(
    dataset: &Path,
    kind: TileKind,
    output: &Path,
    config: DatasetConfig,
) -> Result<()> {
    let set = open_dataset(dataset, config)?;
    set.export_metadata_csv(kind, output)
        .with_context(|| format!("Failed to export {kind} metadata"))?;
    println!("Exported {kind} metadata to {}", output.display());
    Ok(())
}

pub fn handle_import(
    dataset: &Path,
    kind: TileKind,
    input: &Path,
    out: Option<PathBuf>,
    config: DatasetConfig,
) -> Result<()> {
    let mut set = open_dataset(dataset, config)?;
    let report = set
        .import_metadata_csv(kind, input)
        .with_context(|| format!("Failed to import {kind} metadata"))?;

    if !report.is_clean() {
        warn!(
            "Skipped {} rows of {}: lines {:?}",
            report.skipped.len(),
            input.display(),
            report.skipped
        );
    }
    println!(
        "Imported {} {kind} rows from {} ({} skipped)",
        report.applied,
        input.display(),
        report.skipped.len()
    );
    save_dataset(&mut set, out)
}
