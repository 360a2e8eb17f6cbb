use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use artmerge_storage::{DatasetConfig, TileKind};

use super::{open_dataset, save_dataset};

pub fn handle(
    dataset: &Path,
    kind: TileKind,
    id: usize,
    with_metadata: bool,
    out: Option<PathBuf>,
    config: DatasetConfig,
) -> Result<()> {
    let mut set = open_dataset(dataset, config)?;
    set.remove(kind, id)
        .with_context(|| format!("Failed to remove {kind} {id:#06X}"))?;
    if with_metadata {
        set.clear_metadata(kind, id)
            .with_context(|| format!("Failed to reset {kind} {id:#06X} metadata"))?;
    }
    println!("Removed {kind} {id:#06X}");
    save_dataset(&mut set, out)
}
