use std::path::{Path, PathBuf};

use anyhow::Result;
use artmerge_storage::DatasetConfig;

use super::{open_dataset, save_dataset};

pub fn handle(dataset: &Path, out: Option<PathBuf>, config: DatasetConfig) -> Result<()> {
    let mut set = open_dataset(dataset, config)?;
    save_dataset(&mut set, out)
}
