use std::path::PathBuf;

use anyhow::{Context, Result};
use artmerge_storage::{CopyOptions, DatasetConfig, TileKind};

use super::{open_dataset, save_dataset};

/// Arguments of the `merge` subcommand
pub struct MergeArgs {
    pub from: PathBuf,
    pub to: PathBuf,
    pub kind: TileKind,
    pub first: usize,
    pub count: usize,
    pub at: usize,
    pub with_metadata: bool,
    pub out: Option<PathBuf>,
}

pub fn handle(args: MergeArgs, config: DatasetConfig) -> Result<()> {
    let mut source = open_dataset(&args.from, config.clone())?;
    let mut dest = open_dataset(&args.to, config)?;

    let options = CopyOptions {
        metadata: args.with_metadata,
    };
    let last = args
        .first
        .checked_add(args.count)
        .context("Source id range overflows")?;
    let copied = dest
        .copy_from(&mut source, args.kind, args.first..last, args.at, options)
        .with_context(|| {
            format!(
                "Failed to copy {} tiles from {}",
                args.kind,
                args.from.display()
            )
        })?;

    println!(
        "Copied {copied} of {} {} tiles to {:#06X}..",
        args.count, args.kind, args.at
    );
    save_dataset(&mut dest, args.out)
}
