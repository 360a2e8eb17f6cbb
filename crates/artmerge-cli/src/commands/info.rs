use std::path::Path;

use anyhow::Result;
use artmerge_storage::{ArtLayout, DatasetConfig, TileKind};

use super::open_dataset;

pub fn handle(dataset: &Path, config: DatasetConfig) -> Result<()> {
    let set = open_dataset(dataset, config)?;
    let layout = set.art().layout();
    let index = set.art().index();

    let (mut land, mut items) = (0usize, 0usize);
    for slot in 0..index.len() {
        if index.validity(slot).is_valid() {
            match ArtLayout::slot_kind(slot) {
                TileKind::Land => land += 1,
                TileKind::Item => items += 1,
            }
        }
    }

    let class = if layout.is_extended() {
        "extended"
    } else {
        "classic"
    };
    let tiledata = set.tiledata();

    println!("Dataset: {}", dataset.display());
    println!("Index slots: {} ({class})", layout.index_len());
    println!("Max item id: {:#06X}", layout.max_item_id());
    println!(
        "Tiledata: {}, {} land records, {} item records",
        tiledata.format(),
        tiledata.land_count(),
        tiledata.item_count()
    );
    println!("Valid land entries: {land}");
    println!("Valid item entries: {items}");
    Ok(())
}
