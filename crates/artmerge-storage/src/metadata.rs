//! Tiledata file I/O and text interchange files

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use artmerge_formats::{ImportReport, MetadataTable, TileDataFormat, TileKind};
use tracing::{debug, info};

use crate::fs::write_atomic;
use crate::{Result, StorageError};

/// Read and parse a tiledata file
pub fn read_table(path: &Path, format: TileDataFormat) -> Result<MetadataTable> {
    let bytes = std::fs::read(path).map_err(|e| StorageError::open(path, e))?;
    let table = MetadataTable::parse(&bytes, format).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "Loaded {} tiledata from {}: {} land, {} items, {} trailing bytes",
        format,
        path.display(),
        table.land_count(),
        table.item_count(),
        table.trailing().len()
    );
    Ok(table)
}

/// Build and atomically write a tiledata file
pub fn write_table(table: &MetadataTable, path: &Path) -> Result<()> {
    let bytes = table.build()?;
    write_atomic(path, &bytes)?;
    info!(
        "Saved tiledata to {} ({} bytes)",
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// Export one kind of records as `;`-delimited text
///
/// Nothing is written when a record cannot be rendered as one row.
pub fn export_text(table: &MetadataTable, kind: TileKind, path: &Path) -> Result<()> {
    let mut text = Vec::new();
    match kind {
        TileKind::Land => table.write_land_text(&mut text),
        TileKind::Item => table.write_item_text(&mut text),
    }
    .map_err(|e| StorageError::io(path, e))?;
    write_atomic(path, &text)?;
    info!("Exported {} metadata to {}", kind, path.display());
    Ok(())
}

/// Import `;`-delimited text into one kind of records
pub fn import_text(table: &mut MetadataTable, kind: TileKind, path: &Path) -> Result<ImportReport> {
    let file = File::open(path).map_err(|e| StorageError::open(path, e))?;
    let reader = BufReader::new(file);
    let report = match kind {
        TileKind::Land => table.read_land_text(reader),
        TileKind::Item => table.read_item_text(reader),
    }
    .map_err(|e| StorageError::io(path, e))?;

    for line in &report.skipped {
        debug!("Skipped {} metadata row at {}:{}", kind, path.display(), line);
    }
    info!(
        "Imported {} {} rows from {} ({} skipped)",
        report.applied,
        kind,
        path.display(),
        report.skipped.len()
    );
    Ok(report)
}
