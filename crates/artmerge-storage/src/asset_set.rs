//! Dataset aggregate: one art archive plus its tiledata table

use std::ops::Range;
use std::path::{Path, PathBuf};

use artmerge_formats::{
    ImportReport, ItemRecord, LandRecord, MetadataTable, Raster, TileDataFormat, TileKind,
};
use tracing::{debug, info};

use crate::art::{Art, SaveSummary};
use crate::config::DatasetConfig;
use crate::fs::resolve_input;
use crate::metadata::{export_text, import_text, read_table, write_table};
use crate::{Result, SaveTarget, StorageError};

/// Metadata record of either kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileRecord {
    /// Land record
    Land(LandRecord),
    /// Item record
    Item(ItemRecord),
}

impl TileRecord {
    /// Kind of tile this record describes
    pub const fn kind(&self) -> TileKind {
        match self {
            Self::Land(_) => TileKind::Land,
            Self::Item(_) => TileKind::Item,
        }
    }

    /// Decoded name
    pub fn name(&self) -> String {
        match self {
            Self::Land(record) => record.name(),
            Self::Item(record) => record.name(),
        }
    }
}

/// Snapshot of one tile: image and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Logical id
    pub id: usize,
    /// Tile family
    pub kind: TileKind,
    /// Decoded image, if any
    pub raster: Option<Raster>,
    /// Metadata record, if the table has one for this id
    pub record: Option<TileRecord>,
}

/// Options for [`AssetSet::copy_from`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Copy tiledata records along with rasters
    pub metadata: bool,
}

impl CopyOptions {
    /// Copy rasters and metadata
    pub const fn with_metadata() -> Self {
        Self { metadata: true }
    }
}

/// An open dataset
#[derive(Debug)]
pub struct AssetSet {
    root: PathBuf,
    config: DatasetConfig,
    art: Art,
    tiledata: MetadataTable,
}

impl AssetSet {
    /// Open the dataset in `dir` with default file names
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::load_with_config(dir, DatasetConfig::default())
    }

    /// Open the dataset in `dir` with the given file names
    pub fn load_with_config<P: AsRef<Path>>(dir: P, config: DatasetConfig) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        let insensitive = config.case_insensitive;
        let art_path = resolve_input(&root, &config.art_file, insensitive)?;
        let index_path = resolve_input(&root, &config.index_file, insensitive)?;
        let tiledata_path = resolve_input(&root, &config.tiledata_file, insensitive)?;

        let art = Art::open(&index_path, &art_path)?;
        let layout = art.layout();
        let tiledata = read_table(&tiledata_path, layout.tiledata_format())?;

        info!(
            "Opened dataset {}: {} index slots, max item id {:#06X}, {} tiledata with {} items",
            root.display(),
            layout.index_len(),
            layout.max_item_id(),
            tiledata.format(),
            tiledata.item_count()
        );

        Ok(Self {
            root,
            config,
            art,
            tiledata,
        })
    }

    /// Assemble a dataset from parts already in memory
    pub fn from_parts(root: PathBuf, config: DatasetConfig, art: Art, tiledata: MetadataTable) -> Self {
        Self {
            root,
            config,
            art,
            tiledata,
        }
    }

    /// Directory the dataset was loaded from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File naming configuration
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Art archive
    pub fn art(&self) -> &Art {
        &self.art
    }

    /// Mutable art archive
    pub fn art_mut(&mut self) -> &mut Art {
        &mut self.art
    }

    /// Metadata table
    pub fn tiledata(&self) -> &MetadataTable {
        &self.tiledata
    }

    /// Record layout of the metadata table
    pub fn tiledata_format(&self) -> TileDataFormat {
        self.tiledata.format()
    }

    /// Ids of one kind the archive can address
    pub fn ids(&self, kind: TileKind) -> Range<usize> {
        self.art.layout().ids(kind)
    }

    /// Raster of a tile
    pub fn get_raster(&mut self, kind: TileKind, id: usize) -> Result<Option<&Raster>> {
        self.art.get(kind, id)
    }

    /// Replace a tile's raster
    pub fn set_raster(&mut self, kind: TileKind, id: usize, raster: Raster) -> Result<()> {
        self.art.replace(kind, id, raster)
    }

    /// Tombstone a tile's raster
    pub fn remove(&mut self, kind: TileKind, id: usize) -> Result<()> {
        self.art.remove(kind, id)
    }

    /// Metadata record of a tile
    pub fn record(&self, kind: TileKind, id: usize) -> Option<TileRecord> {
        match kind {
            TileKind::Land => self.tiledata.land(id).cloned().map(TileRecord::Land),
            TileKind::Item => self.tiledata.item(id).cloned().map(TileRecord::Item),
        }
    }

    fn metadata_out_of_range(&self, kind: TileKind, id: usize) -> StorageError {
        let max = match kind {
            TileKind::Land => self.tiledata.land_count(),
            TileKind::Item => self.tiledata.item_count(),
        };
        StorageError::OutOfRange { kind, id, max }
    }

    /// Replace a tile's metadata; the record's kind selects the table
    pub fn set_metadata(&mut self, id: usize, record: TileRecord) -> Result<()> {
        let kind = record.kind();
        let applied = match record {
            TileRecord::Land(record) => self.tiledata.set_land(id, record),
            TileRecord::Item(record) => self.tiledata.set_item(id, record),
        };
        if applied {
            Ok(())
        } else {
            Err(self.metadata_out_of_range(kind, id))
        }
    }

    /// Reset a tile's metadata to zeroes
    pub fn clear_metadata(&mut self, kind: TileKind, id: usize) -> Result<()> {
        let cleared = match kind {
            TileKind::Land => self.tiledata.clear_land(id),
            TileKind::Item => self.tiledata.clear_item(id),
        };
        if cleared {
            Ok(())
        } else {
            Err(self.metadata_out_of_range(kind, id))
        }
    }

    /// Image and metadata of a tile
    pub fn asset(&mut self, kind: TileKind, id: usize) -> Result<Asset> {
        let record = self.record(kind, id);
        let raster = self.art.get(kind, id)?.cloned();
        Ok(Asset {
            id,
            kind,
            raster,
            record,
        })
    }

    /// Export one kind of metadata as `;`-delimited text
    pub fn export_metadata_csv<P: AsRef<Path>>(&self, kind: TileKind, path: P) -> Result<()> {
        export_text(&self.tiledata, kind, path.as_ref())
    }

    /// Import `;`-delimited text into one kind of metadata
    pub fn import_metadata_csv<P: AsRef<Path>>(
        &mut self,
        kind: TileKind,
        path: P,
    ) -> Result<ImportReport> {
        import_text(&mut self.tiledata, kind, path.as_ref())
    }

    /// Copy tiles from another dataset into consecutive ids from `dest_start`
    ///
    /// A source id without an image tombstones its destination. Copying
    /// stops at the end of this dataset's id range. Returns the number of
    /// ids copied.
    pub fn copy_from<I>(
        &mut self,
        source: &mut Self,
        kind: TileKind,
        source_ids: I,
        dest_start: usize,
        options: CopyOptions,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let dest_ids = self.ids(kind);
        let mut copied = 0;

        for (dest, source_id) in (dest_start..).zip(source_ids) {
            if !dest_ids.contains(&dest) {
                debug!("Copy stopped at {} id {:#06X}: end of range", kind, dest);
                break;
            }

            match source.get_raster(kind, source_id)?.cloned() {
                Some(raster) => self.set_raster(kind, dest, raster)?,
                None => self.remove(kind, dest)?,
            }

            if options.metadata {
                match source.record(kind, source_id) {
                    Some(record) => {
                        if self.set_metadata(dest, record).is_err() {
                            debug!("No {} metadata slot {:#06X} in destination", kind, dest);
                        }
                    }
                    None => debug!("No {} metadata for source id {:#06X}", kind, source_id),
                }
            }

            copied += 1;
        }

        info!(
            "Copied {} {} tiles from {} to {} starting at {:#06X}",
            copied,
            kind,
            source.root().display(),
            self.root.display(),
            dest_start
        );
        Ok(copied)
    }

    /// Save the archive and the metadata table into `dir`
    ///
    /// Both halves are always attempted. The returned summary covers the
    /// archive.
    pub fn save<P: AsRef<Path>>(&mut self, dir: P) -> Result<SaveSummary> {
        let dir = dir.as_ref();
        let index_out = dir.join(&self.config.index_output);
        let data_out = dir.join(&self.config.art_output);
        let tiledata_out = dir.join(&self.config.tiledata_output);

        let art = self.art.save(&index_out, &data_out);
        let tiledata = write_table(&self.tiledata, &tiledata_out);

        match (art, tiledata) {
            (Ok(summary), Ok(())) => {
                info!("Saved dataset to {}", dir.display());
                Ok(summary)
            }
            (Ok(_), Err(e)) => Err(StorageError::PartialSave {
                saved: SaveTarget::Art,
                failed: SaveTarget::TileData,
                source: Box::new(e),
            }),
            (Err(e), Ok(())) => Err(StorageError::PartialSave {
                saved: SaveTarget::TileData,
                failed: SaveTarget::Art,
                source: Box::new(e),
            }),
            (Err(art), Err(tiledata)) => Err(StorageError::SaveFailed {
                art: Box::new(art),
                tiledata: Box::new(tiledata),
            }),
        }
    }
}
