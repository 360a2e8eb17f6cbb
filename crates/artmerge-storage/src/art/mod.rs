//! Tile art archive: index, decoded raster cache and tombstones
//!
//! Rasters decode on first access and stay cached for the life of the
//! archive. Replacements and removals only touch memory; [`Art::save`]
//! projects the current state into new index and data files.

mod digest;
mod layout;
mod save;

pub use digest::ContentDigest;
pub use layout::{ArtLayout, CLASSIC_INDEX_LEN, EXTENDED_INDEX_LEN, LAND_SLOTS};
pub use save::SaveSummary;

use std::path::Path;

use artmerge_formats::statics::static_dimensions;
use artmerge_formats::{FormatError, LandCodec, Raster, StaticCodec, TileCodec, TileKind};
use tracing::{debug, warn};

use crate::index_table::IndexTable;
use crate::{Result, StorageError};

/// Bytes needed to read a static tile's dimensions
const STATIC_HEADER_BYTES: usize = 8;

/// Decoded state of one slot
#[derive(Debug, Clone, Default)]
enum CacheSlot {
    #[default]
    Unloaded,
    /// Decoding found no image
    Absent,
    Loaded(Raster),
}

/// An open art archive
#[derive(Debug)]
pub struct Art {
    index: IndexTable,
    layout: ArtLayout,
    cache: Vec<CacheSlot>,
    removed: Vec<bool>,
    modified: bool,
}

impl Art {
    /// Open an archive from its index and data files
    pub fn open(index_path: &Path, data_path: &Path) -> Result<Self> {
        let index = IndexTable::load(Some(index_path), Some(data_path))?;
        Ok(Self::from_index(index))
    }

    /// Wrap an already loaded index
    pub fn from_index(index: IndexTable) -> Self {
        let len = index.len();
        Self {
            layout: ArtLayout::new(len),
            index,
            cache: vec![CacheSlot::Unloaded; len],
            removed: vec![false; len],
            modified: false,
        }
    }

    /// Size class and id mapping
    pub const fn layout(&self) -> ArtLayout {
        self.layout
    }

    /// Underlying index
    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Number of index slots
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the archive has no slots
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether anything changed since open
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    fn out_of_range(&self, kind: TileKind, id: usize) -> StorageError {
        StorageError::OutOfRange {
            kind,
            id,
            max: self.layout.ids(kind).end,
        }
    }

    fn mapped_slot(&self, kind: TileKind, id: usize) -> Result<usize> {
        self.layout
            .slot(kind, id)
            .ok_or_else(|| self.out_of_range(kind, id))
    }

    /// Decode a slot straight from the data file
    fn decode_slot(&mut self, slot: usize) -> Result<Option<Raster>> {
        let Some(data) = self.index.read(slot)? else {
            return Ok(None);
        };
        let decoded = match ArtLayout::slot_kind(slot) {
            TileKind::Land => LandCodec::decode(&data),
            TileKind::Item => StaticCodec::decode(&data),
        };
        match decoded {
            Ok(raster) => {
                debug!(
                    "Decoded slot {:#06X}: {}x{}",
                    slot,
                    raster.width(),
                    raster.height()
                );
                Ok(Some(raster))
            }
            Err(FormatError::InvalidDimensions { width, height }) => {
                debug!("Slot {:#06X} declares an empty {}x{} tile", slot, width, height);
                Ok(None)
            }
            Err(e) => {
                warn!("Slot {:#06X} has no usable image: {}", slot, e);
                Ok(None)
            }
        }
    }

    fn cached(&mut self, slot: usize) -> Result<Option<&Raster>> {
        if self.removed[slot] {
            return Ok(None);
        }
        if matches!(self.cache[slot], CacheSlot::Unloaded) {
            self.cache[slot] = match self.decode_slot(slot)? {
                Some(raster) => CacheSlot::Loaded(raster),
                None => CacheSlot::Absent,
            };
        }
        Ok(match &self.cache[slot] {
            CacheSlot::Loaded(raster) => Some(raster),
            CacheSlot::Unloaded | CacheSlot::Absent => None,
        })
    }

    /// Raster of a tile; `None` when out of range, removed or without image
    pub fn get(&mut self, kind: TileKind, id: usize) -> Result<Option<&Raster>> {
        match self.layout.slot(kind, id) {
            Some(slot) => self.cached(slot),
            None => Ok(None),
        }
    }

    /// Land raster by id
    pub fn get_land(&mut self, id: usize) -> Result<Option<&Raster>> {
        self.get(TileKind::Land, id)
    }

    /// Static raster by id
    pub fn get_static(&mut self, id: usize) -> Result<Option<&Raster>> {
        self.get(TileKind::Item, id)
    }

    /// Replace a tile's raster in memory
    ///
    /// Land rasters must be 44x44. Static rasters must not be empty and must
    /// encode within the row lookup range.
    pub fn replace(&mut self, kind: TileKind, id: usize, raster: Raster) -> Result<()> {
        let slot = self.mapped_slot(kind, id)?;
        let allowed = match kind {
            TileKind::Land => raster.is_land_sized(),
            TileKind::Item => raster.width() > 0 && raster.height() > 0,
        };
        if !allowed {
            return Err(StorageError::InvalidRaster {
                kind,
                width: raster.width(),
                height: raster.height(),
            });
        }
        if kind == TileKind::Item {
            StaticCodec::check_encodable(&raster)
                .map_err(|source| StorageError::Encode { slot, source })?;
        }
        self.cache[slot] = CacheSlot::Loaded(raster);
        self.removed[slot] = false;
        self.modified = true;
        Ok(())
    }

    /// Replace a land raster
    pub fn replace_land(&mut self, id: usize, raster: Raster) -> Result<()> {
        self.replace(TileKind::Land, id, raster)
    }

    /// Replace a static raster
    pub fn replace_static(&mut self, id: usize, raster: Raster) -> Result<()> {
        self.replace(TileKind::Item, id, raster)
    }

    /// Tombstone a tile; it saves as an empty slot until replaced
    pub fn remove(&mut self, kind: TileKind, id: usize) -> Result<()> {
        let slot = self.mapped_slot(kind, id)?;
        self.removed[slot] = true;
        self.modified = true;
        Ok(())
    }

    /// Tombstone a land tile
    pub fn remove_land(&mut self, id: usize) -> Result<()> {
        self.remove(TileKind::Land, id)
    }

    /// Tombstone a static tile
    pub fn remove_static(&mut self, id: usize) -> Result<()> {
        self.remove(TileKind::Item, id)
    }

    /// Whether a tile is removed
    pub fn is_removed(&self, kind: TileKind, id: usize) -> bool {
        self.layout
            .slot(kind, id)
            .is_some_and(|slot| self.removed[slot])
    }

    /// Cheap existence check for a land tile
    ///
    /// Uses only the index; a patched entry counts as present.
    pub fn is_valid_land(&self, id: usize) -> bool {
        let Some(slot) = self.layout.land_slot(id) else {
            return false;
        };
        if self.removed[slot] {
            return false;
        }
        match self.cache[slot] {
            CacheSlot::Loaded(_) => true,
            CacheSlot::Absent => false,
            CacheSlot::Unloaded => self.index.validity(slot).is_valid(),
        }
    }

    /// Cheap existence check for a static tile
    ///
    /// Reads only the tile header and requires non-zero dimensions.
    pub fn is_valid_static(&mut self, id: usize) -> Result<bool> {
        let Some(slot) = self.layout.item_slot(id) else {
            return Ok(false);
        };
        if self.removed[slot] {
            return Ok(false);
        }
        match self.cache[slot] {
            CacheSlot::Loaded(_) => Ok(true),
            CacheSlot::Absent => Ok(false),
            CacheSlot::Unloaded => {
                let header = self.index.read_prefix(slot, STATIC_HEADER_BYTES)?;
                Ok(header
                    .as_deref()
                    .and_then(static_dimensions)
                    .is_some_and(|(width, height)| width > 0 && height > 0))
            }
        }
    }

    /// Undecoded bytes of a tile as stored in the input data file
    pub fn raw(&mut self, kind: TileKind, id: usize) -> Result<Option<Vec<u8>>> {
        match self.layout.slot(kind, id) {
            Some(slot) => self.index.read(slot),
            None => Ok(None),
        }
    }

    /// Undecoded bytes of a land tile
    pub fn raw_land(&mut self, id: usize) -> Result<Option<Vec<u8>>> {
        self.raw(TileKind::Land, id)
    }

    /// Undecoded bytes of a static tile
    pub fn raw_static(&mut self, id: usize) -> Result<Option<Vec<u8>>> {
        self.raw(TileKind::Item, id)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use artmerge_formats::IndexEntry;
    use artmerge_formats::index::build_entries;
    use artmerge_formats::land::LAND_ENCODED_SIZE;
    use std::path::PathBuf;

    fn static_tile() -> Vec<u8> {
        [1234u16, 0, 3, 1, 0, 1, 1, 0x0421, 0, 0]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect()
    }

    /// Index of `len` slots; slot 0 is a land tile, slot 0x4000 a static tile
    fn fixture(dir: &Path, len: usize) -> (PathBuf, PathBuf) {
        let mut data = vec![0u8; LAND_ENCODED_SIZE];
        let static_offset = data.len() as i32;
        data.extend_from_slice(&static_tile());

        let mut entries = vec![IndexEntry::REMOVED; len];
        entries[0] = IndexEntry::new(0, LAND_ENCODED_SIZE as i32, 0);
        if len > LAND_SLOTS {
            entries[LAND_SLOTS] = IndexEntry::new(static_offset, static_tile().len() as i32, 0);
        }
        let index = dir.join("artidx.mul");
        let art = dir.join("art.mul");
        std::fs::write(&index, build_entries(&entries).unwrap()).unwrap();
        std::fs::write(&art, data).unwrap();
        (index, art)
    }

    #[test]
    fn test_get_decodes_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let (index, data) = fixture(dir.path(), LAND_SLOTS + 2);
        let mut art = Art::open(&index, &data).unwrap();

        let land = art.get_land(0).unwrap().unwrap();
        assert_eq!((land.width(), land.height()), (44, 44));
        let item = art.get_static(0).unwrap().unwrap();
        assert_eq!(item.pixels(), &[0, 0x8421, 0]);
        assert!(art.get_land(1).unwrap().is_none());
        assert!(art.get_static(2).unwrap().is_none());
        assert!(!art.is_modified());
    }

    #[test]
    fn test_replace_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let (index, data) = fixture(dir.path(), LAND_SLOTS + 2);
        let mut art = Art::open(&index, &data).unwrap();

        art.remove_static(0).unwrap();
        assert!(art.get_static(0).unwrap().is_none());
        assert!(art.is_removed(TileKind::Item, 0));
        assert!(art.is_modified());

        let replacement = Raster::from_pixels(1, 1, vec![0x8001]).unwrap();
        art.replace_static(0, replacement.clone()).unwrap();
        assert_eq!(art.get_static(0).unwrap(), Some(&replacement));
        assert!(!art.is_removed(TileKind::Item, 0));
    }

    #[test]
    fn test_tombstone_wins_over_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (index, data) = fixture(dir.path(), 2);
        let mut art = Art::open(&index, &data).unwrap();
        assert!(art.get_land(0).unwrap().is_some());
        art.remove_land(0).unwrap();
        assert!(art.get_land(0).unwrap().is_none());
        assert!(!art.is_valid_land(0));
    }

    #[test]
    fn test_out_of_range_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let (index, data) = fixture(dir.path(), 2);
        let mut art = Art::open(&index, &data).unwrap();

        let err = art.replace_static(0, Raster::new(1, 1)).unwrap_err();
        assert!(matches!(
            err,
            StorageError::OutOfRange {
                kind: TileKind::Item,
                id: 0,
                max: 0
            }
        ));
        assert!(matches!(
            art.remove_land(2),
            Err(StorageError::OutOfRange { max: 2, .. })
        ));
        assert!(art.get_static(0).unwrap().is_none());
    }

    #[test]
    fn test_invalid_rasters_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (index, data) = fixture(dir.path(), LAND_SLOTS + 1);
        let mut art = Art::open(&index, &data).unwrap();
        assert!(matches!(
            art.replace_land(0, Raster::new(44, 22)),
            Err(StorageError::InvalidRaster {
                kind: TileKind::Land,
                ..
            })
        ));
        assert!(matches!(
            art.replace_static(0, Raster::new(0, 4)),
            Err(StorageError::InvalidRaster { .. })
        ));
        assert!(!art.is_modified());
    }

    #[test]
    fn test_unencodable_static_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (index, data) = fixture(dir.path(), LAND_SLOTS + 1);
        let mut art = Art::open(&index, &data).unwrap();

        let dense = Raster::from_pixels(300, 300, vec![0x8001; 300 * 300]).unwrap();
        assert!(matches!(
            art.replace_static(0, dense),
            Err(StorageError::Encode {
                source: FormatError::RowOffsetOverflow { row: 216, .. },
                ..
            })
        ));
        assert!(!art.is_modified());
        assert_eq!(art.get_static(0).unwrap().unwrap().width(), 3);

        let out = dir.path();
        art.save(&out.join("artidx_.mul"), &out.join("art_.mul"))
            .unwrap();
    }

    #[test]
    fn test_oversized_static_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let mut tile: Vec<u8> = [1234u16, 0, 0xFFFF, 0xFFFF]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        tile.resize(tile.len() + 0xFFFF * 2 + 4, 0);

        let mut entries = vec![IndexEntry::REMOVED; LAND_SLOTS + 1];
        entries[LAND_SLOTS] = IndexEntry::new(0, tile.len() as i32, 0);
        let index = dir.path().join("artidx.mul");
        let data = dir.path().join("art.mul");
        std::fs::write(&index, build_entries(&entries).unwrap()).unwrap();
        std::fs::write(&data, tile).unwrap();

        let mut art = Art::open(&index, &data).unwrap();
        assert!(art.get_static(0).unwrap().is_none());
    }

    #[test]
    fn test_validity_checks() {
        let dir = tempfile::tempdir().unwrap();
        let (index, data) = fixture(dir.path(), LAND_SLOTS + 2);
        let mut art = Art::open(&index, &data).unwrap();
        assert!(art.is_valid_land(0));
        assert!(!art.is_valid_land(1));
        assert!(art.is_valid_static(0).unwrap());
        assert!(!art.is_valid_static(1).unwrap());
        assert!(!art.is_valid_static(0x9000).unwrap());
    }

    #[test]
    fn test_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let (index, data) = fixture(dir.path(), LAND_SLOTS + 1);
        let mut art = Art::open(&index, &data).unwrap();
        assert_eq!(art.raw_static(0).unwrap().unwrap(), static_tile());
        assert_eq!(art.raw_land(0).unwrap().unwrap().len(), LAND_ENCODED_SIZE);
        assert!(art.raw_land(1).unwrap().is_none());
    }
}
