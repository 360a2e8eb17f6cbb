//! Full rewrite of an archive with content deduplication
//!
//! Every slot is re-encoded from its current raster. Rasters with the same
//! digest inside one pool share a single copy in the data file; land and
//! item slots use separate pools.

use std::collections::HashMap;
use std::path::Path;

use artmerge_formats::index::build_entries;
use artmerge_formats::{IndexEntry, LandCodec, Raster, StaticCodec, TileCodec, TileKind};
use tracing::{debug, info};

use super::{Art, ArtLayout, CacheSlot, ContentDigest};
use crate::fs::write_atomic_pair;
use crate::{Result, StorageError};

/// Counters of one save pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// Index slots written
    pub slots: usize,
    /// Tiles encoded into the data file
    pub encoded: usize,
    /// Tiles that reused an earlier identical tile
    pub deduplicated: usize,
    /// Empty or removed slots written as sentinels
    pub sentinels: usize,
    /// Size of the data file
    pub data_bytes: usize,
}

/// Where each distinct raster landed in the data file
#[derive(Debug, Default)]
struct DedupPools {
    land: HashMap<ContentDigest, (i32, i32)>,
    item: HashMap<ContentDigest, (i32, i32)>,
}

impl DedupPools {
    fn pool(&mut self, slot: usize) -> &mut HashMap<ContentDigest, (i32, i32)> {
        match ArtLayout::slot_kind(slot) {
            TileKind::Land => &mut self.land,
            TileKind::Item => &mut self.item,
        }
    }
}

fn encode_slot(slot: usize, raster: &Raster) -> Result<Vec<u8>> {
    let encoded = match ArtLayout::slot_kind(slot) {
        TileKind::Land => LandCodec::encode(raster),
        TileKind::Item => StaticCodec::encode(raster),
    };
    encoded.map_err(|source| StorageError::Encode { slot, source })
}

impl Art {
    /// Index records and data file bytes for the current state
    ///
    /// Slots never read are decoded from the input without being cached.
    pub fn build_output(&mut self) -> Result<(Vec<IndexEntry>, Vec<u8>, SaveSummary)> {
        let len = self.len();
        let mut entries = Vec::with_capacity(len);
        let mut data = Vec::new();
        let mut pools = DedupPools::default();
        let mut summary = SaveSummary {
            slots: len,
            ..SaveSummary::default()
        };

        for slot in 0..len {
            let decoded;
            let raster = if self.removed[slot] {
                None
            } else if matches!(self.cache[slot], CacheSlot::Unloaded) {
                decoded = self.decode_slot(slot)?;
                decoded.as_ref()
            } else if let CacheSlot::Loaded(raster) = &self.cache[slot] {
                Some(raster)
            } else {
                None
            };

            let Some(raster) = raster else {
                entries.push(IndexEntry::REMOVED);
                summary.sentinels += 1;
                continue;
            };

            let digest = ContentDigest::of_raster(raster);
            let pool = pools.pool(slot);
            if let Some(&(offset, length)) = pool.get(&digest) {
                debug!("Slot {:#06X} reuses {} at offset {}", slot, digest, offset);
                entries.push(IndexEntry::new(offset, length, 0));
                summary.deduplicated += 1;
                continue;
            }

            let encoded = encode_slot(slot, raster)?;
            let offset =
                i32::try_from(data.len()).map_err(|_| StorageError::DataTooLarge { slot })?;
            let length =
                i32::try_from(encoded.len()).map_err(|_| StorageError::DataTooLarge { slot })?;
            data.extend_from_slice(&encoded);
            pool.insert(digest, (offset, length));
            entries.push(IndexEntry::new(offset, length, 0));
            summary.encoded += 1;
        }

        summary.data_bytes = data.len();
        Ok((entries, data, summary))
    }

    /// Write the archive to new index and data files
    ///
    /// Both files go through synced temporaries and are renamed together: if
    /// either rename fails, the previous data file is restored. The archive's
    /// in-memory state is left as it was.
    pub fn save(&mut self, index_out: &Path, data_out: &Path) -> Result<SaveSummary> {
        let (entries, data, summary) = self.build_output()?;
        let index_bytes = build_entries(&entries)?;

        write_atomic_pair((data_out, &data), (index_out, &index_bytes))?;

        info!(
            "Saved {} slots to {}: {} encoded, {} deduplicated, {} empty, {} data bytes",
            summary.slots,
            index_out.display(),
            summary.encoded,
            summary.deduplicated,
            summary.sentinels,
            summary.data_bytes
        );
        Ok(summary)
    }
}
