//! Id to slot mapping by index size class

use std::ops::Range;

use artmerge_formats::{TileDataFormat, TileKind};

/// Slots reserved for land tiles at the start of the index
pub const LAND_SLOTS: usize = 0x4000;

/// Index length of the classic layout
pub const CLASSIC_INDEX_LEN: usize = 0xC000;

/// Index length of the extended layout
pub const EXTENDED_INDEX_LEN: usize = 0x13FDC;

const LAND_ID_MASK: usize = 0x3FFF;

/// Size class of an archive, derived from its index length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtLayout {
    index_len: usize,
}

impl ArtLayout {
    /// Layout for an index of `index_len` slots
    pub const fn new(index_len: usize) -> Self {
        Self { index_len }
    }

    /// Number of index slots
    pub const fn index_len(&self) -> usize {
        self.index_len
    }

    /// Whether this is the extended size class
    pub const fn is_extended(&self) -> bool {
        self.index_len == EXTENDED_INDEX_LEN
    }

    /// Largest item id this size class allows
    pub const fn max_item_id(&self) -> usize {
        match self.index_len {
            CLASSIC_INDEX_LEN => 0x7FFF,
            EXTENDED_INDEX_LEN => 0xFFDB,
            _ => 0x3FFF,
        }
    }

    /// Record layout of the matching tiledata file
    pub const fn tiledata_format(&self) -> TileDataFormat {
        if self.is_extended() {
            TileDataFormat::Extended
        } else {
            TileDataFormat::Legacy
        }
    }

    /// Slot of a land id; the id is masked to 14 bits
    pub const fn land_slot(&self, id: usize) -> Option<usize> {
        let slot = id & LAND_ID_MASK;
        if slot < self.index_len {
            Some(slot)
        } else {
            None
        }
    }

    /// Slot of an item id
    pub const fn item_slot(&self, id: usize) -> Option<usize> {
        if id > self.max_item_id() {
            return None;
        }
        let slot = id + LAND_SLOTS;
        if slot < self.index_len {
            Some(slot)
        } else {
            None
        }
    }

    /// Slot of an id of either kind
    pub const fn slot(&self, kind: TileKind, id: usize) -> Option<usize> {
        match kind {
            TileKind::Land => self.land_slot(id),
            TileKind::Item => self.item_slot(id),
        }
    }

    /// Which pool a slot belongs to
    pub const fn slot_kind(slot: usize) -> TileKind {
        if slot < LAND_SLOTS {
            TileKind::Land
        } else {
            TileKind::Item
        }
    }

    /// Ids of one kind that the index can address
    pub fn ids(&self, kind: TileKind) -> Range<usize> {
        match kind {
            TileKind::Land => 0..self.index_len.min(LAND_SLOTS),
            TileKind::Item => {
                let addressable = self.index_len.saturating_sub(LAND_SLOTS);
                0..addressable.min(self.max_item_id() + 1)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_size_classes() {
        assert_eq!(ArtLayout::new(CLASSIC_INDEX_LEN).max_item_id(), 0x7FFF);
        assert_eq!(ArtLayout::new(EXTENDED_INDEX_LEN).max_item_id(), 0xFFDB);
        assert_eq!(ArtLayout::new(0x10000).max_item_id(), 0x3FFF);
        assert!(ArtLayout::new(EXTENDED_INDEX_LEN).is_extended());
        assert_eq!(
            ArtLayout::new(EXTENDED_INDEX_LEN).tiledata_format(),
            TileDataFormat::Extended
        );
        assert_eq!(
            ArtLayout::new(CLASSIC_INDEX_LEN).tiledata_format(),
            TileDataFormat::Legacy
        );
    }

    #[test]
    fn test_land_ids_are_masked() {
        let layout = ArtLayout::new(CLASSIC_INDEX_LEN);
        assert_eq!(layout.land_slot(3), Some(3));
        assert_eq!(layout.land_slot(0x4003), Some(3));
        assert_eq!(ArtLayout::new(2).land_slot(2), None);
    }

    #[test]
    fn test_item_bounds() {
        let layout = ArtLayout::new(CLASSIC_INDEX_LEN);
        assert_eq!(layout.item_slot(0), Some(0x4000));
        assert_eq!(layout.item_slot(0x7FFF), Some(0xBFFF));
        assert_eq!(layout.item_slot(0x8000), None);

        // a short index cuts the range below the size-class limit
        let short = ArtLayout::new(0x4010);
        assert_eq!(short.item_slot(0xF), Some(0x400F));
        assert_eq!(short.item_slot(0x10), None);
        assert_eq!(short.ids(TileKind::Item), 0..0x10);
    }

    #[test]
    fn test_ids() {
        let layout = ArtLayout::new(EXTENDED_INDEX_LEN);
        assert_eq!(layout.ids(TileKind::Land), 0..0x4000);
        assert_eq!(layout.ids(TileKind::Item), 0..0xFFDC);
        assert_eq!(ArtLayout::new(2).ids(TileKind::Land), 0..2);
        assert_eq!(ArtLayout::new(2).ids(TileKind::Item), 0..0);
    }

    proptest! {
        #[test]
        fn item_ids_map_past_land(id in 0usize..=0x7FFF) {
            let layout = ArtLayout::new(CLASSIC_INDEX_LEN);
            prop_assert_eq!(layout.item_slot(id), Some(id + LAND_SLOTS));
            prop_assert!(layout.ids(TileKind::Item).contains(&id));
        }

        #[test]
        fn land_ids_wrap(id in 0usize..0x10000) {
            let layout = ArtLayout::new(CLASSIC_INDEX_LEN);
            prop_assert_eq!(layout.land_slot(id), Some(id & 0x3FFF));
        }
    }
}
