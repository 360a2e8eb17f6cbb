//! Tile metadata table (`tiledata.mul`)
//!
//! The file holds two arrays of fixed-stride records. Land comes first with
//! exactly `0x4000` records; items fill the rest of the file. Records are
//! grouped in blocks of 32, each block preceded by a 4-byte header that is
//! kept verbatim. Bytes after the last whole item block are kept too, so an
//! untouched table builds back to the same bytes.

pub mod flags;
pub mod record;
pub mod text;

pub use flags::TileFlags;
pub use record::{ItemRecord, LandRecord, NAME_LEN, TileName};
pub use text::{ImportReport, ITEM_TEXT_HEADER, LAND_TEXT_HEADER};

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

use crate::error::{FormatError, FormatResult};

/// Number of land records
pub const LAND_RECORDS: usize = 0x4000;

/// Records per group
pub const GROUP_SIZE: usize = 32;

/// Number of land groups
pub const LAND_GROUPS: usize = LAND_RECORDS / GROUP_SIZE;

const GROUP_HEADER_SIZE: usize = 4;

/// Record layout of a tiledata file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileDataFormat {
    /// Records without the extra field
    #[default]
    Legacy,
    /// Records with an extra 32-bit field after the flags
    Extended,
}

impl TileDataFormat {
    /// Whether records carry the extra field
    pub const fn is_extended(self) -> bool {
        matches!(self, Self::Extended)
    }

    /// Size of one land record
    pub const fn land_record_size(self) -> usize {
        match self {
            Self::Legacy => LandRecord::LEGACY_SIZE,
            Self::Extended => LandRecord::EXTENDED_SIZE,
        }
    }

    /// Size of one item record
    pub const fn item_record_size(self) -> usize {
        match self {
            Self::Legacy => ItemRecord::LEGACY_SIZE,
            Self::Extended => ItemRecord::EXTENDED_SIZE,
        }
    }

    /// Size of the fixed land section
    pub const fn land_section_size(self) -> usize {
        LAND_GROUPS * (GROUP_HEADER_SIZE + GROUP_SIZE * self.land_record_size())
    }

    /// Size of one item group including its header
    pub const fn item_group_size(self) -> usize {
        GROUP_HEADER_SIZE + GROUP_SIZE * self.item_record_size()
    }

    /// Normalize an extra field to this layout
    pub const fn normalize_extra(self, extra: Option<i32>) -> Option<i32> {
        match (self, extra) {
            (Self::Legacy, _) => None,
            (Self::Extended, Some(value)) => Some(value),
            (Self::Extended, None) => Some(0),
        }
    }
}

impl std::fmt::Display for TileDataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

/// Parsed tiledata table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTable {
    format: TileDataFormat,
    land: Vec<LandRecord>,
    land_headers: Vec<u32>,
    items: Vec<ItemRecord>,
    item_headers: Vec<u32>,
    trailing: Vec<u8>,
}

impl MetadataTable {
    /// Blank table with `item_groups` groups of item records
    pub fn new(format: TileDataFormat, item_groups: usize) -> Self {
        let land = LandRecord {
            extra: format.normalize_extra(None),
            ..LandRecord::default()
        };
        let item = ItemRecord {
            extra: format.normalize_extra(None),
            ..ItemRecord::default()
        };
        Self {
            format,
            land: vec![land; LAND_RECORDS],
            land_headers: vec![0; LAND_GROUPS],
            items: vec![item; item_groups * GROUP_SIZE],
            item_headers: vec![0; item_groups],
            trailing: Vec::new(),
        }
    }

    /// Parse a tiledata file in the given layout
    pub fn parse(data: &[u8], format: TileDataFormat) -> FormatResult<Self> {
        let land_section = format.land_section_size();
        if data.len() < land_section {
            return Err(FormatError::TileDataTooShort {
                expected: land_section,
                actual: data.len(),
            });
        }

        let extended = format.is_extended();
        let mut cursor = Cursor::new(data);

        let mut land_headers = Vec::with_capacity(LAND_GROUPS);
        let mut land = Vec::with_capacity(LAND_RECORDS);
        for _ in 0..LAND_GROUPS {
            land_headers.push(u32::read_le(&mut cursor)?);
            for _ in 0..GROUP_SIZE {
                land.push(LandRecord::read_args(&mut cursor, (extended,))?);
            }
        }

        let item_groups = (data.len() - land_section) / format.item_group_size();
        let mut item_headers = Vec::with_capacity(item_groups);
        let mut items = Vec::with_capacity(item_groups * GROUP_SIZE);
        for _ in 0..item_groups {
            item_headers.push(u32::read_le(&mut cursor)?);
            for _ in 0..GROUP_SIZE {
                items.push(ItemRecord::read_args(&mut cursor, (extended,))?);
            }
        }

        let consumed = land_section + item_groups * format.item_group_size();
        Ok(Self {
            format,
            land,
            land_headers,
            items,
            item_headers,
            trailing: data[consumed..].to_vec(),
        })
    }

    /// Serialize back into tiledata file bytes
    pub fn build(&self) -> FormatResult<Vec<u8>> {
        let size = self.format.land_section_size()
            + self.item_headers.len() * self.format.item_group_size()
            + self.trailing.len();
        let mut cursor = Cursor::new(Vec::with_capacity(size));

        for (header, group) in self.land_headers.iter().zip(self.land.chunks(GROUP_SIZE)) {
            header.write_le(&mut cursor)?;
            for record in group {
                record.write(&mut cursor)?;
            }
        }
        for (header, group) in self.item_headers.iter().zip(self.items.chunks(GROUP_SIZE)) {
            header.write_le(&mut cursor)?;
            for record in group {
                record.write(&mut cursor)?;
            }
        }

        let mut out = cursor.into_inner();
        out.extend_from_slice(&self.trailing);
        Ok(out)
    }

    /// Record layout
    pub const fn format(&self) -> TileDataFormat {
        self.format
    }

    /// Number of land records
    pub fn land_count(&self) -> usize {
        self.land.len()
    }

    /// Number of item records
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Land record by id
    pub fn land(&self, id: usize) -> Option<&LandRecord> {
        self.land.get(id)
    }

    /// Item record by id
    pub fn item(&self, id: usize) -> Option<&ItemRecord> {
        self.items.get(id)
    }

    /// All land records
    pub fn land_records(&self) -> &[LandRecord] {
        &self.land
    }

    /// All item records
    pub fn item_records(&self) -> &[ItemRecord] {
        &self.items
    }

    /// Opaque group headers of the land section
    pub fn land_headers(&self) -> &[u32] {
        &self.land_headers
    }

    /// Opaque group headers of the item section
    pub fn item_headers(&self) -> &[u32] {
        &self.item_headers
    }

    /// Bytes after the last whole item group
    pub fn trailing(&self) -> &[u8] {
        &self.trailing
    }

    /// Replace a land record; returns `false` when `id` is outside the table
    pub fn set_land(&mut self, id: usize, mut record: LandRecord) -> bool {
        record.extra = self.format.normalize_extra(record.extra);
        match self.land.get_mut(id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Replace an item record; returns `false` when `id` is outside the table
    pub fn set_item(&mut self, id: usize, mut record: ItemRecord) -> bool {
        record.extra = self.format.normalize_extra(record.extra);
        match self.items.get_mut(id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Reset a land record to zeroes
    pub fn clear_land(&mut self, id: usize) -> bool {
        self.set_land(id, LandRecord::default())
    }

    /// Reset an item record to zeroes
    pub fn clear_item(&mut self, id: usize) -> bool {
        self.set_item(id, ItemRecord::default())
    }
}
