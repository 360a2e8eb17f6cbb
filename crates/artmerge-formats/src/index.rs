//! Art index (`artidx.mul`) records
//!
//! The index is a flat array of 12-byte little-endian records. Each record
//! locates one tile inside the data file. A trailing partial record is
//! ignored.

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

use crate::error::FormatResult;

/// Mask removing the "patched" marker from a length
pub const LENGTH_MASK: i32 = 0x7FFF_FFFF;

/// One `(offset, length, extra)` index record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BinRead, BinWrite)]
#[brw(little)]
pub struct IndexEntry {
    /// Byte offset into the data file, negative when the slot has no data
    pub offset: i32,
    /// Encoded length; the high bit marks a patched entry
    pub length: i32,
    /// Opaque extra value
    pub extra: i32,
}

impl IndexEntry {
    /// On-disk record size
    pub const SIZE: usize = 12;

    /// Sentinel written for removed or empty slots
    pub const REMOVED: Self = Self {
        offset: -1,
        length: 0,
        extra: -1,
    };

    /// Create a record pointing at stored data
    pub const fn new(offset: i32, length: i32, extra: i32) -> Self {
        Self {
            offset,
            length,
            extra,
        }
    }

    /// Whether the record claims stored data
    pub const fn has_offset(&self) -> bool {
        self.offset >= 0
    }

    /// Whether the length carries the patched marker
    pub const fn is_patched(&self) -> bool {
        self.length < 0
    }

    /// Length with the patched marker cleared
    pub const fn data_length(&self) -> usize {
        (self.length & LENGTH_MASK) as usize
    }
}

/// Parse every whole record in an index file
pub fn parse_entries(data: &[u8]) -> FormatResult<Vec<IndexEntry>> {
    let count = data.len() / IndexEntry::SIZE;
    let mut cursor = Cursor::new(&data[..count * IndexEntry::SIZE]);
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(IndexEntry::read(&mut cursor)?);
    }
    Ok(entries)
}

/// Serialize records into index file bytes
pub fn build_entries(entries: &[IndexEntry]) -> FormatResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(entries.len() * IndexEntry::SIZE));
    for entry in entries {
        entry.write(&mut cursor)?;
    }
    Ok(cursor.into_inner())
}
