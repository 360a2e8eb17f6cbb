//! File-backed index table
//!
//! Holds the parsed `artidx.mul` records and a lazily opened read handle on
//! the data file. The data file size is taken once at load; the inputs are
//! never written while a dataset is open.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use artmerge_formats::IndexEntry;
use artmerge_formats::index::parse_entries;
use tracing::debug;

use crate::{Result, StorageError};

/// Outcome of an index validity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryValidity {
    /// No usable data behind the slot
    Invalid,
    /// Data present in the data file
    Valid {
        /// Stored length
        length: usize,
        /// Extra field
        extra: i32,
    },
    /// Entry carries the patched marker; the data file is not consulted
    Patched {
        /// Stored length with the marker cleared
        length: usize,
        /// Extra field
        extra: i32,
    },
}

impl EntryValidity {
    /// Whether the slot counts as present
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Parsed index records plus the data file they point into
#[derive(Debug, Default)]
pub struct IndexTable {
    entries: Vec<IndexEntry>,
    data_path: Option<PathBuf>,
    data_len: Option<u64>,
    reader: Option<BufReader<File>>,
}

impl IndexTable {
    /// Load an index and remember its data file
    ///
    /// Either path being `None` yields an empty table.
    pub fn load(index_path: Option<&Path>, data_path: Option<&Path>) -> Result<Self> {
        let (Some(index_path), Some(data_path)) = (index_path, data_path) else {
            return Ok(Self::default());
        };

        let bytes = std::fs::read(index_path).map_err(|e| StorageError::open(index_path, e))?;
        let entries = parse_entries(&bytes).map_err(|source| StorageError::Corrupt {
            path: index_path.to_path_buf(),
            source,
        })?;
        let data_len = std::fs::metadata(data_path).ok().map(|m| m.len());

        debug!(
            "Loaded {} index entries from {} (data file {} bytes)",
            entries.len(),
            index_path.display(),
            data_len.unwrap_or(0)
        );

        Ok(Self {
            entries,
            data_path: Some(data_path.to_path_buf()),
            data_len,
            reader: None,
        })
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no slots
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw record of a slot
    pub fn entry(&self, slot: usize) -> Option<IndexEntry> {
        self.entries.get(slot).copied()
    }

    /// All records
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Path of the data file
    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    /// Record of a slot that passes the offset, length and data-size checks
    fn readable_entry(&self, slot: usize) -> Option<IndexEntry> {
        let entry = self.entry(slot)?;
        if entry.offset < 0 || entry.length < 0 {
            return None;
        }
        let data_len = self.data_len?;
        (data_len >= entry.offset as u64).then_some(entry)
    }

    /// Position the data reader at a slot
    ///
    /// Returns the reader, the stored length and the extra field, or `None`
    /// when the slot holds no readable data.
    pub fn seek(&mut self, slot: usize) -> Result<Option<(&mut BufReader<File>, usize, i32)>> {
        let Some(entry) = self.readable_entry(slot) else {
            return Ok(None);
        };
        let Some(path) = self.data_path.as_deref() else {
            return Ok(None);
        };

        if self.reader.is_none() {
            let file = File::open(path).map_err(|e| StorageError::open(path, e))?;
            self.reader = Some(BufReader::new(file));
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        reader
            .seek(SeekFrom::Start(entry.offset as u64))
            .map_err(|e| StorageError::io(path, e))?;
        Ok(Some((reader, entry.data_length(), entry.extra)))
    }

    /// Read up to the stored length of a slot
    ///
    /// A data file shorter than `offset + length` yields the available prefix.
    pub fn read(&mut self, slot: usize) -> Result<Option<Vec<u8>>> {
        self.read_prefix(slot, usize::MAX)
    }

    /// Read at most `limit` bytes of a slot, never past the end of the data file
    pub fn read_prefix(&mut self, slot: usize, limit: usize) -> Result<Option<Vec<u8>>> {
        let path = self.data_path.clone().unwrap_or_default();
        let available = self
            .entry(slot)
            .zip(self.data_len)
            .map_or(0, |(entry, len)| len.saturating_sub(entry.offset.max(0) as u64));
        let Some((reader, length, _)) = self.seek(slot)? else {
            return Ok(None);
        };
        let wanted = length
            .min(limit)
            .min(usize::try_from(available).unwrap_or(usize::MAX));
        let mut buf = Vec::with_capacity(wanted);
        reader
            .take(wanted as u64)
            .read_to_end(&mut buf)
            .map_err(|e| StorageError::io(path, e))?;
        Ok(Some(buf))
    }

    /// Check whether a slot points at data, without reading it
    pub fn validity(&self, slot: usize) -> EntryValidity {
        let Some(entry) = self.entry(slot) else {
            return EntryValidity::Invalid;
        };
        if entry.offset < 0 {
            return EntryValidity::Invalid;
        }
        if entry.is_patched() {
            return EntryValidity::Patched {
                length: entry.data_length(),
                extra: entry.extra,
            };
        }
        match self.data_len {
            Some(len) if len >= entry.offset as u64 => EntryValidity::Valid {
                length: entry.data_length(),
                extra: entry.extra,
            },
            _ => EntryValidity::Invalid,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use artmerge_formats::index::build_entries;

    fn write_table(dir: &Path, entries: &[IndexEntry], data: &[u8]) -> (PathBuf, PathBuf) {
        let index = dir.join("artidx.mul");
        let art = dir.join("art.mul");
        std::fs::write(&index, build_entries(entries).unwrap()).unwrap();
        std::fs::write(&art, data).unwrap();
        (index, art)
    }

    #[test]
    fn test_missing_paths_give_empty_table() {
        let table = IndexTable::load(None, Some(Path::new("x"))).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.validity(0), EntryValidity::Invalid);
    }

    #[test]
    fn test_missing_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexTable::load(
            Some(&dir.path().join("artidx.mul")),
            Some(&dir.path().join("art.mul")),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_seek_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let entries = [
            IndexEntry::new(2, 3, 9),
            IndexEntry::REMOVED,
            IndexEntry::new(4, 10, 0),
            IndexEntry::new(100, 1, 0),
            IndexEntry::new(0, -5, 0),
        ];
        let (index, art) = write_table(dir.path(), &entries, b"abcdefgh");
        let mut table = IndexTable::load(Some(&index), Some(&art)).unwrap();
        assert_eq!(table.len(), 5);

        let (_, length, extra) = table.seek(0).unwrap().unwrap();
        assert_eq!((length, extra), (3, 9));
        assert_eq!(table.read(0).unwrap().unwrap(), b"cde");
        assert!(table.read(1).unwrap().is_none());
        // short data yields the available prefix
        assert_eq!(table.read(2).unwrap().unwrap(), b"efgh");
        assert!(table.read(3).unwrap().is_none());
        assert!(table.read(4).unwrap().is_none());
        assert!(table.read(5).unwrap().is_none());
        assert_eq!(table.read_prefix(2, 2).unwrap().unwrap(), b"ef");
    }

    #[test]
    fn test_huge_length_reads_what_exists() {
        let dir = tempfile::tempdir().unwrap();
        let entries = [IndexEntry::new(1, i32::MAX, 0), IndexEntry::new(8, i32::MAX, 0)];
        let (index, art) = write_table(dir.path(), &entries, b"abcdefgh");
        let mut table = IndexTable::load(Some(&index), Some(&art)).unwrap();

        let bytes = table.read(0).unwrap().unwrap();
        assert_eq!(bytes, b"bcdefgh");
        assert!(bytes.capacity() < 1024);
        assert_eq!(table.read(1).unwrap().unwrap(), b"");
    }

    #[test]
    fn test_validity() {
        let dir = tempfile::tempdir().unwrap();
        let entries = [
            IndexEntry::new(0, 4, 1),
            IndexEntry::REMOVED,
            IndexEntry::new(50, i32::MIN | 8, 2),
            IndexEntry::new(50, 8, 2),
        ];
        let (index, art) = write_table(dir.path(), &entries, b"data");
        let table = IndexTable::load(Some(&index), Some(&art)).unwrap();

        assert_eq!(
            table.validity(0),
            EntryValidity::Valid {
                length: 4,
                extra: 1
            }
        );
        assert_eq!(table.validity(1), EntryValidity::Invalid);
        assert_eq!(
            table.validity(2),
            EntryValidity::Patched {
                length: 8,
                extra: 2
            }
        );
        assert_eq!(table.validity(3), EntryValidity::Invalid);
        assert_eq!(table.validity(4), EntryValidity::Invalid);
    }

    #[test]
    fn test_missing_data_file_invalidates_entries() {
        let dir = tempfile::tempdir().unwrap();
        let (index, art) = write_table(dir.path(), &[IndexEntry::new(0, 4, 0)], b"data");
        std::fs::remove_file(&art).unwrap();
        let mut table = IndexTable::load(Some(&index), Some(&art)).unwrap();
        assert_eq!(table.validity(0), EntryValidity::Invalid);
        assert!(table.read(0).unwrap().is_none());
    }
}
