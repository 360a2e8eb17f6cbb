//! File-backed storage for tile art datasets.
//!
//! A dataset is a directory holding three files:
//!
//! - **`artidx.mul`**: the index, one 12-byte record per slot
//! - **`art.mul`**: encoded land and static tiles
//! - **`tiledata.mul`**: flags and properties of every tile
//!
//! [`Art`] owns the index and a lazily filled cache of decoded rasters,
//! [`AssetSet`] pairs it with the metadata table. Saving never touches the
//! inputs: outputs go to sibling files (`artidx_.mul`, `art_.mul`,
//! `tiledata_.mul` by default), each written to a temporary file, synced
//! and renamed into place.
//!
//! # Example
//!
//! ```rust,no_run
//! use artmerge_storage::{AssetSet, TileKind};
//!
//! # fn example() -> artmerge_storage::Result<()> {
//! let mut set = AssetSet::load("/path/to/dataset")?;
//! if let Some(raster) = set.get_raster(TileKind::Item, 0x0EED)? {
//!     println!("coin is {}x{}", raster.width(), raster.height());
//! }
//! let summary = set.save("/path/to/dataset")?;
//! println!("{} tiles encoded, {} deduplicated", summary.encoded, summary.deduplicated);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub mod art;
pub mod asset_set;
pub mod config;
pub mod fs;
pub mod index_table;
pub mod metadata;

pub use art::{Art, ArtLayout, ContentDigest, SaveSummary};
pub use artmerge_formats::{
    ImportReport, ItemRecord, LandRecord, MetadataTable, Raster, TileDataFormat, TileFlags,
    TileKind,
};
pub use asset_set::{Asset, AssetSet, CopyOptions, TileRecord};
pub use config::DatasetConfig;
pub use index_table::{EntryValidity, IndexTable};

use artmerge_formats::FormatError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Which half of a dataset save an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    /// Index and data files
    Art,
    /// Metadata table
    TileData,
}

impl fmt::Display for SaveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Art => write!(f, "art"),
            Self::TileData => write!(f, "tiledata"),
        }
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Source file missing at load.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Logical id outside the addressable span.
    #[error("{kind} id {id:#06X} out of range (addressable ids: 0..{max:#06X})")]
    OutOfRange {
        /// Tile family
        kind: TileKind,
        /// Requested id
        id: usize,
        /// Exclusive upper bound of valid ids
        max: usize,
    },

    /// Structurally impossible file contents.
    #[error("Corrupt file {}: {source}", path.display())]
    Corrupt {
        /// Offending file
        path: PathBuf,
        /// What was wrong
        #[source]
        source: FormatError,
    },

    /// I/O error with the path involved.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A raster could not be encoded during save.
    #[error("Failed to encode slot {slot:#06X}: {source}")]
    Encode {
        /// Index slot
        slot: usize,
        /// Codec error
        #[source]
        source: FormatError,
    },

    /// Encoded data no longer fits 32-bit index offsets.
    #[error("Data file exceeds the 31-bit offset range at slot {slot:#06X}")]
    DataTooLarge {
        /// Slot being written when the limit was hit
        slot: usize,
    },

    /// Raster dimensions not allowed for its tile family.
    #[error("Invalid {kind} raster: {width}x{height}")]
    InvalidRaster {
        /// Tile family
        kind: TileKind,
        /// Raster width
        width: u16,
        /// Raster height
        height: u16,
    },

    /// Record in memory could not be serialized.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Configuration file could not be read.
    #[error("Invalid configuration {}: {source}", path.display())]
    Config {
        /// Configuration file
        path: PathBuf,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// One half of a dataset save failed.
    #[error("Partial save: {saved} written, {failed} failed: {source}")]
    PartialSave {
        /// The half that was written
        saved: SaveTarget,
        /// The half that failed
        failed: SaveTarget,
        /// Why it failed
        #[source]
        source: Box<StorageError>,
    },

    /// Both halves of a dataset save failed.
    #[error("Save failed: art: {art}; tiledata: {tiledata}")]
    SaveFailed {
        /// Art save error
        art: Box<StorageError>,
        /// Tiledata save error
        tiledata: Box<StorageError>,
    },
}

impl StorageError {
    /// Wrap an I/O error with its path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an error raised while opening a source file
    pub(crate) fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.into())
        } else {
            Self::io(path, source)
        }
    }
}

/// Version information for the storage crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
