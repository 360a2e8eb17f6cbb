//! Error types for art and tiledata format operations

use thiserror::Error;

/// Format operation result type
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised while decoding or encoding archive structures
#[derive(Debug, Error)]
pub enum FormatError {
    /// Input ended before a structure was complete
    #[error("Truncated data: needed {needed} bytes, got {available}")]
    Truncated {
        /// Bytes required to finish the structure
        needed: usize,
        /// Bytes actually available
        available: usize,
    },

    /// Static tile header declares an empty image
    #[error("Invalid tile dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Declared width
        width: u16,
        /// Declared height
        height: u16,
    },

    /// Static tile header declares more cells than the decoder will hold
    #[error("Tile dimensions {width}x{height} exceed the decoder limit")]
    TileTooLarge {
        /// Declared width
        width: u16,
        /// Declared height
        height: u16,
    },

    /// Land tiles are always 44x44
    #[error("Land raster must be 44x44, got {width}x{height}")]
    LandDimensions {
        /// Raster width
        width: u16,
        /// Raster height
        height: u16,
    },

    /// Pixel buffer length does not match the declared dimensions
    #[error("Pixel buffer holds {actual} cells, expected {expected}")]
    PixelCount {
        /// `width * height`
        expected: usize,
        /// Length of the supplied buffer
        actual: usize,
    },

    /// A row lookup points outside the tile data
    #[error("Row {row} lookup offset {offset} is outside the tile")]
    RowLookup {
        /// Row index
        row: usize,
        /// Offending word offset
        offset: usize,
    },

    /// Encoded rows no longer fit the 16-bit row lookup table
    #[error("Row {row} starts at word {offset}, beyond the 16-bit lookup range")]
    RowOffsetOverflow {
        /// Row index
        row: usize,
        /// Word offset that did not fit
        offset: usize,
    },

    /// Tiledata file is too small for its fixed land section
    #[error("Tiledata too short: land section needs {expected} bytes, file has {actual}")]
    TileDataTooShort {
        /// Size of the land section for the selected format
        expected: usize,
        /// File size
        actual: usize,
    },

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    /// Whether this error describes damaged input rather than a caller mistake
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::InvalidDimensions { .. }
                | Self::TileTooLarge { .. }
                | Self::RowLookup { .. }
                | Self::TileDataTooShort { .. }
                | Self::BinRw(_)
        )
    }
}
