//! Art and tiledata archive formats
//!
//! Parsers and builders for the three files of a tile art dataset:
//!
//! - **`artidx.mul`**: fixed 12-byte index records ([`index`])
//! - **`art.mul`**: land diamonds ([`land`]) and run-length static tiles ([`statics`])
//! - **`tiledata.mul`**: per-tile flags and properties ([`tiledata`])
//!
//! Every codec is symmetric: anything decoded can be encoded back, and a
//! canonical encoding survives a decode/encode round trip byte for byte.
//! Nothing here touches the filesystem; see `artmerge-storage` for that.

#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod index;
pub mod land;
pub mod raster;
pub mod statics;
/// Tile metadata table with binary and text interchange
pub mod tiledata;

pub use codec::TileCodec;
pub use error::{FormatError, FormatResult};
pub use index::IndexEntry;
pub use land::LandCodec;
pub use raster::{PRESENCE_BIT, Raster};
pub use statics::StaticCodec;
pub use tiledata::{
    ImportReport, ItemRecord, LandRecord, MetadataTable, TileDataFormat, TileFlags, TileName,
};

use std::fmt;

/// The two families of tiles in a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// 44x44 diamond terrain tiles
    Land,
    /// Variable-size static (item) tiles
    Item,
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Land => write!(f, "land"),
            Self::Item => write!(f, "item"),
        }
    }
}

impl std::str::FromStr for TileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "land" => Ok(Self::Land),
            "item" | "static" => Ok(Self::Item),
            other => Err(format!("unknown tile kind: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_kind_parse() {
        assert_eq!("land".parse::<TileKind>().unwrap(), TileKind::Land);
        assert_eq!("Static".parse::<TileKind>().unwrap(), TileKind::Item);
        assert!("gump".parse::<TileKind>().is_err());
        assert_eq!(TileKind::Item.to_string(), "item");
    }
}
