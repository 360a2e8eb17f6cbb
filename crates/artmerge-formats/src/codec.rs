//! Shared interface of the tile pixel codecs

use crate::error::FormatResult;
use crate::raster::Raster;

/// Symmetric decoder/encoder for one tile pixel layout
pub trait TileCodec {
    /// Decode an encoded tile into a raster
    fn decode(data: &[u8]) -> FormatResult<Raster>;

    /// Encode a raster into tile bytes
    fn encode(raster: &Raster) -> FormatResult<Vec<u8>>;

    /// Check that decoding then encoding reproduces `data` exactly
    fn verify_round_trip(data: &[u8]) -> FormatResult<bool> {
        let raster = Self::decode(data)?;
        let rebuilt = Self::encode(&raster)?;
        Ok(rebuilt.as_slice() == data)
    }
}
